// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fills one command list per frame.

use inflight_core::renderer::{
    ClearFlags, CommandList, CpuDescriptorHandle, PipelineRegistry, PipelineStateId,
    RendererSettings, ResourceBarrier, ResourceState, RootParameter, ScissorRect, TextureId,
    Viewport,
};
use inflight_data::SceneRegistry;

use crate::error::LaneError;
use crate::frame_resource::{FrameResource, GlobalBindings};
use crate::render_lane::{OpaqueLane, OutlineLane, RenderLane, SkyLane};

/// The back buffer being drawn this frame and its views.
#[derive(Debug, Clone, Copy)]
pub struct FrameTarget {
    /// The swap-chain texture.
    pub back_buffer: TextureId,
    /// Its render target view.
    pub rtv: CpuDescriptorHandle,
    /// The depth-stencil view.
    pub dsv: CpuDescriptorHandle,
    /// Full-target viewport.
    pub viewport: Viewport,
    /// Full-target scissor.
    pub scissor: ScissorRect,
}

/// Everything a frame is recorded from besides the slot itself.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Where to draw.
    pub target: &'a FrameTarget,
    /// What to draw.
    pub scene: &'a SceneRegistry,
    /// Named pipelines and their root signature.
    pub pipelines: &'a PipelineRegistry,
    /// Descriptor heap and tables.
    pub bindings: &'a GlobalBindings,
}

/// Counters from one recorded frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordSummary {
    /// Draw calls recorded.
    pub draws: u32,
    /// Pipeline changes after the initial one.
    pub pipeline_switches: u32,
    /// Layers that had something to draw.
    pub layers_recorded: u32,
}

/// Records the per-frame command sequence, drawing each lane in order.
pub struct FrameRecorder {
    lanes: Vec<Box<dyn RenderLane>>,
    clear_color: [f32; 4],
    depth_clear: f32,
    stencil_clear: u8,
}

impl std::fmt::Debug for FrameRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRecorder")
            .field("lanes", &self.lane_names())
            .field("clear_color", &self.clear_color)
            .finish_non_exhaustive()
    }
}

impl FrameRecorder {
    /// Sky then opaque, plus the outline lane when it is enabled.
    pub fn from_settings(settings: &RendererSettings) -> Self {
        let mut lanes: Vec<Box<dyn RenderLane>> = vec![Box::new(SkyLane), Box::new(OpaqueLane)];
        if settings.enable_outline_pass {
            lanes.push(Box::new(OutlineLane::new(settings.outline_stencil_ref)));
        }
        let recorder = Self {
            lanes,
            clear_color: settings.clear_color,
            depth_clear: settings.depth_clear,
            stencil_clear: settings.stencil_clear,
        };
        log::info!("FrameRecorder: lanes {:?}", recorder.lane_names());
        recorder
    }

    /// Strategy names in recording order.
    pub fn lane_names(&self) -> Vec<&'static str> {
        self.lanes.iter().map(|l| l.strategy_name()).collect()
    }

    /// Records a full frame into `list` using `frame`'s allocator and constants.
    ///
    /// The GPU must be done with `frame`. On success the list is closed and
    /// ready to execute.
    pub fn record_frame(
        &self,
        frame: &mut FrameResource,
        list: &mut dyn CommandList,
        inputs: &FrameInputs<'_>,
    ) -> Result<RecordSummary, LaneError> {
        let FrameInputs {
            target,
            scene,
            pipelines,
            bindings,
        } = *inputs;

        let mut active = Vec::with_capacity(self.lanes.len());
        for lane in &self.lanes {
            if scene.layer(lane.layer()).is_empty() {
                continue;
            }
            let pipeline = pipelines
                .get(lane.pipeline_name())
                .map_err(|_| LaneError::MissingPipeline {
                    layer: lane.layer(),
                    name: lane.pipeline_name(),
                })?;
            active.push((lane.as_ref(), pipeline));
        }
        let initial_pipeline = active.first().map(|&(_, pipeline)| pipeline);

        frame.reset_recording()?;
        list.reset(frame.allocator(), initial_pipeline)?;

        list.set_graphics_root_signature(pipelines.root_signature());
        list.set_descriptor_heaps(&[bindings.srv_heap]);
        list.set_viewport(&target.viewport);
        list.set_scissor_rect(&target.scissor);

        list.resource_barrier(&[ResourceBarrier::transition(
            target.back_buffer,
            ResourceState::Present,
            ResourceState::RenderTarget,
        )]);

        list.set_render_targets(target.rtv, Some(target.dsv));
        list.clear_render_target_view(target.rtv, self.clear_color);
        list.clear_depth_stencil_view(
            target.dsv,
            ClearFlags::DEPTH_STENCIL,
            self.depth_clear,
            self.stencil_clear,
        );

        list.set_graphics_root_constant_buffer_view(
            RootParameter::PassConstants.index(),
            frame.pass_address(),
        );

        let mut summary = RecordSummary::default();
        let mut bound: Option<PipelineStateId> = initial_pipeline;
        for (lane, pipeline) in active {
            if bound != Some(pipeline) {
                list.set_pipeline_state(pipeline);
                bound = Some(pipeline);
                summary.pipeline_switches += 1;
            }
            if let Some(reference) = lane.stencil_reference() {
                list.set_stencil_ref(reference);
            }
            lane.bind_layer_resources(list, bindings)?;
            summary.draws += frame.record_draws(list, scene.layer(lane.layer()), scene, bindings)?;
            summary.layers_recorded += 1;
        }

        list.resource_barrier(&[ResourceBarrier::transition(
            target.back_buffer,
            ResourceState::RenderTarget,
            ResourceState::Present,
        )]);

        list.close()?;

        log::trace!(
            "FrameRecorder({}): {} draws over {} layers",
            frame.label(),
            summary.draws,
            summary.layers_recorded
        );
        Ok(summary)
    }
}
