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

use std::sync::Arc;
use std::time::Duration;

use inflight_core::renderer::{
    CommandList, CommandQueue, CpuDescriptorHandle, DescriptorHeapDescriptor, DescriptorHeapId,
    DescriptorHeapType, GraphicsDevice, Light, PassInputs, PipelineRegistry, RenderError,
    RendererSettings, ScissorRect, SwapChain, TextureDescriptor, TextureFormat, ViewProvider,
    Viewport,
};
use inflight_data::SceneRegistry;
use inflight_lanes::{FrameInputs, FrameRecorder, FrameResource, FrameTarget, GlobalBindings, RecordSummary};

use crate::frame_sync::{FrameSynchronizer, WaitOutcome};

/// Ambient term used until the host sets one.
const DEFAULT_AMBIENT_LIGHT: [f32; 4] = [0.25, 0.25, 0.35, 1.0];

/// Timing for the frame being prepared, in seconds.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Time since the loop started.
    pub total: f32,
    /// Time since the previous frame.
    pub delta: f32,
}

/// Running counters kept by the [`RenderAgent`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames recorded and submitted.
    pub frames_submitted: u64,
    /// Frame advances that had to block on the GPU.
    pub stalls: u64,
    /// Watermark signaled after the latest submission.
    pub last_signaled_fence: u64,
    /// Time spent blocked across all stalls.
    pub total_wait: Duration,
    /// Draws recorded in the latest frame.
    pub draws_last_frame: u32,
}

/// The orchestrator of the frame ring.
pub struct RenderAgent {
    // Backend handles.
    device: Arc<dyn GraphicsDevice>,
    queue: Arc<dyn CommandQueue>,
    swap_chain: Box<dyn SwapChain>,
    command_list: Box<dyn CommandList>,
    // Ring of per-frame resources and the slot claimed by the last advance.
    frames: Vec<FrameResource>,
    current: usize,
    next: usize,
    advanced: bool,
    synchronizer: FrameSynchronizer,
    recorder: FrameRecorder,
    // Owned replacement for a global pipeline lookup.
    pipelines: PipelineRegistry,
    bindings: GlobalBindings,
    rtv_heap: DescriptorHeapId,
    dsv_heap: DescriptorHeapId,
    ambient_light: [f32; 4],
    settings: RendererSettings,
    stats: FrameStats,
    shut_down: bool,
}

impl std::fmt::Debug for RenderAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderAgent")
            .field("frame_count", &self.frames.len())
            .field("current", &self.current)
            .field("recorder", &self.recorder)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl RenderAgent {
    /// Builds the frame ring for `scene` and waits for its geometry uploads.
    ///
    /// Each slot is sized for the objects and materials registered in `scene`
    /// now; registering more afterwards is a configuration error reported by
    /// the next advance. If the scene was built for a different ring size, its
    /// dirty counters are re-marked for `settings.frame_count`.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        queue: Arc<dyn CommandQueue>,
        swap_chain: Box<dyn SwapChain>,
        settings: RendererSettings,
        pipelines: PipelineRegistry,
        bindings: GlobalBindings,
        scene: &mut SceneRegistry,
    ) -> Result<Self, RenderError> {
        settings.validate()?;
        let frame_count = settings.frame_count;
        if scene.frame_count() != frame_count {
            log::warn!(
                "RenderAgent: scene built for {} frames, re-marking for {frame_count}",
                scene.frame_count()
            );
            scene.set_frame_count(frame_count);
        }

        let frames = (0..frame_count)
            .map(|i| {
                FrameResource::new(
                    device.as_ref(),
                    i,
                    scene.object_count(),
                    scene.material_count(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let command_list = device.create_command_list(Some("frame_commands"))?;

        let back_buffers = swap_chain.buffer_count();
        let rtv_heap = device.create_descriptor_heap(&DescriptorHeapDescriptor {
            label: Some("rtv_heap".to_string()),
            heap_type: DescriptorHeapType::Rtv,
            capacity: back_buffers as u32,
            shader_visible: false,
        })?;
        for i in 0..back_buffers {
            device.create_render_target_view(
                swap_chain.back_buffer(i),
                CpuDescriptorHandle::new(rtv_heap, i as u32),
            )?;
        }
        let dsv_heap = device.create_descriptor_heap(&DescriptorHeapDescriptor {
            label: Some("dsv_heap".to_string()),
            heap_type: DescriptorHeapType::Dsv,
            capacity: 1,
            shader_visible: false,
        })?;
        let depth_buffer = device.create_texture(&TextureDescriptor {
            label: Some("depth_stencil".to_string()),
            width: settings.viewport_width,
            height: settings.viewport_height,
            array_layers: 1,
            format: TextureFormat::Depth24UnormStencil8,
        })?;
        device.create_depth_stencil_view(depth_buffer, CpuDescriptorHandle::new(dsv_heap, 0))?;

        let mut synchronizer = FrameSynchronizer::new(device.as_ref(), queue.clone())?;
        // Geometry uploads were queued before us; staging can go once they land.
        synchronizer.flush()?;
        scene.release_staging();

        let recorder = FrameRecorder::from_settings(&settings);
        log::info!(
            "RenderAgent: {frame_count} frames in flight, {} objects, {} materials, {back_buffers} back buffers",
            scene.object_count(),
            scene.material_count()
        );

        Ok(Self {
            device,
            queue,
            swap_chain,
            command_list,
            frames,
            current: 0,
            next: 0,
            advanced: false,
            synchronizer,
            recorder,
            pipelines,
            bindings,
            rtv_heap,
            dsv_heap,
            ambient_light: DEFAULT_AMBIENT_LIGHT,
            settings,
            stats: FrameStats::default(),
            shut_down: false,
        })
    }

    /// Claims the next ring slot, blocking until the GPU is done with it, and
    /// refreshes its object, material and pass constants.
    pub fn on_frame_advance(
        &mut self,
        scene: &mut SceneRegistry,
        view: &dyn ViewProvider,
        lights: &[Light],
        time: FrameTime,
    ) -> Result<(), RenderError> {
        if self.shut_down {
            return Err(RenderError::NotInitialized);
        }
        self.current = self.next;
        self.next = (self.next + 1) % self.frames.len();

        let watermark = self.frames[self.current].fence_value();
        if let WaitOutcome::Waited(waited) = self.synchronizer.wait_for_completion(watermark)? {
            self.stats.stalls += 1;
            self.stats.total_wait += waited;
        }

        let (near_z, far_z) = view.depth_range();
        let frame = &mut self.frames[self.current];
        frame.refresh_object_constants(scene.renderables_mut())?;
        frame.refresh_material_constants(scene.materials_mut())?;
        frame.refresh_pass_constants(&PassInputs {
            view: view.view_matrix(),
            projection: view.projection_matrix(),
            eye_position: view.eye_position(),
            lights,
            ambient_light: self.ambient_light,
            render_target_size: [
                self.settings.viewport_width as f32,
                self.settings.viewport_height as f32,
            ],
            near_z,
            far_z,
            total_time: time.total,
            delta_time: time.delta,
        });

        self.advanced = true;
        Ok(())
    }

    /// Records the claimed slot's command list, submits it, presents, and
    /// signals the slot's new watermark.
    pub fn on_frame_render(&mut self, scene: &SceneRegistry) -> Result<RecordSummary, RenderError> {
        if !self.advanced {
            return Err(RenderError::RenderingFailed(
                "on_frame_render called without a preceding on_frame_advance".to_string(),
            ));
        }
        self.advanced = false;

        let back_index = self.swap_chain.current_back_buffer_index();
        let (width, height) = (self.settings.viewport_width, self.settings.viewport_height);
        let target = FrameTarget {
            back_buffer: self.swap_chain.back_buffer(back_index),
            rtv: CpuDescriptorHandle::new(self.rtv_heap, back_index as u32),
            dsv: CpuDescriptorHandle::new(self.dsv_heap, 0),
            viewport: Viewport::from_size(width, height),
            scissor: ScissorRect::from_size(width, height),
        };

        let frame = &mut self.frames[self.current];
        let summary = self
            .recorder
            .record_frame(
                frame,
                self.command_list.as_mut(),
                &FrameInputs {
                    target: &target,
                    scene,
                    pipelines: &self.pipelines,
                    bindings: &self.bindings,
                },
            )
            .map_err(|e| {
                log::error!("RenderAgent: recording {} failed: {e}", frame.label());
                RenderError::from(e)
            })?;

        self.queue.execute_command_lists(&[self.command_list.as_ref()])?;
        self.swap_chain.present(0)?;

        let fence = self.synchronizer.signal()?;
        self.frames[self.current].set_fence_value(fence);

        self.stats.frames_submitted += 1;
        self.stats.last_signaled_fence = fence;
        self.stats.draws_last_frame = summary.draws;
        let interval = self.settings.stats_interval_frames;
        if interval > 0 && self.stats.frames_submitted % interval == 0 {
            log::info!(
                "RenderAgent: {} frames, {} stalls ({:.2?} waiting), fence {}",
                self.stats.frames_submitted,
                self.stats.stalls,
                self.stats.total_wait,
                fence
            );
        }
        Ok(summary)
    }

    /// Signals a final watermark and blocks until the GPU reaches it. After
    /// this returns nothing the GPU was given is still in use.
    pub fn on_shutdown(&mut self) -> Result<(), RenderError> {
        if self.shut_down {
            return Ok(());
        }
        log::info!(
            "RenderAgent: draining GPU (last signaled {}, completed {})",
            self.synchronizer.last_signaled(),
            self.synchronizer.last_completed()
        );
        let fence = self.synchronizer.flush().map_err(|e| {
            log::error!("RenderAgent: shutdown drain failed: {e}");
            e
        })?;
        self.shut_down = true;
        log::info!(
            "RenderAgent: idle at fence {fence} after {} frames",
            self.stats.frames_submitted
        );
        Ok(())
    }

    /// Replaces the ambient light term.
    pub fn set_ambient_light(&mut self, ambient: [f32; 4]) {
        self.ambient_light = ambient;
    }

    /// Counters so far.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Ring size.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Slot claimed by the latest advance.
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// A slot of the ring.
    pub fn frame_resource(&self, index: usize) -> Option<&FrameResource> {
        self.frames.get(index)
    }

    /// The fence bookkeeping.
    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.synchronizer
    }

    /// The swap chain being presented.
    pub fn swap_chain(&self) -> &dyn SwapChain {
        self.swap_chain.as_ref()
    }

    /// The device everything was created on, for teardown after shutdown.
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// Strategy names of the recorded layers, in order.
    pub fn lane_names(&self) -> Vec<&'static str> {
        self.recorder.lane_names()
    }
}

impl Drop for RenderAgent {
    fn drop(&mut self) {
        // Upload buffers and allocators go away with the ring; drain first.
        if let Err(e) = self.on_shutdown() {
            log::error!("RenderAgent: dropped without a clean drain: {e}");
        }
    }
}
