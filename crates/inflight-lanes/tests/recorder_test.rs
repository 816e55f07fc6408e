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

use inflight_core::renderer::{
    CommandList, CpuDescriptorHandle, DescriptorHeapId, GpuDescriptorHandle, GraphicsDevice,
    PipelineRegistry, PipelineStateId, RendererSettings, ResourceBarrier, ResourceState,
    RootSignatureId, ScissorRect, TextureId, Viewport, OPAQUE_PIPELINE, OUTLINE_PIPELINE,
    SKY_PIPELINE,
};
use inflight_data::mesh::{create_box, create_grid};
use inflight_data::{Geometry, MaterialDescriptor, RenderLayer, RenderableDescriptor, SceneRegistry};
use inflight_infra::graphics::headless::{HeadlessCommandList, HeadlessDevice, RecordedCommand};
use inflight_lanes::{FrameInputs, FrameRecorder, FrameResource, FrameTarget, GlobalBindings, LaneError};

const SKY: PipelineStateId = PipelineStateId(100);
const OPAQUE: PipelineStateId = PipelineStateId(200);
const OUTLINE: PipelineStateId = PipelineStateId(300);
const SRV_HEAP: DescriptorHeapId = DescriptorHeapId(7);

/// One 36-index sky box, two 6-index opaque grids and optionally one outlined box.
fn layered_scene(device: &HeadlessDevice, with_outline: bool) -> SceneRegistry {
    let mut scene = SceneRegistry::new(2);
    let sky_mesh = create_box(100.0, 100.0, 100.0);
    let grid_mesh = create_grid(4.0, 4.0, 2, 2);
    let sky_geo = scene
        .add_geometry(Geometry::upload(device, "sky", &sky_mesh.vertices, &sky_mesh.indices32).unwrap())
        .unwrap();
    let grid_geo = scene
        .add_geometry(Geometry::upload(device, "grid", &grid_mesh.vertices, &grid_mesh.indices32).unwrap())
        .unwrap();
    let mat = scene.add_material(MaterialDescriptor::new("default", 0)).unwrap();

    // Registered out of layer order on purpose.
    scene
        .add_renderable(RenderableDescriptor::new(grid_geo, mat))
        .unwrap();
    scene
        .add_renderable(RenderableDescriptor::new(sky_geo, mat).in_layer(RenderLayer::Sky))
        .unwrap();
    scene
        .add_renderable(RenderableDescriptor::new(grid_geo, mat))
        .unwrap();
    if with_outline {
        scene
            .add_renderable(RenderableDescriptor::new(sky_geo, mat).in_layer(RenderLayer::Outline))
            .unwrap();
    }
    scene
}

fn pipelines(with_outline: bool) -> PipelineRegistry {
    let mut registry = PipelineRegistry::new(RootSignatureId(1));
    registry.register(SKY_PIPELINE, SKY).unwrap();
    registry.register(OPAQUE_PIPELINE, OPAQUE).unwrap();
    if with_outline {
        registry.register(OUTLINE_PIPELINE, OUTLINE).unwrap();
    }
    registry
}

fn target() -> FrameTarget {
    FrameTarget {
        back_buffer: TextureId(42),
        rtv: CpuDescriptorHandle::new(DescriptorHeapId(2), 0),
        dsv: CpuDescriptorHandle::new(DescriptorHeapId(3), 0),
        viewport: Viewport::from_size(1280, 720),
        scissor: ScissorRect::from_size(1280, 720),
    }
}

fn bindings() -> GlobalBindings {
    GlobalBindings {
        srv_heap: SRV_HEAP,
        sky_cubemap: Some(GpuDescriptorHandle::new(SRV_HEAP, 3)),
    }
}

fn commands(list: &dyn CommandList) -> Vec<RecordedCommand> {
    list.as_any()
        .downcast_ref::<HeadlessCommandList>()
        .unwrap()
        .commands()
        .to_vec()
}

#[derive(Debug, PartialEq)]
enum Event {
    Pipeline(PipelineStateId),
    Draw(u32),
}

fn pipeline_and_draw_events(commands: &[RecordedCommand]) -> Vec<Event> {
    commands
        .iter()
        .filter_map(|c| match c {
            RecordedCommand::SetPipelineState(p) => Some(Event::Pipeline(*p)),
            RecordedCommand::DrawIndexedInstanced { index_count, .. } => Some(Event::Draw(*index_count)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_draws_follow_layer_order_with_switches_only_at_boundaries() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let scene = layered_scene(&device, false);
    let registry = pipelines(false);
    let (target, bindings) = (target(), bindings());
    let mut frame = FrameResource::new(&device, 0, 8, 2).unwrap();
    let mut list = device.create_command_list(Some("main")).unwrap();
    let recorder = FrameRecorder::from_settings(&RendererSettings::default());

    // --- 2. ACT ---
    let summary = recorder
        .record_frame(
            &mut frame,
            list.as_mut(),
            &FrameInputs {
                target: &target,
                scene: &scene,
                pipelines: &registry,
                bindings: &bindings,
            },
        )
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        pipeline_and_draw_events(&commands(list.as_ref())),
        vec![
            Event::Pipeline(SKY),
            Event::Draw(36),
            Event::Pipeline(OPAQUE),
            Event::Draw(6),
            Event::Draw(6),
        ]
    );
    assert_eq!(summary.draws, 3);
    assert_eq!(summary.pipeline_switches, 1);
    assert_eq!(summary.layers_recorded, 2);
    assert!(!list.is_recording());
}

#[test]
fn test_frame_is_bracketed_by_back_buffer_transitions() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let scene = layered_scene(&device, false);
    let registry = pipelines(false);
    let (target, bindings) = (target(), bindings());
    let mut frame = FrameResource::new(&device, 0, 8, 2).unwrap();
    let mut list = device.create_command_list(None).unwrap();
    let recorder = FrameRecorder::from_settings(&RendererSettings::default());

    // --- 2. ACT ---
    recorder
        .record_frame(
            &mut frame,
            list.as_mut(),
            &FrameInputs {
                target: &target,
                scene: &scene,
                pipelines: &registry,
                bindings: &bindings,
            },
        )
        .unwrap();
    let recorded = commands(list.as_ref());

    // --- 3. ASSERT ---
    let to_target = RecordedCommand::ResourceBarrier(vec![ResourceBarrier::transition(
        target.back_buffer,
        ResourceState::Present,
        ResourceState::RenderTarget,
    )]);
    let to_present = RecordedCommand::ResourceBarrier(vec![ResourceBarrier::transition(
        target.back_buffer,
        ResourceState::RenderTarget,
        ResourceState::Present,
    )]);
    assert_eq!(recorded[0], RecordedCommand::SetPipelineState(SKY));
    assert_eq!(recorded[1], RecordedCommand::SetRootSignature(RootSignatureId(1)));
    assert_eq!(recorded[2], RecordedCommand::SetDescriptorHeaps(vec![SRV_HEAP]));
    assert_eq!(recorded[5], to_target);
    assert!(matches!(recorded[6], RecordedCommand::SetRenderTargets { .. }));
    assert!(matches!(recorded[7], RecordedCommand::ClearRenderTarget { .. }));
    assert!(matches!(recorded[8], RecordedCommand::ClearDepthStencil { .. }));
    assert_eq!(recorded.last(), Some(&to_present));

    let first_draw = recorded.iter().position(|c| c.is_draw()).unwrap();
    let last_draw = recorded.iter().rposition(|c| c.is_draw()).unwrap();
    let barrier_in = recorded.iter().position(|c| *c == to_target).unwrap();
    assert!(barrier_in < first_draw);
    assert_eq!(last_draw, recorded.len() - 2);
}

#[test]
fn test_each_draw_binds_its_own_object_slot() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let scene = layered_scene(&device, false);
    let registry = pipelines(false);
    let (target, bindings) = (target(), bindings());
    let mut frame = FrameResource::new(&device, 0, 8, 2).unwrap();
    let mut list = device.create_command_list(None).unwrap();
    let recorder = FrameRecorder::from_settings(&RendererSettings::default());

    // --- 2. ACT ---
    recorder
        .record_frame(
            &mut frame,
            list.as_mut(),
            &FrameInputs {
                target: &target,
                scene: &scene,
                pipelines: &registry,
                bindings: &bindings,
            },
        )
        .unwrap();

    // --- 3. ASSERT ---
    let object_slot = 1; // ObjectConstants root parameter
    let bound: Vec<_> = commands(list.as_ref())
        .into_iter()
        .filter_map(|c| match c {
            RecordedCommand::SetRootConstantBufferView { parameter, address } if parameter == object_slot => {
                Some(address)
            }
            _ => None,
        })
        .collect();
    // Sky (object 1) first, then the opaque grids (objects 0 and 2).
    let expected: Vec<_> = [1, 0, 2]
        .iter()
        .map(|&i| frame.object_address(i).unwrap())
        .collect();
    assert_eq!(bound, expected);
}

#[test]
fn test_outline_layer_is_skipped_unless_enabled() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let scene = layered_scene(&device, true);
    let (target, bindings) = (target(), bindings());
    let mut frame = FrameResource::new(&device, 0, 8, 2).unwrap();
    let mut list = device.create_command_list(None).unwrap();

    // --- 2. ACT ---
    // Disabled: the outline pipeline is not even required.
    let disabled = FrameRecorder::from_settings(&RendererSettings::default())
        .record_frame(
            &mut frame,
            list.as_mut(),
            &FrameInputs {
                target: &target,
                scene: &scene,
                pipelines: &pipelines(false),
                bindings: &bindings,
            },
        )
        .unwrap();
    let disabled_commands = commands(list.as_ref());

    let settings = RendererSettings {
        enable_outline_pass: true,
        outline_stencil_ref: 5,
        ..RendererSettings::default()
    };
    let enabled = FrameRecorder::from_settings(&settings)
        .record_frame(
            &mut frame,
            list.as_mut(),
            &FrameInputs {
                target: &target,
                scene: &scene,
                pipelines: &pipelines(true),
                bindings: &bindings,
            },
        )
        .unwrap();
    let enabled_commands = commands(list.as_ref());

    // --- 3. ASSERT ---
    assert_eq!(disabled.draws, 3);
    assert!(!disabled_commands
        .iter()
        .any(|c| matches!(c, RecordedCommand::SetStencilRef(_))));

    assert_eq!(enabled.draws, 4);
    assert_eq!(enabled.pipeline_switches, 2);
    let events = pipeline_and_draw_events(&enabled_commands);
    assert_eq!(events[events.len() - 2], Event::Pipeline(OUTLINE));
    assert_eq!(events[events.len() - 1], Event::Draw(36));
    assert!(enabled_commands.contains(&RecordedCommand::SetStencilRef(5)));
}

#[test]
fn test_missing_pipeline_is_an_error() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let scene = layered_scene(&device, true);
    let (target, bindings) = (target(), bindings());
    let mut frame = FrameResource::new(&device, 0, 8, 2).unwrap();
    let mut list = device.create_command_list(None).unwrap();
    let settings = RendererSettings {
        enable_outline_pass: true,
        ..RendererSettings::default()
    };

    // --- 2. ACT ---
    let result = FrameRecorder::from_settings(&settings).record_frame(
        &mut frame,
        list.as_mut(),
        &FrameInputs {
            target: &target,
            scene: &scene,
            pipelines: &pipelines(false),
            bindings: &bindings,
        },
    );

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(LaneError::MissingPipeline {
            layer: RenderLayer::Outline,
            ..
        })
    ));
    // Nothing was recorded.
    assert!(!list.is_recording());
}

#[test]
fn test_sky_layer_needs_a_cube_map() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let scene = layered_scene(&device, false);
    let registry = pipelines(false);
    let target = target();
    let bindings = GlobalBindings {
        srv_heap: SRV_HEAP,
        sky_cubemap: None,
    };
    let mut frame = FrameResource::new(&device, 0, 8, 2).unwrap();
    let mut list = device.create_command_list(None).unwrap();

    // --- 2. ACT ---
    let result = FrameRecorder::from_settings(&RendererSettings::default()).record_frame(
        &mut frame,
        list.as_mut(),
        &FrameInputs {
            target: &target,
            scene: &scene,
            pipelines: &registry,
            bindings: &bindings,
        },
    );

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(LaneError::MissingBinding {
            layer: RenderLayer::Sky,
            ..
        })
    ));
}
