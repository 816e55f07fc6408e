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

use inflight_core::math::{Mat4, Vec3, FRAC_PI_4};
use approx::assert_relative_eq;
use inflight_core::renderer::{Light, ObjectConstants, PassConstants, PassInputs};
use inflight_data::mesh::create_box;
use inflight_data::{Geometry, MaterialDescriptor, RenderableDescriptor, RenderableHandle, SceneRegistry};
use inflight_infra::graphics::headless::HeadlessDevice;
use inflight_lanes::FrameResource;

const RING: usize = 3;

fn single_box_scene(device: &HeadlessDevice) -> (SceneRegistry, RenderableHandle) {
    let mesh = create_box(1.0, 1.0, 1.0);
    let geometry = Geometry::upload(device, "box", &mesh.vertices, &mesh.indices32).unwrap();
    let mut scene = SceneRegistry::new(RING);
    let g = scene.add_geometry(geometry).unwrap();
    let m = scene.add_material(MaterialDescriptor::new("stone", 0)).unwrap();
    let r = scene.add_renderable(RenderableDescriptor::new(g, m)).unwrap();
    (scene, r)
}

fn ring(device: &HeadlessDevice) -> Vec<FrameResource> {
    (0..RING)
        .map(|i| FrameResource::new(device, i, 4, 4).unwrap())
        .collect()
}

fn stored_world(device: &HeadlessDevice, frame: &FrameResource) -> Mat4 {
    let constants: ObjectConstants = device
        .read_value(frame.object_address(0).unwrap())
        .unwrap();
    constants.world
}

#[test]
fn test_transform_change_takes_exactly_ring_size_refreshes() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let (mut scene, handle) = single_box_scene(&device);
    let mut frames = ring(&device);
    for frame in &mut frames {
        frame.refresh_object_constants(scene.renderables_mut()).unwrap();
    }
    assert_eq!(scene.renderable(handle).unwrap().num_frames_dirty(), 0);

    let moved = Mat4::from_translation(Vec3::new(4.0, -2.0, 7.5));
    scene.set_world_transform(handle, moved).unwrap();
    assert_eq!(scene.renderable(handle).unwrap().num_frames_dirty(), RING);

    // --- 2. ACT & 3. ASSERT ---
    for (i, frame) in frames.iter_mut().enumerate() {
        assert_ne!(
            stored_world(&device, frame),
            moved.transpose(),
            "slot {i} must not see the change before its own refresh"
        );
        let written = frame.refresh_object_constants(scene.renderables_mut()).unwrap();
        assert_eq!(written, 1);
        assert_eq!(
            scene.renderable(handle).unwrap().num_frames_dirty(),
            RING - i - 1
        );
        assert_eq!(stored_world(&device, frame), moved.transpose());
    }

    // A fourth refresh writes nothing.
    assert_eq!(
        frames[0]
            .refresh_object_constants(scene.renderables_mut())
            .unwrap(),
        0
    );
}

#[test]
fn test_world_matrix_reads_back_transposed() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let (mut scene, handle) = single_box_scene(&device);
    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_rotation_y(0.5);
    scene.set_world_transform(handle, world).unwrap();
    let mut frame = FrameResource::new(&device, 0, 1, 1).unwrap();

    // --- 2. ACT ---
    frame.refresh_object_constants(scene.renderables_mut()).unwrap();

    // --- 3. ASSERT ---
    let stored = stored_world(&device, &frame);
    assert_eq!(stored, world.transpose());
    assert_eq!(stored.transpose(), world);
}

#[test]
fn test_pass_refresh_is_idempotent() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let mut frame = FrameResource::new(&device, 0, 1, 1).unwrap();
    let eye = Vec3::new(0.0, 5.0, -10.0);
    let lights = [
        Light::directional(Vec3::new(0.577, -0.577, 0.577), Vec3::new(0.6, 0.6, 0.6)),
        Light::point(Vec3::new(0.0, 3.0, 0.0), Vec3::ONE, 1.0, 10.0),
    ];
    let inputs = PassInputs {
        view: Mat4::look_at_lh(eye, Vec3::ZERO, Vec3::Y).unwrap(),
        projection: Mat4::perspective_lh_zo(FRAC_PI_4, 16.0 / 9.0, 1.0, 1000.0),
        eye_position: eye,
        lights: &lights,
        ambient_light: [0.25, 0.25, 0.35, 1.0],
        render_target_size: [1280.0, 720.0],
        near_z: 1.0,
        far_z: 1000.0,
        total_time: 2.0,
        delta_time: 0.016,
    };
    let size = std::mem::size_of::<PassConstants>();

    // --- 2. ACT ---
    frame.refresh_pass_constants(&inputs);
    let first = device.read_bytes(frame.pass_address(), size).unwrap();
    frame.refresh_pass_constants(&inputs);
    let second = device.read_bytes(frame.pass_address(), size).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(first, second);
    let pass: PassConstants = bytemuck::pod_read_unaligned(&first);
    assert_eq!(pass.light_count, 2);
    assert_relative_eq!(pass.inv_render_target_size[0], 1.0 / 1280.0);
    assert_relative_eq!(pass.inv_render_target_size[1], 1.0 / 720.0);
    assert_relative_eq!(pass.eye_position[2], -10.0);
    assert_relative_eq!(pass.delta_time, 0.016);
    let stored_view = pass.view.transpose().to_cols_array_2d();
    let expected_view = inputs.view.to_cols_array_2d();
    for (stored, expected) in stored_view.iter().flatten().zip(expected_view.iter().flatten()) {
        assert_relative_eq!(*stored, *expected, epsilon = 1e-6);
    }
}

#[test]
fn test_slots_hold_independent_copies() {
    // --- 1. ARRANGE ---
    let device = HeadlessDevice::new();
    let (mut scene, handle) = single_box_scene(&device);
    let mut frames = ring(&device);
    let first = Mat4::from_translation(Vec3::X);
    let second = Mat4::from_translation(Vec3::Z);

    // --- 2. ACT ---
    scene.set_world_transform(handle, first).unwrap();
    frames[0].refresh_object_constants(scene.renderables_mut()).unwrap();
    scene.set_world_transform(handle, second).unwrap();
    frames[1].refresh_object_constants(scene.renderables_mut()).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(stored_world(&device, &frames[0]), first.transpose());
    assert_eq!(stored_world(&device, &frames[1]), second.transpose());
    // The second change restarted the count, so two more slots are owed.
    assert_eq!(scene.renderable(handle).unwrap().num_frames_dirty(), RING - 1);
}
