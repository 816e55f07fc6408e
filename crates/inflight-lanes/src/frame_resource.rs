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

//! One slot of the frame ring.

use inflight_core::renderer::{
    CommandAllocator, CommandList, DescriptorHeapId, GpuAddress, GpuDescriptorHandle,
    GraphicsDevice, MaterialConstants, ObjectConstants, PassConstants, PassInputs, RenderError,
    ResourceError, RootParameter, UploadBuffer,
};
use inflight_data::{Material, Renderable, RenderableHandle, SceneRegistry};

use crate::error::LaneError;

/// Descriptor state shared by every slot: the shader-visible heap and the
/// tables the layers bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalBindings {
    /// Shader-visible heap holding every material texture.
    pub srv_heap: DescriptorHeapId,
    /// Base of the sky cube map table, if the scene has one.
    pub sky_cubemap: Option<GpuDescriptorHandle>,
}

/// A command allocator plus this slot's copy of the object, pass and
/// material constants.
///
/// Capacities are fixed at creation. `fence_value` is the watermark signaled
/// after the last submission that used this slot; zero means never submitted.
#[derive(Debug)]
pub struct FrameResource {
    label: String,
    allocator: Box<dyn CommandAllocator>,
    object_constants: UploadBuffer<ObjectConstants>,
    pass_constants: UploadBuffer<PassConstants>,
    material_constants: UploadBuffer<MaterialConstants>,
    fence_value: u64,
}

impl FrameResource {
    /// Creates ring slot `index` with room for `object_capacity` objects and
    /// `material_capacity` materials.
    pub fn new(
        device: &dyn GraphicsDevice,
        index: usize,
        object_capacity: usize,
        material_capacity: usize,
    ) -> Result<Self, ResourceError> {
        let label = format!("frame_resource[{index}]");
        let allocator = device.create_command_allocator(Some(&format!("{label}.allocator")))?;
        let object_constants = UploadBuffer::new(
            device,
            &format!("{label}.object_constants"),
            object_capacity,
            true,
        )?;
        let pass_constants =
            UploadBuffer::new(device, &format!("{label}.pass_constants"), 1, true)?;
        let material_constants = UploadBuffer::new(
            device,
            &format!("{label}.material_constants"),
            material_capacity,
            true,
        )?;

        log::debug!(
            "{label}: created for {object_capacity} objects and {material_capacity} materials"
        );

        Ok(Self {
            label,
            allocator,
            object_constants,
            pass_constants,
            material_constants,
            fence_value: 0,
        })
    }

    /// Makes the allocator reusable.
    ///
    /// The GPU must have finished every list recorded into it; the frame
    /// synchronizer guarantees that before the slot is handed out.
    pub fn reset_recording(&mut self) -> Result<(), RenderError> {
        self.allocator.reset()
    }

    /// Writes the transposed world matrix of every dirty renderable and
    /// consumes one dirty count from each. Returns how many were written.
    pub fn refresh_object_constants(
        &mut self,
        renderables: &mut [Renderable],
    ) -> Result<usize, LaneError> {
        let capacity = self.object_constants.element_count();
        if renderables.len() > capacity {
            return Err(LaneError::CapacityExceeded {
                what: "object constants",
                requested: renderables.len(),
                capacity,
            });
        }

        let mut written = 0;
        for renderable in renderables.iter_mut() {
            if renderable.num_frames_dirty() == 0 {
                continue;
            }
            let constants = ObjectConstants::from_world(renderable.world());
            self.object_constants
                .write(renderable.object_index(), &constants);
            renderable.consume_dirty();
            written += 1;
        }
        Ok(written)
    }

    /// Recomputes and writes the pass constants. Runs every frame.
    pub fn refresh_pass_constants(&mut self, inputs: &PassInputs<'_>) {
        self.pass_constants.write(0, &PassConstants::compute(inputs));
    }

    /// Same as [`FrameResource::refresh_object_constants`] for materials,
    /// keyed by their constant buffer index.
    pub fn refresh_material_constants(
        &mut self,
        materials: &mut [Material],
    ) -> Result<usize, LaneError> {
        let capacity = self.material_constants.element_count();
        let requested = materials
            .iter()
            .map(|m| m.material_cb_index() + 1)
            .max()
            .unwrap_or(0);
        if requested > capacity {
            return Err(LaneError::CapacityExceeded {
                what: "material constants",
                requested,
                capacity,
            });
        }

        let mut written = 0;
        for material in materials.iter_mut() {
            if material.num_frames_dirty() == 0 {
                continue;
            }
            self.material_constants
                .write(material.material_cb_index(), material.constants());
            material.consume_dirty();
            written += 1;
        }
        Ok(written)
    }

    /// Records one draw per handle, binding geometry, textures and this slot's
    /// object and material constants. Returns the number of draws.
    pub fn record_draws(
        &self,
        list: &mut dyn CommandList,
        handles: &[RenderableHandle],
        scene: &SceneRegistry,
        bindings: &GlobalBindings,
    ) -> Result<u32, LaneError> {
        let mut draws = 0;
        for &handle in handles {
            let dangling = |what| LaneError::DanglingHandle {
                renderable: handle.index(),
                what,
            };
            let renderable = scene.renderable(handle).ok_or_else(|| dangling("renderable"))?;
            let geometry = scene
                .geometry(renderable.geometry())
                .ok_or_else(|| dangling("geometry"))?;
            let material = scene
                .material(renderable.material())
                .ok_or_else(|| dangling("material"))?;

            let object_address = self.object_address(renderable.object_index())?;
            let material_address = self.material_address(material.material_cb_index())?;

            list.set_vertex_buffers(0, &[geometry.vertex_buffer_view()]);
            list.set_index_buffer(&geometry.index_buffer_view());
            list.set_primitive_topology(renderable.topology());

            list.set_graphics_root_descriptor_table(
                RootParameter::MaterialTextures.index(),
                GpuDescriptorHandle::new(bindings.srv_heap, material.diffuse_srv_heap_index()),
            );
            list.set_graphics_root_constant_buffer_view(
                RootParameter::ObjectConstants.index(),
                object_address,
            );
            list.set_graphics_root_constant_buffer_view(
                RootParameter::MaterialConstants.index(),
                material_address,
            );

            let range = renderable.draw_range();
            list.draw_indexed_instanced(
                range.index_count,
                1,
                range.start_index,
                range.base_vertex,
                0,
            );
            draws += 1;
        }
        Ok(draws)
    }

    /// GPU address of object slot `index`.
    pub fn object_address(&self, index: usize) -> Result<GpuAddress, LaneError> {
        let capacity = self.object_constants.element_count();
        if index >= capacity {
            return Err(LaneError::CapacityExceeded {
                what: "object constants",
                requested: index,
                capacity,
            });
        }
        Ok(self.object_constants.gpu_address_of(index))
    }

    /// GPU address of material slot `index`.
    pub fn material_address(&self, index: usize) -> Result<GpuAddress, LaneError> {
        let capacity = self.material_constants.element_count();
        if index >= capacity {
            return Err(LaneError::CapacityExceeded {
                what: "material constants",
                requested: index,
                capacity,
            });
        }
        Ok(self.material_constants.gpu_address_of(index))
    }

    /// GPU address of the pass constants.
    pub fn pass_address(&self) -> GpuAddress {
        self.pass_constants.gpu_address_of(0)
    }

    /// The slot's command allocator.
    pub fn allocator(&self) -> &dyn CommandAllocator {
        self.allocator.as_ref()
    }

    /// Watermark of the last submission that used this slot.
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }

    /// Records the watermark signaled after this slot's submission.
    pub fn set_fence_value(&mut self, value: u64) {
        self.fence_value = value;
    }

    /// Object slots available.
    pub fn object_capacity(&self) -> usize {
        self.object_constants.element_count()
    }

    /// Material slots available.
    pub fn material_capacity(&self) -> usize {
        self.material_constants.element_count()
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inflight_core::math::{Mat4, Vec3};
    use inflight_data::mesh::create_box;
    use inflight_data::{Geometry, MaterialDescriptor, RenderableDescriptor};
    use inflight_infra::graphics::headless::HeadlessDevice;

    fn scene(device: &HeadlessDevice, objects: usize) -> SceneRegistry {
        let mesh = create_box(1.0, 1.0, 1.0);
        let geometry = Geometry::upload(device, "box", &mesh.vertices, &mesh.indices32).unwrap();
        let mut scene = SceneRegistry::new(2);
        let g = scene.add_geometry(geometry).unwrap();
        let m = scene.add_material(MaterialDescriptor::new("mat", 0)).unwrap();
        for i in 0..objects {
            let world = Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0));
            scene
                .add_renderable(RenderableDescriptor::new(g, m).with_world(world))
                .unwrap();
        }
        scene
    }

    #[test]
    fn test_refresh_writes_only_dirty_entries() {
        let device = HeadlessDevice::new();
        let mut scene = scene(&device, 2);
        let mut frame = FrameResource::new(&device, 0, 4, 1).unwrap();

        assert_eq!(frame.refresh_object_constants(scene.renderables_mut()).unwrap(), 2);
        assert_eq!(frame.refresh_object_constants(scene.renderables_mut()).unwrap(), 2);
        assert_eq!(frame.refresh_object_constants(scene.renderables_mut()).unwrap(), 0);
    }

    #[test]
    fn test_too_many_renderables_is_capacity_error() {
        let device = HeadlessDevice::new();
        let mut scene = scene(&device, 3);
        let mut frame = FrameResource::new(&device, 0, 2, 1).unwrap();
        let err = frame
            .refresh_object_constants(scene.renderables_mut())
            .unwrap_err();
        assert!(matches!(
            err,
            LaneError::CapacityExceeded {
                requested: 3,
                capacity: 2,
                ..
            }
        ));
        // Nothing was consumed.
        assert_eq!(scene.renderables()[0].num_frames_dirty(), 2);
    }

    #[test]
    fn test_material_slot_beyond_capacity_fails() {
        let device = HeadlessDevice::new();
        let mut scene = scene(&device, 0);
        scene.add_material(MaterialDescriptor::new("second", 3)).unwrap();
        let mut frame = FrameResource::new(&device, 0, 1, 1).unwrap();
        let err = frame
            .refresh_material_constants(scene.materials_mut())
            .unwrap_err();
        assert!(matches!(
            err,
            LaneError::CapacityExceeded {
                requested: 2,
                capacity: 1,
                ..
            }
        ));
        // The material that fits was not written either.
        let dirty: Vec<_> = scene.materials().iter().map(|m| m.num_frames_dirty()).collect();
        assert_eq!(dirty, vec![2, 2]);
    }

    #[test]
    fn test_material_constants_land_in_their_slot() {
        let device = HeadlessDevice::new();
        let mut scene = scene(&device, 0);
        let mut frame = FrameResource::new(&device, 0, 1, 1).unwrap();
        frame.refresh_material_constants(scene.materials_mut()).unwrap();

        let stored: MaterialConstants = device
            .read_value(frame.material_address(0).unwrap())
            .unwrap();
        assert_eq!(stored, MaterialConstants::default());
    }

    #[test]
    fn test_fence_value_starts_at_zero() {
        let device = HeadlessDevice::new();
        let mut frame = FrameResource::new(&device, 1, 1, 1).unwrap();
        assert_eq!(frame.fence_value(), 0);
        frame.set_fence_value(9);
        assert_eq!(frame.fence_value(), 9);
        assert_eq!(frame.label(), "frame_resource[1]");
    }
}
