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

use inflight_core::renderer::MaterialConstants;

use super::dirty::FramesDirty;

/// Everything needed to register a [`Material`].
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// Unique material name.
    pub name: String,
    /// Slot of the diffuse texture in the shader-visible heap. The specular and
    /// normal maps are expected right after it when bound as one table.
    pub diffuse_srv_heap_index: u32,
    /// Slot of the specular texture.
    pub specular_srv_heap_index: u32,
    /// Slot of the normal map.
    pub normal_srv_heap_index: u32,
    /// Shading constants.
    pub constants: MaterialConstants,
}

impl MaterialDescriptor {
    /// A material whose three textures sit contiguously from `first_srv_heap_index`.
    pub fn new(name: impl Into<String>, first_srv_heap_index: u32) -> Self {
        Self {
            name: name.into(),
            diffuse_srv_heap_index: first_srv_heap_index,
            specular_srv_heap_index: first_srv_heap_index + 1,
            normal_srv_heap_index: first_srv_heap_index + 2,
            constants: MaterialConstants::default(),
        }
    }
}

/// A shared, named material.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    material_cb_index: usize,
    diffuse_srv_heap_index: u32,
    specular_srv_heap_index: u32,
    normal_srv_heap_index: u32,
    constants: MaterialConstants,
    dirty: FramesDirty,
}

impl Material {
    pub(crate) fn new(desc: MaterialDescriptor, material_cb_index: usize, frame_count: usize) -> Self {
        Self {
            name: desc.name,
            material_cb_index,
            diffuse_srv_heap_index: desc.diffuse_srv_heap_index,
            specular_srv_heap_index: desc.specular_srv_heap_index,
            normal_srv_heap_index: desc.normal_srv_heap_index,
            constants: desc.constants,
            dirty: FramesDirty::new(frame_count),
        }
    }

    /// Material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot in every frame's material constant buffer.
    pub fn material_cb_index(&self) -> usize {
        self.material_cb_index
    }

    /// Diffuse texture slot; also the base of the material texture table.
    pub fn diffuse_srv_heap_index(&self) -> u32 {
        self.diffuse_srv_heap_index
    }

    /// Specular texture slot.
    pub fn specular_srv_heap_index(&self) -> u32 {
        self.specular_srv_heap_index
    }

    /// Normal map slot.
    pub fn normal_srv_heap_index(&self) -> u32 {
        self.normal_srv_heap_index
    }

    /// Current shading constants.
    pub fn constants(&self) -> &MaterialConstants {
        &self.constants
    }

    /// Ring slots that still hold stale constants.
    pub fn num_frames_dirty(&self) -> usize {
        self.dirty.remaining()
    }

    /// Marks one ring slot as refreshed. Returns `false` if nothing was stale.
    pub fn consume_dirty(&mut self) -> bool {
        self.dirty.consume()
    }

    pub(crate) fn set_constants(&mut self, constants: MaterialConstants, frame_count: usize) {
        self.constants = constants;
        self.dirty.mark(frame_count);
    }

    pub(crate) fn mark_dirty(&mut self, frame_count: usize) {
        self.dirty.mark(frame_count);
    }
}
