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

//! The owning collection of geometry, materials and renderables.
//!
//! Relations between entities are typed indices into this registry, so a
//! renderable can never outlive the geometry or material it draws with.

mod dirty;
mod geometry;
mod material;
mod renderable;

pub use self::dirty::FramesDirty;
pub use self::geometry::{DrawRange, Geometry, IndexElement};
pub use self::material::{Material, MaterialDescriptor};
pub use self::renderable::{RenderLayer, Renderable, RenderableDescriptor};

use std::collections::HashMap;

use inflight_core::math::Mat4;
use inflight_core::renderer::{GraphicsDevice, MaterialConstants, ResourceError};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Position in the owning collection.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

define_handle!(
    /// Refers to a [`Geometry`] in a [`SceneRegistry`].
    GeometryHandle
);
define_handle!(
    /// Refers to a [`Material`] in a [`SceneRegistry`].
    MaterialHandle
);
define_handle!(
    /// Refers to a [`Renderable`] in a [`SceneRegistry`]. Equal to its object index.
    RenderableHandle
);

/// Owns every drawable entity and the layer lists they are drawn from.
///
/// New and changed entities are marked dirty for `frame_count` ring slots.
#[derive(Debug)]
pub struct SceneRegistry {
    frame_count: usize,
    geometries: Vec<Geometry>,
    geometry_names: HashMap<String, GeometryHandle>,
    materials: Vec<Material>,
    material_names: HashMap<String, MaterialHandle>,
    renderables: Vec<Renderable>,
    layers: [Vec<RenderableHandle>; RenderLayer::COUNT],
}

impl SceneRegistry {
    /// Creates an empty registry for a ring of `frame_count` slots.
    ///
    /// # Panics
    ///
    /// Panics if `frame_count` is zero.
    pub fn new(frame_count: usize) -> Self {
        assert!(frame_count > 0, "the frame ring needs at least one slot");
        Self {
            frame_count,
            geometries: Vec::new(),
            geometry_names: HashMap::new(),
            materials: Vec::new(),
            material_names: HashMap::new(),
            renderables: Vec::new(),
            layers: Default::default(),
        }
    }

    /// Ring size the dirty counters are expressed in.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Changes the ring size and marks every entity dirty for the new size,
    /// since slots that did not exist before hold nothing yet.
    ///
    /// # Panics
    ///
    /// Panics if `frame_count` is zero.
    pub fn set_frame_count(&mut self, frame_count: usize) {
        assert!(frame_count > 0, "the frame ring needs at least one slot");
        log::info!(
            "SceneRegistry: ring size {} -> {frame_count}, re-marking {} renderables and {} materials",
            self.frame_count,
            self.renderables.len(),
            self.materials.len()
        );
        self.frame_count = frame_count;
        for r in &mut self.renderables {
            r.mark_dirty(frame_count);
        }
        for m in &mut self.materials {
            m.mark_dirty(frame_count);
        }
    }

    // --- Geometry ---

    /// Takes ownership of uploaded geometry. Names are unique.
    pub fn add_geometry(&mut self, geometry: Geometry) -> Result<GeometryHandle, ResourceError> {
        if self.geometry_names.contains_key(geometry.name()) {
            return Err(ResourceError::AlreadyExists(geometry.name().to_string()));
        }
        let handle = GeometryHandle(self.geometries.len());
        self.geometry_names
            .insert(geometry.name().to_string(), handle);
        self.geometries.push(geometry);
        Ok(handle)
    }

    /// Looks up geometry by name.
    pub fn geometry_by_name(&self, name: &str) -> Option<GeometryHandle> {
        self.geometry_names.get(name).copied()
    }

    /// Resolves a geometry handle.
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle.0)
    }

    /// Drops every staging copy. Call once the upload fence has completed.
    pub fn release_staging(&mut self) {
        for g in &mut self.geometries {
            g.release_staging();
        }
    }

    // --- Materials ---

    /// Registers a material and assigns it the next material constant slot.
    pub fn add_material(
        &mut self,
        desc: MaterialDescriptor,
    ) -> Result<MaterialHandle, ResourceError> {
        if self.material_names.contains_key(&desc.name) {
            return Err(ResourceError::AlreadyExists(desc.name));
        }
        let handle = MaterialHandle(self.materials.len());
        self.material_names.insert(desc.name.clone(), handle);
        self.materials
            .push(Material::new(desc, handle.0, self.frame_count));
        Ok(handle)
    }

    /// Looks up a material by name.
    pub fn material_by_name(&self, name: &str) -> Option<MaterialHandle> {
        self.material_names.get(name).copied()
    }

    /// Resolves a material handle.
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }

    /// Replaces a material's constants and marks it dirty for every slot.
    pub fn update_material(
        &mut self,
        handle: MaterialHandle,
        constants: MaterialConstants,
    ) -> Result<(), ResourceError> {
        let frame_count = self.frame_count;
        self.materials
            .get_mut(handle.0)
            .ok_or(ResourceError::InvalidHandle)?
            .set_constants(constants, frame_count);
        Ok(())
    }

    /// All materials, indexed by material constant slot.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Mutable access for refreshing dirty counters.
    pub fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }

    // --- Renderables ---

    /// Registers an instance and assigns it the next object constant slot.
    pub fn add_renderable(
        &mut self,
        desc: RenderableDescriptor,
    ) -> Result<RenderableHandle, ResourceError> {
        let geometry = self
            .geometry(desc.geometry)
            .ok_or(ResourceError::InvalidHandle)?;
        if self.material(desc.material).is_none() {
            return Err(ResourceError::InvalidHandle);
        }
        let draw_range = match &desc.submesh {
            Some(name) => geometry.draw_range(name).ok_or_else(|| {
                ResourceError::NotFound(format!("draw range '{name}' in '{}'", geometry.name()))
            })?,
            None => geometry.full_range(),
        };

        let handle = RenderableHandle(self.renderables.len());
        self.renderables
            .push(Renderable::new(&desc, draw_range, handle.0, self.frame_count));
        self.layers[desc.layer.index()].push(handle);
        Ok(handle)
    }

    /// Resolves a renderable handle.
    pub fn renderable(&self, handle: RenderableHandle) -> Option<&Renderable> {
        self.renderables.get(handle.0)
    }

    /// Moves an instance and marks it dirty for every slot.
    pub fn set_world_transform(
        &mut self,
        handle: RenderableHandle,
        world: Mat4,
    ) -> Result<(), ResourceError> {
        let frame_count = self.frame_count;
        self.renderables
            .get_mut(handle.0)
            .ok_or(ResourceError::InvalidHandle)?
            .set_world(world, frame_count);
        Ok(())
    }

    /// All renderables, indexed by object slot.
    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    /// Mutable access for refreshing dirty counters.
    pub fn renderables_mut(&mut self) -> &mut [Renderable] {
        &mut self.renderables
    }

    /// The instances drawn in `layer`, in registration order.
    pub fn layer(&self, layer: RenderLayer) -> &[RenderableHandle] {
        &self.layers[layer.index()]
    }

    /// Number of object constant slots in use.
    pub fn object_count(&self) -> usize {
        self.renderables.len()
    }

    /// Number of material constant slots in use.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Releases every geometry's GPU buffers. Only call after the GPU is idle.
    pub fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        for g in self.geometries {
            g.destroy(device)?;
        }
        Ok(())
    }
}
