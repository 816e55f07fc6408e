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

use inflight_core::math::Mat4;
use inflight_core::renderer::PrimitiveTopology;

use super::dirty::FramesDirty;
use super::geometry::DrawRange;
use super::{GeometryHandle, MaterialHandle};

/// A named subset of renderables sharing a pipeline and draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Background cube map, drawn first.
    Sky,
    /// Regular lit geometry.
    Opaque,
    /// Stencil-tested silhouettes, drawn last.
    Outline,
}

impl RenderLayer {
    /// Number of layers.
    pub const COUNT: usize = 3;

    /// Every layer in recording order.
    pub const ALL: [RenderLayer; Self::COUNT] =
        [RenderLayer::Sky, RenderLayer::Opaque, RenderLayer::Outline];

    /// Position in recording order.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Everything needed to register a [`Renderable`].
#[derive(Debug, Clone)]
pub struct RenderableDescriptor {
    /// Shared geometry.
    pub geometry: GeometryHandle,
    /// Named draw range of the geometry; `None` draws every index.
    pub submesh: Option<String>,
    /// Shared material.
    pub material: MaterialHandle,
    /// Initial world transform.
    pub world: Mat4,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Layer the instance is drawn in.
    pub layer: RenderLayer,
}

impl RenderableDescriptor {
    /// An opaque, identity-transformed instance drawing the whole geometry.
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            geometry,
            submesh: None,
            material,
            world: Mat4::IDENTITY,
            topology: PrimitiveTopology::TriangleList,
            layer: RenderLayer::Opaque,
        }
    }

    /// Sets the world transform.
    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    /// Sets the layer.
    pub fn in_layer(mut self, layer: RenderLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Draws only the named range.
    pub fn with_submesh(mut self, submesh: impl Into<String>) -> Self {
        self.submesh = Some(submesh.into());
        self
    }
}

/// One drawable instance.
///
/// `object_index` is the instance's stable slot in every frame's object
/// constant buffer. Geometry and material are relations, not ownership.
#[derive(Debug, Clone)]
pub struct Renderable {
    world: Mat4,
    geometry: GeometryHandle,
    material: MaterialHandle,
    draw_range: DrawRange,
    topology: PrimitiveTopology,
    layer: RenderLayer,
    object_index: usize,
    dirty: FramesDirty,
}

impl Renderable {
    pub(crate) fn new(
        desc: &RenderableDescriptor,
        draw_range: DrawRange,
        object_index: usize,
        frame_count: usize,
    ) -> Self {
        Self {
            world: desc.world,
            geometry: desc.geometry,
            material: desc.material,
            draw_range,
            topology: desc.topology,
            layer: desc.layer,
            object_index,
            dirty: FramesDirty::new(frame_count),
        }
    }

    /// World transform.
    pub fn world(&self) -> &Mat4 {
        &self.world
    }

    /// Shared geometry.
    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    /// Shared material.
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    /// Indices consumed by the draw.
    pub fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    /// Primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Layer the instance is drawn in.
    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// Slot in every frame's object constant buffer.
    pub fn object_index(&self) -> usize {
        self.object_index
    }

    /// Ring slots that still hold a stale transform.
    pub fn num_frames_dirty(&self) -> usize {
        self.dirty.remaining()
    }

    /// Marks one ring slot as refreshed. Returns `false` if nothing was stale.
    pub fn consume_dirty(&mut self) -> bool {
        self.dirty.consume()
    }

    pub(crate) fn set_world(&mut self, world: Mat4, frame_count: usize) {
        self.world = world;
        self.dirty.mark(frame_count);
    }

    pub(crate) fn mark_dirty(&mut self, frame_count: usize) {
        self.dirty.mark(frame_count);
    }
}
