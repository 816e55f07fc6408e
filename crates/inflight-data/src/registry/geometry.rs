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

//! Shared, immutable-after-upload vertex and index buffers.

use std::collections::HashMap;

use bytemuck::Pod;
use inflight_core::renderer::{
    BufferAllocation, BufferDescriptor, GraphicsDevice, HeapType, IndexBufferView, IndexFormat,
    ResourceError, VertexBufferView,
};

/// An index type that can back an index buffer.
pub trait IndexElement: Pod {
    /// The matching GPU index format.
    const FORMAT: IndexFormat;
}

impl IndexElement for u16 {
    const FORMAT: IndexFormat = IndexFormat::Uint16;
}

impl IndexElement for u32 {
    const FORMAT: IndexFormat = IndexFormat::Uint32;
}

/// The part of a geometry's index buffer one draw consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawRange {
    /// Number of indices.
    pub index_count: u32,
    /// First index.
    pub start_index: u32,
    /// Value added to each index before fetching the vertex.
    pub base_vertex: i32,
}

/// CPU copies kept until the initial upload is known to be complete.
#[derive(Debug)]
struct Staging {
    vertices: Vec<u8>,
    indices: Vec<u8>,
}

/// GPU-resident vertex/index data shared by any number of renderables.
#[derive(Debug)]
pub struct Geometry {
    name: String,
    vertex_buffer: BufferAllocation,
    index_buffer: BufferAllocation,
    vertex_byte_stride: u32,
    index_format: IndexFormat,
    index_count: u32,
    draw_ranges: HashMap<String, DrawRange>,
    staging: Option<Staging>,
}

impl Geometry {
    /// Uploads `vertices` and `indices` into GPU-local buffers.
    ///
    /// The CPU copies are retained until [`Geometry::release_staging`].
    pub fn upload<V: Pod, I: IndexElement>(
        device: &dyn GraphicsDevice,
        name: &str,
        vertices: &[V],
        indices: &[I],
    ) -> Result<Self, ResourceError> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        if vertex_bytes.is_empty() || index_bytes.is_empty() {
            return Err(ResourceError::CreationFailed {
                label: name.to_string(),
                details: "geometry needs at least one vertex and one index".to_string(),
            });
        }

        let vertex_buffer = device.create_default_buffer(
            &BufferDescriptor {
                label: Some(format!("{name}_vertices")),
                size: vertex_bytes.len() as u64,
                heap: HeapType::Default,
            },
            vertex_bytes,
        )?;
        let index_buffer = device.create_default_buffer(
            &BufferDescriptor {
                label: Some(format!("{name}_indices")),
                size: index_bytes.len() as u64,
                heap: HeapType::Default,
            },
            index_bytes,
        )?;

        log::debug!(
            "Geometry({name}): {} vertices, {} indices uploaded",
            vertices.len(),
            indices.len()
        );

        Ok(Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            vertex_byte_stride: std::mem::size_of::<V>() as u32,
            index_format: I::FORMAT,
            index_count: indices.len() as u32,
            draw_ranges: HashMap::new(),
            staging: Some(Staging {
                vertices: vertex_bytes.to_vec(),
                indices: index_bytes.to_vec(),
            }),
        })
    }

    /// Names a sub-range of the index buffer.
    ///
    /// Returns an error if the range reads past the end of the index buffer.
    pub fn add_draw_range(
        &mut self,
        name: impl Into<String>,
        range: DrawRange,
    ) -> Result<(), ResourceError> {
        let name = name.into();
        if range.start_index as u64 + range.index_count as u64 > self.index_count as u64 {
            return Err(ResourceError::CapacityExceeded {
                what: "geometry index range",
                requested: (range.start_index + range.index_count) as usize,
                capacity: self.index_count as usize,
            });
        }
        self.draw_ranges.insert(name, range);
        Ok(())
    }

    /// A named sub-range.
    pub fn draw_range(&self, name: &str) -> Option<DrawRange> {
        self.draw_ranges.get(name).copied()
    }

    /// The range covering every index.
    pub fn full_range(&self) -> DrawRange {
        DrawRange {
            index_count: self.index_count,
            start_index: 0,
            base_vertex: 0,
        }
    }

    /// Drops the CPU staging copies once the upload has completed on the GPU.
    pub fn release_staging(&mut self) {
        if let Some(staging) = self.staging.take() {
            log::debug!(
                "Geometry({}): released {} staging bytes",
                self.name,
                staging.vertices.len() + staging.indices.len()
            );
        }
    }

    /// Whether staging copies are still held.
    pub fn has_staging(&self) -> bool {
        self.staging.is_some()
    }

    /// Vertex buffer binding for the whole buffer.
    pub fn vertex_buffer_view(&self) -> VertexBufferView {
        VertexBufferView {
            buffer_location: self.vertex_buffer.gpu_address,
            size_in_bytes: self.vertex_buffer.size as u32,
            stride_in_bytes: self.vertex_byte_stride,
        }
    }

    /// Index buffer binding for the whole buffer.
    pub fn index_buffer_view(&self) -> IndexBufferView {
        IndexBufferView {
            buffer_location: self.index_buffer.gpu_address,
            size_in_bytes: self.index_buffer.size as u32,
            format: self.index_format,
        }
    }

    /// The geometry's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Releases both GPU buffers.
    pub fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        device.destroy_buffer(self.vertex_buffer.id)?;
        device.destroy_buffer(self.index_buffer.id)
    }
}
