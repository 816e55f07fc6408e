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

//! Buffers: identifiers, GPU virtual addresses and vertex/index views.

/// An opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// A GPU virtual address, as bound to root constant-buffer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GpuAddress(pub u64);

impl GpuAddress {
    /// The null address.
    pub const NULL: Self = Self(0);

    /// Returns the address `bytes` past this one.
    #[inline]
    pub const fn offset(self, bytes: u64) -> Self {
        Self(self.0 + bytes)
    }
}

/// Which memory pool a buffer lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapType {
    /// CPU-writable, GPU-readable memory that stays mapped.
    Upload,
    /// GPU-local memory, filled once from staging data.
    Default,
}

/// Describes a buffer to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Debug label.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Memory pool.
    pub heap: HeapType,
}

/// A created buffer together with where the GPU sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferAllocation {
    /// The buffer handle.
    pub id: BufferId,
    /// Base GPU address.
    pub gpu_address: GpuAddress,
    /// Size in bytes.
    pub size: u64,
}

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn byte_size(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Binds a range of a buffer as vertex input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferView {
    /// Address of the first vertex.
    pub buffer_location: GpuAddress,
    /// Size of the bound range in bytes.
    pub size_in_bytes: u32,
    /// Distance between two vertices.
    pub stride_in_bytes: u32,
}

/// Binds a range of a buffer as index input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBufferView {
    /// Address of the first index.
    pub buffer_location: GpuAddress,
    /// Size of the bound range in bytes.
    pub size_in_bytes: u32,
    /// Width of one index.
    pub format: IndexFormat,
}
