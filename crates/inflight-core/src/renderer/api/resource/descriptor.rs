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

//! Descriptor heaps and the handles pointing into them.
//!
//! Handles are a heap plus a slot index instead of raw pointers; backends turn
//! them into whatever their API expects.

/// An opaque handle to a descriptor heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorHeapId(pub usize);

/// What a descriptor heap holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorHeapType {
    /// Constant buffer, shader resource and unordered access views.
    CbvSrvUav,
    /// Render target views.
    Rtv,
    /// Depth-stencil views.
    Dsv,
}

/// Describes a descriptor heap to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorHeapDescriptor {
    /// Debug label.
    pub label: Option<String>,
    /// Kind of views stored.
    pub heap_type: DescriptorHeapType,
    /// Number of descriptor slots.
    pub capacity: u32,
    /// Whether shaders can index this heap through descriptor tables.
    pub shader_visible: bool,
}

/// A CPU-side descriptor slot, used when writing views and binding targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuDescriptorHandle {
    /// Owning heap.
    pub heap: DescriptorHeapId,
    /// Slot within the heap.
    pub index: u32,
}

/// A GPU-side descriptor slot, used as the base of a descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuDescriptorHandle {
    /// Owning heap.
    pub heap: DescriptorHeapId,
    /// Slot within the heap.
    pub index: u32,
}

macro_rules! impl_descriptor_handle {
    ($ty:ident) => {
        impl $ty {
            /// Creates a handle to `index` in `heap`.
            #[inline]
            pub const fn new(heap: DescriptorHeapId, index: u32) -> Self {
                Self { heap, index }
            }

            /// Returns the handle `count` slots further into the same heap.
            #[inline]
            pub const fn offset(self, count: u32) -> Self {
                Self {
                    heap: self.heap,
                    index: self.index + count,
                }
            }
        }
    };
}

impl_descriptor_handle!(CpuDescriptorHandle);
impl_descriptor_handle!(GpuDescriptorHandle);
