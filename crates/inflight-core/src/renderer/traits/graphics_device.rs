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

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::command_list::{CommandAllocator, CommandList};
use super::queue::Fence;
use crate::renderer::api::{
    BufferAllocation, BufferDescriptor, BufferId, CpuDescriptorHandle, DescriptorHeapDescriptor,
    DescriptorHeapId, GpuAddress, PipelineStateDescriptor, PipelineStateId,
    RootSignatureDescriptor, RootSignatureId, TextureDescriptor, TextureId,
};
use crate::renderer::error::{RenderError, ResourceError};

/// A persistently mapped, CPU-writable and GPU-readable buffer.
///
/// The mapping stays valid until the value is dropped; dropping unmaps and then
/// releases the allocation. There is no read path.
pub trait MappedBuffer: Send + Sync + Debug {
    /// The underlying buffer.
    fn id(&self) -> BufferId;

    /// Total size in bytes.
    fn size(&self) -> u64;

    /// The GPU address of byte 0.
    fn gpu_address(&self) -> GpuAddress;

    /// Copies `data` into the mapping at `offset`.
    ///
    /// # Panics
    ///
    /// Implementations panic if the range leaves the buffer.
    fn write(&mut self, offset: u64, data: &[u8]);
}

/// A trait representing an abstract, thread-safe interface to a GPU device.
///
/// Every creation call is fallible and every failure is fatal to the caller:
/// nothing in the frame loop retries.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a buffer in upload memory and maps it for the buffer's lifetime.
    fn create_upload_buffer(
        &self,
        descriptor: &BufferDescriptor,
    ) -> Result<Box<dyn MappedBuffer>, ResourceError>;

    /// Creates a GPU-local buffer initialized with `initial_data`.
    ///
    /// The upload is complete once the device's queue has drained past the
    /// current fence value; callers keep their staging copy until then.
    fn create_default_buffer(
        &self,
        descriptor: &BufferDescriptor,
        initial_data: &[u8],
    ) -> Result<BufferAllocation, ResourceError>;

    /// Releases a buffer created with [`GraphicsDevice::create_default_buffer`].
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Creates a descriptor heap.
    fn create_descriptor_heap(
        &self,
        descriptor: &DescriptorHeapDescriptor,
    ) -> Result<DescriptorHeapId, ResourceError>;

    /// Writes a shader resource view of `texture` into `destination`.
    fn create_shader_resource_view(
        &self,
        texture: TextureId,
        destination: CpuDescriptorHandle,
    ) -> Result<(), ResourceError>;

    /// Writes a render target view of `texture` into `destination`.
    fn create_render_target_view(
        &self,
        texture: TextureId,
        destination: CpuDescriptorHandle,
    ) -> Result<(), ResourceError>;

    /// Writes a depth-stencil view of `texture` into `destination`.
    fn create_depth_stencil_view(
        &self,
        texture: TextureId,
        destination: CpuDescriptorHandle,
    ) -> Result<(), ResourceError>;

    /// Creates a root signature.
    fn create_root_signature(
        &self,
        descriptor: &RootSignatureDescriptor,
    ) -> Result<RootSignatureId, ResourceError>;

    /// Creates a pipeline-state object from precompiled bytecode.
    fn create_pipeline_state(
        &self,
        descriptor: &PipelineStateDescriptor<'_>,
    ) -> Result<PipelineStateId, ResourceError>;

    /// Creates the memory backing for recorded commands.
    fn create_command_allocator(
        &self,
        label: Option<&str>,
    ) -> Result<Box<dyn CommandAllocator>, ResourceError>;

    /// Creates a command list. The list starts closed; reset it before recording.
    fn create_command_list(&self, label: Option<&str>)
        -> Result<Box<dyn CommandList>, ResourceError>;

    /// Creates a fence starting at `initial_value`.
    fn create_fence(&self, initial_value: u64) -> Result<Arc<dyn Fence>, RenderError>;

    /// Allows downcasting to a concrete backend.
    fn as_any(&self) -> &dyn Any;
}
