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
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytemuck::Pod;
use inflight_core::renderer::{
    BufferAllocation, BufferDescriptor, BufferId, CommandAllocator, CommandList,
    CpuDescriptorHandle, DescriptorHeapDescriptor, DescriptorHeapId, Fence, GpuAddress,
    GraphicsDevice, HeapType, MappedBuffer, PipelineStateDescriptor, PipelineStateId,
    RenderError, ResourceError, RootSignatureDescriptor, RootSignatureId, TextureDescriptor,
    TextureId,
};

use super::command::{HeadlessCommandAllocator, HeadlessCommandList};
use super::fence::HeadlessFence;
use super::memory::{lock, Allocation, MemoryArena};

/// Upload memory handed out by [`HeadlessDevice::create_upload_buffer`].
///
/// Dropping it unmaps and then frees the allocation.
#[derive(Debug)]
struct HeadlessMappedBuffer {
    label: String,
    allocation: Arc<Allocation>,
    arena: Arc<MemoryArena>,
}

impl MappedBuffer for HeadlessMappedBuffer {
    fn id(&self) -> BufferId {
        self.allocation.id
    }

    fn size(&self) -> u64 {
        self.allocation.size()
    }

    fn gpu_address(&self) -> GpuAddress {
        self.allocation.base
    }

    fn write(&mut self, offset: u64, data: &[u8]) {
        let mut bytes = lock(&self.allocation.bytes);
        let start = offset as usize;
        let end = start + data.len();
        assert!(
            end <= bytes.len(),
            "HeadlessMappedBuffer({}): write of {} bytes at {offset} overruns {} bytes",
            self.label,
            data.len(),
            bytes.len()
        );
        bytes[start..end].copy_from_slice(data);
    }
}

impl Drop for HeadlessMappedBuffer {
    fn drop(&mut self) {
        log::debug!("HeadlessMappedBuffer({}): unmapped", self.label);
        self.arena.release(self.allocation.base);
    }
}

/// A CPU-emulated graphics device.
///
/// Every object gets a unique ID from a shared counter. Upload and default
/// buffers live in an address space that tests can read back with
/// [`HeadlessDevice::read_bytes`].
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: AtomicUsize,
    arena: Arc<MemoryArena>,
    descriptor_heaps: Mutex<HashMap<DescriptorHeapId, DescriptorHeapDescriptor>>,
    pipelines: Mutex<HashMap<PipelineStateId, String>>,
    fail_next_creation: Mutex<Option<String>>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Creates an empty device.
    pub fn new() -> Self {
        log::info!("HeadlessDevice: created");
        Self {
            next_id: AtomicUsize::new(1),
            arena: Arc::new(MemoryArena::default()),
            descriptor_heaps: Mutex::new(HashMap::new()),
            pipelines: Mutex::new(HashMap::new()),
            fail_next_creation: Mutex::new(None),
        }
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Makes the next resource creation fail with `reason`.
    pub fn fail_next_creation(&self, reason: impl Into<String>) {
        *lock(&self.fail_next_creation) = Some(reason.into());
    }

    fn check_injected_failure(&self, label: &str) -> Result<(), ResourceError> {
        match lock(&self.fail_next_creation).take() {
            Some(details) => {
                log::error!("HeadlessDevice: creation of '{label}' failed: {details}");
                Err(ResourceError::CreationFailed {
                    label: label.to_string(),
                    details,
                })
            }
            None => Ok(()),
        }
    }

    /// Reads `len` bytes of device memory at `address`.
    pub fn read_bytes(&self, address: GpuAddress, len: usize) -> Option<Vec<u8>> {
        self.arena.read(address, len)
    }

    /// Reads a `T` from device memory at `address`.
    pub fn read_value<T: Pod>(&self, address: GpuAddress) -> Option<T> {
        let bytes = self.read_bytes(address, std::mem::size_of::<T>())?;
        Some(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Number of live buffers.
    pub fn live_buffer_count(&self) -> usize {
        self.arena.live_count()
    }

    /// Bytes of upload memory currently mapped.
    pub fn upload_bytes_in_use(&self) -> u64 {
        self.arena.total_size(HeapType::Upload)
    }

    /// The label a pipeline was created with.
    pub fn pipeline_label(&self, id: PipelineStateId) -> Option<String> {
        lock(&self.pipelines).get(&id).cloned()
    }

    fn check_descriptor(&self, handle: CpuDescriptorHandle) -> Result<(), ResourceError> {
        let heaps = lock(&self.descriptor_heaps);
        let heap = heaps.get(&handle.heap).ok_or(ResourceError::InvalidHandle)?;
        if handle.index >= heap.capacity {
            return Err(ResourceError::CapacityExceeded {
                what: "descriptor heap",
                requested: handle.index as usize,
                capacity: heap.capacity as usize,
            });
        }
        Ok(())
    }
}

fn label_of(label: &Option<String>) -> &str {
    label.as_deref().unwrap_or("unnamed")
}

impl GraphicsDevice for HeadlessDevice {
    fn create_upload_buffer(
        &self,
        descriptor: &BufferDescriptor,
    ) -> Result<Box<dyn MappedBuffer>, ResourceError> {
        let label = label_of(&descriptor.label);
        self.check_injected_failure(label)?;
        let allocation = self
            .arena
            .allocate(BufferId(self.next()), HeapType::Upload, descriptor.size);
        Ok(Box::new(HeadlessMappedBuffer {
            label: label.to_string(),
            allocation,
            arena: self.arena.clone(),
        }))
    }

    fn create_default_buffer(
        &self,
        descriptor: &BufferDescriptor,
        initial_data: &[u8],
    ) -> Result<BufferAllocation, ResourceError> {
        let label = label_of(&descriptor.label);
        self.check_injected_failure(label)?;
        if initial_data.len() as u64 > descriptor.size {
            return Err(ResourceError::CreationFailed {
                label: label.to_string(),
                details: format!(
                    "{} bytes of initial data for a {} byte buffer",
                    initial_data.len(),
                    descriptor.size
                ),
            });
        }
        let allocation = self
            .arena
            .allocate(BufferId(self.next()), HeapType::Default, descriptor.size);
        lock(&allocation.bytes)[..initial_data.len()].copy_from_slice(initial_data);
        Ok(BufferAllocation {
            id: allocation.id,
            gpu_address: allocation.base,
            size: descriptor.size,
        })
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let allocation = self
            .arena
            .find_by_id(id)
            .ok_or(ResourceError::InvalidHandle)?;
        self.arena.release(allocation.base);
        Ok(())
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        self.check_injected_failure(label_of(&descriptor.label))?;
        Ok(TextureId(self.next()))
    }

    fn create_descriptor_heap(
        &self,
        descriptor: &DescriptorHeapDescriptor,
    ) -> Result<DescriptorHeapId, ResourceError> {
        self.check_injected_failure(label_of(&descriptor.label))?;
        let id = DescriptorHeapId(self.next());
        lock(&self.descriptor_heaps).insert(id, descriptor.clone());
        Ok(id)
    }

    fn create_shader_resource_view(
        &self,
        _texture: TextureId,
        destination: CpuDescriptorHandle,
    ) -> Result<(), ResourceError> {
        self.check_descriptor(destination)
    }

    fn create_render_target_view(
        &self,
        _texture: TextureId,
        destination: CpuDescriptorHandle,
    ) -> Result<(), ResourceError> {
        self.check_descriptor(destination)
    }

    fn create_depth_stencil_view(
        &self,
        _texture: TextureId,
        destination: CpuDescriptorHandle,
    ) -> Result<(), ResourceError> {
        self.check_descriptor(destination)
    }

    fn create_root_signature(
        &self,
        descriptor: &RootSignatureDescriptor,
    ) -> Result<RootSignatureId, ResourceError> {
        self.check_injected_failure(label_of(&descriptor.label))?;
        Ok(RootSignatureId(self.next()))
    }

    fn create_pipeline_state(
        &self,
        descriptor: &PipelineStateDescriptor<'_>,
    ) -> Result<PipelineStateId, ResourceError> {
        self.check_injected_failure(descriptor.label)?;
        let id = PipelineStateId(self.next());
        lock(&self.pipelines).insert(id, descriptor.label.to_string());
        Ok(id)
    }

    fn create_command_allocator(
        &self,
        label: Option<&str>,
    ) -> Result<Box<dyn CommandAllocator>, ResourceError> {
        let label = label.unwrap_or("command_allocator");
        self.check_injected_failure(label)?;
        Ok(Box::new(HeadlessCommandAllocator::new(label)))
    }

    fn create_command_list(
        &self,
        label: Option<&str>,
    ) -> Result<Box<dyn CommandList>, ResourceError> {
        let label = label.unwrap_or("command_list");
        self.check_injected_failure(label)?;
        Ok(Box::new(HeadlessCommandList::new(label)))
    }

    fn create_fence(&self, initial_value: u64) -> Result<Arc<dyn Fence>, RenderError> {
        self.check_injected_failure("fence")
            .map_err(|e| RenderError::SynchronizationFailed(e.to_string()))?;
        Ok(Arc::new(HeadlessFence::new(initial_value)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(size: u64) -> BufferDescriptor {
        BufferDescriptor {
            label: Some("test".to_string()),
            size,
            heap: HeapType::Upload,
        }
    }

    #[test]
    fn test_mapped_writes_are_visible_by_address() {
        let device = HeadlessDevice::new();
        let mut buffer = device.create_upload_buffer(&upload(512)).unwrap();
        buffer.write(256, &7u32.to_le_bytes());
        let address = buffer.gpu_address().offset(256);
        assert_eq!(device.read_value::<u32>(address), Some(7));
    }

    #[test]
    fn test_dropping_mapping_frees_memory() {
        let device = HeadlessDevice::new();
        let buffer = device.create_upload_buffer(&upload(256)).unwrap();
        let address = buffer.gpu_address();
        assert_eq!(device.upload_bytes_in_use(), 256);
        drop(buffer);
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.read_bytes(address, 1), None);
    }

    #[test]
    fn test_default_buffer_holds_initial_data() {
        let device = HeadlessDevice::new();
        let desc = BufferDescriptor {
            label: None,
            size: 8,
            heap: HeapType::Default,
        };
        let alloc = device.create_default_buffer(&desc, &[1, 2, 3, 4]).unwrap();
        assert_eq!(
            device.read_bytes(alloc.gpu_address, 8),
            Some(vec![1, 2, 3, 4, 0, 0, 0, 0])
        );
        device.destroy_buffer(alloc.id).unwrap();
        assert!(device.destroy_buffer(alloc.id).is_err());
    }

    #[test]
    fn test_injected_failure_hits_next_creation_only() {
        let device = HeadlessDevice::new();
        device.fail_next_creation("out of memory");
        let err = device.create_upload_buffer(&upload(16)).unwrap_err();
        assert!(matches!(err, ResourceError::CreationFailed { .. }));
        assert!(device.create_upload_buffer(&upload(16)).is_ok());
    }

    #[test]
    fn test_descriptor_views_are_bounds_checked() {
        let device = HeadlessDevice::new();
        let heap = device
            .create_descriptor_heap(&DescriptorHeapDescriptor {
                label: None,
                heap_type: inflight_core::renderer::DescriptorHeapType::Rtv,
                capacity: 2,
                shader_visible: false,
            })
            .unwrap();
        let tex = TextureId(99);
        assert!(device
            .create_render_target_view(tex, CpuDescriptorHandle::new(heap, 1))
            .is_ok());
        assert!(device
            .create_render_target_view(tex, CpuDescriptorHandle::new(heap, 2))
            .is_err());
    }
}
