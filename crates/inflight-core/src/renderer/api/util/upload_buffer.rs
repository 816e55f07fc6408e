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

//! A typed, persistently mapped upload buffer with fixed-stride slots.

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::renderer::api::{BufferDescriptor, BufferId, GpuAddress, HeapType};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::{GraphicsDevice, MappedBuffer};

/// Constant-buffer views must start on, and span multiples of, this many bytes.
pub const CONSTANT_BUFFER_ALIGNMENT: u64 = 256;

/// Rounds `byte_size` up to the next multiple of [`CONSTANT_BUFFER_ALIGNMENT`].
///
/// # Examples
///
/// ```
/// use inflight_core::renderer::api::constant_buffer_byte_size;
/// assert_eq!(constant_buffer_byte_size(64), 256);
/// assert_eq!(constant_buffer_byte_size(256), 256);
/// assert_eq!(constant_buffer_byte_size(300), 512);
/// ```
#[inline]
pub const fn constant_buffer_byte_size(byte_size: u64) -> u64 {
    (byte_size + (CONSTANT_BUFFER_ALIGNMENT - 1)) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// `element_count` slots of `T` in CPU-writable, GPU-readable memory.
///
/// The memory stays mapped for the whole lifetime of the value. Writes land
/// immediately; the GPU only observes them through command lists submitted
/// after the write, which is what the frame fence protocol guarantees.
/// The buffer is write-only from the CPU side.
#[derive(Debug)]
pub struct UploadBuffer<T: Pod> {
    label: String,
    memory: Box<dyn MappedBuffer>,
    element_count: usize,
    element_stride: u64,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// Allocates and maps `element_count` slots.
    ///
    /// With `is_constant_buffer` each slot is padded to
    /// [`CONSTANT_BUFFER_ALIGNMENT`]; otherwise slots are tightly packed.
    pub fn new(
        device: &dyn GraphicsDevice,
        label: &str,
        element_count: usize,
        is_constant_buffer: bool,
    ) -> Result<Self, ResourceError> {
        let raw_size = std::mem::size_of::<T>() as u64;
        let element_stride = if is_constant_buffer {
            constant_buffer_byte_size(raw_size)
        } else {
            raw_size
        };
        // Zero-sized buffers are invalid on most backends.
        let size = element_stride * element_count.max(1) as u64;

        let memory = device.create_upload_buffer(&BufferDescriptor {
            label: Some(label.to_string()),
            size,
            heap: HeapType::Upload,
        })?;

        log::debug!(
            "UploadBuffer({label}): {element_count} slots of {element_stride} bytes at {:?}",
            memory.gpu_address()
        );

        Ok(Self {
            label: label.to_string(),
            memory,
            element_count,
            element_stride,
            _marker: PhantomData,
        })
    }

    /// Copies `value` into slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= element_count`.
    pub fn write(&mut self, index: usize, value: &T) {
        assert!(
            index < self.element_count,
            "UploadBuffer({}): write to slot {index} but only {} slots exist",
            self.label,
            self.element_count
        );
        let offset = index as u64 * self.element_stride;
        self.memory.write(offset, bytemuck::bytes_of(value));
    }

    /// GPU address of slot `index`, for direct root binding.
    ///
    /// # Panics
    ///
    /// Panics if `index >= element_count`.
    pub fn gpu_address_of(&self, index: usize) -> GpuAddress {
        assert!(
            index < self.element_count,
            "UploadBuffer({}): address of slot {index} but only {} slots exist",
            self.label,
            self.element_count
        );
        self.memory
            .gpu_address()
            .offset(index as u64 * self.element_stride)
    }

    /// Number of slots.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Distance in bytes between two slots.
    pub fn element_stride(&self) -> u64 {
        self.element_stride
    }

    /// The underlying buffer.
    pub fn buffer_id(&self) -> BufferId {
        self.memory.id()
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::{
        BufferAllocation, CpuDescriptorHandle, DescriptorHeapDescriptor, DescriptorHeapId,
        PipelineStateDescriptor, PipelineStateId, RootSignatureDescriptor, RootSignatureId,
        TextureDescriptor, TextureId,
    };
    use crate::renderer::error::RenderError;
    use crate::renderer::traits::{CommandAllocator, CommandList, Fence};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mapped memory shared with the test so writes can be inspected.
    #[derive(Debug)]
    struct MockMappedBuffer {
        id: BufferId,
        base: GpuAddress,
        bytes: Arc<Mutex<Vec<u8>>>,
    }

    impl MappedBuffer for MockMappedBuffer {
        fn id(&self) -> BufferId {
            self.id
        }
        fn size(&self) -> u64 {
            self.bytes.lock().unwrap().len() as u64
        }
        fn gpu_address(&self) -> GpuAddress {
            self.base
        }
        fn write(&mut self, offset: u64, data: &[u8]) {
            let start = offset as usize;
            self.bytes.lock().unwrap()[start..start + data.len()].copy_from_slice(data);
        }
    }

    /// A mock graphics device that produces unique IDs and keeps the last mapping.
    #[derive(Debug, Default)]
    struct MockGraphicsDevice {
        next_id: AtomicUsize,
        last_mapping: Mutex<Option<Arc<Mutex<Vec<u8>>>>>,
    }

    impl MockGraphicsDevice {
        fn next(&self) -> usize {
            self.next_id.fetch_add(1, Ordering::Relaxed) + 1
        }

        fn last_bytes(&self) -> Vec<u8> {
            let mapping = self.last_mapping.lock().unwrap();
            let bytes = mapping.as_ref().expect("no buffer mapped").lock().unwrap();
            bytes.clone()
        }
    }

    impl GraphicsDevice for MockGraphicsDevice {
        fn create_upload_buffer(
            &self,
            d: &BufferDescriptor,
        ) -> Result<Box<dyn MappedBuffer>, ResourceError> {
            let id = self.next();
            let bytes = Arc::new(Mutex::new(vec![0u8; d.size as usize]));
            *self.last_mapping.lock().unwrap() = Some(bytes.clone());
            Ok(Box::new(MockMappedBuffer {
                id: BufferId(id),
                base: GpuAddress(id as u64 * 0x10000),
                bytes,
            }))
        }
        fn create_default_buffer(
            &self,
            d: &BufferDescriptor,
            _data: &[u8],
        ) -> Result<BufferAllocation, ResourceError> {
            let id = self.next();
            Ok(BufferAllocation {
                id: BufferId(id),
                gpu_address: GpuAddress(id as u64 * 0x10000),
                size: d.size,
            })
        }
        fn destroy_buffer(&self, _id: BufferId) -> Result<(), ResourceError> {
            Ok(())
        }
        fn create_texture(&self, _d: &TextureDescriptor) -> Result<TextureId, ResourceError> {
            Ok(TextureId(self.next()))
        }
        fn create_descriptor_heap(
            &self,
            _d: &DescriptorHeapDescriptor,
        ) -> Result<DescriptorHeapId, ResourceError> {
            Ok(DescriptorHeapId(self.next()))
        }
        fn create_shader_resource_view(
            &self,
            _t: TextureId,
            _h: CpuDescriptorHandle,
        ) -> Result<(), ResourceError> {
            Ok(())
        }
        fn create_render_target_view(
            &self,
            _t: TextureId,
            _h: CpuDescriptorHandle,
        ) -> Result<(), ResourceError> {
            Ok(())
        }
        fn create_depth_stencil_view(
            &self,
            _t: TextureId,
            _h: CpuDescriptorHandle,
        ) -> Result<(), ResourceError> {
            Ok(())
        }
        fn create_root_signature(
            &self,
            _d: &RootSignatureDescriptor,
        ) -> Result<RootSignatureId, ResourceError> {
            Ok(RootSignatureId(self.next()))
        }
        fn create_pipeline_state(
            &self,
            _d: &PipelineStateDescriptor<'_>,
        ) -> Result<PipelineStateId, ResourceError> {
            Ok(PipelineStateId(self.next()))
        }
        fn create_command_allocator(
            &self,
            _l: Option<&str>,
        ) -> Result<Box<dyn CommandAllocator>, ResourceError> {
            Err(ResourceError::BackendError("not supported by mock".into()))
        }
        fn create_command_list(
            &self,
            _l: Option<&str>,
        ) -> Result<Box<dyn CommandList>, ResourceError> {
            Err(ResourceError::BackendError("not supported by mock".into()))
        }
        fn create_fence(&self, _v: u64) -> Result<Arc<dyn Fence>, RenderError> {
            Err(RenderError::SynchronizationFailed("not supported by mock".into()))
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    struct Sample {
        value: [f32; 4],
    }

    #[test]
    fn test_constant_buffer_slots_are_padded() {
        let device = MockGraphicsDevice::default();
        let buffer = UploadBuffer::<Sample>::new(&device, "padded", 4, true).unwrap();
        assert_eq!(buffer.element_stride(), 256);
        assert_eq!(device.last_bytes().len(), 1024);
    }

    #[test]
    fn test_streaming_slots_are_packed() {
        let device = MockGraphicsDevice::default();
        let buffer = UploadBuffer::<Sample>::new(&device, "packed", 4, false).unwrap();
        assert_eq!(buffer.element_stride(), 16);
        assert_eq!(device.last_bytes().len(), 64);
    }

    #[test]
    fn test_gpu_address_advances_by_stride() {
        let device = MockGraphicsDevice::default();
        let buffer = UploadBuffer::<Sample>::new(&device, "addr", 3, true).unwrap();
        let base = buffer.gpu_address_of(0);
        assert_eq!(buffer.gpu_address_of(2), base.offset(512));
    }

    #[test]
    fn test_write_lands_at_slot_offset() {
        let device = MockGraphicsDevice::default();
        let mut buffer = UploadBuffer::<Sample>::new(&device, "write", 2, true).unwrap();
        let sample = Sample {
            value: [1.0, 2.0, 3.0, 4.0],
        };
        buffer.write(1, &sample);

        let bytes = device.last_bytes();
        assert!(bytes[..256].iter().all(|b| *b == 0));
        assert_eq!(&bytes[256..272], bytemuck::bytes_of(&sample));
    }

    #[test]
    fn test_write_to_last_slot_succeeds() {
        let device = MockGraphicsDevice::default();
        let mut buffer = UploadBuffer::<Sample>::new(&device, "edge", 3, true).unwrap();
        buffer.write(2, &Sample { value: [9.0; 4] });
    }

    #[test]
    #[should_panic(expected = "only 3 slots exist")]
    fn test_write_past_end_panics() {
        let device = MockGraphicsDevice::default();
        let mut buffer = UploadBuffer::<Sample>::new(&device, "edge", 3, true).unwrap();
        buffer.write(3, &Sample { value: [9.0; 4] });
    }

    #[test]
    fn test_empty_buffer_still_allocates_one_slot() {
        let device = MockGraphicsDevice::default();
        let buffer = UploadBuffer::<Sample>::new(&device, "empty", 0, true).unwrap();
        assert_eq!(buffer.element_count(), 0);
        assert_eq!(device.last_bytes().len(), 256);
    }
}
