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

use inflight_core::renderer::{
    GraphicsDevice, RenderError, ResourceError, SwapChain, TextureDescriptor, TextureFormat,
    TextureId,
};

use super::device::HeadlessDevice;

/// A swap chain whose back buffers are plain device textures.
///
/// Presenting only advances the back-buffer index.
#[derive(Debug)]
pub struct HeadlessSwapChain {
    back_buffers: Vec<TextureId>,
    current: usize,
    width: u32,
    height: u32,
    presents: u64,
}

impl HeadlessSwapChain {
    /// Creates `buffer_count` back buffers of `width` x `height`.
    pub fn new(
        device: &HeadlessDevice,
        buffer_count: usize,
        width: u32,
        height: u32,
    ) -> Result<Self, ResourceError> {
        if buffer_count == 0 {
            return Err(ResourceError::CreationFailed {
                label: "swap_chain".to_string(),
                details: "a swap chain needs at least one back buffer".to_string(),
            });
        }
        let back_buffers = (0..buffer_count)
            .map(|i| {
                device.create_texture(&TextureDescriptor {
                    label: Some(format!("back_buffer_{i}")),
                    width,
                    height,
                    array_layers: 1,
                    format: TextureFormat::Bgra8Unorm,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("HeadlessSwapChain: {buffer_count} back buffers of {width}x{height}");
        Ok(Self {
            back_buffers,
            current: 0,
            width,
            height,
            presents: 0,
        })
    }

    /// Number of successful presents.
    pub fn present_count(&self) -> u64 {
        self.presents
    }

    /// Back-buffer size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl SwapChain for HeadlessSwapChain {
    fn buffer_count(&self) -> usize {
        self.back_buffers.len()
    }

    fn current_back_buffer_index(&self) -> usize {
        self.current
    }

    fn back_buffer(&self, index: usize) -> TextureId {
        self.back_buffers[index]
    }

    fn present(&mut self, _sync_interval: u32) -> Result<(), RenderError> {
        self.presents += 1;
        self.current = (self.current + 1) % self.back_buffers.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_rotates_back_buffers() {
        let device = HeadlessDevice::new();
        let mut chain = HeadlessSwapChain::new(&device, 2, 64, 32).unwrap();
        let first = chain.back_buffer(chain.current_back_buffer_index());

        chain.present(0).unwrap();
        assert_eq!(chain.current_back_buffer_index(), 1);
        assert_ne!(chain.back_buffer(1), first);

        chain.present(0).unwrap();
        assert_eq!(chain.current_back_buffer_index(), 0);
        assert_eq!(chain.present_count(), 2);
    }

    #[test]
    fn test_zero_buffers_is_an_error() {
        let device = HeadlessDevice::new();
        assert!(HeadlessSwapChain::new(&device, 0, 1, 1).is_err());
    }
}
