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

use std::fmt::Debug;

use crate::renderer::api::TextureId;
use crate::renderer::error::RenderError;

/// The chain of back buffers presented to the screen.
pub trait SwapChain: Send + Debug {
    /// Number of back buffers.
    fn buffer_count(&self) -> usize;

    /// Index of the back buffer the next frame renders into.
    fn current_back_buffer_index(&self) -> usize;

    /// The texture of back buffer `index`.
    fn back_buffer(&self, index: usize) -> TextureId;

    /// Presents the current back buffer and advances to the next one.
    fn present(&mut self, sync_interval: u32) -> Result<(), RenderError>;
}
