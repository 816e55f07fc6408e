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

//! The contracts a graphics backend implements for the frame loop.

mod command_list;
mod graphics_device;
mod queue;
mod swap_chain;
mod view_provider;

pub use self::command_list::{CommandAllocator, CommandList};
pub use self::graphics_device::{GraphicsDevice, MappedBuffer};
pub use self::queue::{CommandQueue, Fence};
pub use self::swap_chain::SwapChain;
pub use self::view_provider::ViewProvider;
