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

//! Backend-agnostic rendering contracts for the frame-resource ring.
//!
//! The `traits` describe what a device, queue, fence and command list must do;
//! a concrete backend in `inflight-infra` implements them. `api` holds the
//! plain value types flowing through those traits.

pub mod api;
pub mod error;
pub mod light;
pub mod traits;

pub use self::api::*;
pub use self::error::{RenderError, ResourceError};
pub use self::light::{Light, LightType};
pub use self::traits::{
    CommandAllocator, CommandList, CommandQueue, Fence, GraphicsDevice, MappedBuffer, SwapChain,
    ViewProvider,
};
