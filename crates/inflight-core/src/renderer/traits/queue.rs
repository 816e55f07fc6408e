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

use super::command_list::CommandList;
use crate::renderer::error::RenderError;

/// A GPU timeline value the CPU can observe and block on.
///
/// The completed value only ever increases.
pub trait Fence: Send + Sync + Debug {
    /// The last value the GPU (or the CPU, via [`Fence::signal`]) reached.
    fn completed_value(&self) -> u64;

    /// Blocks the calling thread until [`Fence::completed_value`] is at least `value`.
    ///
    /// There is no timeout.
    fn wait_for_value(&self, value: u64) -> Result<(), RenderError>;

    /// Sets the completed value from the CPU side.
    fn signal(&self, value: u64) -> Result<(), RenderError>;

    /// Allows downcasting to a concrete backend.
    fn as_any(&self) -> &dyn Any;
}

/// A queue that executes closed command lists in submission order.
pub trait CommandQueue: Send + Sync + Debug {
    /// Submits closed command lists for execution.
    fn execute_command_lists(&self, lists: &[&dyn CommandList]) -> Result<(), RenderError>;

    /// Enqueues a signal: once every previously submitted list has completed,
    /// `fence` reaches `value`.
    fn signal(&self, fence: &Arc<dyn Fence>, value: u64) -> Result<(), RenderError>;
}
