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

//! A CPU-emulated graphics backend.
//!
//! Upload memory is plain host memory that can be read back by GPU address,
//! command lists record into inspectable command vectors, and the queue
//! executes submissions on its own worker thread so fence completion is
//! genuinely asynchronous to the recording thread.

mod command;
mod device;
mod fence;
mod memory;
mod queue;
mod swap_chain;

pub use self::command::{HeadlessCommandAllocator, HeadlessCommandList, RecordedCommand};
pub use self::device::HeadlessDevice;
pub use self::fence::HeadlessFence;
pub use self::queue::{ExecutedList, ExecutionLog, HeadlessQueue};
pub use self::swap_chain::HeadlessSwapChain;
