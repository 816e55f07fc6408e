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

//! Acts as the orchestrator of the frame loop.
//!
//! The agent owns the frame ring, the command list and the synchronizer. Each
//! frame the host calls [`RenderAgent::on_frame_advance`] to claim the next
//! slot and refresh its constants, then [`RenderAgent::on_frame_render`] to
//! record, submit, present and signal. [`RenderAgent::on_shutdown`] drains the
//! GPU before anything it may still read is released.

mod agent;

pub use agent::*;
