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

//! Per-frame resource bundles and the command recording that consumes them.
//!
//! A [`FrameResource`] is one slot of the frame ring: its own command
//! allocator and its own copies of every constant buffer. The
//! [`FrameRecorder`] fills a command list for one slot, drawing each
//! [`RenderLane`] in turn.

#![warn(missing_docs)]

pub mod error;
pub mod frame_resource;
pub mod recorder;
pub mod render_lane;

pub use error::LaneError;
pub use frame_resource::{FrameResource, GlobalBindings};
pub use recorder::{FrameInputs, FrameRecorder, FrameTarget, RecordSummary};
pub use render_lane::{OpaqueLane, OutlineLane, RenderLane, SkyLane};
