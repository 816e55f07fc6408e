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

//! Ring sizing constants and renderer settings.

pub mod settings;

pub use self::settings::RendererSettings;

/// The largest ring the renderer accepts. Each slot owns a full set of upload buffers.
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;

/// Ring size used when no settings override it.
pub const DEFAULT_FRAME_COUNT: usize = 3;
