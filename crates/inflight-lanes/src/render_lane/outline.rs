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

use inflight_core::renderer::OUTLINE_PIPELINE;
use inflight_data::RenderLayer;

use super::RenderLane;

/// Silhouettes drawn where the stencil differs from the reference value
/// written by the outlined objects.
#[derive(Debug, Clone, Copy)]
pub struct OutlineLane {
    stencil_reference: u32,
}

impl OutlineLane {
    /// Creates the lane with the stencil value outlined objects write.
    pub fn new(stencil_reference: u32) -> Self {
        Self { stencil_reference }
    }
}

impl RenderLane for OutlineLane {
    fn strategy_name(&self) -> &'static str {
        "Outline"
    }

    fn layer(&self) -> RenderLayer {
        RenderLayer::Outline
    }

    fn pipeline_name(&self) -> &'static str {
        OUTLINE_PIPELINE
    }

    fn stencil_reference(&self) -> Option<u32> {
        Some(self.stencil_reference)
    }
}
