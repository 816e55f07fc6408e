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

use inflight_core::renderer::OPAQUE_PIPELINE;
use inflight_data::RenderLayer;

use super::RenderLane;

/// Lit geometry with the material textures bound per draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpaqueLane;

impl RenderLane for OpaqueLane {
    fn strategy_name(&self) -> &'static str {
        "Opaque"
    }

    fn layer(&self) -> RenderLayer {
        RenderLayer::Opaque
    }

    fn pipeline_name(&self) -> &'static str {
        OPAQUE_PIPELINE
    }
}
