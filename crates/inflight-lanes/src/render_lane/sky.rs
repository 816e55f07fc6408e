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

use inflight_core::renderer::{CommandList, RootParameter, SKY_PIPELINE};
use inflight_data::RenderLayer;

use super::RenderLane;
use crate::error::LaneError;
use crate::frame_resource::GlobalBindings;

/// The background cube map. Binds the cube map table before its draws.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkyLane;

impl RenderLane for SkyLane {
    fn strategy_name(&self) -> &'static str {
        "Sky"
    }

    fn layer(&self) -> RenderLayer {
        RenderLayer::Sky
    }

    fn pipeline_name(&self) -> &'static str {
        SKY_PIPELINE
    }

    fn bind_layer_resources(
        &self,
        list: &mut dyn CommandList,
        bindings: &GlobalBindings,
    ) -> Result<(), LaneError> {
        let cubemap = bindings.sky_cubemap.ok_or(LaneError::MissingBinding {
            layer: RenderLayer::Sky,
            what: "cube map",
        })?;
        list.set_graphics_root_descriptor_table(RootParameter::Cubemap.index(), cubemap);
        Ok(())
    }
}
