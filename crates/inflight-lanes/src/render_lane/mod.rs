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

//! Render lanes: one strategy per render layer.

use inflight_core::renderer::CommandList;
use inflight_data::RenderLayer;

use crate::error::LaneError;
use crate::frame_resource::GlobalBindings;

mod opaque;
mod outline;
mod sky;

pub use opaque::*;
pub use outline::*;
pub use sky::*;

/// How one render layer is drawn.
///
/// The [`FrameRecorder`](crate::FrameRecorder) walks its lanes in order,
/// switching to each lane's pipeline when it differs from the bound one and
/// then letting the lane bind whatever the layer needs beyond the per-draw
/// state.
pub trait RenderLane: Send + Sync {
    /// A human-readable identifier, used in logs.
    fn strategy_name(&self) -> &'static str;

    /// The layer whose renderables this lane draws.
    fn layer(&self) -> RenderLayer;

    /// Name of the pipeline in the [`PipelineRegistry`](inflight_core::renderer::PipelineRegistry).
    fn pipeline_name(&self) -> &'static str;

    /// Stencil reference to set before drawing, if the pipeline tests stencil.
    fn stencil_reference(&self) -> Option<u32> {
        None
    }

    /// Binds layer-wide resources such as descriptor tables.
    fn bind_layer_resources(
        &self,
        _list: &mut dyn CommandList,
        _bindings: &GlobalBindings,
    ) -> Result<(), LaneError> {
        Ok(())
    }
}
