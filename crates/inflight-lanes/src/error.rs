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

//! Failures raised while refreshing or recording a frame slot.

use inflight_core::renderer::{RenderError, ResourceError};
use inflight_data::RenderLayer;
use thiserror::Error;

/// Failures while filling frame resources or recording a frame.
#[derive(Debug, Error)]
pub enum LaneError {
    /// A layer has renderables but its pipeline was never registered.
    #[error("no '{name}' pipeline registered for the {layer:?} layer")]
    MissingPipeline {
        /// The layer being recorded.
        layer: RenderLayer,
        /// The pipeline name looked up.
        name: &'static str,
    },

    /// A layer needs a descriptor table that was not provided.
    #[error("the {layer:?} layer needs a {what} binding")]
    MissingBinding {
        /// The layer being recorded.
        layer: RenderLayer,
        /// What is missing.
        what: &'static str,
    },

    /// A handle does not resolve in the scene registry.
    #[error("renderable {renderable} refers to a missing {what}")]
    DanglingHandle {
        /// Index of the renderable being drawn.
        renderable: usize,
        /// The kind of entity that did not resolve.
        what: &'static str,
    },

    /// More entities than the frame resource was sized for.
    #[error("{what}: slot {requested} requested but the frame resource holds {capacity}")]
    CapacityExceeded {
        /// Which buffer overflowed.
        what: &'static str,
        /// The offending slot or count.
        requested: usize,
        /// Slots available.
        capacity: usize,
    },

    /// A device resource failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The command list or allocator failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<LaneError> for RenderError {
    fn from(error: LaneError) -> Self {
        match error {
            LaneError::Resource(e) => RenderError::ResourceError(e),
            LaneError::Render(e) => e,
            LaneError::CapacityExceeded {
                what,
                requested,
                capacity,
            } => RenderError::ResourceError(ResourceError::CapacityExceeded {
                what,
                requested,
                capacity,
            }),
            other => RenderError::RenderingFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_maps_to_resource_error() {
        let err: RenderError = LaneError::CapacityExceeded {
            what: "object constants",
            requested: 9,
            capacity: 8,
        }
        .into();
        assert!(matches!(
            err,
            RenderError::ResourceError(ResourceError::CapacityExceeded { requested: 9, .. })
        ));
    }

    #[test]
    fn test_missing_pipeline_message_names_layer() {
        let err = LaneError::MissingPipeline {
            layer: RenderLayer::Outline,
            name: "outline",
        };
        assert_eq!(
            err.to_string(),
            "no 'outline' pipeline registered for the Outline layer"
        );
        assert!(matches!(
            RenderError::from(err),
            RenderError::RenderingFailed(_)
        ));
    }
}
