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

//! An explicit, owned lookup table of named pipeline-state objects.
//!
//! The orchestrator owns one [`PipelineRegistry`] and hands it by reference to
//! whatever needs to resolve a pass name; there is no global lookup.

use std::collections::HashMap;

use super::{PipelineStateId, RootSignatureId};
use crate::renderer::error::ResourceError;

/// Registry name of the opaque geometry pipeline.
pub const OPAQUE_PIPELINE: &str = "opaque";
/// Registry name of the sky/cube-map pipeline.
pub const SKY_PIPELINE: &str = "sky";
/// Registry name of the stencil outline pipeline.
pub const OUTLINE_PIPELINE: &str = "outline";

/// Named pipelines sharing one root signature.
#[derive(Debug, Clone)]
pub struct PipelineRegistry {
    root_signature: RootSignatureId,
    pipelines: HashMap<String, PipelineStateId>,
}

impl PipelineRegistry {
    /// Creates an empty registry for pipelines built against `root_signature`.
    pub fn new(root_signature: RootSignatureId) -> Self {
        Self {
            root_signature,
            pipelines: HashMap::new(),
        }
    }

    /// The shared root signature.
    pub fn root_signature(&self) -> RootSignatureId {
        self.root_signature
    }

    /// Registers `pipeline` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pipeline: PipelineStateId,
    ) -> Result<(), ResourceError> {
        let name = name.into();
        if self.pipelines.contains_key(&name) {
            return Err(ResourceError::AlreadyExists(name));
        }
        log::debug!("PipelineRegistry: '{name}' -> {pipeline:?}");
        self.pipelines.insert(name, pipeline);
        Ok(())
    }

    /// Resolves a pipeline by name.
    pub fn get(&self, name: &str) -> Result<PipelineStateId, ResourceError> {
        self.pipelines
            .get(name)
            .copied()
            .ok_or_else(|| ResourceError::NotFound(format!("pipeline '{name}'")))
    }

    /// Returns `true` if a pipeline is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    /// Number of registered pipelines.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = PipelineRegistry::new(RootSignatureId(7));
        registry
            .register(OPAQUE_PIPELINE, PipelineStateId(1))
            .expect("first registration");
        assert_eq!(registry.get(OPAQUE_PIPELINE).unwrap(), PipelineStateId(1));
        assert_eq!(registry.root_signature(), RootSignatureId(7));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = PipelineRegistry::new(RootSignatureId(0));
        registry.register(SKY_PIPELINE, PipelineStateId(1)).unwrap();
        let err = registry.register(SKY_PIPELINE, PipelineStateId(2)).unwrap_err();
        assert!(matches!(err, ResourceError::AlreadyExists(name) if name == "sky"));
        assert_eq!(registry.get(SKY_PIPELINE).unwrap(), PipelineStateId(1));
    }

    #[test]
    fn test_missing_pipeline_is_not_found() {
        let registry = PipelineRegistry::new(RootSignatureId(0));
        assert!(matches!(
            registry.get(OUTLINE_PIPELINE),
            Err(ResourceError::NotFound(_))
        ));
        assert!(registry.is_empty());
    }
}
