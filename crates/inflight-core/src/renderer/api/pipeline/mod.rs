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

//! Root signatures and pipeline-state objects.
//!
//! Building the descriptors (shader compilation, blend/raster state) happens
//! outside the frame loop; the loop only ever sees the resulting IDs.

pub mod registry;
pub mod root_layout;

pub use self::registry::{PipelineRegistry, OPAQUE_PIPELINE, OUTLINE_PIPELINE, SKY_PIPELINE};
pub use self::root_layout::{scene_root_signature, RootParameter};

use super::resource::TextureFormat;

/// An opaque handle to a compiled pipeline-state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineStateId(pub usize);

/// An opaque handle to a root signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootSignatureId(pub usize);

/// One root parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootParameterDesc {
    /// A range of shader resource views starting at `t{base_register}`.
    DescriptorTable {
        /// First shader register.
        base_register: u32,
        /// Number of consecutive descriptors.
        count: u32,
    },
    /// A root constant buffer bound by GPU address at `b{register}`.
    ConstantBufferView {
        /// Shader register.
        register: u32,
    },
}

/// Describes a root signature to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSignatureDescriptor {
    /// Debug label.
    pub label: Option<String>,
    /// Parameters, indexed by root slot.
    pub parameters: Vec<RootParameterDesc>,
}

/// Comparison used by depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Passes if the new value is less.
    Less,
    /// Passes if the new value is less or equal.
    LessEqual,
    /// Passes if equal.
    Equal,
    /// Passes if not equal.
    NotEqual,
    /// Always passes.
    Always,
}

/// What the stencil buffer does on a passing test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOperation {
    /// Leave the stored value.
    Keep,
    /// Write the reference value.
    Replace,
}

/// Stencil configuration for a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilState {
    /// Test against the reference value.
    pub compare: CompareFunction,
    /// Operation when both stencil and depth pass.
    pub pass_op: StencilOperation,
}

/// Depth and stencil configuration for a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Enables the depth test.
    pub depth_test: bool,
    /// Enables depth writes.
    pub depth_write: bool,
    /// Depth comparison.
    pub depth_compare: CompareFunction,
    /// Stencil test, if any.
    pub stencil: Option<StencilState>,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            depth_compare: CompareFunction::Less,
            stencil: None,
        }
    }
}

/// Describes a graphics pipeline to create from precompiled bytecode.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStateDescriptor<'a> {
    /// Debug label, usually the registry name.
    pub label: &'a str,
    /// The root signature the shaders were compiled against.
    pub root_signature: RootSignatureId,
    /// Vertex shader bytecode.
    pub vertex_shader: &'a [u8],
    /// Pixel shader bytecode.
    pub pixel_shader: &'a [u8],
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilState,
    /// Color target format.
    pub render_target_format: TextureFormat,
    /// Depth target format.
    pub depth_stencil_format: TextureFormat,
}
