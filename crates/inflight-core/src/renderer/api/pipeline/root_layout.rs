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

//! The root parameter layout shared by every scene pipeline.

use super::{RootParameterDesc, RootSignatureDescriptor};

/// Root slots, in the order they appear in [`scene_root_signature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RootParameter {
    /// Descriptor table of the material textures (diffuse, specular, normal) at `t0..t2`.
    MaterialTextures = 0,
    /// Per-object constants at `b0`.
    ObjectConstants = 1,
    /// Per-pass constants at `b1`.
    PassConstants = 2,
    /// Per-material constants at `b2`.
    MaterialConstants = 3,
    /// Descriptor table of the sky cube map at `t3`.
    Cubemap = 4,
}

impl RootParameter {
    /// Number of root slots.
    pub const COUNT: usize = 5;

    /// The root slot index.
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Material textures bound per draw, contiguous from the diffuse slot.
pub const MATERIAL_TEXTURE_COUNT: u32 = 3;

/// The root signature every pipeline in the registry is compiled against.
pub fn scene_root_signature() -> RootSignatureDescriptor {
    RootSignatureDescriptor {
        label: Some("scene_root_signature".to_string()),
        parameters: vec![
            RootParameterDesc::DescriptorTable {
                base_register: 0,
                count: MATERIAL_TEXTURE_COUNT,
            },
            RootParameterDesc::ConstantBufferView { register: 0 },
            RootParameterDesc::ConstantBufferView { register: 1 },
            RootParameterDesc::ConstantBufferView { register: 2 },
            RootParameterDesc::DescriptorTable {
                base_register: MATERIAL_TEXTURE_COUNT,
                count: 1,
            },
        ],
    }
}
