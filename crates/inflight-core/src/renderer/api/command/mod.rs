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

//! Value types recorded into command lists: barriers, viewports, clears.

use super::resource::TextureId;

/// Primitive assembly mode for draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Independent triangles.
    #[default]
    TriangleList,
    /// Connected triangle strip.
    TriangleStrip,
    /// Independent lines.
    LineList,
    /// Points.
    PointList,
}

/// The usage state a resource is in, for transition barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Ready to be shown by the swap chain.
    Present,
    /// Bound as a color render target.
    RenderTarget,
    /// Bound as a writable depth-stencil target.
    DepthWrite,
    /// Readable from pixel shaders.
    PixelShaderResource,
    /// Destination of copy operations.
    CopyDest,
    /// Generic read state of upload memory.
    GenericRead,
}

/// A resource-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceBarrier {
    /// The texture being transitioned.
    pub resource: TextureId,
    /// State before the barrier.
    pub before: ResourceState,
    /// State after the barrier.
    pub after: ResourceState,
}

impl ResourceBarrier {
    /// A transition of `resource` from `before` to `after`.
    pub const fn transition(resource: TextureId, before: ResourceState, after: ResourceState) -> Self {
        Self {
            resource,
            before,
            after,
        }
    }
}

/// The rasterizer viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Minimum depth.
    pub min_depth: f32,
    /// Maximum depth.
    pub max_depth: f32,
}

impl Viewport {
    /// A full-target viewport with the `[0, 1]` depth range.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// The scissor rectangle, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge, inclusive.
    pub left: i32,
    /// Top edge, inclusive.
    pub top: i32,
    /// Right edge, exclusive.
    pub right: i32,
    /// Bottom edge, exclusive.
    pub bottom: i32,
}

impl ScissorRect {
    /// A rectangle covering the whole target.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width as i32,
            bottom: height as i32,
        }
    }
}

/// Which aspects of a depth-stencil view a clear touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearFlags {
    bits: u32,
}

impl ClearFlags {
    /// Clear depth.
    pub const DEPTH: Self = Self { bits: 1 << 0 };
    /// Clear stencil.
    pub const STENCIL: Self = Self { bits: 1 << 1 };
    /// Clear both.
    pub const DEPTH_STENCIL: Self = Self {
        bits: Self::DEPTH.bits | Self::STENCIL.bits,
    };

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Checks whether every flag in `other` is set.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }
}

impl std::ops::BitOr for ClearFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_flags_combine() {
        let both = ClearFlags::DEPTH | ClearFlags::STENCIL;
        assert_eq!(both, ClearFlags::DEPTH_STENCIL);
        assert!(both.contains(ClearFlags::STENCIL));
        assert!(!ClearFlags::DEPTH.contains(ClearFlags::STENCIL));
    }

    #[test]
    fn test_full_target_viewport_and_scissor() {
        let vp = Viewport::from_size(800, 600);
        assert_eq!((vp.width, vp.height, vp.max_depth), (800.0, 600.0, 1.0));
        assert_eq!(ScissorRect::from_size(800, 600).bottom, 600);
    }
}
