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

//! CPU-side light descriptions fed into the per-pass constants.

use crate::math::Vec3;
use crate::renderer::api::scene::LightConstants;

/// The kind of light source. Only affects which fields the shader reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Infinitely distant light; only `direction` is meaningful.
    Directional,
    /// Omnidirectional light with distance falloff.
    Point,
    /// Cone light with distance falloff and a spot exponent.
    Spot,
}

/// A light as the scene describes it.
///
/// # Examples
///
/// ```
/// use inflight_core::math::Vec3;
/// use inflight_core::renderer::light::Light;
///
/// let key = Light::directional(Vec3::new(0.57, -0.57, 0.57), Vec3::new(0.6, 0.6, 0.6));
/// assert_eq!(key.to_constants().direction, [0.57, -0.57, 0.57]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// What kind of light this is.
    pub light_type: LightType,
    /// Radiant strength per channel.
    pub color: Vec3,
    /// World position (point and spot lights).
    pub position: Vec3,
    /// Direction the light travels (directional and spot lights).
    pub direction: Vec3,
    /// Distance at which attenuation starts.
    pub falloff_start: f32,
    /// Distance at which the light no longer contributes.
    pub falloff_end: f32,
    /// Spot cone exponent.
    pub spot_power: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            color: Vec3::new(0.5, 0.5, 0.5),
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, -1.0, 0.0),
            falloff_start: 1.0,
            falloff_end: 10.0,
            spot_power: 64.0,
        }
    }
}

impl Light {
    /// A directional light travelling along `direction`.
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            light_type: LightType::Directional,
            color,
            direction,
            ..Default::default()
        }
    }

    /// A point light at `position` fading out between the two falloff distances.
    pub fn point(position: Vec3, color: Vec3, falloff_start: f32, falloff_end: f32) -> Self {
        Self {
            light_type: LightType::Point,
            color,
            position,
            falloff_start,
            falloff_end,
            ..Default::default()
        }
    }

    /// Packs the light into its constant-buffer layout.
    pub fn to_constants(&self) -> LightConstants {
        LightConstants {
            strength: self.color.to_array(),
            falloff_start: self.falloff_start,
            direction: self.direction.to_array(),
            falloff_end: self.falloff_end,
            position: self.position.to_array(),
            spot_power: self.spot_power,
        }
    }
}
