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

//! The constant-buffer layouts uploaded every frame.
//!
//! Every struct here is `#[repr(C)]` and `Pod` so it can be copied into an
//! upload buffer with `bytemuck::bytes_of`. Matrices are stored transposed.

use crate::math::{Mat4, Vec3};
use crate::renderer::light::Light;

/// The maximum number of lights carried by [`PassConstants`].
pub const MAX_LIGHTS: usize = 3;

/// Per-object data, bound at the object-constants root slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectConstants {
    /// Transposed world matrix.
    pub world: Mat4,
}

impl ObjectConstants {
    /// Packs a world transform, transposing it for the shader.
    pub fn from_world(world: &Mat4) -> Self {
        Self {
            world: world.transpose(),
        }
    }
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
        }
    }
}

/// One light as laid out in the shader. Each field pair fills a 16-byte row.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightConstants {
    /// Radiant strength.
    pub strength: [f32; 3],
    /// Point/spot light attenuation start.
    pub falloff_start: f32,
    /// Directional/spot direction.
    pub direction: [f32; 3],
    /// Point/spot light attenuation end.
    pub falloff_end: f32,
    /// Point/spot position.
    pub position: [f32; 3],
    /// Spot exponent.
    pub spot_power: f32,
}

/// Per-material shading data.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialConstants {
    /// Base color multiplier.
    pub diffuse_albedo: [f32; 4],
    /// Fresnel reflectance at normal incidence.
    pub fresnel_r0: [f32; 3],
    /// Surface roughness in `[0, 1]`.
    pub roughness: f32,
    /// Ambient contribution.
    pub ambient_strength: f32,
    /// Specular exponent.
    pub specular_shininess: f32,
    /// Padding to a 16-byte row.
    pub _padding: [f32; 2],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0; 4],
            fresnel_r0: [0.01; 3],
            roughness: 0.25,
            ambient_strength: 0.1,
            specular_shininess: 16.0,
            _padding: [0.0; 2],
        }
    }
}

/// Per-pass camera and lighting data. Recomputed in full every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PassConstants {
    /// View matrix.
    pub view: Mat4,
    /// Inverse view matrix.
    pub inv_view: Mat4,
    /// Projection matrix.
    pub proj: Mat4,
    /// Inverse projection matrix.
    pub inv_proj: Mat4,
    /// `proj * view`.
    pub view_proj: Mat4,
    /// Inverse of `view_proj`.
    pub inv_view_proj: Mat4,
    /// Camera world position.
    pub eye_position: [f32; 3],
    /// Number of valid entries in `lights`.
    pub light_count: u32,
    /// Render target size in pixels.
    pub render_target_size: [f32; 2],
    /// Reciprocal of `render_target_size`.
    pub inv_render_target_size: [f32; 2],
    /// Near plane distance.
    pub near_z: f32,
    /// Far plane distance.
    pub far_z: f32,
    /// Seconds since start.
    pub total_time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Ambient light color.
    pub ambient_light: [f32; 4],
    /// Scene lights. Entries past `light_count` are zeroed.
    pub lights: [LightConstants; MAX_LIGHTS],
}

/// Everything needed to build a [`PassConstants`].
#[derive(Debug, Clone, Copy)]
pub struct PassInputs<'a> {
    /// Camera view matrix.
    pub view: Mat4,
    /// Camera projection matrix.
    pub projection: Mat4,
    /// Camera world position.
    pub eye_position: Vec3,
    /// Scene lights; anything past [`MAX_LIGHTS`] is ignored.
    pub lights: &'a [Light],
    /// Ambient light color.
    pub ambient_light: [f32; 4],
    /// Render target size in pixels.
    pub render_target_size: [f32; 2],
    /// Near plane distance.
    pub near_z: f32,
    /// Far plane distance.
    pub far_z: f32,
    /// Seconds since start.
    pub total_time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
}

impl PassConstants {
    /// Builds the pass constants, deriving inverses and transposing every matrix.
    ///
    /// A singular matrix is replaced by identity in its inverse slot.
    pub fn compute(inputs: &PassInputs<'_>) -> Self {
        let view_proj = inputs.projection * inputs.view;
        let invert = |m: &Mat4, what: &str| {
            m.inverse().unwrap_or_else(|| {
                log::warn!("PassConstants: {what} matrix is singular, using identity inverse");
                Mat4::IDENTITY
            })
        };

        if inputs.lights.len() > MAX_LIGHTS {
            log::warn!(
                "PassConstants: {} lights supplied, only the first {MAX_LIGHTS} are uploaded",
                inputs.lights.len()
            );
        }
        let mut lights = [LightConstants::default(); MAX_LIGHTS];
        for (slot, light) in lights.iter_mut().zip(inputs.lights) {
            *slot = light.to_constants();
        }

        let [w, h] = inputs.render_target_size;
        let reciprocal = |v: f32| if v > 0.0 { 1.0 / v } else { 0.0 };

        Self {
            view: inputs.view.transpose(),
            inv_view: invert(&inputs.view, "view").transpose(),
            proj: inputs.projection.transpose(),
            inv_proj: invert(&inputs.projection, "projection").transpose(),
            view_proj: view_proj.transpose(),
            inv_view_proj: invert(&view_proj, "view-projection").transpose(),
            eye_position: inputs.eye_position.to_array(),
            light_count: inputs.lights.len().min(MAX_LIGHTS) as u32,
            render_target_size: [w, h],
            inv_render_target_size: [reciprocal(w), reciprocal(h)],
            near_z: inputs.near_z,
            far_z: inputs.far_z,
            total_time: inputs.total_time,
            delta_time: inputs.delta_time,
            ambient_light: inputs.ambient_light,
            lights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec3, FRAC_PI_4};

    fn inputs(lights: &[Light]) -> PassInputs<'_> {
        PassInputs {
            view: Mat4::look_at_lh(Vec3::new(0.0, 2.0, -5.0), Vec3::ZERO, Vec3::Y).unwrap(),
            projection: Mat4::perspective_lh_zo(FRAC_PI_4, 1.5, 1.0, 100.0),
            eye_position: Vec3::new(0.0, 2.0, -5.0),
            lights,
            ambient_light: [0.25, 0.25, 0.35, 1.0],
            render_target_size: [1280.0, 720.0],
            near_z: 1.0,
            far_z: 100.0,
            total_time: 0.0,
            delta_time: 0.016,
        }
    }

    #[test]
    fn test_layout_sizes_are_multiples_of_sixteen() {
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 64);
        assert_eq!(std::mem::size_of::<LightConstants>(), 48);
        assert_eq!(std::mem::size_of::<MaterialConstants>(), 48);
        assert_eq!(std::mem::size_of::<PassConstants>() % 16, 0);
    }

    #[test]
    fn test_object_constants_are_transposed() {
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let c = ObjectConstants::from_world(&world);
        assert_eq!(c.world, world.transpose());
        assert_eq!(c.world.cols[0].w, 1.0);
    }

    #[test]
    fn test_pass_constants_are_deterministic() {
        let lights = [Light::default()];
        assert_eq!(
            PassConstants::compute(&inputs(&lights)),
            PassConstants::compute(&inputs(&lights))
        );
    }

    #[test]
    fn test_extra_lights_are_dropped() {
        let lights = [Light::default(); 5];
        let c = PassConstants::compute(&inputs(&lights));
        assert_eq!(c.light_count, MAX_LIGHTS as u32);
        assert_eq!(c.lights[2], Light::default().to_constants());
    }

    #[test]
    fn test_inverse_view_round_trips() {
        let c = PassConstants::compute(&inputs(&[]));
        let product = c.view.transpose() * c.inv_view.transpose();
        for (i, col) in product.cols.iter().enumerate() {
            for r in 0..4 {
                let expected = if i == r { 1.0 } else { 0.0 };
                assert!((col.get(r) - expected).abs() < 1e-4);
            }
        }
        assert_eq!(c.lights, [LightConstants::default(); MAX_LIGHTS]);
    }
}
