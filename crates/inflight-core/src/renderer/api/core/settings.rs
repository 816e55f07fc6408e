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

//! Global settings for the renderer, loadable from a RON document.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_FRAME_COUNT, MAX_FRAMES_IN_FLIGHT};
use crate::renderer::error::RenderError;

/// A collection of settings fixed at renderer creation.
///
/// Missing fields in a RON document fall back to [`RendererSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Number of frame resources in the ring (N).
    pub frame_count: usize,
    /// Back-buffer clear color (RGBA).
    pub clear_color: [f32; 4],
    /// Depth clear value.
    pub depth_clear: f32,
    /// Stencil clear value.
    pub stencil_clear: u8,
    /// Records the stencil outline layer after the opaque layer when `true`.
    pub enable_outline_pass: bool,
    /// Stencil reference used by the outline layer.
    pub outline_stencil_ref: u32,
    /// Render target width in pixels.
    pub viewport_width: u32,
    /// Render target height in pixels.
    pub viewport_height: u32,
    /// Frame statistics are logged every this many frames. `0` disables them.
    pub stats_interval_frames: u64,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            clear_color: [0.0, 0.2, 0.4, 1.0],
            depth_clear: 1.0,
            stencil_clear: 0,
            enable_outline_pass: false,
            outline_stencil_ref: 1,
            viewport_width: 1280,
            viewport_height: 720,
            stats_interval_frames: 500,
        }
    }
}

impl RendererSettings {
    /// Parses and validates settings from RON text.
    pub fn from_ron_str(text: &str) -> anyhow::Result<Self> {
        let settings: Self = ron::from_str(text).context("malformed renderer settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a RON settings file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read renderer settings '{}'", path.display()))?;
        let settings = Self::from_ron_str(&text)
            .with_context(|| format!("in settings file '{}'", path.display()))?;
        log::info!(
            "RendererSettings: loaded '{}' (frame_count={}, outline={})",
            path.display(),
            settings.frame_count,
            settings.enable_outline_pass
        );
        Ok(settings)
    }

    /// Rejects settings the ring cannot be built from.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.frame_count == 0 || self.frame_count > MAX_FRAMES_IN_FLIGHT {
            return Err(RenderError::InitializationFailed(format!(
                "frame_count must be within 1..={MAX_FRAMES_IN_FLIGHT}, got {}",
                self.frame_count
            )));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(RenderError::InitializationFailed(
                "viewport dimensions must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Width over height of the render target.
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_configuration() {
        let s = RendererSettings::default();
        assert_eq!(s.frame_count, 3);
        assert_eq!(s.clear_color, [0.0, 0.2, 0.4, 1.0]);
        assert!(!s.enable_outline_pass);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_falls_back_to_defaults() {
        let s = RendererSettings::from_ron_str("(frame_count: 2, enable_outline_pass: true)")
            .expect("valid settings");
        assert_eq!(s.frame_count, 2);
        assert!(s.enable_outline_pass);
        assert_eq!(s.viewport_width, 1280);
    }

    #[test]
    fn test_out_of_range_frame_count_is_rejected() {
        assert!(RendererSettings::from_ron_str("(frame_count: 0)").is_err());
        assert!(RendererSettings::from_ron_str("(frame_count: 4)").is_err());
    }

    #[test]
    fn test_malformed_ron_is_rejected() {
        assert!(RendererSettings::from_ron_str("(frame_count: \"three\")").is_err());
    }
}
