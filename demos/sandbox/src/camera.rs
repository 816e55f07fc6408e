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

//! Orbit camera and frame timing.

use std::time::Instant;

use inflight_agents::FrameTime;
use inflight_core::math::{Mat4, Vec3, FRAC_PI_4, PI};
use inflight_core::renderer::ViewProvider;

const NEAR_Z: f32 = 1.0;
const FAR_Z: f32 = 1000.0;

/// A camera on a sphere around the origin, looking at it.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    radius: f32,
    theta: f32,
    phi: f32,
    aspect: f32,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            radius: 50.0,
            theta: 1.5 * PI,
            phi: 0.2 * PI,
            aspect,
        }
    }

    /// Moves around the vertical axis.
    pub fn orbit(&mut self, radians: f32) {
        self.theta = (self.theta + radians) % (2.0 * PI);
    }
}

impl ViewProvider for OrbitCamera {
    fn view_matrix(&self) -> Mat4 {
        // The eye never sits on the up axis, so the basis is always defined.
        Mat4::look_at_lh(self.eye_position(), Vec3::ZERO, Vec3::Y).unwrap_or_default()
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh_zo(FRAC_PI_4, self.aspect, NEAR_Z, FAR_Z)
    }

    fn eye_position(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.phi.sin() * self.theta.cos(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.sin(),
        )
    }

    fn depth_range(&self) -> (f32, f32) {
        (NEAR_Z, FAR_Z)
    }
}

/// Wall-clock frame timing with a once-per-second frame rate log.
#[derive(Debug)]
pub struct FrameTimer {
    start: Instant,
    last: Instant,
    window_start: Instant,
    window_frames: u32,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            window_start: now,
            window_frames: 0,
        }
    }

    /// Starts a frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let time = FrameTime {
            total: now.duration_since(self.start).as_secs_f32(),
            delta: now.duration_since(self.last).as_secs_f32(),
        };
        self.last = now;

        self.window_frames += 1;
        let window = now.duration_since(self.window_start).as_secs_f32();
        if window >= 1.0 {
            let fps = self.window_frames as f32 / window;
            log::info!("Sandbox: {fps:.1} fps, {:.3} ms/frame", 1000.0 / fps);
            self.window_start = now;
            self.window_frames = 0;
        }
        time
    }
}
