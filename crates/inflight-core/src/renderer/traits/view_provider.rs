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

use crate::math::{Mat4, Vec3};

/// Supplies the camera for a frame.
///
/// Implementors update themselves once per frame (input, timing) before the
/// renderer reads them.
pub trait ViewProvider {
    /// World-to-view transform.
    fn view_matrix(&self) -> Mat4;

    /// View-to-clip transform.
    fn projection_matrix(&self) -> Mat4;

    /// Camera position in world space.
    fn eye_position(&self) -> Vec3;

    /// Near and far plane distances.
    fn depth_range(&self) -> (f32, f32) {
        (1.0, 1000.0)
    }
}
