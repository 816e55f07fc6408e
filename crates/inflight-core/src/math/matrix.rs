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

//! Defines the column-major [`Mat4`] used for world, view and projection transforms.

use super::{Vec3, Vec4};
use std::ops::Mul;

/// Smallest pivot magnitude accepted when inverting.
const SINGULAR_PIVOT: f32 = 1e-8;

/// A 4x4 column-major matrix.
///
/// Matrices transform column vectors (`m * v`). Constant buffers expect the
/// transposed layout, see [`Mat4::transpose`].
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

type Rows = [[f32; 4]; 4];

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// A matrix with all elements set to 0.
    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO; 4],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    fn from_rows(rows: Rows) -> Self {
        let col = |c: usize| Vec4::new(rows[0][c], rows[1][c], rows[2][c], rows[3][c]);
        Self::from_cols(col(0), col(1), col(2), col(3))
    }

    fn to_rows(self) -> Rows {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            *row = self.get_row(r).into_array();
        }
        rows
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0].get(index),
            self.cols[1].get(index),
            self.cols[2].get(index),
            self.cols[3].get(index),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = Vec4::from_vec3(v, 1.0);
        m
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::X * scale.x,
            Vec4::Y * scale.y,
            Vec4::Z * scale.z,
            Vec4::W,
        )
    }

    /// Rotation of `angle` radians around the X axis.
    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::X,
            Vec4::new(0.0, c, s, 0.0),
            Vec4::new(0.0, -s, c, 0.0),
            Vec4::W,
        )
    }

    /// Rotation of `angle` radians around the Y axis.
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(c, 0.0, -s, 0.0),
            Vec4::Y,
            Vec4::new(s, 0.0, c, 0.0),
            Vec4::W,
        )
    }

    /// Left-handed perspective projection mapping depth to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < z_near < z_far`.
    pub fn perspective_lh_zo(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        assert!(z_near > 0.0 && z_far > z_near, "invalid depth range");
        let f = 1.0 / (fov_y_radians * 0.5).tan();
        let range = z_far / (z_far - z_near);
        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, range, 1.0),
            Vec4::new(0.0, 0.0, -range * z_near, 0.0),
        )
    }

    /// Left-handed view matrix looking from `eye` towards `target`.
    ///
    /// Returns `None` when `eye == target` or `up` is parallel to the view direction.
    pub fn look_at_lh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = (target - eye).normalize();
        if forward == Vec3::ZERO {
            return None;
        }
        let right = up.cross(forward).normalize();
        if right == Vec3::ZERO {
            return None;
        }
        let up = forward.cross(right);
        Some(Self::from_cols(
            Vec4::new(right.x, up.x, forward.x, 0.0),
            Vec4::new(right.y, up.y, forward.y, 0.0),
            Vec4::new(right.z, up.z, forward.z, 0.0),
            Vec4::new(-right.dot(eye), -up.dot(eye), -forward.dot(eye), 1.0),
        ))
    }

    /// Returns the transpose of the matrix, where rows and columns are swapped.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(
            self.get_row(0),
            self.get_row(1),
            self.get_row(2),
            self.get_row(3),
        )
    }

    /// Computes the determinant by row reduction.
    pub fn determinant(&self) -> f32 {
        let mut a = self.to_rows();
        let mut det = 1.0;
        for col in 0..4 {
            let pivot = pivot_row(&a, col);
            if a[pivot][col] == 0.0 {
                return 0.0;
            }
            if pivot != col {
                a.swap(pivot, col);
                det = -det;
            }
            det *= a[col][col];
            for row in col + 1..4 {
                let factor = a[row][col] / a[col][col];
                for k in col..4 {
                    let v = a[col][k];
                    a[row][k] -= factor * v;
                }
            }
        }
        det
    }

    /// Computes the inverse with Gauss-Jordan elimination.
    /// Returns `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let mut a = self.to_rows();
        let mut inv = Self::IDENTITY.to_rows();
        for col in 0..4 {
            let pivot = pivot_row(&a, col);
            if a[pivot][col].abs() < SINGULAR_PIVOT {
                return None;
            }
            a.swap(pivot, col);
            inv.swap(pivot, col);

            let p = a[col][col];
            for k in 0..4 {
                a[col][k] /= p;
                inv[col][k] /= p;
            }
            for row in 0..4 {
                let factor = a[row][col];
                if row == col || factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    let (av, iv) = (a[col][k], inv[col][k]);
                    a[row][k] -= factor * av;
                    inv[row][k] -= factor * iv;
                }
            }
        }
        Some(Self::from_rows(inv))
    }

    /// The matrix as `[column][row]` arrays.
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.cols.map(Vec4::into_array)
    }
}

fn pivot_row(a: &Rows, col: usize) -> usize {
    let mut best = col;
    for row in col + 1..4 {
        if a[row][col].abs() > a[best][col].abs() {
            best = row;
        }
    }
    best
}

impl Default for Mat4 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Composes two transforms; `a * b` applies `b` first.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self {
        Self {
            cols: rhs.cols.map(|c| self * c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, FRAC_PI_4};

    fn mat4_approx_eq(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array_2d()
            .iter()
            .flatten()
            .zip(b.to_cols_array_2d().iter().flatten())
            .all(|(x, y)| approx_eq(*x, *y))
    }

    #[test]
    fn test_transpose_swaps_rows_and_columns() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let t = m.transpose();
        assert_eq!(t.get_row(3), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_inverse_of_composed_transform() {
        let m = Mat4::from_translation(Vec3::new(4.0, -2.0, 7.0))
            * Mat4::from_rotation_y(0.7)
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 0.5));
        let inv = m.inverse().expect("matrix should be invertible");
        assert!(mat4_approx_eq(m * inv, Mat4::IDENTITY));
        assert!(mat4_approx_eq(inv * m, Mat4::IDENTITY));
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        assert!(Mat4::ZERO.inverse().is_none());
        assert!(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).inverse().is_none());
    }

    #[test]
    fn test_determinant() {
        assert!(approx_eq(Mat4::IDENTITY.determinant(), 1.0));
        let s = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        assert!(approx_eq(s.determinant(), 24.0));
        assert!(approx_eq(Mat4::from_rotation_x(1.1).determinant(), 1.0));
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let p = Mat4::perspective_lh_zo(FRAC_PI_4, 16.0 / 9.0, 1.0, 1000.0);
        let near = p * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let far = p * Vec4::new(0.0, 0.0, 1000.0, 1.0);
        assert!(approx_eq(near.z / near.w, 0.0));
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 5.0, -10.0);
        let view = Mat4::look_at_lh(eye, Vec3::ZERO, Vec3::Y).expect("valid view");
        let p = view * Vec4::from_vec3(eye, 1.0);
        assert!(approx_eq(p.truncate().length(), 0.0));
        // The target lies straight ahead on +Z.
        let t = view * Vec4::W;
        assert!(approx_eq(t.x, 0.0));
        assert!(t.z > 0.0);
    }

    #[test]
    fn test_look_at_rejects_degenerate_input() {
        assert!(Mat4::look_at_lh(Vec3::ONE, Vec3::ONE, Vec3::Y).is_none());
        assert!(Mat4::look_at_lh(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }
}
