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

//! Defines the `Mat4` type and associated operations.

use super::{Quaternion, Vec3, Vec4};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A 4x4 column-major matrix, used for model, view and projection transforms.
///
/// The memory layout is column-major (`cols[3]` holds the translation), which is
/// what GL-style uniform uploads expect. [`Mat4::to_cols_array`] yields the
/// 16-float layout tracking engines use for `toMatrix`-style outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// A 4x4 matrix with all elements set to 0.
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
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, Vec4::from_vec3(v, 1.0))
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::W,
        )
    }

    /// Creates a rotation matrix from a unit quaternion.
    #[inline]
    pub fn from_quat(q: Quaternion) -> Self {
        let x2 = q.x + q.x;
        let y2 = q.y + q.y;
        let z2 = q.z + q.z;
        let xx = q.x * x2;
        let xy = q.x * y2;
        let xz = q.x * z2;
        let yy = q.y * y2;
        let yz = q.y * z2;
        let zz = q.z * z2;
        let wx = q.w * x2;
        let wy = q.w * y2;
        let wz = q.w * z2;

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Creates a rigid transform that rotates by `rotation` and then translates by `translation`.
    #[inline]
    pub fn from_rotation_translation(rotation: Quaternion, translation: Vec3) -> Self {
        let mut m = Self::from_quat(rotation);
        m.cols[3] = Vec4::from_vec3(translation, 1.0);
        m
    }

    /// Creates a right-handed, possibly off-center perspective frustum with a
    /// GL-style `[-1, 1]` depth range.
    ///
    /// `left`, `right`, `bottom` and `top` are measured on the near plane.
    ///
    /// # Panics
    ///
    /// Panics if the planes are degenerate (`near <= 0`, `far <= near`, or an
    /// empty extent).
    pub fn frustum_rh_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        assert!(near > 0.0 && far > near);
        assert!(right != left && top != bottom);
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;

        Self::from_cols(
            Vec4::new(2.0 * near / width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * near / height, 0.0, 0.0),
            Vec4::new(
                (right + left) / width,
                (top + bottom) / height,
                -(far + near) / depth,
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -2.0 * far * near / depth, 0.0),
        )
    }

    /// Returns the transpose of the matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(
            self.get_row(0),
            self.get_row(1),
            self.get_row(2),
            self.get_row(3),
        )
    }

    /// Flattens the matrix into 16 floats in column-major order.
    #[inline]
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, col) in self.cols.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&col.to_array());
        }
        out
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_relative_eq;

    fn assert_vec4_eq(a: Vec4, b: Vec4) {
        for i in 0..4 {
            assert_relative_eq!(a.get(i), b.get(i), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rotation_translation_applies_rotation_first() {
        let m = Mat4::from_rotation_translation(
            Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2),
            Vec3::new(0.0, 0.0, 5.0),
        );
        assert_vec4_eq(m * Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::new(0.0, 1.0, 5.0, 1.0));
    }

    #[test]
    fn test_frustum_maps_near_and_far_to_clip_bounds() {
        let (near, far) = (0.1, 100.0);
        let m = Mat4::frustum_rh_gl(-0.05, 0.05, -0.05, 0.05, near, far);

        let on_near = m * Vec4::new(0.0, 0.0, -near, 1.0);
        assert_relative_eq!(on_near.z / on_near.w, -1.0, epsilon = 1e-4);

        let on_far = m * Vec4::new(0.0, 0.0, -far, 1.0);
        assert_relative_eq!(on_far.z / on_far.w, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_frustum_off_center_shifts_principal_axis() {
        let m = Mat4::frustum_rh_gl(-0.02, 0.06, -0.03, 0.03, 0.1, 10.0);
        assert!(m.cols[2].x > 0.0);
        assert_relative_eq!(m.cols[2].y, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_frustum_rejects_inverted_planes() {
        let _ = Mat4::frustum_rh_gl(-1.0, 1.0, -1.0, 1.0, 10.0, 1.0);
    }

    #[test]
    fn test_transpose_and_cols_array() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let flat = m.to_cols_array();
        assert_eq!(&flat[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(m.transpose().get_row(3), Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_mul_identity() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }
}
