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

//! Rigid-body poses as reported by the tracking engine.

use super::{Mat4, Quaternion, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid transformation from an object's local frame to the world frame.
///
/// Camera poses map camera space to world space, so the view matrix is the
/// matrix of [`Pose::inverse`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in meters.
    pub translation: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quaternion,
}

impl Pose {
    /// The pose at the world origin with no rotation.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quaternion::IDENTITY,
    };

    /// Creates a pose, normalizing the rotation.
    #[inline]
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    /// Creates a pure translation.
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quaternion::IDENTITY)
    }

    /// Returns the inverse transform (world to local).
    #[inline]
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.conjugate();
        Self {
            translation: -(inv_rot * self.translation),
            rotation: inv_rot,
        }
    }

    /// Composes two poses: `self.compose(&other)` applies `other` first.
    #[inline]
    pub fn compose(&self, other: &Pose) -> Self {
        Self {
            translation: self.translation + self.rotation * other.translation,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    /// Transforms a point from local space into world space.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    /// Converts the pose into a 4x4 model matrix.
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}
