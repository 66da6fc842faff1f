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

//! Per-tick snapshots produced by a tracking session.

use super::TrackingState;
use crate::math::{Mat4, Pose};
use serde::{Deserialize, Serialize};

/// Pinhole intrinsics of the camera image, expressed in the display-oriented
/// image the background surface shows.
///
/// The engine already accounts for the last display geometry it was told
/// about, so these values can be turned into a projection directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in pixels, `[fx, fy]`.
    pub focal_length: [f32; 2],
    /// Principal point in pixels, `[cx, cy]`, origin at the top-left corner.
    pub principal_point: [f32; 2],
    /// Image size in pixels, `[width, height]`.
    pub image_dimensions: [u32; 2],
}

impl CameraIntrinsics {
    /// Builds centered intrinsics from a vertical field of view.
    pub fn from_vertical_fov(fov_y_radians: f32, width: u32, height: u32) -> Self {
        let fy = height as f32 * 0.5 / (fov_y_radians * 0.5).tan();
        Self {
            focal_length: [fy, fy],
            principal_point: [width as f32 * 0.5, height as f32 * 0.5],
            image_dimensions: [width, height],
        }
    }
}

/// The camera of one frame: where it is and whether its pose can be trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera-to-world pose. Only meaningful while `tracking_state` is `Tracking`.
    pub pose: Pose,
    /// Whether the engine is currently tracking the device.
    pub tracking_state: TrackingState,
    /// Projection parameters of the camera image.
    pub intrinsics: CameraIntrinsics,
}

impl Camera {
    /// Returns the tracking state of the camera for this frame.
    #[inline]
    pub fn tracking_state(&self) -> TrackingState {
        self.tracking_state
    }

    /// Computes a GL-style projection matrix for the given clipping planes.
    ///
    /// The frustum is derived from the intrinsics, so an off-center principal
    /// point produces an off-center frustum.
    pub fn projection_matrix(&self, near: f32, far: f32) -> Mat4 {
        let [fx, fy] = self.intrinsics.focal_length;
        let [cx, cy] = self.intrinsics.principal_point;
        let width = self.intrinsics.image_dimensions[0] as f32;
        let height = self.intrinsics.image_dimensions[1] as f32;

        // Image rows grow downwards while the frustum's y grows upwards.
        let left = -cx * near / fx;
        let right = (width - cx) * near / fx;
        let top = cy * near / fy;
        let bottom = -(height - cy) * near / fy;
        Mat4::frustum_rh_gl(left, right, bottom, top, near, far)
    }

    /// Computes the view matrix (world to camera) from the camera pose.
    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.inverse().to_matrix()
    }
}

/// Validity of a frame's light estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightEstimateState {
    /// The estimate may be used for rendering.
    Valid,
    /// The engine could not estimate lighting this frame.
    #[default]
    NotValid,
}

/// Ambient lighting approximation for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightEstimate {
    /// Whether `color_correction` holds a real estimate.
    pub state: LightEstimateState,
    /// RGB scale factors followed by the average pixel intensity in gamma space.
    pub color_correction: [f32; 4],
}

impl LightEstimate {
    /// Correction that leaves rendered colors unchanged.
    pub const NEUTRAL_CORRECTION: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Creates a valid estimate.
    pub fn valid(color_correction: [f32; 4]) -> Self {
        Self {
            state: LightEstimateState::Valid,
            color_correction,
        }
    }

    /// Creates an estimate the engine flagged as unusable.
    pub fn not_valid() -> Self {
        Self::default()
    }

    /// Returns the 4-component color correction for shading.
    ///
    /// An invalid estimate yields [`LightEstimate::NEUTRAL_CORRECTION`].
    #[inline]
    pub fn color_correction(&self) -> [f32; 4] {
        match self.state {
            LightEstimateState::Valid => self.color_correction,
            LightEstimateState::NotValid => Self::NEUTRAL_CORRECTION,
        }
    }
}

/// An immutable snapshot produced by one `update()` call on a resumed session.
///
/// The camera image itself is written by the engine into the texture bound via
/// `set_camera_texture`; it is not part of this struct. A frame is only valid
/// for the tick that acquired it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Capture time of the camera image, in nanoseconds.
    pub timestamp_ns: i64,
    /// The camera for this frame.
    pub camera: Camera,
    /// The light estimate for this frame.
    pub light_estimate: LightEstimate,
}

impl Frame {
    /// Returns the camera of this frame.
    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Returns the light estimate of this frame.
    #[inline]
    pub fn light_estimate(&self) -> &LightEstimate {
        &self.light_estimate
    }
}
