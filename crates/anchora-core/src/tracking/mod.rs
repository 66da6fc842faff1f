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

//! Interface contracts for the external real-time tracking engine.
//!
//! The engine is consumed through two traits: [`TrackingEngine`] handles
//! install checks and session construction, and [`TrackingSession`] is one
//! live connection with its own resume/pause lifecycle. Concrete engines live
//! in `anchora-infra` (or in the embedding application).

mod error;
mod frame;

pub use error::{SessionCreationError, TrackingError};
pub use frame::{Camera, CameraIntrinsics, Frame, LightEstimate, LightEstimateState};

use crate::math::Pose;
use crate::platform::DisplayRotation;
use crate::renderer::TextureId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-entity tracking status, gating whether its pose is usable this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingState {
    /// The pose is being actively updated and can be rendered.
    Tracking,
    /// Tracking is temporarily lost; the pose may be stale.
    Paused,
    /// The engine has given up on this entity for good.
    Stopped,
}

impl TrackingState {
    /// Returns `true` only for [`TrackingState::Tracking`].
    #[inline]
    pub fn is_tracking(self) -> bool {
        self == TrackingState::Tracking
    }
}

/// Identity of one session instance.
///
/// A recreated session always gets a new id, which is how stale anchor
/// handles are told apart from live ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    /// Allocates a process-wide unique session id.
    pub fn fresh() -> Self {
        SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// A tracking handle for one anchor, owned by the session that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle {
    /// The session the anchor was created on.
    pub session: SessionId,
    /// Engine-assigned id, unique within `session`.
    pub id: u64,
}

/// Answer of an install check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    /// The engine is installed and a session can be created.
    Installed,
    /// An install flow was started; check again on the next resume.
    InstallRequested,
}

/// How `update()` paces the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateMode {
    /// `update()` blocks until a new camera image is available, throttling the
    /// render thread to the camera frame rate.
    #[default]
    Blocking,
    /// `update()` returns immediately with the most recent image.
    LatestCameraImage,
}

/// Which lighting information the engine should estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightEstimationMode {
    /// No estimate; every frame reports an invalid light estimate.
    Disabled,
    /// Ambient color correction and intensity.
    #[default]
    AmbientIntensity,
}

/// Options handed to the engine when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pacing of `update()`.
    pub update_mode: UpdateMode,
    /// Light estimation mode.
    pub light_estimation: LightEstimationMode,
}

/// Install check and session factory of a tracking engine.
pub trait TrackingEngine: Send {
    /// Checks whether the engine is installed.
    ///
    /// With `user_requested_install` set, a missing engine starts an install
    /// flow and [`InstallStatus::InstallRequested`] is returned. Without it, a
    /// missing engine is reported as an error instead of prompting again.
    fn request_install(
        &mut self,
        user_requested_install: bool,
    ) -> Result<InstallStatus, SessionCreationError>;

    /// Creates a new session, initially paused.
    fn create_session(
        &mut self,
        config: &SessionConfig,
    ) -> Result<Box<dyn TrackingSession>, SessionCreationError>;
}

/// One live connection to the tracking engine.
pub trait TrackingSession: Send {
    /// Returns the identity of this session instance.
    fn id(&self) -> SessionId;

    /// Starts or restarts the camera and tracking.
    fn resume(&mut self) -> Result<(), TrackingError>;

    /// Stops the camera. Calling it on a paused session does nothing.
    fn pause(&mut self);

    /// Binds the texture the engine writes the next camera image into.
    fn set_camera_texture(&mut self, texture: TextureId);

    /// Tells the engine about the display geometry it renders for.
    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32);

    /// Acquires the next frame.
    ///
    /// In [`UpdateMode::Blocking`] this waits for the next camera image.
    fn update(&mut self) -> Result<Frame, TrackingError>;

    /// Creates an anchor at `pose` (world space).
    fn create_anchor(&mut self, pose: Pose) -> Result<AnchorHandle, TrackingError>;

    /// Returns the tracking state of `anchor`.
    ///
    /// Handles from another session report [`TrackingState::Stopped`].
    fn anchor_tracking_state(&self, anchor: AnchorHandle) -> TrackingState;

    /// Returns the latest pose of `anchor`, refined during `update()`.
    fn anchor_pose(&self, anchor: AnchorHandle) -> Option<Pose>;
}
