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

//! The tracking session as owned by the lifecycle manager and borrowed by the
//! render loop.

mod lifecycle;

pub use lifecycle::{EnsureOutcome, HostResume, LifecycleError, SessionLifecycleManager};

use anchora_core::math::Pose;
use anchora_core::platform::DisplayRotation;
use anchora_core::renderer::TextureId;
use anchora_core::tracking::{
    AnchorHandle, Frame, SessionId, TrackingError, TrackingSession, TrackingState,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle state of the session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session, and nothing pending.
    Uninitialized,
    /// An engine install flow was started; retry on the next resume.
    AwaitingInstall,
    /// A session exists but was never resumed.
    Created,
    /// The session is running and may be asked for frames.
    Resumed,
    /// The session exists but is paused.
    Paused,
    /// The last creation or resume attempt failed; no session exists.
    Failed,
}

/// A tracking session plus the lifecycle state it is in.
///
/// It implements [`TrackingSession`] itself, so collaborators that receive it
/// cannot pull a frame from a session that is not resumed.
pub struct ManagedSession {
    inner: Box<dyn TrackingSession>,
    state: SessionState,
}

impl ManagedSession {
    pub(crate) fn new(inner: Box<dyn TrackingSession>) -> Self {
        Self {
            inner,
            state: SessionState::Created,
        }
    }

    /// Current state: `Created`, `Resumed` or `Paused`.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` if frames may be pulled.
    pub fn is_resumed(&self) -> bool {
        self.state == SessionState::Resumed
    }
}

impl TrackingSession for ManagedSession {
    fn id(&self) -> SessionId {
        self.inner.id()
    }

    fn resume(&mut self) -> Result<(), TrackingError> {
        self.inner.resume()?;
        self.state = SessionState::Resumed;
        Ok(())
    }

    fn pause(&mut self) {
        if self.state == SessionState::Resumed {
            self.inner.pause();
            self.state = SessionState::Paused;
        }
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.inner.set_camera_texture(texture);
    }

    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        self.inner.set_display_geometry(rotation, width, height);
    }

    fn update(&mut self) -> Result<Frame, TrackingError> {
        if !self.is_resumed() {
            return Err(TrackingError::SessionPaused);
        }
        self.inner.update()
    }

    fn create_anchor(&mut self, pose: Pose) -> Result<AnchorHandle, TrackingError> {
        self.inner.create_anchor(pose)
    }

    fn anchor_tracking_state(&self, anchor: AnchorHandle) -> TrackingState {
        self.inner.anchor_tracking_state(anchor)
    }

    fn anchor_pose(&self, anchor: AnchorHandle) -> Option<Pose> {
        self.inner.anchor_pose(anchor)
    }
}

/// The slot holding zero or one session, shared by the control and render threads.
///
/// The lifecycle manager is the only writer. The render loop locks it for the
/// duration of one tick. The lifecycle ordering (dependents paused before the
/// session, resumed after it) keeps the two from contending.
#[derive(Clone, Default)]
pub struct SharedSession {
    slot: Arc<Mutex<Option<ManagedSession>>>,
}

impl SharedSession {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the slot. A poisoned lock is recovered, since a panicking tick
    /// never leaves the session half-updated.
    pub fn lock(&self) -> MutexGuard<'_, Option<ManagedSession>> {
        self.slot.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("Session lock was poisoned; recovering.");
            poisoned.into_inner()
        })
    }

    /// Returns `true` if a session currently exists.
    pub fn is_present(&self) -> bool {
        self.lock().is_some()
    }

    /// Id of the current session, if any.
    pub fn id(&self) -> Option<SessionId> {
        self.lock().as_ref().map(|s| s.id())
    }

    /// State of the current session, if any.
    pub fn state(&self) -> Option<SessionState> {
        self.lock().as_ref().map(|s| s.state())
    }
}
