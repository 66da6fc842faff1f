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

//! Drives the session through install check, creation, resume and pause.

use super::{ManagedSession, SessionState, SharedSession};
use anchora_core::platform::{StatusNotifier, SurfaceLifecycle};
use anchora_core::tracking::{
    InstallStatus, SessionConfig, SessionCreationError, SessionId, TrackingEngine, TrackingError,
    TrackingSession,
};
use std::sync::Arc;
use thiserror::Error;

/// Why the lifecycle manager could not bring a session up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The engine refused to create a session.
    #[error("session creation failed: {0}")]
    Creation(#[from] SessionCreationError),
    /// The camera is held elsewhere. The session was discarded and will be
    /// recreated on the next host resume.
    #[error("camera not available; session discarded")]
    CameraUnavailable,
    /// Resuming failed for another reason. The session was discarded.
    #[error("session resume failed: {0}")]
    ResumeFailed(TrackingError),
    /// `resume()` was called without a session.
    #[error("no session to resume")]
    NoSession,
}

impl LifecycleError {
    /// Returns `true` if the next host resume can be expected to succeed
    /// without user action.
    pub fn is_retryable(&self) -> bool {
        match self {
            LifecycleError::Creation(e) => !e.is_fatal(),
            LifecycleError::CameraUnavailable | LifecycleError::NoSession => true,
            LifecycleError::ResumeFailed(_) => false,
        }
    }

    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            LifecycleError::Creation(e) => e.user_message(),
            LifecycleError::CameraUnavailable => "Camera not available. Please restart the app.",
            LifecycleError::ResumeFailed(_) | LifecycleError::NoSession => {
                "Failed to start the AR session"
            }
        }
    }
}

/// Result of [`SessionLifecycleManager::ensure_active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A session already existed.
    Ready(SessionId),
    /// A new session was created.
    Created(SessionId),
    /// The engine is being installed; no session was created.
    AwaitingInstall,
}

/// Result of [`SessionLifecycleManager::on_host_resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostResume {
    /// The session and its dependents are running.
    Resumed(SessionId),
    /// Waiting for the engine install to finish.
    AwaitingInstall,
}

/// Owns the tracking engine and the single session slot.
///
/// Runs on the control thread. The render loop only sees the session through
/// the [`SharedSession`] returned by [`SessionLifecycleManager::session`].
pub struct SessionLifecycleManager {
    engine: Box<dyn TrackingEngine>,
    session: SharedSession,
    config: SessionConfig,
    // State while the slot is empty.
    idle_state: SessionState,
    install_requested: bool,
    sessions_created: u64,
    notifier: Option<Arc<dyn StatusNotifier>>,
}

impl SessionLifecycleManager {
    /// Creates a manager with an empty session slot.
    pub fn new(engine: Box<dyn TrackingEngine>, config: SessionConfig) -> Self {
        Self {
            engine,
            session: SharedSession::new(),
            config,
            idle_state: SessionState::Uninitialized,
            install_requested: false,
            sessions_created: 0,
            notifier: None,
        }
    }

    /// Routes user-facing failure messages to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn StatusNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Routes user-facing messages to `notifier`, in place.
    pub fn set_notifier(&mut self, notifier: Arc<dyn StatusNotifier>) {
        self.notifier = Some(notifier);
    }

    /// The session slot, for the render loop.
    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.session.state().unwrap_or(self.idle_state)
    }

    /// Whether an install flow was requested from the engine.
    pub fn install_requested(&self) -> bool {
        self.install_requested
    }

    /// Number of sessions created so far.
    pub fn sessions_created(&self) -> u64 {
        self.sessions_created
    }

    /// Makes sure a session exists, creating one if the engine is installed.
    ///
    /// If the engine starts an install flow, no session is created and the
    /// caller must retry on the next resume.
    pub fn ensure_active(&mut self) -> Result<EnsureOutcome, LifecycleError> {
        if let Some(id) = self.session.id() {
            return Ok(EnsureOutcome::Ready(id));
        }

        // Prompt for installation only once; afterwards a missing engine is an error.
        match self.engine.request_install(!self.install_requested) {
            Ok(InstallStatus::InstallRequested) => {
                log::info!("Tracking engine install requested; waiting for the next resume.");
                self.install_requested = true;
                self.idle_state = SessionState::AwaitingInstall;
                return Ok(EnsureOutcome::AwaitingInstall);
            }
            Ok(InstallStatus::Installed) => {}
            Err(e) => return Err(self.creation_failed(e)),
        }

        match self.engine.create_session(&self.config) {
            Ok(inner) => {
                let managed = ManagedSession::new(inner);
                let id = managed.id();
                *self.session.lock() = Some(managed);
                self.idle_state = SessionState::Uninitialized;
                self.sessions_created += 1;
                log::info!("Created tracking {id}.");
                Ok(EnsureOutcome::Created(id))
            }
            Err(e) => Err(self.creation_failed(e)),
        }
    }

    /// Resumes the current session.
    ///
    /// If the camera is unavailable, or resuming fails otherwise, the session
    /// is discarded. The caller retries `ensure_active` + `resume` on the next
    /// host resume, never within the same tick.
    pub fn resume(&mut self) -> Result<SessionId, LifecycleError> {
        let mut slot = self.session.lock();
        let Some(session) = slot.as_mut() else {
            return Err(LifecycleError::NoSession);
        };
        let id = session.id();

        match session.resume() {
            Ok(()) => {
                log::info!("Resumed tracking {id}.");
                Ok(id)
            }
            Err(TrackingError::CameraNotAvailable) => {
                *slot = None;
                drop(slot);
                self.idle_state = SessionState::Uninitialized;
                log::warn!("Camera not available while resuming {id}; session discarded.");
                self.report(&LifecycleError::CameraUnavailable);
                Err(LifecycleError::CameraUnavailable)
            }
            Err(other) => {
                *slot = None;
                drop(slot);
                self.idle_state = SessionState::Failed;
                let err = LifecycleError::ResumeFailed(other);
                log::error!("{}: {err}", err.user_message());
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Pauses the current session. Does nothing without a session or when
    /// already paused.
    pub fn pause(&mut self) {
        if let Some(session) = self.session.lock().as_mut() {
            if session.is_resumed() {
                session.pause();
                log::info!("Paused tracking {}.", session.id());
            }
        }
    }

    /// Handles a host resume event.
    ///
    /// The session is resumed before any dependent, and the dependents are
    /// resumed in the given order.
    pub fn on_host_resume(
        &mut self,
        dependents: &[&dyn SurfaceLifecycle],
    ) -> Result<HostResume, LifecycleError> {
        if let EnsureOutcome::AwaitingInstall = self.ensure_active()? {
            return Ok(HostResume::AwaitingInstall);
        }
        let id = self.resume()?;
        for dependent in dependents {
            log::debug!("Resuming {}.", dependent.name());
            dependent.on_resume();
        }
        Ok(HostResume::Resumed(id))
    }

    /// Handles a host pause event.
    ///
    /// Dependents are paused in reverse order, all of them before the session.
    pub fn on_host_pause(&mut self, dependents: &[&dyn SurfaceLifecycle]) {
        if !self.session.is_present() {
            return;
        }
        for dependent in dependents.iter().rev() {
            log::debug!("Pausing {}.", dependent.name());
            dependent.on_pause();
        }
        self.pause();
    }

    fn creation_failed(&mut self, error: SessionCreationError) -> LifecycleError {
        self.idle_state = SessionState::Failed;
        let err = LifecycleError::Creation(error);
        log::error!("{}: {err}", err.user_message());
        self.report(&err);
        err
    }

    fn report(&self, error: &LifecycleError) {
        if let Some(notifier) = &self.notifier {
            notifier.show_error(error.user_message());
        }
    }
}
