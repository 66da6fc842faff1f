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

//! Defines the error types reported by a tracking engine.

use std::fmt;

/// Why the engine could not create a session.
///
/// Every kind maps to one user-facing message. Only [`SessionCreationError::Other`]
/// is worth retrying without user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCreationError {
    /// The tracking engine is not installed on the device.
    NotInstalled,
    /// The user declined the install prompt.
    UserDeclinedInstall,
    /// The installed engine is older than this app requires.
    ApkTooOld,
    /// This app was built against an SDK older than the installed engine supports.
    SdkTooOld,
    /// The device cannot run the tracking engine at all.
    DeviceNotCompatible,
    /// Any other creation failure, with the engine's description.
    Other(String),
}

impl SessionCreationError {
    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionCreationError::NotInstalled | SessionCreationError::UserDeclinedInstall => {
                "Please install the tracking engine"
            }
            SessionCreationError::ApkTooOld => "Please update the tracking engine",
            SessionCreationError::SdkTooOld => "Please update this app",
            SessionCreationError::DeviceNotCompatible => "This device does not support AR",
            SessionCreationError::Other(_) => "Failed to create AR session",
        }
    }

    /// Returns `true` if this failure cannot be fixed by simply trying again.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SessionCreationError::Other(_))
    }
}

impl fmt::Display for SessionCreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionCreationError::NotInstalled => write!(f, "Tracking engine is not installed"),
            SessionCreationError::UserDeclinedInstall => {
                write!(f, "User declined the tracking engine installation")
            }
            SessionCreationError::ApkTooOld => write!(f, "Installed tracking engine is too old"),
            SessionCreationError::SdkTooOld => {
                write!(f, "Application SDK is too old for the installed engine")
            }
            SessionCreationError::DeviceNotCompatible => {
                write!(f, "Device is not compatible with the tracking engine")
            }
            SessionCreationError::Other(msg) => write!(f, "Session creation failed: {msg}"),
        }
    }
}

impl std::error::Error for SessionCreationError {}

/// A failure raised by a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// The camera is held by another process.
    CameraNotAvailable,
    /// The session is not resumed and cannot produce frames.
    SessionPaused,
    /// `update()` was called before a camera texture was bound.
    TextureNotSet,
    /// The anchor handle does not belong to this session.
    StaleAnchor,
    /// An unrecoverable engine failure.
    Fatal(String),
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::CameraNotAvailable => write!(f, "Camera is not available"),
            TrackingError::SessionPaused => write!(f, "Session is paused"),
            TrackingError::TextureNotSet => write!(f, "No camera texture is bound to the session"),
            TrackingError::StaleAnchor => {
                write!(f, "Anchor belongs to a session that no longer exists")
            }
            TrackingError::Fatal(msg) => write!(f, "Fatal tracking engine error: {msg}"),
        }
    }
}

impl std::error::Error for TrackingError {}
