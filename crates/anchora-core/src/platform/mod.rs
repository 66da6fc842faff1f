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

//! Abstractions over the host platform: display orientation, pausable
//! surfaces and user-facing status messages.

use serde::{Deserialize, Serialize};

/// Orientation of the display relative to the device's natural orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayRotation {
    /// Natural orientation.
    #[default]
    Rotation0,
    /// Rotated 90 degrees counter-clockwise.
    Rotation90,
    /// Upside down.
    Rotation180,
    /// Rotated 90 degrees clockwise.
    Rotation270,
}

impl DisplayRotation {
    /// Returns the rotation in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            DisplayRotation::Rotation0 => 0,
            DisplayRotation::Rotation90 => 90,
            DisplayRotation::Rotation180 => 180,
            DisplayRotation::Rotation270 => 270,
        }
    }
}

/// Something that must be resumed after, and paused before, the tracking session.
///
/// Implemented by the render surface (it pulls frames from the session) and by
/// the viewport adapter (it pushes geometry into the session).
pub trait SurfaceLifecycle: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Resumes the dependent. The session is already resumed.
    fn on_resume(&self);

    /// Pauses the dependent. Must not return while it can still touch the session.
    fn on_pause(&self);
}

/// Receives messages meant for the user (banners, toasts, ...).
pub trait StatusNotifier: Send + Sync {
    /// Shows an informational message.
    fn show_message(&self, message: &str);

    /// Shows an error message.
    fn show_error(&self, message: &str);

    /// Hides whatever is currently shown.
    fn hide(&self);
}
