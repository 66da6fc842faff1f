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

//! Keeps the session informed about the display geometry it renders for.

use anchora_core::platform::{DisplayRotation, SurfaceLifecycle};
use anchora_core::tracking::TrackingSession;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Last-known surface size and display rotation, plus whether the session
/// still has to hear about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Display rotation.
    pub rotation: DisplayRotation,
}

#[derive(Debug)]
struct ViewportState {
    geometry: Option<Geometry>,
    rotation: DisplayRotation,
    pending: bool,
    listening: bool,
}

impl ViewportState {
    fn sync_rotation(&mut self) {
        let rotation = self.rotation;
        if let Some(geometry) = self.geometry.as_mut() {
            if geometry.rotation != rotation {
                geometry.rotation = rotation;
                self.pending = true;
            }
        }
    }
}

/// Tracks surface size and display rotation and forwards changes to the session.
///
/// Size changes come from the render thread (`on_surface_changed`), rotation
/// changes from the platform's display listener. A rotation received while
/// paused is held back until the adapter resumes. [`ViewportAdapter::apply_pending_changes_to`] runs once
/// per tick before a frame is pulled.
#[derive(Debug)]
pub struct ViewportAdapter {
    state: Mutex<ViewportState>,
}

impl ViewportAdapter {
    /// Creates an adapter for a display currently at `rotation`.
    pub fn new(rotation: DisplayRotation) -> Self {
        Self {
            state: Mutex::new(ViewportState {
                geometry: None,
                rotation,
                pending: false,
                listening: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a new surface size. Unchanged sizes are ignored.
    pub fn notify_geometry_changed(&self, width: u32, height: u32) {
        let mut state = self.lock();
        let rotation = state.rotation;
        let next = Geometry {
            width,
            height,
            rotation,
        };
        if state.geometry != Some(next) {
            log::debug!("Viewport geometry changed to {width}x{height}.");
            state.geometry = Some(next);
            state.pending = true;
        }
    }

    /// Records a new display rotation.
    ///
    /// While paused the rotation is only remembered; it reaches the geometry
    /// when the adapter resumes.
    pub fn notify_rotation_changed(&self, rotation: DisplayRotation) {
        let mut state = self.lock();
        if state.rotation == rotation {
            return;
        }
        log::debug!("Display rotation changed to {} degrees.", rotation.degrees());
        state.rotation = rotation;
        if state.listening {
            state.sync_rotation();
        }
    }

    /// Pushes pending geometry into `session`. Returns whether anything was sent.
    pub fn apply_pending_changes_to(&self, session: &mut dyn TrackingSession) -> bool {
        let mut state = self.lock();
        if !state.pending {
            return false;
        }
        let Some(geometry) = state.geometry else {
            return false;
        };
        session.set_display_geometry(geometry.rotation, geometry.width, geometry.height);
        state.pending = false;
        true
    }

    /// The current geometry, once the surface size is known.
    pub fn geometry(&self) -> Option<Geometry> {
        self.lock().geometry
    }

    /// Whether a change is waiting to be applied.
    pub fn has_pending_changes(&self) -> bool {
        self.lock().pending
    }
}

impl Default for ViewportAdapter {
    fn default() -> Self {
        Self::new(DisplayRotation::Rotation0)
    }
}

impl SurfaceLifecycle for ViewportAdapter {
    fn name(&self) -> &str {
        "viewport adapter"
    }

    fn on_resume(&self) {
        let mut state = self.lock();
        state.listening = true;
        state.sync_rotation();
    }

    fn on_pause(&self) {
        self.lock().listening = false;
    }
}
