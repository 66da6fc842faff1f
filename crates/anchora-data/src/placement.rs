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

//! Anchor placement hooks run by the render loop once per tick.

use crate::registry::AnchorRegistry;
use anchora_core::math::{LinearRgba, Pose, Vec3};
use anchora_core::tracking::{Frame, TrackingError, TrackingSession};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// A collaborator that may add anchors while the render loop holds the frame.
///
/// Invoked after the frame is acquired and before the background is drawn.
/// An error is logged by the render loop and does not abort the tick.
pub trait AnchorPlacement: Send {
    /// Inspects the frame and appends anchors to `anchors` if it wants to.
    fn on_frame(
        &mut self,
        frame: &Frame,
        session: &mut dyn TrackingSession,
        anchors: &mut AnchorRegistry,
    ) -> Result<(), TrackingError>;
}

/// Where a requested anchor should go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementRequest {
    /// At a world-space pose.
    World(Pose),
    /// Straight ahead of the camera, at the given distance in meters.
    InFrontOfCamera {
        /// Distance along the camera's viewing direction.
        distance: f32,
    },
}

/// Colors handed out to placed anchors, cycling.
pub const DEFAULT_PALETTE: [LinearRgba; 4] = [
    LinearRgba::new(66.0 / 255.0, 133.0 / 255.0, 244.0 / 255.0, 1.0),
    LinearRgba::new(219.0 / 255.0, 68.0 / 255.0, 55.0 / 255.0, 1.0),
    LinearRgba::new(244.0 / 255.0, 180.0 / 255.0, 0.0, 1.0),
    LinearRgba::new(15.0 / 255.0, 157.0 / 255.0, 88.0 / 255.0, 1.0),
];

/// Cloneable producer side of a [`QueuedPlacement`], usable from any thread.
#[derive(Debug, Clone)]
pub struct PlacementSender {
    sender: Sender<PlacementRequest>,
}

impl PlacementSender {
    /// Queues a request. Returns `false` if the render loop is gone.
    pub fn request(&self, request: PlacementRequest) -> bool {
        self.sender.send(request).is_ok()
    }
}

/// Places anchors from a queue of requests, at most one per tick.
///
/// Requests are held back while the camera is not tracking, since neither
/// the camera pose nor new anchors are reliable then.
#[derive(Debug)]
pub struct QueuedPlacement {
    receiver: Receiver<PlacementRequest>,
    pending: Option<PlacementRequest>,
    palette: Vec<LinearRgba>,
    placed: usize,
}

impl QueuedPlacement {
    /// Creates the placement hook and the sender that feeds it.
    pub fn new() -> (Self, PlacementSender) {
        Self::with_palette(DEFAULT_PALETTE.to_vec())
    }

    /// Same as [`QueuedPlacement::new`] with custom colors.
    ///
    /// An empty palette falls back to white.
    pub fn with_palette(palette: Vec<LinearRgba>) -> (Self, PlacementSender) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let palette = if palette.is_empty() {
            vec![LinearRgba::WHITE]
        } else {
            palette
        };
        (
            Self {
                receiver,
                pending: None,
                palette,
                placed: 0,
            },
            PlacementSender { sender },
        )
    }

    /// Number of anchors placed so far.
    pub fn placed(&self) -> usize {
        self.placed
    }

    fn next_request(&mut self) -> Option<PlacementRequest> {
        if let Some(request) = self.pending.take() {
            return Some(request);
        }
        match self.receiver.try_recv() {
            Ok(request) => Some(request),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl AnchorPlacement for QueuedPlacement {
    fn on_frame(
        &mut self,
        frame: &Frame,
        session: &mut dyn TrackingSession,
        anchors: &mut AnchorRegistry,
    ) -> Result<(), TrackingError> {
        let Some(request) = self.next_request() else {
            return Ok(());
        };
        let camera = frame.camera();
        if !camera.tracking_state().is_tracking() {
            self.pending = Some(request);
            return Ok(());
        }

        let pose = match request {
            PlacementRequest::World(pose) => pose,
            PlacementRequest::InFrontOfCamera { distance } => camera
                .pose
                .compose(&Pose::from_translation(Vec3::new(0.0, 0.0, -distance))),
        };
        let color = self.palette[self.placed % self.palette.len()];
        if let Err(e) = anchors.add(session, pose, color) {
            // Retried on the next tick.
            self.pending = Some(request);
            return Err(e);
        }
        self.placed += 1;
        Ok(())
    }
}
