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

//! The ordered collection of placed anchors.

use anchora_core::math::{LinearRgba, Mat4, Pose};
use anchora_core::tracking::{AnchorHandle, TrackingError, TrackingSession};
use std::sync::{Arc, RwLock};

/// An anchor together with the color its virtual object is drawn in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredAnchor {
    /// Tracking handle, owned by the session that created it.
    pub handle: AnchorHandle,
    /// Object tint, components in `[0, 1]`.
    pub color: LinearRgba,
}

/// An anchor that passed the visibility filter for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleAnchor {
    /// Position of the anchor in insertion order.
    pub index: usize,
    /// The anchor's tracking handle.
    pub handle: AnchorHandle,
    /// Anchor-to-world transform built from the anchor's current pose.
    pub transform: Mat4,
    /// Object tint.
    pub color: LinearRgba,
}

/// Append-only, insertion-ordered list of anchors. Insertion order is draw order.
///
/// There is no deduplication and no removal. Anchors created on a session that
/// has since been discarded stay in the list but are never visible again.
#[derive(Debug, Default, Clone)]
pub struct AnchorRegistry {
    anchors: Vec<ColoredAnchor>,
}

/// The registry as shared between the control and render threads.
pub type SharedAnchorRegistry = Arc<RwLock<AnchorRegistry>>;

impl AnchorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry behind a shared lock.
    pub fn shared() -> SharedAnchorRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Number of anchors ever added.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns `true` if no anchor was added yet.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Iterates over all anchors in insertion order, visible or not.
    pub fn iter(&self) -> impl Iterator<Item = &ColoredAnchor> {
        self.anchors.iter()
    }

    /// Appends an existing tracking handle. Returns its index.
    pub fn push(&mut self, handle: AnchorHandle, color: LinearRgba) -> usize {
        self.anchors.push(ColoredAnchor { handle, color });
        self.anchors.len() - 1
    }

    /// Creates an anchor at `pose` on `session` and appends it.
    pub fn add(
        &mut self,
        session: &mut dyn TrackingSession,
        pose: Pose,
        color: LinearRgba,
    ) -> Result<AnchorHandle, TrackingError> {
        let handle = session.create_anchor(pose)?;
        let index = self.push(handle, color);
        log::debug!(
            "Anchor #{index} placed on {} at ({:.2}, {:.2}, {:.2})",
            handle.session,
            pose.translation.x,
            pose.translation.y,
            pose.translation.z
        );
        Ok(handle)
    }

    /// Iterates, in insertion order, over the anchors `session` is currently tracking.
    ///
    /// Anchors from another session, anchors not in the `Tracking` state, and
    /// anchors without a pose are skipped.
    pub fn visible<'a>(
        &'a self,
        session: &'a dyn TrackingSession,
    ) -> impl Iterator<Item = VisibleAnchor> + 'a {
        let current = session.id();
        self.anchors
            .iter()
            .enumerate()
            .filter_map(move |(index, anchor)| {
                if anchor.handle.session != current {
                    log::trace!("Skipping stale anchor #{index} from {}", anchor.handle.session);
                    return None;
                }
                if !session.anchor_tracking_state(anchor.handle).is_tracking() {
                    return None;
                }
                let pose = session.anchor_pose(anchor.handle)?;
                Some(VisibleAnchor {
                    index,
                    handle: anchor.handle,
                    transform: pose.to_matrix(),
                    color: anchor.color,
                })
            })
    }

    /// Calls `f(transform, color)` for each visible anchor. Returns how many were visited.
    pub fn for_each_visible<F>(&self, session: &dyn TrackingSession, mut f: F) -> usize
    where
        F: FnMut(&Mat4, &LinearRgba),
    {
        let mut visited = 0;
        for anchor in self.visible(session) {
            f(&anchor.transform, &anchor.color);
            visited += 1;
        }
        visited
    }

    /// Like [`AnchorRegistry::for_each_visible`], stopping at the first error.
    pub fn try_for_each_visible<F, E>(
        &self,
        session: &dyn TrackingSession,
        mut f: F,
    ) -> Result<usize, E>
    where
        F: FnMut(&Mat4, &LinearRgba) -> Result<(), E>,
    {
        let mut visited = 0;
        for anchor in self.visible(session) {
            f(&anchor.transform, &anchor.color)?;
            visited += 1;
        }
        Ok(visited)
    }
}
