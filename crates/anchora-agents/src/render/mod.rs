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

//! Defines the FrameRenderLoop, which turns one tracking frame into one drawn image.

use crate::session::{ManagedSession, SharedSession};
use crate::viewport::ViewportAdapter;
use anchora_core::math::{LinearRgba, Mat4, Vec3};
use anchora_core::renderer::{
    AnchorDraw, AnchorRenderer, BackgroundSurface, RenderError, RenderTarget, SceneOverlay,
    SceneView, SurfaceRenderer,
};
use anchora_core::tracking::{TrackingError, TrackingSession};
use anchora_data::{AnchorPlacement, AnchorRegistry, SharedAnchorRegistry};
use anchora_telemetry::RenderStats;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use thiserror::Error;

/// Near clipping plane of the projection matrix, in meters.
pub const NEAR_CLIP: f32 = 0.1;

/// Far clipping plane of the projection matrix, in meters.
pub const FAR_CLIP: f32 = 100.0;

/// Uniform scale applied to every anchored object.
pub const ANCHOR_SCALE: f32 = 1.0;

/// What a single [`FrameRenderLoop::render_tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No resumed session; only the clear happened.
    NoSession,
    /// The camera image was drawn, but the camera was not tracking.
    BackgroundOnly,
    /// Background, overlays and anchors were drawn.
    Rendered {
        /// Number of anchor draw calls issued.
        anchors_drawn: usize,
    },
    /// The tick body failed; the error was logged and the tick dropped.
    Failed,
}

/// Errors raised inside a tick. They never escape [`FrameRenderLoop::render_tick`].
#[derive(Debug, Error)]
pub enum TickError {
    /// The tracking engine failed.
    #[error(transparent)]
    Tracking(#[from] TrackingError),
    /// A renderer collaborator failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The background surface has not created its texture yet.
    #[error("background texture was not created")]
    MissingBackgroundTexture,
    /// The tick body panicked.
    #[error("render tick panicked: {0}")]
    Panicked(String),
}

/// The per-tick render procedure, run on the render thread.
///
/// Each tick clears the target, pulls a frame from the session, draws the
/// camera background and, while the camera tracks, the overlays and one object
/// per visible anchor. Any failure inside a tick is logged and swallowed so the
/// next tick runs normally.
pub struct FrameRenderLoop {
    session: SharedSession,
    anchors: SharedAnchorRegistry,
    viewport: Arc<ViewportAdapter>,
    target: Box<dyn RenderTarget>,
    background: Box<dyn BackgroundSurface>,
    renderer: Box<dyn AnchorRenderer>,
    overlays: Vec<Box<dyn SceneOverlay>>,
    placement: Option<Box<dyn AnchorPlacement>>,
    clear_color: LinearRgba,
    stats: RenderStats,
}

impl FrameRenderLoop {
    /// Creates a render loop drawing into `target`.
    pub fn new(
        session: SharedSession,
        anchors: SharedAnchorRegistry,
        viewport: Arc<ViewportAdapter>,
        target: Box<dyn RenderTarget>,
        background: Box<dyn BackgroundSurface>,
        renderer: Box<dyn AnchorRenderer>,
    ) -> Self {
        Self {
            session,
            anchors,
            viewport,
            target,
            background,
            renderer,
            overlays: Vec::new(),
            placement: None,
            clear_color: LinearRgba::new(0.1, 0.1, 0.1, 1.0),
            stats: RenderStats::default(),
        }
    }

    /// Adds an overlay, drawn after the overlays added before it.
    pub fn with_overlay(mut self, overlay: Box<dyn SceneOverlay>) -> Self {
        self.overlays.push(overlay);
        self
    }

    /// Installs the anchor placement hook.
    pub fn with_placement(mut self, placement: Box<dyn AnchorPlacement>) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Sets the color the target is cleared to.
    pub fn with_clear_color(mut self, color: LinearRgba) -> Self {
        self.clear_color = color;
        self
    }

    /// Sets the period of the statistics summary in the log.
    pub fn with_stats_interval(mut self, interval: Duration) -> Self {
        self.stats = RenderStats::new(interval);
        self
    }

    /// Render statistics collected so far.
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Runs one tick. Never fails and never panics outward.
    pub fn render_tick(&mut self) -> TickOutcome {
        // Clear first so the driver does not load the previous frame's contents.
        self.target.clear();

        let slot = self.session.clone();
        let mut guard = slot.lock();
        let outcome = match guard.as_mut() {
            Some(session) if session.is_resumed() => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| self.tick_body(session)));
                match result {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(e)) => {
                        log::error!("Failure on the render thread: {e}");
                        TickOutcome::Failed
                    }
                    Err(payload) => {
                        let e = TickError::Panicked(panic_message(payload.as_ref()));
                        log::error!("Failure on the render thread: {e}");
                        TickOutcome::Failed
                    }
                }
            }
            _ => TickOutcome::NoSession,
        };
        drop(guard);

        match outcome {
            TickOutcome::NoSession => self.stats.record_idle(),
            TickOutcome::BackgroundOnly => self.stats.record_background_only(),
            TickOutcome::Rendered { anchors_drawn } => self.stats.record_rendered(anchors_drawn),
            TickOutcome::Failed => self.stats.record_failure(),
        }
        self.stats.tick();
        outcome
    }

    fn tick_body(&mut self, session: &mut ManagedSession) -> Result<TickOutcome, TickError> {
        self.viewport.apply_pending_changes_to(session);

        let texture = self
            .background
            .texture_id()
            .ok_or(TickError::MissingBackgroundTexture)?;
        session.set_camera_texture(texture);

        // Blocks until a new camera image is available in blocking update mode.
        let frame = session.update()?;

        if let Some(placement) = self.placement.as_mut() {
            let mut anchors = write_registry(&self.anchors);
            if let Err(e) = placement.on_frame(&frame, session, &mut anchors) {
                log::warn!("Anchor placement failed: {e}");
            }
        }

        self.background.draw(&frame)?;

        let camera = frame.camera();
        if !camera.tracking_state().is_tracking() {
            return Ok(TickOutcome::BackgroundOnly);
        }

        let scene = SceneView {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(NEAR_CLIP, FAR_CLIP),
            color_correction: frame.light_estimate().color_correction(),
        };

        for overlay in self.overlays.iter_mut() {
            overlay.draw(&frame, &scene)?;
        }

        let anchors = read_registry(&self.anchors);
        let scale = Mat4::from_scale(Vec3::ONE * ANCHOR_SCALE);
        let renderer = &mut self.renderer;
        let anchors_drawn = anchors.try_for_each_visible(&*session, |transform, color| {
            renderer.draw_anchor(&AnchorDraw {
                scene,
                model: *transform * scale,
                color: *color,
            })
        })?;

        Ok(TickOutcome::Rendered { anchors_drawn })
    }
}

impl SurfaceRenderer for FrameRenderLoop {
    fn on_surface_created(&mut self) {
        self.target.set_clear_color(self.clear_color);

        match self.background.create_texture() {
            Ok(texture) => log::debug!("Camera background texture {texture:?} created."),
            Err(e) => log::error!("Failed to create the camera background texture: {e}"),
        }
        if let Err(e) = self.renderer.on_surface_created() {
            log::error!("Failed to prepare the anchor renderer: {e}");
        }
        for overlay in self.overlays.iter_mut() {
            if let Err(e) = overlay.on_surface_created() {
                log::error!("Failed to prepare overlay '{}': {e}", overlay.name());
            }
        }
    }

    fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.viewport.notify_geometry_changed(width, height);
        self.target.set_viewport(0, 0, width, height);
    }

    fn on_draw_frame(&mut self) {
        self.render_tick();
    }
}

fn read_registry(registry: &SharedAnchorRegistry) -> RwLockReadGuard<'_, AnchorRegistry> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_registry(registry: &SharedAnchorRegistry) -> RwLockWriteGuard<'_, AnchorRegistry> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
