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

//! The public-facing SDK of Anchora.
//!
//! [`ArApp`] is the host of an AR application: it owns the session lifecycle
//! on the control thread, runs the render loop on a dedicated
//! [`RenderThread`], and keeps the two in the order the tracking engine
//! requires. Platform glue forwards its lifecycle callbacks to it.

mod render_thread;

pub use render_thread::RenderThread;

use anchora_agents::{
    FrameRenderLoop, HostResume, LifecycleError, SessionLifecycleManager, SessionState,
    ViewportAdapter,
};
use anchora_core::math::{LinearRgba, Pose};
use anchora_core::platform::{DisplayRotation, StatusNotifier, SurfaceLifecycle};
use anchora_core::renderer::{AnchorRenderer, BackgroundSurface, RenderTarget, SceneOverlay};
use anchora_core::tracking::{AnchorHandle, TrackingEngine};
use anchora_core::AppConfig;
use anchora_data::{AnchorPlacement, AnchorRegistry, SharedAnchorRegistry};
use anchora_telemetry::TickCounters;
use anyhow::{anyhow, Result};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

pub mod prelude {
    pub use crate::{ArApp, RenderCollaborators, RenderThread};
    pub use anchora_agents::{HostResume, LifecycleError, SessionState, TickOutcome};
    pub use anchora_core::math::{LinearRgba, Pose, Quaternion, Vec3};
    pub use anchora_core::platform::{DisplayRotation, StatusNotifier};
    pub use anchora_core::tracking::{SessionCreationError, TrackingEngine};
    pub use anchora_core::AppConfig;
    pub use anchora_data::{PlacementRequest, PlacementSender, QueuedPlacement};
}

/// The GPU-side collaborators handed to the render loop.
pub struct RenderCollaborators {
    /// Target cleared and drawn into every tick.
    pub target: Box<dyn RenderTarget>,
    /// Camera background provider.
    pub background: Box<dyn BackgroundSurface>,
    /// Draws the object attached to each anchor.
    pub renderer: Box<dyn AnchorRenderer>,
    /// Optional visualizations, drawn in order.
    pub overlays: Vec<Box<dyn SceneOverlay>>,
    /// Optional hook placing anchors from the render thread.
    pub placement: Option<Box<dyn AnchorPlacement>>,
}

impl RenderCollaborators {
    /// Bundles the required collaborators.
    pub fn new(
        target: Box<dyn RenderTarget>,
        background: Box<dyn BackgroundSurface>,
        renderer: Box<dyn AnchorRenderer>,
    ) -> Self {
        Self {
            target,
            background,
            renderer,
            overlays: Vec::new(),
            placement: None,
        }
    }

    /// Adds an overlay.
    pub fn with_overlay(mut self, overlay: Box<dyn SceneOverlay>) -> Self {
        self.overlays.push(overlay);
        self
    }

    /// Installs an anchor placement hook.
    pub fn with_placement(mut self, placement: Box<dyn AnchorPlacement>) -> Self {
        self.placement = Some(placement);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permission {
    Unknown,
    Granted,
    Denied,
}

/// An AR application host.
///
/// Call the `on_*` methods from the platform's lifecycle callbacks, on one
/// control thread. Rendering starts once the camera permission is granted.
pub struct ArApp {
    config: AppConfig,
    lifecycle: SessionLifecycleManager,
    anchors: SharedAnchorRegistry,
    viewport: Arc<ViewportAdapter>,
    collaborators: Option<RenderCollaborators>,
    render_thread: Option<Arc<RenderThread>>,
    notifier: Option<Arc<dyn StatusNotifier>>,
    permission: Permission,
    host_resumed: bool,
    surface_size: Option<(u32, u32)>,
}

impl ArApp {
    /// Creates the host. No session exists until the first resume.
    pub fn new(
        engine: Box<dyn TrackingEngine>,
        collaborators: RenderCollaborators,
        config: AppConfig,
    ) -> Self {
        Self {
            lifecycle: SessionLifecycleManager::new(engine, config.session),
            config,
            anchors: AnchorRegistry::shared(),
            viewport: Arc::new(ViewportAdapter::default()),
            collaborators: Some(collaborators),
            render_thread: None,
            notifier: None,
            permission: Permission::Unknown,
            host_resumed: false,
            surface_size: None,
        }
    }

    /// Routes user-facing messages to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn StatusNotifier>) -> Self {
        self.lifecycle.set_notifier(Arc::clone(&notifier));
        self.notifier = Some(notifier);
        self
    }

    /// The camera permission was granted: starts the render thread.
    pub fn on_permission_granted(&mut self) -> Result<()> {
        self.permission = Permission::Granted;
        if self.render_thread.is_some() {
            return Ok(());
        }
        let collaborators = self
            .collaborators
            .take()
            .ok_or_else(|| anyhow!("render collaborators were already consumed"))?;

        let mut render_loop = FrameRenderLoop::new(
            self.lifecycle.session(),
            Arc::clone(&self.anchors),
            Arc::clone(&self.viewport),
            collaborators.target,
            collaborators.background,
            collaborators.renderer,
        )
        .with_clear_color(self.config.clear_color)
        .with_stats_interval(Duration::from_millis(self.config.stats_interval_ms));
        for overlay in collaborators.overlays {
            render_loop = render_loop.with_overlay(overlay);
        }
        if let Some(placement) = collaborators.placement {
            render_loop = render_loop.with_placement(placement);
        }

        let thread = Arc::new(RenderThread::spawn(
            &self.config.render_thread_name,
            self.config.surface.clone(),
            self.config.frame_pacing(),
            render_loop,
        )?);
        if let Some((width, height)) = self.surface_size {
            thread.surface_changed(width, height);
        }
        // The session may already be running if the host resumed first.
        if self.host_resumed && self.lifecycle.state() == SessionState::Resumed {
            thread.on_resume();
        }
        self.render_thread = Some(thread);
        log::info!("Camera permission granted; rendering started.");
        Ok(())
    }

    /// The camera permission was denied. The app stays idle.
    pub fn on_permission_denied(&mut self) {
        self.permission = Permission::Denied;
        log::warn!("Camera permission denied; nothing will be rendered.");
        if let Some(notifier) = &self.notifier {
            notifier.show_error("Camera permission is needed to run this application");
        }
    }

    /// Whether the camera permission was granted.
    pub fn has_camera_permission(&self) -> bool {
        self.permission == Permission::Granted
    }

    /// The host came to the foreground.
    ///
    /// Creates the session if needed and resumes it, then the render surface
    /// and the viewport adapter.
    pub fn on_resume(&mut self) -> Result<HostResume, LifecycleError> {
        self.host_resumed = true;
        let render = self.render_thread.clone();
        let viewport = Arc::clone(&self.viewport);
        let dependents = dependents(render.as_deref(), &viewport);

        let outcome = self.lifecycle.on_host_resume(&dependents)?;
        if let (HostResume::Resumed(_), Some(notifier)) = (outcome, &self.notifier) {
            notifier.show_message("Searching for surfaces...");
        }
        Ok(outcome)
    }

    /// The host went to the background.
    ///
    /// Pauses the viewport adapter and the render surface, waiting for the
    /// in-flight tick, before pausing the session.
    pub fn on_pause(&mut self) {
        self.host_resumed = false;
        let render = self.render_thread.clone();
        let viewport = Arc::clone(&self.viewport);
        let dependents = dependents(render.as_deref(), &viewport);
        self.lifecycle.on_host_pause(&dependents);
    }

    /// The rendering surface was resized.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.surface_size = Some((width, height));
        match &self.render_thread {
            Some(thread) => thread.surface_changed(width, height),
            None => self.viewport.notify_geometry_changed(width, height),
        }
    }

    /// The display was rotated.
    pub fn on_display_rotation_changed(&self, rotation: DisplayRotation) {
        self.viewport.notify_rotation_changed(rotation);
    }

    /// Creates an anchor at `pose` on the current session and registers it.
    pub fn place_anchor(&self, pose: Pose, color: LinearRgba) -> Result<AnchorHandle> {
        let slot = self.lifecycle.session();
        let mut guard = slot.lock();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("no active AR session"))?;
        // Session before registry, the order the render loop locks them in.
        let mut anchors = self.anchors.write().unwrap_or_else(PoisonError::into_inner);
        let handle = anchors.add(session, pose, color)?;
        Ok(handle)
    }

    /// The anchors placed so far.
    pub fn anchors(&self) -> SharedAnchorRegistry {
        Arc::clone(&self.anchors)
    }

    /// Current session lifecycle state.
    pub fn session_state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Render tick counters, once the render thread runs.
    pub fn render_totals(&self) -> Option<TickCounters> {
        self.render_thread.as_ref().map(|thread| thread.totals())
    }

    /// The render thread, once started.
    pub fn render_thread(&self) -> Option<&RenderThread> {
        self.render_thread.as_deref()
    }

    /// Pauses everything and stops the render thread.
    pub fn shutdown(&mut self) {
        if self.host_resumed {
            self.on_pause();
        }
        if let Some(thread) = self.render_thread.take() {
            thread.shutdown();
        }
    }
}

impl Drop for ArApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn dependents<'a>(
    render: Option<&'a RenderThread>,
    viewport: &'a ViewportAdapter,
) -> Vec<&'a dyn SurfaceLifecycle> {
    let mut dependents: Vec<&dyn SurfaceLifecycle> = Vec::with_capacity(2);
    if let Some(render) = render {
        dependents.push(render);
    }
    dependents.push(viewport);
    dependents
}
