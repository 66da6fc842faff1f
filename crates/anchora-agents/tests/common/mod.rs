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

//! Scriptable tracking engine and recording render collaborators shared by
//! the integration tests.

#![allow(dead_code)]

use anchora_agents::{
    FrameRenderLoop, HostResume, LifecycleError, SessionLifecycleManager, ViewportAdapter,
};
use anchora_core::math::{LinearRgba, Pose, Vec3};
use anchora_core::platform::{DisplayRotation, StatusNotifier, SurfaceLifecycle};
use anchora_core::renderer::{
    AnchorDraw, AnchorRenderer, BackgroundSurface, RenderError, RenderTarget, SceneOverlay,
    SceneView, SurfaceRenderer, TextureId,
};
use anchora_core::tracking::{
    AnchorHandle, Camera, CameraIntrinsics, Frame, InstallStatus, LightEstimate, SessionConfig,
    SessionCreationError, SessionId, TrackingEngine, TrackingError, TrackingSession,
    TrackingState,
};
use anchora_data::{AnchorPlacement, AnchorRegistry, SharedAnchorRegistry};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Everything the mocks are told to do and everything they observed.
pub struct Script {
    pub events: Vec<String>,
    pub camera_available: bool,
    pub camera_tracking: TrackingState,
    pub intrinsics: CameraIntrinsics,
    pub light: LightEstimate,
    pub fail_updates: u32,
    pub panic_updates: u32,
    pub updates: u32,
    pub update_violations: u32,
    pub anchor_states: HashMap<u64, TrackingState>,
    pub anchor_queries: u32,
    pub fail_anchor_creations: u32,
    pub install_answers: VecDeque<InstallStatus>,
    pub install_prompts: Vec<bool>,
    pub creation_error: Option<SessionCreationError>,
    pub geometry: Vec<(DisplayRotation, u32, u32)>,
    pub textures: Vec<TextureId>,
    pub clears: u32,
    pub viewports: Vec<(u32, u32)>,
    pub backgrounds_drawn: u32,
    pub overlay_draws: u32,
    pub anchor_draws: Vec<AnchorDraw>,
    pub fail_texture_creation: bool,
    pub messages: Vec<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            camera_available: true,
            camera_tracking: TrackingState::Tracking,
            intrinsics: test_intrinsics(),
            light: LightEstimate::valid([0.9, 0.8, 0.7, 0.5]),
            fail_updates: 0,
            panic_updates: 0,
            updates: 0,
            update_violations: 0,
            anchor_states: HashMap::new(),
            anchor_queries: 0,
            fail_anchor_creations: 0,
            install_answers: VecDeque::new(),
            install_prompts: Vec::new(),
            creation_error: None,
            geometry: Vec::new(),
            textures: Vec::new(),
            clears: 0,
            viewports: Vec::new(),
            backgrounds_drawn: 0,
            overlay_draws: 0,
            anchor_draws: Vec::new(),
            fail_texture_creation: false,
            messages: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct Shared(Arc<Mutex<Script>>);

impl Shared {
    pub fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.0.lock().unwrap();
        f(&mut script)
    }

    pub fn event(&self, event: impl Into<String>) {
        self.with(|s| s.events.push(event.into()));
    }

    pub fn events(&self) -> Vec<String> {
        self.with(|s| s.events.clone())
    }
}

pub fn test_intrinsics() -> CameraIntrinsics {
    CameraIntrinsics {
        focal_length: [500.0, 500.0],
        principal_point: [330.0, 236.0],
        image_dimensions: [640, 480],
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracking engine
// ─────────────────────────────────────────────────────────────────────────────

pub struct MockEngine {
    pub script: Shared,
}

impl TrackingEngine for MockEngine {
    fn request_install(
        &mut self,
        user_requested_install: bool,
    ) -> Result<InstallStatus, SessionCreationError> {
        Ok(self.script.with(|s| {
            s.install_prompts.push(user_requested_install);
            s.install_answers
                .pop_front()
                .unwrap_or(InstallStatus::Installed)
        }))
    }

    fn create_session(
        &mut self,
        _config: &SessionConfig,
    ) -> Result<Box<dyn TrackingSession>, SessionCreationError> {
        if let Some(e) = self.script.with(|s| s.creation_error.clone()) {
            return Err(e);
        }
        let id = SessionId::fresh();
        self.script.event(format!("session:create:{}", id.0));
        Ok(Box::new(MockSession {
            id,
            script: self.script.clone(),
            resumed: false,
            next_anchor: 0,
        }))
    }
}

pub struct MockSession {
    id: SessionId,
    script: Shared,
    resumed: bool,
    next_anchor: u64,
}

impl TrackingSession for MockSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn resume(&mut self) -> Result<(), TrackingError> {
        if !self.script.with(|s| s.camera_available) {
            return Err(TrackingError::CameraNotAvailable);
        }
        self.resumed = true;
        self.script.event("session:resume");
        Ok(())
    }

    fn pause(&mut self) {
        self.resumed = false;
        self.script.event("session:pause");
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.script.with(|s| s.textures.push(texture));
    }

    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        self.script.with(|s| s.geometry.push((rotation, width, height)));
    }

    fn update(&mut self) -> Result<Frame, TrackingError> {
        let resumed = self.resumed;
        let (fail, panic, frame) = self.script.with(|s| {
            s.updates += 1;
            if !resumed {
                s.update_violations += 1;
            }
            let fail = s.fail_updates > 0;
            if fail {
                s.fail_updates -= 1;
            }
            let panic = !fail && s.panic_updates > 0;
            if panic {
                s.panic_updates -= 1;
            }
            let frame = Frame {
                timestamp_ns: i64::from(s.updates) * 33_000_000,
                camera: Camera {
                    pose: Pose::from_translation(Vec3::new(0.0, 1.5, 0.0)),
                    tracking_state: s.camera_tracking,
                    intrinsics: s.intrinsics,
                },
                light_estimate: s.light,
            };
            (fail, panic, frame)
        });
        if fail {
            return Err(TrackingError::Fatal("engine-internal error".to_string()));
        }
        if panic {
            panic!("engine blew up");
        }
        Ok(frame)
    }

    fn create_anchor(&mut self, _pose: Pose) -> Result<AnchorHandle, TrackingError> {
        let fail = self.script.with(|s| {
            let fail = s.fail_anchor_creations > 0;
            if fail {
                s.fail_anchor_creations -= 1;
            }
            fail
        });
        if fail {
            return Err(TrackingError::Fatal("anchor limit reached".to_string()));
        }
        self.next_anchor += 1;
        Ok(AnchorHandle {
            session: self.id,
            id: self.next_anchor,
        })
    }

    fn anchor_tracking_state(&self, anchor: AnchorHandle) -> TrackingState {
        self.script.with(|s| {
            s.anchor_queries += 1;
            s.anchor_states
                .get(&anchor.id)
                .copied()
                .unwrap_or(TrackingState::Tracking)
        })
    }

    fn anchor_pose(&self, anchor: AnchorHandle) -> Option<Pose> {
        self.script.with(|s| s.anchor_queries += 1);
        Some(Pose::from_translation(Vec3::new(anchor.id as f32, 0.0, -1.0)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Render collaborators
// ─────────────────────────────────────────────────────────────────────────────

pub struct RecordingTarget {
    pub script: Shared,
}

impl RenderTarget for RecordingTarget {
    fn set_clear_color(&mut self, _color: LinearRgba) {}

    fn clear(&mut self) {
        self.script.with(|s| s.clears += 1);
    }

    fn set_viewport(&mut self, _x: i32, _y: i32, width: u32, height: u32) {
        self.script.with(|s| s.viewports.push((width, height)));
    }
}

pub struct RecordingBackground {
    pub script: Shared,
    pub texture: Option<TextureId>,
}

impl BackgroundSurface for RecordingBackground {
    fn create_texture(&mut self) -> Result<TextureId, RenderError> {
        if self.script.with(|s| s.fail_texture_creation) {
            return Err(RenderError::ResourceCreationFailed("no context".to_string()));
        }
        let texture = TextureId(7);
        self.texture = Some(texture);
        Ok(texture)
    }

    fn texture_id(&self) -> Option<TextureId> {
        self.texture
    }

    fn draw(&mut self, _frame: &Frame) -> Result<(), RenderError> {
        self.script.with(|s| s.backgrounds_drawn += 1);
        Ok(())
    }
}

pub struct RecordingRenderer {
    pub script: Shared,
}

impl AnchorRenderer for RecordingRenderer {
    fn draw_anchor(&mut self, draw: &AnchorDraw) -> Result<(), RenderError> {
        self.script.with(|s| s.anchor_draws.push(*draw));
        Ok(())
    }
}

pub struct RecordingOverlay {
    pub script: Shared,
}

impl SceneOverlay for RecordingOverlay {
    fn name(&self) -> &str {
        "recording overlay"
    }

    fn draw(&mut self, _frame: &Frame, _scene: &SceneView) -> Result<(), RenderError> {
        self.script.with(|s| s.overlay_draws += 1);
        Ok(())
    }
}

/// A lifecycle dependent that only logs its calls.
pub struct RecordingDependent {
    pub name: &'static str,
    pub script: Shared,
}

impl SurfaceLifecycle for RecordingDependent {
    fn name(&self) -> &str {
        self.name
    }

    fn on_resume(&self) {
        self.script.event(format!("{}:resume", self.name));
    }

    fn on_pause(&self) {
        self.script.event(format!("{}:pause", self.name));
    }
}

pub struct RecordingNotifier {
    pub script: Shared,
}

impl StatusNotifier for RecordingNotifier {
    fn show_message(&self, message: &str) {
        self.script.with(|s| s.messages.push(message.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.script.with(|s| s.messages.push(format!("error: {message}")));
    }

    fn hide(&self) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────────────────────────

/// A lifecycle manager and a render loop wired to the same session slot.
pub struct Harness {
    pub script: Shared,
    pub manager: SessionLifecycleManager,
    pub anchors: SharedAnchorRegistry,
    pub viewport: Arc<ViewportAdapter>,
    pub render: FrameRenderLoop,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(None, |_| {})
    }

    pub fn with_placement(placement: Box<dyn AnchorPlacement>) -> Self {
        Self::build(Some(placement), |_| {})
    }

    /// Applies `configure` to the script before the surface is created.
    pub fn configured(configure: impl FnOnce(&mut Script)) -> Self {
        Self::build(None, configure)
    }

    fn build(
        placement: Option<Box<dyn AnchorPlacement>>,
        configure: impl FnOnce(&mut Script),
    ) -> Self {
        let script = Shared::default();
        script.with(configure);
        let manager = SessionLifecycleManager::new(
            Box::new(MockEngine {
                script: script.clone(),
            }),
            SessionConfig::default(),
        )
        .with_notifier(Arc::new(RecordingNotifier {
            script: script.clone(),
        }));
        let anchors = AnchorRegistry::shared();
        let viewport = Arc::new(ViewportAdapter::default());

        let mut render = FrameRenderLoop::new(
            manager.session(),
            anchors.clone(),
            viewport.clone(),
            Box::new(RecordingTarget {
                script: script.clone(),
            }),
            Box::new(RecordingBackground {
                script: script.clone(),
                texture: None,
            }),
            Box::new(RecordingRenderer {
                script: script.clone(),
            }),
        )
        .with_overlay(Box::new(RecordingOverlay {
            script: script.clone(),
        }));
        if let Some(placement) = placement {
            render = render.with_placement(placement);
        }
        render.on_surface_created();
        render.on_surface_changed(640, 480);

        Self {
            script,
            manager,
            anchors,
            viewport,
            render,
        }
    }

    /// Host resume with the viewport adapter as the only dependent.
    pub fn resume(&mut self) -> Result<HostResume, LifecycleError> {
        let dependents: [&dyn SurfaceLifecycle; 1] = [&*self.viewport];
        self.manager.on_host_resume(&dependents)
    }

    pub fn pause(&mut self) {
        let dependents: [&dyn SurfaceLifecycle; 1] = [&*self.viewport];
        self.manager.on_host_pause(&dependents);
    }

    /// Creates an anchor on the current session.
    pub fn add_anchor(&self, color: LinearRgba) -> AnchorHandle {
        let slot = self.manager.session();
        let mut guard = slot.lock();
        let session = guard.as_mut().expect("no session");
        self.anchors
            .write()
            .unwrap()
            .add(session, Pose::IDENTITY, color)
            .unwrap()
    }

    pub fn anchor_draws(&self) -> Vec<AnchorDraw> {
        self.script.with(|s| s.anchor_draws.clone())
    }
}
