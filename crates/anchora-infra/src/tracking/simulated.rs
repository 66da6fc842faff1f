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

//! A tracking engine that synthesizes frames from a camera orbiting the origin.
//!
//! It needs no camera or sensors, which makes it suitable for demos and for
//! exercising the render thread in tests.

use anchora_core::math::{Pose, Quaternion, Vec3};
use anchora_core::platform::DisplayRotation;
use anchora_core::renderer::TextureId;
use anchora_core::tracking::{
    AnchorHandle, Camera, CameraIntrinsics, Frame, InstallStatus, LightEstimate,
    LightEstimationMode, SessionConfig, SessionCreationError, SessionId, TrackingEngine,
    TrackingError, TrackingSession, TrackingState, UpdateMode,
};
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Behavior of a [`SimulatedEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedEngineConfig {
    /// Whether the engine is installed. If not, the first install check starts
    /// an install flow which completes before the next check.
    pub installed: bool,
    /// Makes every session creation fail with this error.
    pub creation_error: Option<SessionCreationError>,
    /// Rate at which camera images become available.
    pub camera_fps: u32,
    /// Number of frames after each resume before the camera reaches `Tracking`.
    pub warmup_frames: u32,
    /// Radius of the camera orbit around the origin, in meters.
    pub orbit_radius: f32,
    /// Height of the camera above the floor, in meters.
    pub camera_height: f32,
    /// Time for one full orbit.
    pub orbit_period: Duration,
    /// Vertical field of view of the camera, in radians.
    pub fov_y: f32,
    /// Camera image size in pixels.
    pub image_size: (u32, u32),
    /// Average intensity reported by the light estimate.
    pub ambient_intensity: f32,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            installed: true,
            creation_error: None,
            camera_fps: 30,
            warmup_frames: 10,
            orbit_radius: 1.5,
            camera_height: 1.4,
            orbit_period: Duration::from_secs(20),
            fov_y: 60f32.to_radians(),
            image_size: (640, 480),
            ambient_intensity: 0.6,
        }
    }
}

/// Controls whether the simulated camera is available to sessions.
///
/// Turning it off emulates another application holding the camera: the next
/// session resume, and every `update()`, fails with [`TrackingError::CameraNotAvailable`].
#[derive(Debug, Clone)]
pub struct CameraSwitch(Arc<AtomicBool>);

impl CameraSwitch {
    /// Makes the camera available or unavailable.
    pub fn set_available(&self, available: bool) {
        self.0.store(available, Ordering::SeqCst);
    }

    /// Whether the camera is currently available.
    pub fn is_available(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for CameraSwitch {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

/// A [`TrackingEngine`] producing synthetic frames.
pub struct SimulatedEngine {
    config: SimulatedEngineConfig,
    installed: bool,
    camera: CameraSwitch,
}

impl SimulatedEngine {
    /// Creates an engine with the given behavior.
    pub fn new(config: SimulatedEngineConfig) -> Self {
        Self {
            installed: config.installed,
            config,
            camera: CameraSwitch::default(),
        }
    }

    /// Handle to toggle camera availability from another thread.
    pub fn camera_switch(&self) -> CameraSwitch {
        self.camera.clone()
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new(SimulatedEngineConfig::default())
    }
}

impl TrackingEngine for SimulatedEngine {
    fn request_install(
        &mut self,
        user_requested_install: bool,
    ) -> Result<InstallStatus, SessionCreationError> {
        if self.installed {
            return Ok(InstallStatus::Installed);
        }
        if !user_requested_install {
            return Err(SessionCreationError::NotInstalled);
        }
        log::info!("Simulating tracking engine installation.");
        // The install flow finishes while the host is paused.
        self.installed = true;
        Ok(InstallStatus::InstallRequested)
    }

    fn create_session(
        &mut self,
        config: &SessionConfig,
    ) -> Result<Box<dyn TrackingSession>, SessionCreationError> {
        if let Some(error) = &self.config.creation_error {
            return Err(error.clone());
        }
        Ok(Box::new(SimulatedSession::new(
            self.config.clone(),
            *config,
            self.camera.clone(),
        )))
    }
}

struct SimulatedSession {
    id: SessionId,
    engine: SimulatedEngineConfig,
    session: SessionConfig,
    camera: CameraSwitch,
    resumed: bool,
    texture: Option<TextureId>,
    geometry: Option<(DisplayRotation, u32, u32)>,
    started: Instant,
    last_frame: Option<Instant>,
    frames_since_resume: u32,
    tracking: TrackingState,
    // Anchor tracking follows the camera's tracking state.
    anchors: HashMap<u64, Pose>,
    next_anchor: u64,
}

impl SimulatedSession {
    fn new(engine: SimulatedEngineConfig, session: SessionConfig, camera: CameraSwitch) -> Self {
        Self {
            id: SessionId::fresh(),
            engine,
            session,
            camera,
            resumed: false,
            texture: None,
            geometry: None,
            started: Instant::now(),
            last_frame: None,
            frames_since_resume: 0,
            tracking: TrackingState::Paused,
            anchors: HashMap::new(),
            next_anchor: 0,
        }
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.engine.camera_fps.max(1)))
    }

    fn wait_for_camera_image(&self) {
        if self.session.update_mode != UpdateMode::Blocking {
            return;
        }
        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            let interval = self.frame_interval();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
    }

    fn camera_pose(&self, elapsed: Duration) -> Pose {
        let period = self.engine.orbit_period.as_secs_f32().max(f32::EPSILON);
        let angle = TAU * (elapsed.as_secs_f32() / period).fract();
        let r = self.engine.orbit_radius;
        // Rotating -Z by `angle` about +Y points the camera at the origin.
        Pose::new(
            Vec3::new(r * angle.sin(), self.engine.camera_height, r * angle.cos()),
            Quaternion::from_axis_angle(Vec3::Y, angle),
        )
    }

    fn intrinsics(&self) -> CameraIntrinsics {
        let (width, height) = self.engine.image_size;
        let (width, height) = match self.geometry {
            Some((DisplayRotation::Rotation90 | DisplayRotation::Rotation270, ..)) => {
                (height, width)
            }
            _ => (width, height),
        };
        CameraIntrinsics::from_vertical_fov(self.engine.fov_y, width, height)
    }

    fn light_estimate(&self, elapsed: Duration) -> LightEstimate {
        match self.session.light_estimation {
            LightEstimationMode::Disabled => LightEstimate::not_valid(),
            LightEstimationMode::AmbientIntensity => {
                let flicker = 0.05 * (elapsed.as_secs_f32() * 0.5).sin();
                let intensity = (self.engine.ambient_intensity + flicker).clamp(0.0, 1.0);
                LightEstimate::valid([1.0, 0.97, 0.92, intensity])
            }
        }
    }
}

impl TrackingSession for SimulatedSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn resume(&mut self) -> Result<(), TrackingError> {
        if !self.camera.is_available() {
            return Err(TrackingError::CameraNotAvailable);
        }
        self.resumed = true;
        self.frames_since_resume = 0;
        self.last_frame = None;
        Ok(())
    }

    fn pause(&mut self) {
        self.resumed = false;
        self.tracking = TrackingState::Paused;
    }

    fn set_camera_texture(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    fn set_display_geometry(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        log::debug!(
            "{}: display geometry {width}x{height} at {} degrees",
            self.id,
            rotation.degrees()
        );
        self.geometry = Some((rotation, width, height));
    }

    fn update(&mut self) -> Result<Frame, TrackingError> {
        if !self.resumed {
            return Err(TrackingError::SessionPaused);
        }
        if self.texture.is_none() {
            return Err(TrackingError::TextureNotSet);
        }
        if !self.camera.is_available() {
            self.tracking = TrackingState::Paused;
            return Err(TrackingError::CameraNotAvailable);
        }
        self.wait_for_camera_image();
        self.last_frame = Some(Instant::now());

        self.frames_since_resume = self.frames_since_resume.saturating_add(1);
        self.tracking = if self.frames_since_resume > self.engine.warmup_frames {
            TrackingState::Tracking
        } else {
            TrackingState::Paused
        };

        let elapsed = self.started.elapsed();
        Ok(Frame {
            timestamp_ns: i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX),
            camera: Camera {
                pose: self.camera_pose(elapsed),
                tracking_state: self.tracking,
                intrinsics: self.intrinsics(),
            },
            light_estimate: self.light_estimate(elapsed),
        })
    }

    fn create_anchor(&mut self, pose: Pose) -> Result<AnchorHandle, TrackingError> {
        if !self.resumed {
            return Err(TrackingError::SessionPaused);
        }
        self.next_anchor += 1;
        self.anchors.insert(self.next_anchor, pose);
        Ok(AnchorHandle {
            session: self.id,
            id: self.next_anchor,
        })
    }

    fn anchor_tracking_state(&self, anchor: AnchorHandle) -> TrackingState {
        if anchor.session != self.id {
            return TrackingState::Stopped;
        }
        if self.anchors.contains_key(&anchor.id) {
            self.tracking
        } else {
            TrackingState::Stopped
        }
    }

    fn anchor_pose(&self, anchor: AnchorHandle) -> Option<Pose> {
        if anchor.session != self.id {
            return None;
        }
        self.anchors.get(&anchor.id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fast_config() -> SimulatedEngineConfig {
        SimulatedEngineConfig {
            camera_fps: 1000,
            warmup_frames: 2,
            ..Default::default()
        }
    }

    fn running_session(engine: &mut SimulatedEngine) -> Box<dyn TrackingSession> {
        let mut session = engine
            .create_session(&SessionConfig::default())
            .expect("session");
        session.set_camera_texture(TextureId(1));
        session.resume().expect("resume");
        session
    }

    #[test]
    fn install_flow_prompts_once() {
        let mut engine = SimulatedEngine::new(SimulatedEngineConfig {
            installed: false,
            ..Default::default()
        });
        assert_eq!(
            engine.request_install(true),
            Ok(InstallStatus::InstallRequested)
        );
        assert_eq!(engine.request_install(false), Ok(InstallStatus::Installed));
    }

    #[test]
    fn declined_install_is_an_error() {
        let mut engine = SimulatedEngine::new(SimulatedEngineConfig {
            installed: false,
            ..Default::default()
        });
        assert_eq!(
            engine.request_install(false),
            Err(SessionCreationError::NotInstalled)
        );
    }

    #[test]
    fn update_requires_resume_and_texture() {
        let mut engine = SimulatedEngine::new(fast_config());
        let mut session = engine.create_session(&SessionConfig::default()).unwrap();
        assert_eq!(session.update(), Err(TrackingError::SessionPaused));
        session.resume().unwrap();
        assert_eq!(session.update(), Err(TrackingError::TextureNotSet));
    }

    #[test]
    fn camera_tracks_after_warmup() {
        let mut engine = SimulatedEngine::new(fast_config());
        let mut session = running_session(&mut engine);
        let states: Vec<_> = (0..4)
            .map(|_| session.update().unwrap().camera.tracking_state)
            .collect();
        assert_eq!(
            states,
            vec![
                TrackingState::Paused,
                TrackingState::Paused,
                TrackingState::Tracking,
                TrackingState::Tracking
            ]
        );
    }

    #[test]
    fn camera_unavailable_blocks_resume() {
        let mut engine = SimulatedEngine::new(fast_config());
        let switch = engine.camera_switch();
        let mut session = engine.create_session(&SessionConfig::default()).unwrap();
        switch.set_available(false);
        assert_eq!(session.resume(), Err(TrackingError::CameraNotAvailable));
        switch.set_available(true);
        assert_eq!(session.resume(), Ok(()));
    }

    #[test]
    fn camera_lost_while_running_fails_updates() {
        let mut engine = SimulatedEngine::new(fast_config());
        let switch = engine.camera_switch();
        let mut session = running_session(&mut engine);
        assert!(session.update().is_ok());

        switch.set_available(false);
        assert_eq!(session.update(), Err(TrackingError::CameraNotAvailable));
        switch.set_available(true);
        assert!(session.update().is_ok());
    }

    #[test]
    fn orbiting_camera_faces_the_origin() {
        let engine = SimulatedEngine::new(fast_config());
        let session = SimulatedSession::new(
            engine.config.clone(),
            SessionConfig::default(),
            CameraSwitch::default(),
        );
        let pose = session.camera_pose(Duration::from_secs(3));
        let forward = pose.rotation.rotate_vec3(Vec3::new(0.0, 0.0, -1.0));
        let to_origin = Vec3::new(-pose.translation.x, 0.0, -pose.translation.z).normalize();
        assert_relative_eq!(forward.dot(to_origin), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn anchors_follow_camera_tracking_and_ignore_foreign_handles() {
        let mut engine = SimulatedEngine::new(fast_config());
        let mut session = running_session(&mut engine);
        let anchor = session.create_anchor(Pose::IDENTITY).unwrap();
        session.update().unwrap();
        assert_eq!(session.anchor_tracking_state(anchor), TrackingState::Paused);
        for _ in 0..3 {
            session.update().unwrap();
        }
        assert_eq!(session.anchor_tracking_state(anchor), TrackingState::Tracking);

        let foreign = AnchorHandle {
            session: SessionId(u64::MAX),
            id: anchor.id,
        };
        assert_eq!(session.anchor_tracking_state(foreign), TrackingState::Stopped);
        assert_eq!(session.anchor_pose(foreign), None);
    }

    #[test]
    fn disabled_light_estimation_is_not_valid() {
        let mut engine = SimulatedEngine::new(fast_config());
        let mut session = engine
            .create_session(&SessionConfig {
                light_estimation: LightEstimationMode::Disabled,
                ..Default::default()
            })
            .unwrap();
        session.set_camera_texture(TextureId(1));
        session.resume().unwrap();
        let frame = session.update().unwrap();
        assert_eq!(
            frame.light_estimate.color_correction(),
            LightEstimate::NEUTRAL_CORRECTION
        );
    }
}
