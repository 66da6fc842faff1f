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

// Anchora Sandbox
// Runs an AR app headless against the simulated tracking engine.

use anchora_infra::{
    HeadlessAnchorRenderer, HeadlessBackground, HeadlessCounters, HeadlessTarget, LogNotifier,
    SimulatedEngine, SimulatedEngineConfig,
};
use anchora_sdk::prelude::*;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn load_config() -> Result<AppConfig> {
    match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(&path)
            .with_context(|| format!("failed to load configuration from '{path}'")),
        None => Ok(AppConfig::default()),
    }
}

fn main() -> Result<()> {
    anchora_telemetry::init_logging();
    let config = load_config()?;

    let engine = SimulatedEngine::new(SimulatedEngineConfig {
        installed: false,
        ..Default::default()
    });
    let camera = engine.camera_switch();

    let counters = HeadlessCounters::shared();
    let (placement, placements) = QueuedPlacement::new();
    let collaborators = RenderCollaborators::new(
        Box::new(HeadlessTarget::new(counters.clone())),
        Box::new(HeadlessBackground::new(counters.clone())),
        Box::new(HeadlessAnchorRenderer::new(counters.clone())),
    )
    .with_placement(Box::new(placement));

    let mut app = ArApp::new(Box::new(engine), collaborators, config)
        .with_notifier(Arc::new(LogNotifier::new()));

    app.on_surface_changed(1080, 1920);
    app.on_permission_granted()?;

    // The first resume starts the install flow; the second one gets a session.
    log::info!("Host resume: {:?}", app.on_resume());
    app.on_pause();
    log::info!("Host resume: {:?}", app.on_resume());

    for i in 0..4 {
        thread::sleep(Duration::from_millis(500));
        placements.request(PlacementRequest::InFrontOfCamera {
            distance: 0.5 + i as f32 * 0.25,
        });
    }
    app.place_anchor(
        Pose::from_translation(Vec3::new(0.0, 0.0, 0.0)),
        LinearRgba::WHITE,
    )?;

    app.on_display_rotation_changed(DisplayRotation::Rotation90);
    app.on_surface_changed(1920, 1080);
    thread::sleep(Duration::from_secs(1));

    // The camera drops out mid-run: those ticks fail, rendering picks up again after.
    camera.set_available(false);
    thread::sleep(Duration::from_millis(200));
    camera.set_available(true);
    thread::sleep(Duration::from_millis(300));

    // Another app grabs the camera while we are in the background.
    app.on_pause();
    camera.set_available(false);
    log::info!("Host resume: {:?}", app.on_resume());
    camera.set_available(true);
    app.on_pause();
    log::info!("Host resume: {:?}", app.on_resume());
    thread::sleep(Duration::from_secs(1));

    app.shutdown();

    let anchors = app.anchors();
    let anchors = anchors
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    log::info!(
        "Done: {} anchors placed, {} backgrounds and {} anchor draws ({} uniform bytes).",
        anchors.len(),
        counters.backgrounds(),
        counters.anchors(),
        counters.uniform_bytes()
    );
    Ok(())
}
