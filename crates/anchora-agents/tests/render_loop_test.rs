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

//! Integration tests for the FrameRenderLoop's per-tick procedure.

mod common;

use anchora_agents::{HostResume, TickOutcome, FAR_CLIP, NEAR_CLIP};
use anchora_core::math::LinearRgba;
use anchora_core::platform::{DisplayRotation, SurfaceLifecycle};
use anchora_core::renderer::TextureId;
use anchora_core::tracking::{CameraIntrinsics, LightEstimate, TrackingState};
use approx::assert_relative_eq;
use common::{test_intrinsics, Harness};

fn resumed_harness() -> Harness {
    let mut h = Harness::new();
    assert!(matches!(h.resume(), Ok(HostResume::Resumed(_))));
    h
}

// ─────────────────────────────────────────────────────────────────────────────
// No session
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_tick_without_session_only_clears() {
    let mut h = Harness::new();
    assert_eq!(h.render.render_tick(), TickOutcome::NoSession);
    h.script.with(|s| {
        assert_eq!(s.clears, 1);
        assert_eq!(s.updates, 0);
        assert_eq!(s.backgrounds_drawn, 0);
    });
}

#[test]
fn test_tick_with_paused_session_does_not_pull_frames() {
    let mut h = resumed_harness();
    h.pause();
    assert_eq!(h.render.render_tick(), TickOutcome::NoSession);
    h.script.with(|s| assert_eq!(s.updates, 0));
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_registry_draws_background_only_content() {
    let mut h = resumed_harness();
    assert_eq!(
        h.render.render_tick(),
        TickOutcome::Rendered { anchors_drawn: 0 }
    );
    h.script.with(|s| {
        assert_eq!(s.backgrounds_drawn, 1);
        assert!(s.anchor_draws.is_empty());
        assert_eq!(s.textures, vec![TextureId(7)]);
    });
}

#[test]
fn test_non_tracking_anchor_is_skipped_in_insertion_order() {
    let mut h = resumed_harness();
    let first = h.add_anchor(LinearRgba::RED);
    let second = h.add_anchor(LinearRgba::GREEN);
    let third = h.add_anchor(LinearRgba::BLUE);
    h.script
        .with(|s| s.anchor_states.insert(second.id, TrackingState::Paused));

    assert_eq!(
        h.render.render_tick(),
        TickOutcome::Rendered { anchors_drawn: 2 }
    );
    let draws = h.anchor_draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].color, LinearRgba::RED);
    assert_eq!(draws[1].color, LinearRgba::BLUE);

    // The mock places anchor `n` at x = n.
    let cols = draws[0].model.to_cols_array();
    assert_relative_eq!(cols[12], first.id as f32);
    let cols = draws[1].model.to_cols_array();
    assert_relative_eq!(cols[12], third.id as f32);
    assert_relative_eq!(cols[14], -1.0);
}

#[test]
fn test_camera_not_tracking_draws_background_only() {
    let mut h = resumed_harness();
    h.add_anchor(LinearRgba::WHITE);
    h.script.with(|s| s.camera_tracking = TrackingState::Paused);

    assert_eq!(h.render.render_tick(), TickOutcome::BackgroundOnly);
    h.script.with(|s| {
        assert_eq!(s.backgrounds_drawn, 1);
        assert_eq!(s.overlay_draws, 0);
        assert!(s.anchor_draws.is_empty());
    });
}

#[test]
fn test_camera_not_tracking_computes_no_matrices() {
    let mut h = resumed_harness();
    h.add_anchor(LinearRgba::WHITE);
    // An empty image gives a degenerate frustum, which cannot be projected.
    let degenerate = CameraIntrinsics {
        focal_length: [500.0, 500.0],
        principal_point: [0.0, 0.0],
        image_dimensions: [0, 0],
    };
    h.script.with(|s| {
        s.intrinsics = degenerate;
        s.camera_tracking = TrackingState::Paused;
    });

    assert_eq!(h.render.render_tick(), TickOutcome::BackgroundOnly);
    h.script.with(|s| {
        assert_eq!(s.backgrounds_drawn, 1);
        assert_eq!(s.anchor_queries, 0);
    });

    // The same frame while tracking does reach the projection and fails.
    h.script.with(|s| s.camera_tracking = TrackingState::Tracking);
    assert_eq!(h.render.render_tick(), TickOutcome::Failed);
}

#[test]
fn test_overlays_draw_before_anchors_while_tracking() {
    let mut h = resumed_harness();
    h.add_anchor(LinearRgba::WHITE);
    h.render.render_tick();
    h.script.with(|s| {
        assert_eq!(s.overlay_draws, 1);
        assert_eq!(s.anchor_draws.len(), 1);
    });
}

#[test]
fn test_projection_uses_fixed_clip_planes() {
    let mut h = resumed_harness();
    h.add_anchor(LinearRgba::WHITE);
    for _ in 0..3 {
        h.render.render_tick();
    }

    let camera = anchora_core::tracking::Camera {
        pose: anchora_core::math::Pose::IDENTITY,
        tracking_state: TrackingState::Tracking,
        intrinsics: test_intrinsics(),
    };
    let expected = camera.projection_matrix(0.1, 100.0).to_cols_array();
    assert_eq!(NEAR_CLIP, 0.1);
    assert_eq!(FAR_CLIP, 100.0);
    for draw in h.anchor_draws() {
        assert_eq!(draw.scene.projection.to_cols_array(), expected);
    }
}

#[test]
fn test_color_correction_always_has_four_components() {
    let mut h = resumed_harness();
    h.add_anchor(LinearRgba::WHITE);

    h.render.render_tick();
    h.script.with(|s| s.light = LightEstimate::not_valid());
    h.render.render_tick();

    let draws = h.anchor_draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].scene.color_correction, [0.9, 0.8, 0.7, 0.5]);
    assert_eq!(
        draws[1].scene.color_correction,
        LightEstimate::NEUTRAL_CORRECTION
    );
    for draw in draws {
        assert_eq!(draw.scene.color_correction.len(), 4);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_engine_error_fails_only_the_current_tick() {
    let mut h = resumed_harness();
    h.add_anchor(LinearRgba::WHITE);
    h.script.with(|s| s.fail_updates = 1);

    assert_eq!(h.render.render_tick(), TickOutcome::Failed);
    h.script.with(|s| assert_eq!(s.backgrounds_drawn, 0));

    assert_eq!(
        h.render.render_tick(),
        TickOutcome::Rendered { anchors_drawn: 1 }
    );
    assert_eq!(h.render.stats().totals().failed, 1);
    assert_eq!(h.render.stats().totals().rendered, 1);
}

#[test]
fn test_panic_in_tick_is_contained() {
    let mut h = resumed_harness();
    h.script.with(|s| s.panic_updates = 1);

    assert_eq!(h.render.render_tick(), TickOutcome::Failed);
    assert!(h.manager.session().is_present());
    assert_eq!(
        h.render.render_tick(),
        TickOutcome::Rendered { anchors_drawn: 0 }
    );
}

#[test]
fn test_missing_background_texture_fails_every_tick() {
    let mut h = Harness::configured(|s| s.fail_texture_creation = true);
    h.resume().unwrap();

    assert_eq!(h.render.render_tick(), TickOutcome::Failed);
    assert_eq!(h.render.render_tick(), TickOutcome::Failed);
    h.script.with(|s| {
        assert_eq!(s.updates, 0);
        assert_eq!(s.clears, 2);
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewport
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_surface_size_reaches_session_before_first_frame() {
    let mut h = resumed_harness();
    h.render.render_tick();
    h.render.render_tick();
    h.script.with(|s| {
        assert_eq!(s.geometry, vec![(DisplayRotation::Rotation0, 640, 480)]);
        assert_eq!(s.viewports, vec![(640, 480)]);
    });
}

#[test]
fn test_rotation_change_is_applied_on_next_tick() {
    let mut h = resumed_harness();
    h.render.render_tick();
    assert!(h.viewport.name().contains("viewport"));

    h.viewport.notify_rotation_changed(DisplayRotation::Rotation90);
    h.render.render_tick();
    h.script.with(|s| {
        assert_eq!(s.geometry.last(), Some(&(DisplayRotation::Rotation90, 640, 480)));
    });
}
