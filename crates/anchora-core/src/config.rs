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

//! Application configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all) is a
//! valid configuration.

use crate::math::LinearRgba;
use crate::tracking::{SessionConfig, UpdateMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tick interval used when `update()` does not pace the render thread and no
/// explicit interval is configured. About one display refresh at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Pixel format and behavior of the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Red channel bits.
    pub red_bits: u8,
    /// Green channel bits.
    pub green_bits: u8,
    /// Blue channel bits.
    pub blue_bits: u8,
    /// Alpha channel bits. Alpha is used for plane blending.
    pub alpha_bits: u8,
    /// Depth buffer bits.
    pub depth_bits: u8,
    /// Stencil buffer bits.
    pub stencil_bits: u8,
    /// Keep the GPU context alive while paused so textures survive a pause.
    pub preserve_context_on_pause: bool,
    /// Render continuously rather than on demand.
    pub continuous: bool,
    /// Minimum time between two ticks, in milliseconds. `None` leaves pacing
    /// to the tracking engine.
    pub min_frame_interval_ms: Option<u64>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 16,
            stencil_bits: 0,
            preserve_context_on_pause: true,
            continuous: true,
            min_frame_interval_ms: None,
        }
    }
}

/// Top-level configuration of an AR application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Color the render target is cleared to before the background is drawn.
    pub clear_color: LinearRgba,
    /// Rendering surface setup.
    pub surface: SurfaceConfig,
    /// Options handed to the tracking engine on session creation.
    pub session: SessionConfig,
    /// Period of the render statistics summary in the log, in milliseconds.
    pub stats_interval_ms: u64,
    /// Name of the render thread.
    pub render_thread_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clear_color: LinearRgba::new(0.1, 0.1, 0.1, 1.0),
            surface: SurfaceConfig::default(),
            session: SessionConfig::default(),
            stats_interval_ms: 1000,
            render_thread_name: "anchora-render".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Minimum interval between render ticks.
    ///
    /// An explicit `surface.min_frame_interval_ms` wins. Otherwise only
    /// [`UpdateMode::LatestCameraImage`] needs pacing, since `update()` then
    /// returns immediately.
    pub fn frame_pacing(&self) -> Option<Duration> {
        match (self.surface.min_frame_interval_ms, self.session.update_mode) {
            (Some(ms), _) => Some(Duration::from_millis(ms)),
            (None, UpdateMode::LatestCameraImage) => Some(DEFAULT_FRAME_INTERVAL),
            (None, UpdateMode::Blocking) => None,
        }
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
