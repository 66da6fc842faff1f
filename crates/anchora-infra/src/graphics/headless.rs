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

//! Rendering collaborators that do no GPU work.
//!
//! They validate their inputs, pack uniforms the way a GPU backend would, and
//! count what they were asked to do. Used by the demo and by tests of the
//! render thread.

use anchora_core::math::LinearRgba;
use anchora_core::renderer::{
    AnchorDraw, AnchorRenderer, AnchorUniforms, BackgroundSurface, RenderError, RenderTarget,
    TextureId,
};
use anchora_core::tracking::Frame;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TEXTURE: AtomicU32 = AtomicU32::new(1);

/// Counters shared by the headless collaborators.
#[derive(Debug, Default)]
pub struct HeadlessCounters {
    clears: AtomicU64,
    backgrounds: AtomicU64,
    anchors: AtomicU64,
    uniform_bytes: AtomicU64,
}

impl HeadlessCounters {
    /// Creates zeroed counters behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of target clears.
    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// Number of background draws.
    pub fn backgrounds(&self) -> u64 {
        self.backgrounds.load(Ordering::Relaxed)
    }

    /// Number of anchor draws.
    pub fn anchors(&self) -> u64 {
        self.anchors.load(Ordering::Relaxed)
    }

    /// Total size of the uniform data packed for anchor draws.
    pub fn uniform_bytes(&self) -> u64 {
        self.uniform_bytes.load(Ordering::Relaxed)
    }
}

/// A [`RenderTarget`] without pixels.
#[derive(Debug)]
pub struct HeadlessTarget {
    counters: Arc<HeadlessCounters>,
    clear_color: LinearRgba,
    viewport: (i32, i32, u32, u32),
}

impl HeadlessTarget {
    /// Creates a target reporting into `counters`.
    pub fn new(counters: Arc<HeadlessCounters>) -> Self {
        Self {
            counters,
            clear_color: LinearRgba::BLACK,
            viewport: (0, 0, 0, 0),
        }
    }

    /// The last clear color set.
    pub fn clear_color(&self) -> LinearRgba {
        self.clear_color
    }

    /// The last viewport set.
    pub fn viewport(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }
}

impl RenderTarget for HeadlessTarget {
    fn set_clear_color(&mut self, color: LinearRgba) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        self.counters.clears.fetch_add(1, Ordering::Relaxed);
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        log::debug!("Viewport set to {width}x{height} at ({x}, {y}).");
        self.viewport = (x, y, width, height);
    }
}

/// A [`BackgroundSurface`] that allocates texture ids but draws nothing.
#[derive(Debug)]
pub struct HeadlessBackground {
    counters: Arc<HeadlessCounters>,
    texture: Option<TextureId>,
}

impl HeadlessBackground {
    /// Creates a background reporting into `counters`.
    pub fn new(counters: Arc<HeadlessCounters>) -> Self {
        Self {
            counters,
            texture: None,
        }
    }
}

impl BackgroundSurface for HeadlessBackground {
    fn create_texture(&mut self) -> Result<TextureId, RenderError> {
        let texture = TextureId(NEXT_TEXTURE.fetch_add(1, Ordering::Relaxed));
        self.texture = Some(texture);
        Ok(texture)
    }

    fn texture_id(&self) -> Option<TextureId> {
        self.texture
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError> {
        if self.texture.is_none() {
            return Err(RenderError::NotInitialized);
        }
        log::trace!("Background for frame at {} ns.", frame.timestamp_ns);
        self.counters.backgrounds.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// An [`AnchorRenderer`] that packs uniforms and discards them.
#[derive(Debug)]
pub struct HeadlessAnchorRenderer {
    counters: Arc<HeadlessCounters>,
    ready: bool,
}

impl HeadlessAnchorRenderer {
    /// Creates a renderer reporting into `counters`.
    pub fn new(counters: Arc<HeadlessCounters>) -> Self {
        Self {
            counters,
            ready: false,
        }
    }
}

impl AnchorRenderer for HeadlessAnchorRenderer {
    fn on_surface_created(&mut self) -> Result<(), RenderError> {
        self.ready = true;
        Ok(())
    }

    fn draw_anchor(&mut self, draw: &AnchorDraw) -> Result<(), RenderError> {
        if !self.ready {
            return Err(RenderError::NotInitialized);
        }
        let uniforms = AnchorUniforms::from(draw);
        let bytes = bytemuck::bytes_of(&uniforms);
        if uniforms.model.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::DrawFailed("non-finite model matrix".to_string()));
        }
        log::trace!(
            "Anchor at ({:.2}, {:.2}, {:.2}), {} uniform bytes.",
            uniforms.model[12],
            uniforms.model[13],
            uniforms.model[14],
            bytes.len()
        );
        self.counters.anchors.fetch_add(1, Ordering::Relaxed);
        self.counters
            .uniform_bytes
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}
