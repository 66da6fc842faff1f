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

//! Contracts for the GPU-side collaborators of the render loop.
//!
//! The render loop never talks to a graphics API directly. It clears a
//! [`RenderTarget`], asks a [`BackgroundSurface`] to draw the camera image, and
//! hands matrices to an [`AnchorRenderer`]. Shaders, meshes and textures are
//! the collaborators' business.

mod error;

pub use error::RenderError;

use crate::math::{LinearRgba, Mat4};
use crate::tracking::Frame;
use bytemuck::{Pod, Zeroable};

/// Backend handle of a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Camera matrices and lighting shared by every draw of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    /// World-to-camera transform.
    pub view: Mat4,
    /// Camera-to-clip transform.
    pub projection: Mat4,
    /// RGB scale factors and average intensity from the light estimate.
    pub color_correction: [f32; 4],
}

/// Everything needed to draw the virtual object attached to one anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorDraw {
    /// Matrices and lighting of the current tick.
    pub scene: SceneView,
    /// Anchor-to-world transform.
    pub model: Mat4,
    /// Tint of the anchored object.
    pub color: LinearRgba,
}

/// GPU layout of an [`AnchorDraw`], ready for a uniform buffer upload.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct AnchorUniforms {
    /// Model matrix, column-major.
    pub model: [f32; 16],
    /// View matrix, column-major.
    pub view: [f32; 16],
    /// Projection matrix, column-major.
    pub projection: [f32; 16],
    /// Light-estimate color correction.
    pub color_correction: [f32; 4],
    /// Object tint.
    pub color: [f32; 4],
}

impl From<&AnchorDraw> for AnchorUniforms {
    fn from(draw: &AnchorDraw) -> Self {
        Self {
            model: draw.model.to_cols_array(),
            view: draw.scene.view.to_cols_array(),
            projection: draw.scene.projection.to_cols_array(),
            color_correction: draw.scene.color_correction,
            color: draw.color.to_array(),
        }
    }
}

/// The color/depth target the render loop draws into.
pub trait RenderTarget: Send {
    /// Sets the color used by [`RenderTarget::clear`].
    fn set_clear_color(&mut self, color: LinearRgba);

    /// Clears color and depth so the driver does not load the previous frame.
    fn clear(&mut self);

    /// Sets the viewport rectangle in pixels.
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
}

/// Supplies the texture the engine writes the camera image into, and draws it.
pub trait BackgroundSurface: Send {
    /// Creates the external texture. Called on the render thread once the GPU
    /// context exists.
    fn create_texture(&mut self) -> Result<TextureId, RenderError>;

    /// Returns the texture created by [`BackgroundSurface::create_texture`], if any.
    fn texture_id(&self) -> Option<TextureId>;

    /// Draws the camera image bound to `frame` as a full-screen background.
    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

/// Draws the virtual content attached to one anchor.
pub trait AnchorRenderer: Send {
    /// Prepares meshes and shaders. Called from `on_surface_created`.
    fn on_surface_created(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Issues the draw calls for one anchor.
    fn draw_anchor(&mut self, draw: &AnchorDraw) -> Result<(), RenderError>;
}

/// Optional visualization drawn between the background and the anchors
/// (detected planes, feature point clouds, ...).
pub trait SceneOverlay: Send {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Prepares GPU resources. Called from `on_surface_created`.
    fn on_surface_created(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Draws the overlay for a tracking frame.
    fn draw(&mut self, frame: &Frame, scene: &SceneView) -> Result<(), RenderError>;
}

/// The callbacks a rendering surface drives on its render thread.
pub trait SurfaceRenderer: Send {
    /// The GPU context was (re)created.
    fn on_surface_created(&mut self);

    /// The surface was resized or rotated.
    fn on_surface_changed(&mut self, width: u32, height: u32);

    /// Draws one frame.
    fn on_draw_frame(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn uniforms_keep_column_major_layout() {
        let draw = AnchorDraw {
            scene: SceneView {
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
                color_correction: [1.0, 0.9, 0.8, 0.5],
            },
            model: Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)),
            color: LinearRgba::RED,
        };
        let uniforms = AnchorUniforms::from(&draw);
        assert_eq!(&uniforms.model[12..15], &[4.0, 5.0, 6.0]);
        assert_eq!(uniforms.color, [1.0, 0.0, 0.0, 1.0]);

        let bytes: &[u8] = bytemuck::bytes_of(&uniforms);
        assert_eq!(bytes.len(), (16 * 3 + 8) * 4);
    }
}
