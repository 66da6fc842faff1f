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

//! Defines the error type for the rendering collaborators.

use std::fmt;

/// An error raised by a GPU-side collaborator (background, anchors, overlays).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// An operation was attempted before `on_surface_created` set the collaborator up.
    NotInitialized,
    /// A GPU resource (texture, shader, buffer) or asset could not be created.
    ResourceCreationFailed(String),
    /// Submitting a draw call failed.
    DrawFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => {
                write!(f, "The rendering collaborator is not initialized.")
            }
            RenderError::ResourceCreationFailed(msg) => {
                write!(f, "Failed to create a rendering resource: {msg}")
            }
            RenderError::DrawFailed(msg) => write!(f, "Draw call failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}
