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

//! # Anchora Agents
//!
//! The moving parts of an AR application: the session lifecycle manager run by
//! the control thread, the viewport adapter, and the per-frame render loop run
//! by the render thread.

#![warn(missing_docs)]

pub mod render;
pub mod session;
pub mod viewport;

pub use render::{FrameRenderLoop, TickError, TickOutcome, ANCHOR_SCALE, FAR_CLIP, NEAR_CLIP};
pub use session::{
    EnsureOutcome, HostResume, LifecycleError, ManagedSession, SessionLifecycleManager,
    SessionState, SharedSession,
};
pub use viewport::{Geometry, ViewportAdapter};
