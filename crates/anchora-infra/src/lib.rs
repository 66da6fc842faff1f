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

//! # Anchora Infra
//!
//! Concrete implementations of the contracts defined in `anchora-core`: a
//! simulated tracking engine that runs without a camera, headless rendering
//! collaborators, and a log-backed status notifier.

#![warn(missing_docs)]

pub mod graphics;
pub mod platform;
pub mod tracking;

pub use graphics::{HeadlessAnchorRenderer, HeadlessBackground, HeadlessCounters, HeadlessTarget};
pub use platform::LogNotifier;
pub use tracking::{CameraSwitch, SimulatedEngine, SimulatedEngineConfig};
