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

//! # Anchora Telemetry
//!
//! Logging setup and render-loop statistics.

#![warn(missing_docs)]

pub mod stats;

pub use stats::{RenderStats, TickCounters};

/// Installs the `env_logger` backend for the `log` facade.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized.");
    }
}
