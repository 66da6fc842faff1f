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

//! Counters describing what the render loop did, tick by tick.

use std::time::{Duration, Instant};

/// Counts of tick outcomes over some period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickCounters {
    /// Total ticks.
    pub ticks: u64,
    /// Ticks that found no active session.
    pub idle: u64,
    /// Ticks that drew only the camera background.
    pub background_only: u64,
    /// Ticks that drew the background and the anchors.
    pub rendered: u64,
    /// Ticks whose body failed.
    pub failed: u64,
    /// Anchor draw calls issued.
    pub anchors_drawn: u64,
}

/// Render statistics with a periodic log summary.
#[derive(Debug)]
pub struct RenderStats {
    totals: TickCounters,
    window: TickCounters,
    window_start: Instant,
    interval: Duration,
}

impl RenderStats {
    /// Creates statistics that summarize every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            totals: TickCounters::default(),
            window: TickCounters::default(),
            window_start: Instant::now(),
            interval,
        }
    }

    fn bump(&mut self, f: impl Fn(&mut TickCounters)) {
        f(&mut self.totals);
        f(&mut self.window);
    }

    /// Records a tick without an active session.
    pub fn record_idle(&mut self) {
        self.bump(|c| {
            c.ticks += 1;
            c.idle += 1;
        });
    }

    /// Records a tick that drew only the background.
    pub fn record_background_only(&mut self) {
        self.bump(|c| {
            c.ticks += 1;
            c.background_only += 1;
        });
    }

    /// Records a fully rendered tick.
    pub fn record_rendered(&mut self, anchors_drawn: usize) {
        self.bump(|c| {
            c.ticks += 1;
            c.rendered += 1;
            c.anchors_drawn += anchors_drawn as u64;
        });
    }

    /// Records a failed tick.
    pub fn record_failure(&mut self) {
        self.bump(|c| {
            c.ticks += 1;
            c.failed += 1;
        });
    }

    /// Counters since creation.
    pub fn totals(&self) -> TickCounters {
        self.totals
    }

    /// Should be called once per tick. Logs a summary and starts a new window
    /// when the interval has elapsed; returns whether it did.
    pub fn tick(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed < self.interval {
            return false;
        }
        let w = self.window;
        let fps = w.ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        log::info!(
            "Render: {:.1} ticks/s, rendered={} background_only={} idle={} failed={} anchors_drawn={}",
            fps,
            w.rendered,
            w.background_only,
            w.idle,
            w.failed,
            w.anchors_drawn
        );
        self.window = TickCounters::default();
        self.window_start = Instant::now();
        true
    }
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
