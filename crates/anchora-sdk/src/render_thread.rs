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

//! The dedicated thread that owns the render loop.

use anchora_agents::{FrameRenderLoop, TickOutcome};
use anchora_core::platform::SurfaceLifecycle;
use anchora_core::renderer::SurfaceRenderer;
use anchora_core::SurfaceConfig;
use anchora_telemetry::TickCounters;
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long the thread waits for a command when a tick found no session.
const IDLE_BACKOFF: Duration = Duration::from_millis(16);

enum Command {
    SurfaceChanged(u32, u32),
    Resume,
    Pause(Sender<()>),
    RequestRender,
    Shutdown,
}

/// Runs a [`FrameRenderLoop`] on its own thread, the way a platform GL view
/// drives its renderer.
///
/// The thread calls `on_surface_created` once, then renders continuously (or
/// on request) while resumed. With a frame interval, consecutive ticks start
/// at least that far apart; without one, the engine's blocking `update()` is
/// the only throttle. Commands are handled between ticks, so
/// [`SurfaceLifecycle::on_pause`] returns only after the in-flight tick is done.
pub struct RenderThread {
    name: String,
    commands: Sender<Command>,
    handle: Mutex<Option<JoinHandle<()>>>,
    totals: Arc<Mutex<TickCounters>>,
}

impl RenderThread {
    /// Spawns the thread. It stays idle until resumed.
    pub fn spawn(
        name: &str,
        surface: SurfaceConfig,
        frame_interval: Option<Duration>,
        render_loop: FrameRenderLoop,
    ) -> Result<Self> {
        let (commands, receiver) = crossbeam_channel::unbounded();
        let totals = Arc::new(Mutex::new(TickCounters::default()));
        let published = Arc::clone(&totals);

        log::info!(
            "Render surface: R{}G{}B{}A{} depth {} stencil {}, {}.",
            surface.red_bits,
            surface.green_bits,
            surface.blue_bits,
            surface.alpha_bits,
            surface.depth_bits,
            surface.stencil_bits,
            if surface.continuous {
                "continuous"
            } else {
                "on demand"
            }
        );
        if let Some(interval) = frame_interval {
            log::info!("Render ticks paced to at most one every {interval:?}.");
        }

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(receiver, surface, frame_interval, render_loop, published))
            .with_context(|| format!("failed to spawn render thread '{name}'"))?;

        Ok(Self {
            name: name.to_string(),
            commands,
            handle: Mutex::new(Some(handle)),
            totals,
        })
    }

    /// Forwards a surface size change. Applied before the next tick.
    pub fn surface_changed(&self, width: u32, height: u32) {
        self.send(Command::SurfaceChanged(width, height));
    }

    /// Asks for one frame when rendering on demand.
    pub fn request_render(&self) {
        self.send(Command::RequestRender);
    }

    /// Tick counters published by the thread.
    pub fn totals(&self) -> TickCounters {
        *lock(&self.totals)
    }

    /// Whether the thread is still running.
    pub fn is_running(&self) -> bool {
        lock(&self.handle)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the thread and waits for it to exit. Later calls do nothing.
    pub fn shutdown(&self) {
        let Some(handle) = lock(&self.handle).take() else {
            return;
        };
        self.send(Command::Shutdown);
        if handle.join().is_err() {
            log::error!("Render thread '{}' panicked.", self.name);
        } else {
            log::info!("Render thread '{}' stopped.", self.name);
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::warn!("Render thread '{}' is gone; command dropped.", self.name);
        }
    }
}

impl SurfaceLifecycle for RenderThread {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_resume(&self) {
        self.send(Command::Resume);
    }

    fn on_pause(&self) {
        let (ack, acked) = crossbeam_channel::bounded(1);
        if self.commands.send(Command::Pause(ack)).is_err() {
            return;
        }
        // Blocks until the thread has finished its current tick.
        if acked.recv().is_err() {
            log::warn!("Render thread '{}' exited before pausing.", self.name);
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    commands: Receiver<Command>,
    surface: SurfaceConfig,
    frame_interval: Option<Duration>,
    mut render_loop: FrameRenderLoop,
    totals: Arc<Mutex<TickCounters>>,
) {
    log::info!("Render thread started.");
    render_loop.on_surface_created();

    let mut running = false;
    let mut was_paused = false;
    let mut render_requested = false;
    let mut idle = false;
    let mut next_tick: Option<Instant> = None;

    loop {
        let ticking = running && (surface.continuous || render_requested);
        let wait = if idle {
            Some(IDLE_BACKOFF)
        } else {
            next_tick
                .map(|at| at.saturating_duration_since(Instant::now()))
                .filter(|remaining| !remaining.is_zero())
        };
        let command = if !ticking {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        } else if let Some(wait) = wait {
            match commands.recv_timeout(wait) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(e) if e.is_empty() => None,
                Err(_) => break,
            }
        };

        match command {
            Some(Command::SurfaceChanged(width, height)) => {
                render_loop.on_surface_changed(width, height);
            }
            Some(Command::Resume) => {
                if was_paused && !surface.preserve_context_on_pause {
                    // The GPU context was lost while paused.
                    render_loop.on_surface_created();
                }
                running = true;
                idle = false;
            }
            Some(Command::Pause(ack)) => {
                running = false;
                was_paused = true;
                let _ = ack.send(());
            }
            Some(Command::RequestRender) => render_requested = true,
            Some(Command::Shutdown) => break,
            None => {
                let started = Instant::now();
                next_tick = frame_interval.map(|interval| started + interval);
                let outcome = render_loop.render_tick();
                render_requested = false;
                idle = outcome == TickOutcome::NoSession;
                *lock(&totals) = render_loop.stats().totals();
            }
        }
    }
    log::info!("Render thread exiting.");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
