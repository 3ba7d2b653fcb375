use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{
    config::Params,
    error::{PongError, PongResult},
};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A background thread calling `step` at most once per `interval`.
///
/// Each iteration checks the time since the last step; when a full interval
/// has passed it runs one step with that elapsed time and then sleeps for
/// whatever is left of the interval. Otherwise it yields the processor.
pub struct FixedRateLoop {
    name: &'static str,
    interval: Duration,
    join_timeout: Duration,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FixedRateLoop {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            join_timeout: Params::JOIN_TIMEOUT,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the loop thread. Returns `Ok(false)` without doing anything when
    /// the loop is already running.
    pub fn start<F>(&mut self, step: F) -> PongResult<bool>
    where
        F: FnMut(Duration) + Send + 'static,
    {
        if self.is_running() {
            debug!(name = self.name, "loop already running");
            return Ok(false);
        }
        // Reap a thread that ended on its own, e.g. after a panic in `step`.
        if let Some(finished) = self.handle.take() {
            if finished.join().is_err() {
                warn!(name = self.name, "previous loop thread had panicked");
            }
        }

        // Fresh flag per run, so a thread detached by a timed-out stop can
        // never be switched back on.
        let running = Arc::new(AtomicBool::new(true));
        let interval = self.interval;
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(self.name.to_string())
            .spawn(move || run(interval, &thread_running, step))
            .map_err(|source| PongError::Spawn {
                name: self.name,
                source,
            })?;

        self.running = running;
        self.handle = Some(handle);
        debug!(name = self.name, interval_us = interval.as_micros() as u64, "loop started");
        Ok(true)
    }

    /// Signal the loop to exit and wait up to the join timeout for it.
    ///
    /// Best effort: returns `false` when the thread did not finish in time, in
    /// which case it is detached and left to exit on its own. Stopping a loop
    /// that isn't running is a no-op returning `true`.
    pub fn stop(&mut self) -> bool {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + self.join_timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    name = self.name,
                    timeout_ms = self.join_timeout.as_millis() as u64,
                    "loop did not stop in time, detaching"
                );
                return false;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        if handle.join().is_err() {
            warn!(name = self.name, "loop thread panicked");
        }
        debug!(name = self.name, "loop stopped");
        true
    }
}

impl Drop for FixedRateLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<F>(interval: Duration, running: &AtomicBool, mut step: F)
where
    F: FnMut(Duration),
{
    let mut last_step = Instant::now();

    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        let elapsed = now.duration_since(last_step);

        if elapsed >= interval {
            step(elapsed);
            last_step = now;

            if let Some(remaining) = interval.checked_sub(now.elapsed()) {
                thread::sleep(remaining);
            }
        } else {
            thread::yield_now();
        }
    }
}

/// Frames counted over the last full second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Count a frame shown now and return the current rate.
    pub fn frame(&mut self) -> u32 {
        self.frame_at(Instant::now())
    }

    pub fn frame_at(&mut self, now: Instant) -> u32 {
        self.frames += 1;
        if now.duration_since(self.window_start) >= Duration::from_secs(1) {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = now;
        }
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
