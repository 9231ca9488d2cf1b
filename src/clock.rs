//! Time sources and fixed-rate tick scheduling

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time since the clock's own epoch
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// ============================================================================
// Tick scheduling
// ============================================================================

/// Most ticks a single `advance` will hand out; the rest of a long stall is dropped
pub const MAX_CATCH_UP_TICKS: u32 = 4;

/// Converts elapsed frame time into whole growth ticks at a fixed rate
#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    backlog: Duration,
    max_catch_up: u32,
}

impl TickScheduler {
    /// `hz` is clamped to at least 1
    pub fn new(hz: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / hz.max(1),
            backlog: Duration::ZERO,
            max_catch_up: MAX_CATCH_UP_TICKS,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Account for `elapsed` time and return how many ticks are due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.backlog += elapsed;
        let mut due = 0;
        while self.backlog >= self.period {
            self.backlog -= self.period;
            due += 1;
            if due == self.max_catch_up {
                // Stalled: forget the remaining debt instead of spiraling
                self.backlog = Duration::ZERO;
                break;
            }
        }
        due
    }

    /// Time until the next tick is due
    pub fn until_next(&self) -> Duration {
        self.period.saturating_sub(self.backlog)
    }
}

// ============================================================================
// FPS counter
// ============================================================================

/// Rolling FPS counter fed with timestamps
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    last_frame: Option<Duration>,
    sample_count: usize,
}

impl FpsCounter {
    /// Create a new FPS counter with specified sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: None,
            sample_count: sample_count.max(1),
        }
    }

    /// Record a frame at `now`.
    /// Returns (delta_time, average_fps)
    pub fn tick(&mut self, now: Duration) -> (f32, f32) {
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f32());
        self.last_frame = Some(now);

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        (dt, self.average_fps())
    }

    pub fn average_fps(&self) -> f32 {
        let avg_dt: f32 = self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }
}
