//! Time management utilities
//!
//! The engine only ever looks at differences between two consecutive clock
//! reads, so any monotonic source with an arbitrary origin will do.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Monotonic time source consumed by the frame loop
pub trait Clock: Send {
    /// Current time in nanoseconds since an arbitrary origin
    fn now_nanos(&self) -> i64;
}

/// Clock backed by [`std::time::Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

/// Clock that only moves when told to
///
/// Clones share the same underlying time, so a test can keep one copy and
/// hand the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let nanos = i64::try_from(by.as_nanos()).unwrap_or(i64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Move time forward by a number of seconds
    pub fn advance_secs(&self, seconds: f32) {
        self.advance(Duration::from_secs_f32(seconds));
    }

    /// Jump to an absolute reading
    pub fn set_nanos(&self, nanos: i64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

/// High-precision timer for frame timing
pub struct FrameTimer {
    clock: Box<dyn Clock>,
    last_frame: Option<i64>,
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
}

impl FrameTimer {
    /// Create a timer reading from the given clock
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            last_frame: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Take the current reading as the reference point for the next delta
    pub fn reset(&mut self) {
        self.last_frame = Some(self.clock.now_nanos());
    }

    /// Update the timer (should be called once per frame) and return the
    /// seconds elapsed since the previous tick.
    ///
    /// The first tick after construction reports zero.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn tick(&mut self) -> f32 {
        let now = self.clock.now_nanos();
        let elapsed = self.last_frame.map_or(0, |last| now.saturating_sub(last).max(0));
        self.last_frame = Some(now);

        let seconds = elapsed as f64 / NANOS_PER_SECOND;
        self.delta_time = seconds as f32;
        self.total_time += seconds;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total time accumulated across ticks
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since the first tick
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f64 {
        if self.total_time > 0.0 {
            self.frame_count as f64 / self.total_time
        } else {
            0.0
        }
    }
}
