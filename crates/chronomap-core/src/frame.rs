//! Frame source for animations.
//!
//! Every suspension point in the viewer is an await on the next display
//! frame. The [`FrameClock`] trait abstracts the frame source so that the
//! animator and sequencer run the same way against a browser frame
//! callback, a fixed-interval timer, or the paused tokio clock in tests.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// A source of display frames.
pub trait FrameClock {
    /// Wait for the next frame and return the clock time at that frame.
    fn next_frame(&self) -> impl Future<Output = Duration>;

    /// Current clock time, measured from an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// A frame clock that ticks every fixed interval using `tokio::time`.
///
/// Under `#[tokio::test(start_paused = true)]` the clock auto-advances,
/// which makes animation tests deterministic.
#[derive(Debug, Clone, Copy)]
pub struct IntervalFrameClock {
    /// Origin of [`FrameClock::now`].
    origin: Instant,
    /// Time between frames.
    interval: Duration,
}

impl IntervalFrameClock {
    /// Create a clock yielding a frame every `interval`.
    ///
    /// Zero intervals are raised to one millisecond so that a frame loop
    /// always yields to the runtime.
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Create a clock from a millisecond interval.
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Time between frames.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameClock for IntervalFrameClock {
    async fn next_frame(&self) -> Duration {
        tokio::time::sleep(self.interval).await;
        self.now()
    }

    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }
}
