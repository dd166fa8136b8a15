//! Frame rate limiting
//!
//! Native only: relies on `std::time::Instant` and thread sleeps. In the
//! browser the page's animation frame already paces the loop.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How many recent frame times `average_fps` looks at
const HISTORY_LEN: usize = 120;

/// Sleep granularity is poor on some platforms; the last stretch before the
/// deadline is spun instead
const SPIN_MARGIN: Duration = Duration::from_millis(2);

/// Keeps a loop from running faster than a maximum rate.
///
/// This is a soft cap: frames that take longer than the period are not
/// compensated for.
pub struct FramerateLimiter {
    /// `None` when unlocked
    period: Option<Duration>,
    prev: Instant,
    times: VecDeque<Duration>,
}

impl FramerateLimiter {
    /// `None` or `Some(0)` disables the cap but still tracks frame times
    pub fn new(max_fps: Option<u32>) -> Self {
        let period = max_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64));
        Self {
            period,
            prev: Instant::now(),
            times: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Finish a frame: record how long it took since the previous tick and
    /// sleep out whatever is left of the period. Returns the frame time
    /// before sleeping.
    pub fn tick(&mut self) -> Duration {
        let elapsed = self.prev.elapsed();
        if self.times.len() == HISTORY_LEN {
            self.times.pop_front();
        }
        self.times.push_back(elapsed);

        if let Some(period) = self.period {
            let deadline = self.prev + period;
            while Instant::now() + SPIN_MARGIN < deadline {
                std::thread::sleep(Duration::from_millis(1));
            }
            while Instant::now() < deadline {
                std::hint::spin_loop();
            }
        }

        self.prev = Instant::now();
        elapsed
    }

    /// Restart the current period, e.g. after a long load
    pub fn reset(&mut self) {
        self.prev = Instant::now();
    }

    /// Average rate over the recent frame history
    pub fn average_fps(&self) -> Option<f32> {
        let total: Duration = self.times.iter().sum();
        if self.times.is_empty() || total.is_zero() {
            return None;
        }
        Some(self.times.len() as f32 / total.as_secs_f32())
    }
}
