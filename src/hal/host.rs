//! Host (desktop) implementations backed by the standard library.

use std::thread;
use std::time::Duration;

use crate::traits::Delay;

/// Blocking delay that sleeps the calling thread.
///
/// This is what the animation worker uses on a desktop host: each fade step
/// parks the worker thread for the step delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl StdDelay {
    /// Creates a new sleeping delay.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(u64::from(ms)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn std_delay_sleeps_at_least_requested() {
        let mut delay = StdDelay::new();
        let start = Instant::now();
        delay.delay_ms(15);
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn std_delay_zero_returns_immediately() {
        let mut delay = StdDelay::new();
        let start = Instant::now();
        delay.delay_ms(0);
        assert!(start.elapsed() < Duration::from_millis(15));
    }
}
