//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without a physical device.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockIndicator`] | [`IndicatorDriver`] | Records a timestamped trace of writes |
//! | [`MockBattery`] | [`BatteryGauge`] | Adjustable state of charge |
//! | [`MockLink`] | [`LinkMonitor`] | Adjustable wireless link presence |
//! | [`MockDelay`] | [`Delay`] | Records delays without sleeping |
//!
//! The indicator trace and the battery/link mocks use shared interior state,
//! so a test keeps observing and steering them after the driver has moved
//! onto the animation worker thread.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use indicator_leds::hal::{MockBattery, MockIndicator};
//! use indicator_leds::traits::{BatteryGauge, IndicatorDriver};
//!
//! let mut driver = MockIndicator::new();
//! let trace = driver.trace();
//! driver.set_brightness(1, 30).unwrap();
//! assert_eq!(trace.levels_for(1), vec![30]);
//!
//! let battery = Arc::new(MockBattery::new(80));
//! battery.set_level(12);
//! assert_eq!(battery.state_of_charge(), 12);
//! ```
//!
//! [`IndicatorDriver`]: crate::traits::IndicatorDriver
//! [`BatteryGauge`]: crate::traits::BatteryGauge
//! [`LinkMonitor`]: crate::traits::LinkMonitor
//! [`Delay`]: crate::traits::Delay

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::traits::{BatteryGauge, Delay, IndicatorDriver, LinkMonitor};

// ============================================================================
// Indicator Mock
// ============================================================================

/// One recorded hardware write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightWrite {
    /// Light index.
    pub index: usize,
    /// Brightness written (0 for `off`).
    pub percent: u8,
    /// True if written through [`IndicatorDriver::off`].
    pub off: bool,
    /// When the write happened.
    pub at: Instant,
}

/// Shared, cloneable handle to a [`MockIndicator`]'s write log.
#[derive(Clone, Debug, Default)]
pub struct IndicatorTrace {
    writes: Arc<Mutex<Vec<LightWrite>>>,
}

impl IndicatorTrace {
    /// Snapshot of every write so far, oldest first.
    pub fn writes(&self) -> Vec<LightWrite> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of writes recorded.
    pub fn len(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all recorded writes.
    pub fn clear(&self) {
        self.writes.lock().unwrap().clear();
    }

    /// Levels written to one light, oldest first.
    pub fn levels_for(&self, index: usize) -> Vec<u8> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.index == index)
            .map(|w| w.percent)
            .collect()
    }

    /// Number of `off` calls recorded.
    pub fn offs(&self) -> usize {
        self.writes.lock().unwrap().iter().filter(|w| w.off).count()
    }

    fn record(&self, index: usize, percent: u8, off: bool) {
        self.writes.lock().unwrap().push(LightWrite {
            index,
            percent,
            off,
            at: Instant::now(),
        });
    }
}

/// Mock indicator driver for testing.
///
/// Records every successful write into an [`IndicatorTrace`]. A light can be
/// configured to fail so tests can exercise hardware-error paths.
///
/// # Example
///
/// ```rust
/// use indicator_leds::hal::MockIndicator;
/// use indicator_leds::traits::IndicatorDriver;
///
/// let mut driver = MockIndicator::new().failing_light(2);
/// assert!(driver.set_brightness(0, 50).is_ok());
/// assert!(driver.set_brightness(2, 50).is_err());
///
/// // Failed writes never reach the trace
/// assert_eq!(driver.trace().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockIndicator {
    trace: IndicatorTrace,
    failing: Option<usize>,
}

impl MockIndicator {
    /// Creates a new mock driver with an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to light `index` fail.
    pub fn failing_light(mut self, index: usize) -> Self {
        self.failing = Some(index);
        self
    }

    /// Shared handle to the write log.
    pub fn trace(&self) -> IndicatorTrace {
        self.trace.clone()
    }
}

impl IndicatorDriver for MockIndicator {
    type Error = ();

    fn set_brightness(&mut self, index: usize, percent: u8) -> Result<(), ()> {
        if self.failing == Some(index) {
            return Err(());
        }
        self.trace.record(index, percent, false);
        Ok(())
    }

    fn off(&mut self, index: usize) -> Result<(), ()> {
        if self.failing == Some(index) {
            return Err(());
        }
        self.trace.record(index, 0, true);
        Ok(())
    }
}

// ============================================================================
// Status Source Mocks
// ============================================================================

/// Mock battery gauge with an adjustable level.
#[derive(Debug)]
pub struct MockBattery {
    level: AtomicU8,
    samples: AtomicU32,
}

impl MockBattery {
    /// Creates a battery reporting `level` percent.
    pub fn new(level: u8) -> Self {
        Self {
            level: AtomicU8::new(level),
            samples: AtomicU32::new(0),
        }
    }

    /// Change the reported level.
    pub fn set_level(&self, level: u8) {
        self.level.store(level, Ordering::SeqCst);
    }

    /// Number of times the level has been sampled.
    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::SeqCst)
    }
}

impl Default for MockBattery {
    fn default() -> Self {
        Self::new(100)
    }
}

impl BatteryGauge for MockBattery {
    fn state_of_charge(&self) -> u8 {
        self.samples.fetch_add(1, Ordering::SeqCst);
        self.level.load(Ordering::SeqCst)
    }
}

/// Mock wireless link with adjustable presence.
#[derive(Debug, Default)]
pub struct MockLink {
    connected: AtomicBool,
}

impl MockLink {
    /// Creates a link in the given state.
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    /// Change the reported link state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl LinkMonitor for MockLink {
    fn is_wireless_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Delay Mock
// ============================================================================

/// Mock delay that records requested time without sleeping.
///
/// Clones share their counters, so a test can keep one handle while the
/// animation worker owns another.
///
/// # Example
///
/// ```rust
/// use indicator_leds::hal::MockDelay;
/// use indicator_leds::traits::Delay;
///
/// let mut delay = MockDelay::new();
/// let observer = delay.clone();
///
/// delay.delay_ms(4);
/// delay.delay_ms(6);
///
/// assert_eq!(observer.total_ms(), 10);
/// assert_eq!(observer.calls(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockDelay {
    total_ms: Arc<AtomicU64>,
    calls: Arc<AtomicU64>,
}

impl MockDelay {
    /// Creates a delay with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ms.load(Ordering::SeqCst)
    }

    /// Number of `delay_ms` calls.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.total_ms.fetch_add(u64::from(ms), Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // MockIndicator Tests
    // =========================================================================

    #[test]
    fn mock_indicator_default() {
        let driver = MockIndicator::new();
        assert!(driver.trace().is_empty());
    }

    #[test]
    fn mock_indicator_records_writes_in_order() {
        let mut driver = MockIndicator::new();
        driver.set_brightness(0, 10).unwrap();
        driver.set_brightness(1, 20).unwrap();
        driver.set_brightness(0, 30).unwrap();

        let writes = driver.trace().writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[2].index, 0);
        assert_eq!(writes[2].percent, 30);
        assert!(writes[0].at <= writes[2].at);
        assert_eq!(driver.trace().levels_for(0), vec![10, 30]);
    }

    #[test]
    fn mock_indicator_off_recorded() {
        let mut driver = MockIndicator::new();
        driver.off(3).unwrap();

        let writes = driver.trace().writes();
        assert!(writes[0].off);
        assert_eq!(writes[0].percent, 0);
        assert_eq!(driver.trace().offs(), 1);
    }

    #[test]
    fn mock_indicator_trace_shared_between_handles() {
        let mut driver = MockIndicator::new();
        let trace = driver.trace();
        driver.set_brightness(2, 99).unwrap();
        assert_eq!(trace.len(), 1);

        trace.clear();
        assert!(driver.trace().is_empty());
    }

    #[test]
    fn mock_indicator_failing_light() {
        let mut driver = MockIndicator::new().failing_light(1);
        assert!(driver.set_brightness(1, 5).is_err());
        assert!(driver.off(1).is_err());
        assert!(driver.trace().is_empty());
    }

    // =========================================================================
    // MockBattery / MockLink Tests
    // =========================================================================

    #[test]
    fn mock_battery_counts_samples() {
        let battery = MockBattery::new(55);
        assert_eq!(battery.samples(), 0);
        assert_eq!(battery.state_of_charge(), 55);
        battery.set_level(20);
        assert_eq!(battery.state_of_charge(), 20);
        assert_eq!(battery.samples(), 2);
    }

    #[test]
    fn mock_battery_default_full() {
        assert_eq!(MockBattery::default().state_of_charge(), 100);
    }

    #[test]
    fn mock_link_toggle() {
        let link = MockLink::default();
        assert!(!link.is_wireless_connected());
        link.set_connected(true);
        assert!(link.is_wireless_connected());
    }

    // =========================================================================
    // MockDelay Tests
    // =========================================================================

    #[test]
    fn mock_delay_clones_share_counters() {
        let mut delay = MockDelay::new();
        let observer = delay.clone();
        delay.delay_ms(0);
        delay.delay_ms(3);
        assert_eq!(observer.calls(), 2);
        assert_eq!(observer.total_ms(), 3);
    }
}
