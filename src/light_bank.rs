//! Brightness bookkeeping for the indicator lights.
//!
//! [`LightBank`] owns the hardware driver and the last brightness written to
//! each light. Fades read the recorded values back instead of querying the
//! hardware, so the bank is the single source of truth for animation state.
//!
//! # Example
//!
//! ```rust
//! use indicator_leds::{LightBank, hal::MockIndicator};
//!
//! let mut bank: LightBank<_, 4> = LightBank::new(MockIndicator::new());
//!
//! bank.set_brightness(1, 60).unwrap();
//! assert_eq!(bank.brightness(1), Some(60));
//!
//! // Values above 100% are clamped
//! bank.set_brightness(2, 250).unwrap();
//! assert_eq!(bank.brightness(2), Some(100));
//!
//! // Out-of-range lights are rejected instead of indexing past the array
//! assert!(bank.set_brightness(4, 10).is_err());
//! assert_eq!(bank.brightness(4), None);
//! ```

use core::fmt;

use log::warn;

use crate::traits::IndicatorDriver;

/// Full brightness, as a percentage.
pub const FULL_BRIGHTNESS: u8 = 100;

/// Lights off.
pub const OFF: u8 = 0;

/// Error returned by bounds-checked light access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightError {
    /// The requested light does not exist on this bank.
    OutOfRange {
        /// Requested light index.
        index: usize,
        /// Number of lights on the bank.
        count: usize,
    },
}

impl fmt::Display for LightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightError::OutOfRange { index, count } => {
                write!(f, "light {} out of range (bank has {} lights)", index, count)
            }
        }
    }
}

/// Fixed-size bank of `N` dimmable lights.
///
/// # Type Parameters
///
/// - `D`: The hardware driver ([`IndicatorDriver`] trait)
/// - `N`: Number of lights, fixed at compile time
///
/// # Hardware Failures
///
/// A failed hardware write is logged and counted but not surfaced: the
/// recorded brightness is updated regardless so the animation proceeds
/// logically.
pub struct LightBank<D: IndicatorDriver, const N: usize> {
    driver: D,
    levels: [u8; N],
    hardware_failures: u32,
}

impl<D: IndicatorDriver, const N: usize> LightBank<D, N> {
    /// Number of lights on this bank.
    pub const COUNT: usize = N;

    /// Create a bank with every light recorded as off.
    ///
    /// The hardware is not touched; call [`all_off`](Self::all_off) at startup.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            levels: [OFF; N],
            hardware_failures: 0,
        }
    }

    /// Number of lights on this bank.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns true if the bank has no lights.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Set a light's brightness, clamped to `0..=100`.
    pub fn set_brightness(&mut self, index: usize, percent: u8) -> Result<(), LightError> {
        if index >= N {
            return Err(LightError::OutOfRange { index, count: N });
        }

        let percent = percent.min(FULL_BRIGHTNESS);
        if let Err(e) = self.driver.set_brightness(index, percent) {
            self.hardware_failures = self.hardware_failures.saturating_add(1);
            warn!("light {}: hardware write of {}% failed: {:?}", index, percent, e);
        }
        self.levels[index] = percent;
        Ok(())
    }

    /// Last recorded brightness of a light. Never queries the hardware.
    #[inline]
    pub fn brightness(&self, index: usize) -> Option<u8> {
        self.levels.get(index).copied()
    }

    /// Recorded brightness of every light.
    #[inline]
    pub fn levels(&self) -> &[u8; N] {
        &self.levels
    }

    /// Switch every light off in hardware and record zero brightness.
    ///
    /// Used at startup/reset only: it jumps straight to off rather than
    /// stepping the brightness down.
    pub fn all_off(&mut self) {
        for index in 0..N {
            if let Err(e) = self.driver.off(index) {
                self.hardware_failures = self.hardware_failures.saturating_add(1);
                warn!("light {}: hardware off failed: {:?}", index, e);
            }
        }
        self.levels = [OFF; N];
    }

    /// Number of hardware writes that failed since creation.
    #[inline]
    pub fn hardware_failures(&self) -> u32 {
        self.hardware_failures
    }

    /// Get a reference to the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
