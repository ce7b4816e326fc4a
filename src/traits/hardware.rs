//! Hardware abstraction traits for indicator lights, battery and link status.
//!
//! This module defines the hardware interfaces that allow indicator-leds to
//! work across different platforms (keyboard firmware, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`IndicatorDriver`] | PWM/LED-driver brightness output per light |
//! | [`BatteryGauge`] | State-of-charge query |
//! | [`LinkMonitor`] | Wireless link presence query |
//! | [`Delay`] | Blocking delay used by the animation worker |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`] and [`crate::hal::host::StdDelay`].
//!
//! # Example
//!
//! ```rust
//! use indicator_leds::traits::IndicatorDriver;
//! use indicator_leds::hal::MockIndicator;
//!
//! let mut driver = MockIndicator::new();
//! driver.set_brightness(0, 40).unwrap();
//! driver.off(0).unwrap();
//!
//! assert_eq!(driver.trace().len(), 2);
//! ```

use alloc::sync::Arc;

/// Output trait for a bank of dimmable indicator lights.
///
/// Implement this trait for your LED driver hardware. Brightness is
/// expressed as an integer percentage.
///
/// # Implementation Notes
///
/// - `percent` is always within `0..=100` when called from [`LightBank`]
/// - Failures are logged by the caller and never retried
///
/// # Example Implementation
///
/// ```rust,ignore
/// use indicator_leds::traits::IndicatorDriver;
///
/// struct PwmLeds { /* channel handles */ }
///
/// impl IndicatorDriver for PwmLeds {
///     type Error = ();
///
///     fn set_brightness(&mut self, index: usize, percent: u8) -> Result<(), ()> {
///         let duty = u32::from(percent) * MAX_DUTY / 100;
///         // Set PWM duty on channel `index`...
///         Ok(())
///     }
/// }
/// ```
///
/// [`LightBank`]: crate::LightBank
pub trait IndicatorDriver {
    /// Error type for driver operations.
    type Error: core::fmt::Debug;

    /// Set the brightness of light `index` as a percentage (0-100).
    fn set_brightness(&mut self, index: usize, percent: u8) -> Result<(), Self::Error>;

    /// Switch light `index` fully off.
    ///
    /// Defaults to writing zero brightness. Override when the driver has a
    /// dedicated disable path.
    fn off(&mut self, index: usize) -> Result<(), Self::Error> {
        self.set_brightness(index, 0)
    }
}

/// Battery state-of-charge source.
///
/// Sampled on demand; implementations should not cache across calls.
pub trait BatteryGauge {
    /// Returns the battery charge as a percentage (0-100).
    fn state_of_charge(&self) -> u8;
}

/// Wireless link presence query.
pub trait LinkMonitor {
    /// Returns true if the active wireless profile has a connected host.
    fn is_wireless_connected(&self) -> bool;
}

/// Blocking delay used between animation steps.
///
/// The animation worker owns its delay and blocks on it for the full
/// duration of a fade. Never call this from a trigger context.
pub trait Delay {
    /// Block the calling thread for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: BatteryGauge + ?Sized> BatteryGauge for Arc<T> {
    fn state_of_charge(&self) -> u8 {
        (**self).state_of_charge()
    }
}

impl<T: LinkMonitor + ?Sized> LinkMonitor for Arc<T> {
    fn is_wireless_connected(&self) -> bool {
        (**self).is_wireless_connected()
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
