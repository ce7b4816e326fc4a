//! Indicator configuration.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`. Defaults reproduce the stock
//! firmware timings.
//!
//! # Example
//!
//! ```rust
//! use indicator_leds::config::{AnimationTimings, Config, IndicatorConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.timings.recheck_interval_ms, 4000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_timings(AnimationTimings::default().with_profile_fade_ms(600))
//!     .with_indicator(IndicatorConfig::default().with_show_battery_on_startup(false));
//! ```

use core::fmt;
use core::time::Duration;

use heapless::String as HString;

/// Maximum length of the indicator name.
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings.
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating if too long.
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Shortest fade duration that still steps visibly (one unit per step).
pub const MIN_SMOOTH_FADE_MS: u32 = 100;

// ============================================================================
// Errors
// ============================================================================

/// Error loading or validating a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for this configuration.
    InvalidJson,
    /// The watchdog re-check interval is zero.
    ZeroRecheckInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidJson => write!(f, "invalid configuration JSON"),
            ConfigError::ZeroRecheckInterval => {
                write!(f, "recheck_interval_ms must be greater than zero")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ============================================================================
// Main Config
// ============================================================================

/// Complete indicator configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Animation durations and intervals.
    pub timings: AnimationTimings,
    /// Behaviour switches.
    pub indicator: IndicatorConfig,
}

impl Config {
    /// Set the animation timings
    pub fn with_timings(mut self, timings: AnimationTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Set the indicator options
    pub fn with_indicator(mut self, indicator: IndicatorConfig) -> Self {
        self.indicator = indicator;
        self
    }

    /// Check the configuration can drive the controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timings.recheck_interval_ms == 0 {
            return Err(ConfigError::ZeroRecheckInterval);
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take their
    /// default values.
    ///
    /// # Example
    ///
    /// ```
    /// use indicator_leds::config::Config;
    ///
    /// let json = br#"{"timings": {"battery_fade_ms": 1200}, "indicator": {"name": "left half"}}"#;
    /// let config = Config::from_json(json).unwrap();
    /// assert_eq!(config.timings.battery_fade_ms, 1200);
    /// assert_eq!(config.timings.profile_fade_ms, 400);
    /// assert_eq!(config.indicator.name.as_str(), "left half");
    /// ```
    #[cfg(feature = "serde-json-core")]
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let (config, _): (Config, _) =
            serde_json_core::from_slice(json).map_err(|_| ConfigError::InvalidJson)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Animation Timings
// ============================================================================

/// Fade durations and intervals, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimationTimings {
    /// Profile selection pulse
    pub profile_fade_ms: u32,
    /// Battery level pulse
    pub battery_fade_ms: u32,
    /// Per-light fade of the wired-connection sequence
    pub wired_fade_ms: u32,
    /// Watchdog "disconnected" pulse and the suspend fade-out
    pub disconnect_fade_ms: u32,
    /// Hold at full and at zero brightness between fades
    pub hold_ms: u32,
    /// Reconnection watchdog re-check interval
    pub recheck_interval_ms: u32,
    /// Delay before the startup battery indication
    pub startup_delay_ms: u32,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            profile_fade_ms: 400,
            battery_fade_ms: 800,
            wired_fade_ms: 400,
            disconnect_fade_ms: 300,
            hold_ms: 100,
            recheck_interval_ms: 4000,
            startup_delay_ms: 1000,
        }
    }
}

impl AnimationTimings {
    /// Set the profile pulse duration
    pub fn with_profile_fade_ms(mut self, ms: u32) -> Self {
        self.profile_fade_ms = ms;
        self
    }

    /// Set the battery pulse duration
    pub fn with_battery_fade_ms(mut self, ms: u32) -> Self {
        self.battery_fade_ms = ms;
        self
    }

    /// Set the wired sequence fade duration
    pub fn with_wired_fade_ms(mut self, ms: u32) -> Self {
        self.wired_fade_ms = ms;
        self
    }

    /// Set the disconnect pulse duration
    pub fn with_disconnect_fade_ms(mut self, ms: u32) -> Self {
        self.disconnect_fade_ms = ms;
        self
    }

    /// Set the hold time
    pub fn with_hold_ms(mut self, ms: u32) -> Self {
        self.hold_ms = ms;
        self
    }

    /// Set the watchdog re-check interval
    pub fn with_recheck_interval_ms(mut self, ms: u32) -> Self {
        self.recheck_interval_ms = ms;
        self
    }

    /// Set the startup battery delay
    pub fn with_startup_delay_ms(mut self, ms: u32) -> Self {
        self.startup_delay_ms = ms;
        self
    }

    /// Returns true if every fade is long enough to step visibly.
    ///
    /// Shorter fades still run, but every step has zero delay.
    pub fn is_smooth(&self) -> bool {
        [
            self.profile_fade_ms,
            self.battery_fade_ms,
            self.wired_fade_ms,
            self.disconnect_fade_ms,
        ]
        .iter()
        .all(|&ms| ms >= MIN_SMOOTH_FADE_MS)
    }

    /// Watchdog re-check interval as a [`Duration`].
    #[inline]
    pub fn recheck_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.recheck_interval_ms))
    }

    /// Startup battery delay as a [`Duration`].
    #[inline]
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.startup_delay_ms))
    }
}

// ============================================================================
// Indicator Options
// ============================================================================

/// Behaviour switches.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndicatorConfig {
    /// Name used in log output
    pub name: ShortString,
    /// Show the battery level once after startup
    pub show_battery_on_startup: bool,
    /// Fade every light out when the wired host suspends
    pub fade_out_on_suspend: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            name: short_string("status"),
            show_battery_on_startup: true,
            fade_out_on_suspend: true,
        }
    }
}

impl IndicatorConfig {
    /// Set the name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Enable or disable the startup battery indication
    pub fn with_show_battery_on_startup(mut self, enabled: bool) -> Self {
        self.show_battery_on_startup = enabled;
        self
    }

    /// Enable or disable the suspend fade-out
    pub fn with_fade_out_on_suspend(mut self, enabled: bool) -> Self {
        self.fade_out_on_suspend = enabled;
        self
    }
}
