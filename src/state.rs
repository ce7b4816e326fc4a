//! Shared control state written by triggers and read by the animation worker.
//!
//! [`ControllerState`] holds the small pieces of device state the trigger
//! handlers track between events: the wired-connection state, the last
//! selected profile, and whether the reconnection watchdog is checking.
//! Triggers can run concurrently with each other and with the worker, so
//! every field is an atomic.
//!
//! Light brightness is not stored here: only the animation worker writes
//! it, through its own [`LightBank`](crate::LightBank).

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Last known state of the wired (USB) connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WiredConnectionState {
    /// No wired connection.
    #[default]
    None = 0,
    /// Wired host present and powered.
    Powered = 1,
    /// Wired host present but suspended (asleep).
    Suspended = 2,
}

impl WiredConnectionState {
    /// Returns the state as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            WiredConnectionState::None => "none",
            WiredConnectionState::Powered => "powered",
            WiredConnectionState::Suspended => "suspended",
        }
    }

    /// Parse a state from text (`none`/`off`, `powered`/`on`, `suspended`/`sleep`).
    ///
    /// Input is trimmed and case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use indicator_leds::WiredConnectionState;
    ///
    /// assert_eq!(WiredConnectionState::from_text("powered"), Some(WiredConnectionState::Powered));
    /// assert_eq!(WiredConnectionState::from_text(" ON "), Some(WiredConnectionState::Powered));
    /// assert_eq!(WiredConnectionState::from_text("sleep"), Some(WiredConnectionState::Suspended));
    /// assert_eq!(WiredConnectionState::from_text("off"), Some(WiredConnectionState::None));
    /// assert_eq!(WiredConnectionState::from_text("maybe"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("off") {
            Some(WiredConnectionState::None)
        } else if s.eq_ignore_ascii_case("powered") || s.eq_ignore_ascii_case("on") {
            Some(WiredConnectionState::Powered)
        } else if s.eq_ignore_ascii_case("suspended") || s.eq_ignore_ascii_case("sleep") {
            Some(WiredConnectionState::Suspended)
        } else {
            None
        }
    }

    /// Returns true if a wired host is attached (powered or suspended).
    #[inline]
    pub const fn is_present(&self) -> bool {
        !matches!(self, WiredConnectionState::None)
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => WiredConnectionState::Powered,
            2 => WiredConnectionState::Suspended,
            _ => WiredConnectionState::None,
        }
    }
}

/// Reconnection watchdog state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WatchdogState {
    /// Not watching the link.
    #[default]
    Idle,
    /// Periodically checking for a link and pulsing while none is present.
    Checking,
}

/// Control fields shared between trigger contexts and the animation worker.
///
/// # Example
///
/// ```rust
/// use indicator_leds::{ControllerState, WatchdogState, WiredConnectionState};
///
/// let state = ControllerState::new();
/// assert_eq!(state.watchdog(), WatchdogState::Idle);
///
/// // Only the first activation wins
/// assert!(state.begin_checking());
/// assert!(!state.begin_checking());
///
/// state.set_wired(WiredConnectionState::Powered);
/// assert_eq!(state.wired(), WiredConnectionState::Powered);
/// ```
#[derive(Debug, Default)]
pub struct ControllerState {
    checking: AtomicBool,
    wired: AtomicU8,
    profile: AtomicU8,
}

impl ControllerState {
    /// Create state with no wired connection, profile 0 and an idle watchdog.
    pub const fn new() -> Self {
        Self {
            checking: AtomicBool::new(false),
            wired: AtomicU8::new(WiredConnectionState::None as u8),
            profile: AtomicU8::new(0),
        }
    }

    /// Last recorded wired-connection state.
    pub fn wired(&self) -> WiredConnectionState {
        WiredConnectionState::from_u8(self.wired.load(Ordering::Acquire))
    }

    /// Record a new wired-connection state.
    pub fn set_wired(&self, state: WiredConnectionState) {
        self.wired.store(state as u8, Ordering::Release);
    }

    /// Last selected profile index.
    ///
    /// Kept for callers and status output only. A profile pulse carries its
    /// own mask, so the worker never reads this.
    pub fn profile(&self) -> u8 {
        self.profile.load(Ordering::Acquire)
    }

    /// Record the selected profile index.
    pub fn set_profile(&self, index: u8) {
        self.profile.store(index, Ordering::Release);
    }

    /// Returns true while the reconnection watchdog is checking.
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    /// Current watchdog state.
    pub fn watchdog(&self) -> WatchdogState {
        if self.is_checking() {
            WatchdogState::Checking
        } else {
            WatchdogState::Idle
        }
    }

    /// Move the watchdog from idle to checking.
    ///
    /// Returns false if it was already checking.
    pub fn begin_checking(&self) -> bool {
        self.checking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Force the watchdog into checking, whatever its state.
    pub fn force_checking(&self) {
        self.checking.store(true, Ordering::Release);
    }

    /// Return the watchdog to idle.
    ///
    /// Returns true if it was checking.
    pub fn stop_checking(&self) -> bool {
        self.checking.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wired_state_default_none() {
        assert_eq!(WiredConnectionState::default(), WiredConnectionState::None);
        assert!(!WiredConnectionState::None.is_present());
        assert!(WiredConnectionState::Powered.is_present());
        assert!(WiredConnectionState::Suspended.is_present());
    }

    #[test]
    fn wired_state_round_trips_through_atomic() {
        let state = ControllerState::new();
        for wired in [
            WiredConnectionState::Powered,
            WiredConnectionState::Suspended,
            WiredConnectionState::None,
        ] {
            state.set_wired(wired);
            assert_eq!(state.wired(), wired);
        }
    }

    #[test]
    fn wired_state_text() {
        assert_eq!(WiredConnectionState::Powered.as_str(), "powered");
        assert_eq!(
            WiredConnectionState::from_text("SUSPENDED"),
            Some(WiredConnectionState::Suspended)
        );
        assert_eq!(WiredConnectionState::from_text(""), None);
    }

    #[test]
    fn profile_recorded() {
        let state = ControllerState::new();
        assert_eq!(state.profile(), 0);
        state.set_profile(2);
        assert_eq!(state.profile(), 2);
    }

    #[test]
    fn watchdog_transitions() {
        let state = ControllerState::new();
        assert!(!state.stop_checking());

        assert!(state.begin_checking());
        assert_eq!(state.watchdog(), WatchdogState::Checking);

        assert!(state.stop_checking());
        assert_eq!(state.watchdog(), WatchdogState::Idle);

        state.force_checking();
        state.force_checking();
        assert!(state.is_checking());
    }

    #[test]
    fn concurrent_activation_has_single_winner() {
        use std::sync::Arc;
        use std::thread;

        let state = Arc::new(ControllerState::new());
        let handles: std::vec::Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || state.begin_checking())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
    }
}
