//! Inbound events understood by the indicator.
//!
//! Events arrive already decoded from whatever notification mechanism the
//! device uses. Two text forms are accepted for desktop use and testing:
//!
//! | Event | Line form | JSON form |
//! |-------|-----------|-----------|
//! | Profile selected | `profile 1` | `{"event": "profile", "index": 1}` |
//! | Wired connection | `wired powered` | `{"event": "wired", "state": "powered"}` |
//! | Battery changed | `battery` | `{"event": "battery"}` |
//! | Show battery | `show` | `{"event": "show"}` |
//! | Hide battery | `hide` | `{"event": "hide"}` |

use crate::state::WiredConnectionState;

/// A device-state event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorEvent {
    /// The active wireless profile changed.
    ProfileChanged {
        /// New profile index.
        index: u8,
    },
    /// The wired connection changed state.
    WiredConnectionChanged {
        /// New wired state.
        state: WiredConnectionState,
    },
    /// The battery level changed; it is sampled when handled.
    BatteryLevelChanged,
    /// Explicit request to show the battery level.
    ShowBattery,
    /// Explicit request to hide the battery level.
    HideBattery,
}

impl IndicatorEvent {
    /// Parse the line form of an event.
    ///
    /// Keywords are case-insensitive and surrounding whitespace is ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use indicator_leds::{IndicatorEvent, WiredConnectionState};
    ///
    /// assert_eq!(
    ///     IndicatorEvent::from_text("profile 2"),
    ///     Some(IndicatorEvent::ProfileChanged { index: 2 })
    /// );
    /// assert_eq!(
    ///     IndicatorEvent::from_text("wired suspended"),
    ///     Some(IndicatorEvent::WiredConnectionChanged { state: WiredConnectionState::Suspended })
    /// );
    /// assert_eq!(IndicatorEvent::from_text("SHOW"), Some(IndicatorEvent::ShowBattery));
    /// assert_eq!(IndicatorEvent::from_text("profile"), None);
    /// ```
    pub fn from_text(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let keyword = words.next()?;
        let arg = words.next();
        if words.next().is_some() {
            return None;
        }

        Self::from_parts(keyword, arg.and_then(|a| a.parse().ok()), arg)
    }

    /// Short name of the event, as used in the line and JSON forms.
    pub const fn as_str(&self) -> &'static str {
        match self {
            IndicatorEvent::ProfileChanged { .. } => "profile",
            IndicatorEvent::WiredConnectionChanged { .. } => "wired",
            IndicatorEvent::BatteryLevelChanged => "battery",
            IndicatorEvent::ShowBattery => "show",
            IndicatorEvent::HideBattery => "hide",
        }
    }

    fn from_parts(keyword: &str, index: Option<u8>, state: Option<&str>) -> Option<Self> {
        let is = |name: &str| keyword.eq_ignore_ascii_case(name);

        if is("profile") {
            index.map(|index| IndicatorEvent::ProfileChanged { index })
        } else if is("wired") || is("usb") {
            state
                .and_then(WiredConnectionState::from_text)
                .map(|state| IndicatorEvent::WiredConnectionChanged { state })
        } else if state.is_some() {
            None
        } else if is("battery") {
            Some(IndicatorEvent::BatteryLevelChanged)
        } else if is("show") {
            Some(IndicatorEvent::ShowBattery)
        } else if is("hide") {
            Some(IndicatorEvent::HideBattery)
        } else {
            None
        }
    }
}

// ============================================================================
// JSON Form
// ============================================================================

/// Wire shape of the JSON event form.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct EventMessage<'a> {
    /// Event keyword.
    pub event: &'a str,
    /// Profile index, for `profile`.
    #[serde(default)]
    pub index: Option<u8>,
    /// Wired state, for `wired`.
    #[serde(default)]
    pub state: Option<WiredConnectionState>,
}

#[cfg(feature = "serde")]
impl EventMessage<'_> {
    /// Convert to an event, if the fields fit the keyword.
    pub fn to_event(&self) -> Option<IndicatorEvent> {
        let is = |name: &str| self.event.eq_ignore_ascii_case(name);
        if is("wired") || is("usb") {
            return self
                .state
                .map(|state| IndicatorEvent::WiredConnectionChanged { state });
        }
        if self.state.is_some() {
            return None;
        }
        IndicatorEvent::from_parts(self.event, self.index, None)
    }
}

/// Parse an event from JSON bytes.
///
/// # Example
///
/// ```
/// use indicator_leds::events::parse_event;
/// use indicator_leds::{IndicatorEvent, WiredConnectionState};
///
/// let event = parse_event(br#"{"event": "wired", "state": "powered"}"#).unwrap();
/// assert_eq!(
///     event,
///     IndicatorEvent::WiredConnectionChanged { state: WiredConnectionState::Powered }
/// );
///
/// assert_eq!(parse_event(br#"{"event": "profile"}"#), None);
/// ```
#[cfg(feature = "serde-json-core")]
pub fn parse_event(json: &[u8]) -> Option<IndicatorEvent> {
    let (message, _): (EventMessage<'_>, _) = serde_json_core::from_slice(json).ok()?;
    message.to_event()
}
