//! # indicator-leds
//!
//! A status-indicator controller for a small bank of dimmable lights on a
//! battery-powered peripheral, such as a wireless keyboard.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the light driver, battery gauge, link monitor and delay
//! - **Proportional fades**: Fade-in, fade-out and pulse primitives in 100 fixed steps
//! - **Serialized animation**: One worker thread runs every animation to completion
//! - **Collapsing triggers**: Each trigger owns one pending slot; re-triggering replaces it
//! - **Reconnection watchdog**: Pulses a "disconnected" light until a link is confirmed
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions
//! - `light_bank` - Bounds-checked brightness bookkeeping
//! - `fade` - Time-sliced fade primitives
//! - `jobs` - Animation jobs and the light patterns they show
//! - `scheduler` - Single-worker scheduler with per-trigger slots
//! - `triggers` - Event handlers and the [`StatusIndicator`] front end
//! - `watchdog` - Reconnection watchdog state machine
//! - `hal` - Concrete implementations (mocks for testing, host delay)
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use indicator_leds::{
//!     StatusIndicator, WiredConnectionState, WatchdogState,
//!     config::Config,
//!     hal::{MockBattery, MockDelay, MockIndicator, MockLink},
//! };
//!
//! let link = Arc::new(MockLink::new(false));
//! let indicator = StatusIndicator::start::<_, _, _, 4>(
//!     Config::default(),
//!     MockIndicator::new(),
//!     MockDelay::new(),
//!     Arc::new(MockBattery::new(60)),
//!     Arc::clone(&link),
//! )
//! .unwrap();
//!
//! // Losing the wired host starts the reconnection watchdog
//! indicator.on_wired_connection_changed(WiredConnectionState::None);
//! assert_eq!(indicator.watchdog_state(), WatchdogState::Checking);
//!
//! // A powered host stops it immediately
//! indicator.on_wired_connection_changed(WiredConnectionState::Powered);
//! assert_eq!(indicator.watchdog_state(), WatchdogState::Idle);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Indicator configuration with firmware defaults.
pub mod config;
/// Inbound device-state events.
pub mod events;
/// Time-sliced fade primitives.
pub mod fade;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Animation jobs and indicator patterns.
pub mod jobs;
/// Brightness bookkeeping for the indicator lights.
pub mod light_bank;
/// Shared control state.
pub mod state;
/// Core traits for hardware abstraction.
pub mod traits;

/// Single-worker animation scheduler.
#[cfg(feature = "std")]
pub mod scheduler;
/// Trigger handlers and the indicator front end.
#[cfg(feature = "std")]
pub mod triggers;
/// Reconnection watchdog.
#[cfg(feature = "std")]
pub mod watchdog;

// Re-exports for convenience
pub use config::{AnimationTimings, Config, ConfigError, IndicatorConfig};
pub use events::IndicatorEvent;
pub use jobs::{AnimationJob, Job, JobKind, LightMask};
pub use light_bank::{LightBank, LightError};
pub use state::{ControllerState, WatchdogState, WiredConnectionState};
pub use traits::{BatteryGauge, Delay, IndicatorDriver, LinkMonitor};

#[cfg(feature = "std")]
pub use scheduler::{AnimationScheduler, JobOutcome, JobRecord, JobRunner, ScheduleResult, SchedulerHandle};
#[cfg(feature = "std")]
pub use triggers::{IgnoreReason, IndicatorRunner, StartError, StatusIndicator, TriggerOutcome};
#[cfg(feature = "std")]
pub use watchdog::CheckOutcome;

// Parsing function re-exports (serde-json-core based)
#[cfg(feature = "serde-json-core")]
pub use events::parse_event;
