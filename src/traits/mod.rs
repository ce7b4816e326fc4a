//! Trait definitions for hardware abstraction.
//!
//! This module defines the abstractions that allow indicator-leds to:
//! - Run on different hardware (keyboard shields, desktop mock)
//! - Query battery and link status without owning those subsystems
//! - Pace animations with a platform-provided blocking delay
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`IndicatorDriver`]: Per-light brightness output
//! - [`BatteryGauge`]: Battery state of charge
//! - [`LinkMonitor`]: Wireless link presence
//! - [`Delay`]: Blocking step delay for the animation worker

pub mod hardware;

pub use hardware::*;
