//! Animation job types and the indicator patterns built from them.
//!
//! This module defines what the animation worker can be asked to do:
//!
//! 1. A [`LightMask`] selects a subset of lights, most-significant bit first
//! 2. An [`AnimationJob`] pulses a mask a number of times over a duration
//! 3. A [`Job`] is the unit the scheduler stores in a trigger's slot
//! 4. A [`JobKind`] names the slot, one per trigger
//!
//! The pattern helpers ([`profile_mask`], [`battery_pattern`]) hold the fixed
//! tables that map device state onto light patterns.
//!
//! # Example
//!
//! ```rust
//! use indicator_leds::jobs::{battery_pattern, profile_mask, LightMask};
//!
//! // Profile 1 pulses the second light from the left
//! assert_eq!(profile_mask(1), Some(LightMask::from_bits(0b0100)));
//!
//! // 45% battery shows two lights once
//! let (mask, repeats) = battery_pattern(45);
//! assert_eq!(mask.bits(), 0b1100);
//! assert_eq!(repeats, 1);
//! ```

use core::fmt;

// ============================================================================
// Light Mask
// ============================================================================

/// Bit mask selecting a subset of lights.
///
/// Bit `k` (counting from the least-significant bit) selects light
/// `count - 1 - k`, so written in binary the mask reads left-to-right in
/// light order: `0b1000` on a 4-light bank is light 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightMask(u8);

impl LightMask {
    /// The empty mask.
    pub const NONE: Self = Self(0);

    /// Create a mask from raw bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw mask bits.
    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns true if no light is selected.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if light `index` of a `count`-light bank is selected.
    pub const fn selects(&self, index: usize, count: usize) -> bool {
        if index >= count || count - 1 - index >= u8::BITS as usize {
            return false;
        }
        self.0 & (1 << (count - 1 - index)) != 0
    }

    /// Iterate the selected light indices of a `count`-light bank.
    pub fn lights(self, count: usize) -> impl Iterator<Item = usize> {
        (0..count).filter(move |&index| self.selects(index, count))
    }
}

impl fmt::Display for LightMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// A pulse animation: fade in, hold, fade out, hold, `repeats` times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationJob {
    /// Lights driven by the pulse.
    pub mask: LightMask,
    /// Number of pulses.
    pub repeats: u8,
    /// Duration of one pulse's fade-in plus fade-out, in milliseconds.
    pub duration_ms: u32,
}

impl AnimationJob {
    /// Create a pulse job.
    pub const fn pulse(mask: LightMask, repeats: u8, duration_ms: u32) -> Self {
        Self {
            mask,
            repeats,
            duration_ms,
        }
    }
}

/// Work stored in a scheduler slot and executed by the animation worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Job {
    /// Pulse a fixed mask (profile and battery-level indications).
    Pulse(AnimationJob),
    /// Sample the battery when the job runs, then pulse its pattern.
    ShowBattery,
    /// Wired-connection sequence: fade every light in one after another,
    /// then fade all out. Fades out instead if the host is suspended.
    WiredSequence,
    /// One reconnection watchdog tick.
    ConnectionCheck,
}

/// Identifies a trigger's scheduling slot.
///
/// Each kind owns exactly one slot: scheduling a kind that is already
/// pending replaces the pending job rather than queueing a second one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JobKind {
    /// Profile selection pulse.
    Profile = 0,
    /// Wired-connection animation.
    Wired = 1,
    /// Battery level pulse.
    Battery = 2,
    /// Reconnection watchdog tick.
    ConnectionCheck = 3,
}

impl JobKind {
    /// Number of slot kinds.
    pub const COUNT: usize = 4;

    /// Every kind, in slot order.
    pub const ALL: [JobKind; Self::COUNT] = [
        JobKind::Profile,
        JobKind::Wired,
        JobKind::Battery,
        JobKind::ConnectionCheck,
    ];

    /// Slot index of this kind.
    #[inline]
    pub const fn slot(&self) -> usize {
        *self as usize
    }

    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobKind::Profile => "profile",
            JobKind::Wired => "wired",
            JobKind::Battery => "battery",
            JobKind::ConnectionCheck => "connection_check",
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// Highest profile index that has an indication.
pub const MAX_PROFILE_INDEX: u8 = 2;

/// Mask pulsed by the reconnection watchdog while no link is present.
pub const DISCONNECTED_MASK: LightMask = LightMask::from_bits(0b0001);

/// Mask pulsed for a profile selection: `0b1000 >> index`.
///
/// Returns `None` for indices above [`MAX_PROFILE_INDEX`]; no animation is
/// shown for those.
pub const fn profile_mask(index: u8) -> Option<LightMask> {
    if index > MAX_PROFILE_INDEX {
        return None;
    }
    Some(LightMask::from_bits(0b1000 >> index))
}

/// Mask and repeat count shown for a battery level.
///
/// | level ≤ | mask | repeats |
/// |---------|------|---------|
/// | 15 | `1000` | 3 |
/// | 30 | `1000` | 1 |
/// | 50 | `1100` | 1 |
/// | 80 | `1110` | 1 |
/// | else | `1110` | 3 |
pub const fn battery_pattern(level: u8) -> (LightMask, u8) {
    match level {
        0..=15 => (LightMask::from_bits(0b1000), 3),
        16..=30 => (LightMask::from_bits(0b1000), 1),
        31..=50 => (LightMask::from_bits(0b1100), 1),
        51..=80 => (LightMask::from_bits(0b1110), 1),
        _ => (LightMask::from_bits(0b1110), 3),
    }
}
