//! Time-sliced fade primitives operating on a [`LightBank`].
//!
//! Every fade runs a fixed number of discrete steps ([`FADE_STEPS`]) and
//! blocks on the supplied [`Delay`] between steps. These functions are only
//! ever called from the animation worker; triggers schedule jobs instead.
//!
//! # Step Timing
//!
//! The step delay is `duration_ms / 100`, rounded toward zero. Durations
//! under 100 ms therefore collapse every step to zero delay and the fade
//! becomes an instantaneous jump.
//!
//! # Fade-out Scaling
//!
//! Fade-outs scale the brightness each light had when the fade-out began:
//! at step `j` (counting down from 100) a light that started at `B` is at
//! `B * j / 100`. A fade-out started part-way through a fade-in therefore
//! continues smoothly from wherever the light was.
//!
//! # Example
//!
//! ```rust
//! use indicator_leds::{fade, LightBank, hal::{MockDelay, MockIndicator}};
//!
//! let mut bank: LightBank<_, 4> = LightBank::new(MockIndicator::new());
//! let mut delay = MockDelay::new();
//!
//! fade::fade_in_single(&mut bank, &mut delay, 0, 400).unwrap();
//! assert_eq!(bank.brightness(0), Some(100));
//! assert_eq!(delay.total_ms(), 101 * 4);
//!
//! fade::fade_out_all(&mut bank, &mut delay, 400).unwrap();
//! assert_eq!(bank.levels(), &[0, 0, 0, 0]);
//! ```
//!
//! [`LightBank`]: crate::LightBank

use crate::jobs::{AnimationJob, LightMask};
use crate::light_bank::{LightBank, LightError, FULL_BRIGHTNESS};
use crate::traits::{Delay, IndicatorDriver};

/// Number of discrete steps in every fade.
pub const FADE_STEPS: u32 = 100;

/// Step delay for a full fade of `duration_ms`.
#[inline]
pub const fn step_delay_ms(duration_ms: u32) -> u32 {
    duration_ms / FADE_STEPS
}

/// Brightness at fade-in step `step` (0 to [`FADE_STEPS`]).
#[inline]
pub const fn fade_in_level(step: u32) -> u8 {
    (FULL_BRIGHTNESS as u32 * step / FADE_STEPS) as u8
}

/// Brightness at fade-out step `step` for a light that started at `start`.
#[inline]
pub const fn fade_out_level(start: u8, step: u32) -> u8 {
    (start as u32 * step / FADE_STEPS) as u8
}

/// Ramp one light from 0 to full brightness over `duration_ms`.
///
/// Writes [`FADE_STEPS`]` + 1` levels (0 through 100) and sleeps the step
/// delay after each one.
pub fn fade_in_single<D, T, const N: usize>(
    bank: &mut LightBank<D, N>,
    delay: &mut T,
    index: usize,
    duration_ms: u32,
) -> Result<(), LightError>
where
    D: IndicatorDriver,
    T: Delay + ?Sized,
{
    if index >= N {
        return Err(LightError::OutOfRange { index, count: N });
    }

    let step_delay = step_delay_ms(duration_ms);
    for step in 0..=FADE_STEPS {
        bank.set_brightness(index, fade_in_level(step))?;
        delay.delay_ms(step_delay);
    }
    Ok(())
}

/// Ramp every light from its current brightness down to 0, in lockstep.
pub fn fade_out_all<D, T, const N: usize>(
    bank: &mut LightBank<D, N>,
    delay: &mut T,
    duration_ms: u32,
) -> Result<(), LightError>
where
    D: IndicatorDriver,
    T: Delay + ?Sized,
{
    fade_out_masked(bank, delay, None, step_delay_ms(duration_ms))
}

/// Pulse the lights selected by `mask`, `repeats` times.
///
/// Each pulse fades the selected lights in over half of `duration_ms`, holds
/// at full brightness for `hold_ms`, fades them back out over the other half
/// and holds dark for `hold_ms`. Unselected lights are never written.
pub fn pulse<D, T, const N: usize>(
    bank: &mut LightBank<D, N>,
    delay: &mut T,
    mask: LightMask,
    repeats: u8,
    duration_ms: u32,
    hold_ms: u32,
) -> Result<(), LightError>
where
    D: IndicatorDriver,
    T: Delay + ?Sized,
{
    let step_delay = duration_ms / (2 * FADE_STEPS);

    for _ in 0..repeats {
        for step in 0..=FADE_STEPS {
            for index in mask.lights(N) {
                bank.set_brightness(index, fade_in_level(step))?;
            }
            delay.delay_ms(step_delay);
        }
        delay.delay_ms(hold_ms);

        fade_out_masked(bank, delay, Some(mask), step_delay)?;
        delay.delay_ms(hold_ms);
    }
    Ok(())
}

/// Run an [`AnimationJob`] as a [`pulse`].
pub fn run_pulse<D, T, const N: usize>(
    bank: &mut LightBank<D, N>,
    delay: &mut T,
    job: &AnimationJob,
    hold_ms: u32,
) -> Result<(), LightError>
where
    D: IndicatorDriver,
    T: Delay + ?Sized,
{
    pulse(bank, delay, job.mask, job.repeats, job.duration_ms, hold_ms)
}

/// Shared fade-out loop. `mask = None` fades every light.
fn fade_out_masked<D, T, const N: usize>(
    bank: &mut LightBank<D, N>,
    delay: &mut T,
    mask: Option<LightMask>,
    step_delay: u32,
) -> Result<(), LightError>
where
    D: IndicatorDriver,
    T: Delay + ?Sized,
{
    let start = *bank.levels();
    let selected = |index: usize| mask.map_or(true, |m| m.selects(index, N));

    for step in (0..=FADE_STEPS).rev() {
        for (index, &level) in start.iter().enumerate() {
            if selected(index) {
                bank.set_brightness(index, fade_out_level(level, step))?;
            }
        }
        delay.delay_ms(step_delay);
    }
    Ok(())
}
