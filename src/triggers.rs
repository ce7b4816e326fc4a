//! Trigger handlers and the indicator front end.
//!
//! [`StatusIndicator`] is what the rest of the device talks to. Each handler
//! records the event in the shared [`ControllerState`], hands a job to the
//! animation worker and returns without waiting. The lights are only ever
//! written on the worker, by [`IndicatorRunner`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use indicator_leds::config::{AnimationTimings, Config, IndicatorConfig};
//! use indicator_leds::hal::{MockBattery, MockDelay, MockIndicator, MockLink};
//! use indicator_leds::{StatusIndicator, TriggerOutcome, JobKind};
//!
//! let config = Config::default()
//!     .with_indicator(IndicatorConfig::default().with_show_battery_on_startup(false));
//! let driver = MockIndicator::new();
//! let trace = driver.trace();
//!
//! let indicator = StatusIndicator::start::<_, _, _, 4>(
//!     config,
//!     driver,
//!     MockDelay::new(),
//!     Arc::new(MockBattery::new(45)),
//!     Arc::new(MockLink::new(true)),
//! )
//! .unwrap();
//!
//! assert_eq!(indicator.on_profile_changed(0), TriggerOutcome::Scheduled(JobKind::Profile));
//! assert!(indicator.scheduler().wait_for_completed(1, Duration::from_secs(1)));
//!
//! // Profile 0 pulses the first light only; the rest stay at their startup off
//! assert!(trace.levels_for(0).contains(&100));
//! assert_eq!(trace.levels_for(1), vec![0]);
//! ```

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{AnimationTimings, Config, ConfigError};
use crate::events::IndicatorEvent;
use crate::fade;
use crate::jobs::{battery_pattern, profile_mask, AnimationJob, Job, JobKind, DISCONNECTED_MASK};
use crate::light_bank::{LightBank, LightError};
use crate::scheduler::{AnimationScheduler, JobRunner, ScheduleResult, SchedulerHandle};
use crate::state::{ControllerState, WatchdogState, WiredConnectionState};
use crate::traits::{BatteryGauge, Delay, IndicatorDriver, LinkMonitor};
use crate::watchdog::{self, CheckOutcome};

// ============================================================================
// Outcomes
// ============================================================================

/// What a trigger handler did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A job was queued in the given slot.
    Scheduled(JobKind),
    /// A pending job in the given slot was replaced.
    Collapsed(JobKind),
    /// Nothing was scheduled.
    Ignored {
        /// Why the event was ignored.
        reason: IgnoreReason,
    },
}

/// Reason an event produced no animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Profile index has no indication.
    ProfileOutOfRange(u8),
    /// The request has no defined effect.
    NoEffect,
    /// The animation worker has stopped.
    Stopped,
}

impl TriggerOutcome {
    fn from_schedule(kind: JobKind, result: ScheduleResult) -> Self {
        match result {
            ScheduleResult::Queued => TriggerOutcome::Scheduled(kind),
            ScheduleResult::Collapsed => TriggerOutcome::Collapsed(kind),
            ScheduleResult::Stopped => TriggerOutcome::Ignored {
                reason: IgnoreReason::Stopped,
            },
        }
    }

    /// Returns true if a job is now pending because of the event.
    pub fn is_scheduled(&self) -> bool {
        matches!(
            self,
            TriggerOutcome::Scheduled(_) | TriggerOutcome::Collapsed(_)
        )
    }
}

/// Error starting the indicator.
#[derive(Debug)]
pub enum StartError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// The animation worker thread could not be spawned.
    Spawn(std::io::Error),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::Config(e) => write!(f, "invalid configuration: {}", e),
            StartError::Spawn(e) => write!(f, "failed to spawn animation worker: {}", e),
        }
    }
}

impl std::error::Error for StartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartError::Config(e) => Some(e),
            StartError::Spawn(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StartError {
    fn from(e: ConfigError) -> Self {
        StartError::Config(e)
    }
}

impl From<std::io::Error> for StartError {
    fn from(e: std::io::Error) -> Self {
        StartError::Spawn(e)
    }
}

// ============================================================================
// Worker Side
// ============================================================================

/// Runs indicator jobs against the light bank on the animation worker.
pub struct IndicatorRunner<D, T, B, L, const N: usize>
where
    D: IndicatorDriver,
{
    bank: LightBank<D, N>,
    delay: T,
    battery: B,
    link: L,
    state: Arc<ControllerState>,
    timings: AnimationTimings,
    fade_out_on_suspend: bool,
}

impl<D, T, B, L, const N: usize> IndicatorRunner<D, T, B, L, N>
where
    D: IndicatorDriver,
    T: Delay,
    B: BatteryGauge,
    L: LinkMonitor,
{
    /// Create a runner driving `bank`.
    pub fn new(
        bank: LightBank<D, N>,
        delay: T,
        battery: B,
        link: L,
        state: Arc<ControllerState>,
        config: &Config,
    ) -> Self {
        Self {
            bank,
            delay,
            battery,
            link,
            state,
            timings: config.timings,
            fade_out_on_suspend: config.indicator.fade_out_on_suspend,
        }
    }

    fn show_battery(&mut self) -> Result<(), LightError> {
        let level = self.battery.state_of_charge();
        let (mask, repeats) = battery_pattern(level);
        debug!("battery {}%: pulsing {} x{}", level, mask, repeats);
        fade::pulse(
            &mut self.bank,
            &mut self.delay,
            mask,
            repeats,
            self.timings.battery_fade_ms,
            self.timings.hold_ms,
        )
    }

    fn wired_sequence(&mut self) -> Result<(), LightError> {
        let t = self.timings;

        if self.fade_out_on_suspend && self.state.wired() == WiredConnectionState::Suspended {
            debug!("wired host suspended: fading out");
            return fade::fade_out_all(&mut self.bank, &mut self.delay, t.disconnect_fade_ms);
        }

        for index in 0..N {
            fade::fade_in_single(&mut self.bank, &mut self.delay, index, t.wired_fade_ms)?;
            self.delay.delay_ms(t.hold_ms);
        }
        self.delay.delay_ms(t.hold_ms);
        fade::fade_out_all(&mut self.bank, &mut self.delay, t.wired_fade_ms)
    }

    fn connection_check(&mut self, scheduler: &SchedulerHandle) -> Result<(), LightError> {
        let outcome = watchdog::evaluate(&*self.state, &self.link, scheduler);
        if outcome != CheckOutcome::StillDisconnected {
            return Ok(());
        }

        let t = self.timings;
        let result = fade::pulse(
            &mut self.bank,
            &mut self.delay,
            DISCONNECTED_MASK,
            1,
            t.disconnect_fade_ms,
            t.hold_ms,
        );
        watchdog::rearm(&self.state, scheduler, t.recheck_interval());
        result
    }
}

impl<D, T, B, L, const N: usize> JobRunner for IndicatorRunner<D, T, B, L, N>
where
    D: IndicatorDriver + Send,
    T: Delay + Send,
    B: BatteryGauge + Send,
    L: LinkMonitor + Send,
{
    fn run(&mut self, job: Job, scheduler: &SchedulerHandle) -> Result<(), LightError> {
        match job {
            Job::Pulse(pulse) => {
                fade::run_pulse(&mut self.bank, &mut self.delay, &pulse, self.timings.hold_ms)
            }
            Job::ShowBattery => self.show_battery(),
            Job::WiredSequence => self.wired_sequence(),
            Job::ConnectionCheck => self.connection_check(scheduler),
        }
    }
}

// ============================================================================
// Trigger Side
// ============================================================================

/// Front end of the status indicator.
///
/// Owns the animation worker; dropping the indicator lets the running
/// animation finish and stops the worker.
pub struct StatusIndicator<B: BatteryGauge> {
    scheduler: AnimationScheduler,
    state: Arc<ControllerState>,
    battery: B,
    config: Config,
}

impl<B: BatteryGauge> StatusIndicator<B> {
    /// Switch every light off, start the animation worker and, if enabled,
    /// schedule the startup battery indication.
    ///
    /// `battery` is sampled from trigger context by
    /// [`on_battery_changed`](Self::on_battery_changed) and from the worker
    /// by the startup indication, so it is cloned for the worker (an
    /// `Arc<impl BatteryGauge>` works).
    pub fn start<D, T, L, const N: usize>(
        config: Config,
        driver: D,
        delay: T,
        battery: B,
        link: L,
    ) -> Result<Self, StartError>
    where
        D: IndicatorDriver + Send + 'static,
        T: Delay + Send + 'static,
        B: Clone + Send + 'static,
        L: LinkMonitor + Send + 'static,
    {
        config.validate()?;
        if !config.timings.is_smooth() {
            warn!(
                "{}: fade durations under 100 ms will jump instead of fading",
                config.indicator.name
            );
        }

        let mut bank: LightBank<D, N> = LightBank::new(driver);
        bank.all_off();

        let state = Arc::new(ControllerState::new());
        let runner = IndicatorRunner::new(
            bank,
            delay,
            battery.clone(),
            link,
            Arc::clone(&state),
            &config,
        );
        let scheduler = AnimationScheduler::spawn(runner)?;

        if config.indicator.show_battery_on_startup {
            scheduler.handle().schedule(
                JobKind::Battery,
                Job::ShowBattery,
                config.timings.startup_delay(),
            );
        }
        info!("{}: started with {} lights", config.indicator.name, N);

        Ok(Self {
            scheduler,
            state,
            battery,
            config,
        })
    }

    /// Handle any [`IndicatorEvent`].
    pub fn handle_event(&self, event: IndicatorEvent) -> TriggerOutcome {
        match event {
            IndicatorEvent::ProfileChanged { index } => self.on_profile_changed(index),
            IndicatorEvent::WiredConnectionChanged { state } => {
                self.on_wired_connection_changed(state)
            }
            IndicatorEvent::BatteryLevelChanged => self.on_battery_changed(),
            IndicatorEvent::ShowBattery => self.show_battery(),
            IndicatorEvent::HideBattery => self.hide_battery(),
        }
    }

    /// A wireless profile was selected.
    ///
    /// Profiles 0 to 2 pulse mask `0b1000 >> index`; higher indices are
    /// ignored. Starts the reconnection watchdog if it is idle.
    pub fn on_profile_changed(&self, index: u8) -> TriggerOutcome {
        let Some(mask) = profile_mask(index) else {
            debug!("profile {}: no indication", index);
            return TriggerOutcome::Ignored {
                reason: IgnoreReason::ProfileOutOfRange(index),
            };
        };

        self.state.set_profile(index);
        let job = AnimationJob::pulse(mask, 1, self.config.timings.profile_fade_ms);
        let result = self
            .scheduler()
            .schedule(JobKind::Profile, Job::Pulse(job), Duration::ZERO);
        debug!("profile {}: pulsing {}", index, mask);

        let interval = self.config.timings.recheck_interval();
        watchdog::activate(&self.state, self.scheduler(), interval);
        TriggerOutcome::from_schedule(JobKind::Profile, result)
    }

    /// The wired connection changed state.
    ///
    /// A powered host stops the watchdog and plays the wired sequence. Any
    /// other state forces the watchdog on and restarts its timer.
    pub fn on_wired_connection_changed(&self, wired: WiredConnectionState) -> TriggerOutcome {
        self.state.set_wired(wired);
        debug!("wired connection: {}", wired.as_str());

        if wired == WiredConnectionState::Powered {
            watchdog::stand_down(&self.state, self.scheduler());
            let result = self
                .scheduler()
                .schedule(JobKind::Wired, Job::WiredSequence, Duration::ZERO);
            TriggerOutcome::from_schedule(JobKind::Wired, result)
        } else {
            let result = watchdog::force(
                &self.state,
                self.scheduler(),
                self.config.timings.recheck_interval(),
            );
            TriggerOutcome::from_schedule(JobKind::ConnectionCheck, result)
        }
    }

    /// The battery level changed. Samples the level now and pulses its
    /// pattern.
    pub fn on_battery_changed(&self) -> TriggerOutcome {
        let level = self.battery.state_of_charge();
        let (mask, repeats) = battery_pattern(level);
        debug!("battery {}%: pulsing {} x{}", level, mask, repeats);

        let job = AnimationJob::pulse(mask, repeats, self.config.timings.battery_fade_ms);
        let result = self
            .scheduler()
            .schedule(JobKind::Battery, Job::Pulse(job), Duration::ZERO);
        TriggerOutcome::from_schedule(JobKind::Battery, result)
    }

    /// Show the battery level on demand.
    pub fn show_battery(&self) -> TriggerOutcome {
        self.on_battery_changed()
    }

    /// Hide the battery level. Has no effect.
    pub fn hide_battery(&self) -> TriggerOutcome {
        debug!("hide battery: no effect");
        TriggerOutcome::Ignored {
            reason: IgnoreReason::NoEffect,
        }
    }

    /// Shared control state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Current reconnection watchdog state.
    pub fn watchdog_state(&self) -> WatchdogState {
        self.state.watchdog()
    }

    /// Handle to the animation scheduler.
    pub fn scheduler(&self) -> &SchedulerHandle {
        self.scheduler.handle()
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<B: BatteryGauge> fmt::Debug for StatusIndicator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusIndicator")
            .field("name", &self.config.indicator.name)
            .field("watchdog", &self.state.watchdog())
            .field("wired", &self.state.wired())
            .field("profile", &self.state.profile())
            .field("running", &self.scheduler().running())
            .finish()
    }
}

impl<B: BatteryGauge> Drop for StatusIndicator<B> {
    fn drop(&mut self) {
        debug!(
            "{}: stopping after {} jobs",
            self.config.indicator.name,
            self.scheduler().completed()
        );
    }
}
