//! Reconnection watchdog.
//!
//! While no link is confirmed the watchdog re-checks on a fixed interval and
//! pulses the "disconnected" light after every failed check. It is a two
//! state machine stored in [`ControllerState`]:
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Idle | [`activate`] or [`force`] | Checking |
//! | Checking | tick, link present | Idle |
//! | Checking | tick, no link | Checking (pulse, re-check later) |
//! | Checking | [`stand_down`] | Idle |
//!
//! The tick itself runs as a [`Job::ConnectionCheck`] on the animation
//! worker, so the pulse is serialized with every other animation. The next
//! tick is due one interval after the previous one finished.

use std::time::Duration;

use log::{debug, info};

use crate::jobs::{Job, JobKind};
use crate::scheduler::{ScheduleResult, SchedulerHandle};
use crate::state::ControllerState;
use crate::traits::LinkMonitor;

/// Default re-check interval in milliseconds.
pub const DEFAULT_RECHECK_MS: u32 = 4000;

/// Result of evaluating one watchdog tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The watchdog is idle; nothing to do.
    Inactive,
    /// A link is present. The watchdog has returned to idle.
    LinkRestored,
    /// Still no link. The caller should pulse and re-check.
    StillDisconnected,
}

/// Evaluate a tick against the current link state.
///
/// A wired host counts as a link whether it is powered or suspended. The
/// decision is made under the scheduler lock, so a concurrent [`force`] is
/// either seen as checking with no link or applied after the stop.
pub fn evaluate<L: LinkMonitor + ?Sized>(
    state: &ControllerState,
    link: &L,
    scheduler: &SchedulerHandle,
) -> CheckOutcome {
    let outcome = scheduler.with_lock(|| {
        if !state.is_checking() {
            CheckOutcome::Inactive
        } else if state.wired().is_present() || link.is_wireless_connected() {
            state.stop_checking();
            CheckOutcome::LinkRestored
        } else {
            CheckOutcome::StillDisconnected
        }
    });

    match outcome {
        CheckOutcome::LinkRestored => info!("watchdog: link present, stopping checks"),
        CheckOutcome::StillDisconnected => debug!("watchdog: still disconnected"),
        CheckOutcome::Inactive => {}
    }
    outcome
}

/// Start checking if the watchdog is idle.
///
/// Returns false, without touching the schedule, if it was already checking.
pub fn activate(state: &ControllerState, scheduler: &SchedulerHandle, interval: Duration) -> bool {
    let activated = scheduler
        .reschedule_if(JobKind::ConnectionCheck, Job::ConnectionCheck, interval, || {
            state.begin_checking()
        })
        .is_some();
    if activated {
        info!("watchdog: checking every {:?}", interval);
    }
    activated
}

/// Enter checking unconditionally and restart the tick timer.
pub fn force(
    state: &ControllerState,
    scheduler: &SchedulerHandle,
    interval: Duration,
) -> ScheduleResult {
    let mut was_checking = true;
    let result = scheduler.reschedule_if(JobKind::ConnectionCheck, Job::ConnectionCheck, interval, || {
        was_checking = state.is_checking();
        state.force_checking();
        true
    });
    if !was_checking {
        info!("watchdog: checking every {:?}", interval);
    }
    result.unwrap_or(ScheduleResult::Stopped)
}

/// Return to idle immediately and drop any pending tick.
///
/// A tick that is already running sees the idle state when it finishes and
/// does not re-arm itself.
pub fn stand_down(state: &ControllerState, scheduler: &SchedulerHandle) {
    let (was_checking, _) = scheduler.cancel_with(JobKind::ConnectionCheck, || state.stop_checking());
    if was_checking {
        info!("watchdog: connection confirmed, stopping checks");
    }
}

/// Queue the next tick if the watchdog is still checking.
///
/// The check and the queueing happen as one step, so a concurrent
/// [`stand_down`] cannot leave a stray tick behind.
pub fn rearm(state: &ControllerState, scheduler: &SchedulerHandle, interval: Duration) -> bool {
    scheduler
        .reschedule_if(JobKind::ConnectionCheck, Job::ConnectionCheck, interval, || {
            state.is_checking()
        })
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockLink;
    use crate::light_bank::LightError;
    use crate::scheduler::{AnimationScheduler, JobRunner};
    use crate::state::{WatchdogState, WiredConnectionState};
    use std::sync::Barrier;
    use std::thread;

    struct Idle;

    impl JobRunner for Idle {
        fn run(&mut self, _job: Job, _scheduler: &SchedulerHandle) -> Result<(), LightError> {
            Ok(())
        }
    }

    const LONG: Duration = Duration::from_secs(60);

    fn idle_scheduler() -> AnimationScheduler {
        AnimationScheduler::spawn(Idle).unwrap()
    }

    #[test]
    fn evaluate_idle_is_inactive() {
        let scheduler = idle_scheduler();
        let state = ControllerState::new();
        assert_eq!(
            evaluate(&state, &MockLink::new(false), scheduler.handle()),
            CheckOutcome::Inactive
        );
    }

    #[test]
    fn evaluate_without_link_keeps_checking() {
        let scheduler = idle_scheduler();
        let state = ControllerState::new();
        state.force_checking();
        assert_eq!(
            evaluate(&state, &MockLink::new(false), scheduler.handle()),
            CheckOutcome::StillDisconnected
        );
        assert_eq!(state.watchdog(), WatchdogState::Checking);
    }

    #[test]
    fn evaluate_wireless_link_stops_checking() {
        let scheduler = idle_scheduler();
        let state = ControllerState::new();
        state.force_checking();
        assert_eq!(
            evaluate(&state, &MockLink::new(true), scheduler.handle()),
            CheckOutcome::LinkRestored
        );
        assert_eq!(state.watchdog(), WatchdogState::Idle);
    }

    #[test]
    fn evaluate_wired_host_counts_as_link() {
        let scheduler = idle_scheduler();
        for wired in [WiredConnectionState::Powered, WiredConnectionState::Suspended] {
            let state = ControllerState::new();
            state.force_checking();
            state.set_wired(wired);
            assert_eq!(
                evaluate(&state, &MockLink::new(false), scheduler.handle()),
                CheckOutcome::LinkRestored
            );
        }
    }

    #[test]
    fn evaluate_never_drops_concurrent_force() {
        let scheduler = idle_scheduler();
        let handle = scheduler.handle();
        let link = MockLink::new(false);

        for _ in 0..5_000 {
            let state = ControllerState::new();
            state.set_wired(WiredConnectionState::Suspended);
            state.force_checking();
            let barrier = Barrier::new(2);

            thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    evaluate(&state, &link, handle);
                });
                s.spawn(|| {
                    barrier.wait();
                    state.set_wired(WiredConnectionState::None);
                    force(&state, handle, LONG);
                });
            });

            // The host left and nothing is linked: checking must survive
            assert_eq!(state.wired(), WiredConnectionState::None);
            assert!(state.is_checking());
        }
    }

    #[test]
    fn activate_only_once() {
        let scheduler = idle_scheduler();
        let handle = scheduler.handle();
        let state = ControllerState::new();

        assert!(activate(&state, &handle, LONG));
        assert!(handle.is_pending(JobKind::ConnectionCheck));
        assert!(!activate(&state, &handle, LONG));
    }

    #[test]
    fn force_rearms_when_already_checking() {
        let scheduler = idle_scheduler();
        let handle = scheduler.handle();
        let state = ControllerState::new();

        state.force_checking();
        assert_eq!(force(&state, &handle, LONG), ScheduleResult::Queued);
        assert_eq!(force(&state, &handle, LONG), ScheduleResult::Collapsed);
        assert!(state.is_checking());
        assert!(handle.is_pending(JobKind::ConnectionCheck));
    }

    #[test]
    fn stand_down_cancels_pending_tick() {
        let scheduler = idle_scheduler();
        let handle = scheduler.handle();
        let state = ControllerState::new();

        activate(&state, &handle, LONG);
        stand_down(&state, &handle);

        assert_eq!(state.watchdog(), WatchdogState::Idle);
        assert!(!handle.is_pending(JobKind::ConnectionCheck));
        assert!(!rearm(&state, &handle, LONG));
        assert!(!handle.is_pending(JobKind::ConnectionCheck));
    }
}
