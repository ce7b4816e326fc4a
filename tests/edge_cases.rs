//! Edge case and boundary condition tests for the status indicator

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use indicator_leds::{
    config::{AnimationTimings, Config, IndicatorConfig},
    fade,
    hal::{MockBattery, MockDelay, MockIndicator, MockLink, StdDelay},
    AnimationJob, IgnoreReason, Job, JobKind, JobOutcome, LightBank, LightMask, ScheduleResult,
    StatusIndicator, TriggerOutcome, WatchdogState, WiredConnectionState,
};

const TIMEOUT: Duration = Duration::from_secs(10);

fn quiet() -> Config {
    Config::default()
        .with_timings(AnimationTimings::default().with_recheck_interval_ms(30))
        .with_indicator(IndicatorConfig::default().with_show_battery_on_startup(false))
}

fn wait_until_running(indicator: &StatusIndicator<Arc<MockBattery>>, kind: JobKind) {
    let deadline = Instant::now() + TIMEOUT;
    while indicator.scheduler().running() != Some(kind) {
        assert!(Instant::now() < deadline, "{:?} never started", kind);
        thread::yield_now();
    }
}

// ============================================================================
// Boundary Value Tests
// ============================================================================

#[test]
fn brightness_clamped_to_full() {
    let mut bank: LightBank<_, 4> = LightBank::new(MockIndicator::new());
    for requested in [0u8, 1, 99, 100, 101, 200, u8::MAX] {
        bank.set_brightness(2, requested).unwrap();
        assert_eq!(bank.brightness(2), Some(requested.min(100)));
    }
    assert!(bank.driver().trace().writes().iter().all(|w| w.percent <= 100));
}

#[test]
fn fade_out_tracks_starting_brightness() {
    let mut bank: LightBank<_, 4> = LightBank::new(MockIndicator::new());
    let mut delay = MockDelay::new();
    bank.set_brightness(0, 80).unwrap();
    bank.set_brightness(1, 37).unwrap();
    bank.driver().trace().clear();

    fade::fade_out_all(&mut bank, &mut delay, 100).unwrap();

    // Level at step j (counting down from 100) is start * j / 100
    for (light, start) in [(0usize, 80u32), (1, 37)] {
        let levels = bank.driver().trace().levels_for(light);
        assert_eq!(levels.len(), 101);
        for (i, &level) in levels.iter().enumerate() {
            let j = 100 - i as u32;
            assert_eq!(u32::from(level), start * j / 100);
        }
        assert!(levels.windows(2).all(|p| p[0] >= p[1]));
    }
}

#[test]
fn profile_index_above_two_is_ignored() {
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        quiet(),
        MockIndicator::new(),
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(false),
    )
    .unwrap();

    for index in [3u8, 4, 8, u8::MAX] {
        assert_eq!(
            indicator.on_profile_changed(index),
            TriggerOutcome::Ignored {
                reason: IgnoreReason::ProfileOutOfRange(index)
            }
        );
    }
    assert_eq!(indicator.watchdog_state(), WatchdogState::Idle);
    assert!(indicator.scheduler().wait_idle(TIMEOUT));
    assert_eq!(indicator.scheduler().completed(), 0);
}

#[test]
fn zero_durations_still_run() {
    let config = Config::default()
        .with_timings(AnimationTimings {
            profile_fade_ms: 0,
            battery_fade_ms: 0,
            wired_fade_ms: 0,
            disconnect_fade_ms: 0,
            hold_ms: 0,
            recheck_interval_ms: 30,
            startup_delay_ms: 0,
        })
        .with_indicator(IndicatorConfig::default().with_show_battery_on_startup(false));
    assert!(!config.timings.is_smooth());

    let delay = MockDelay::new();
    let driver = MockIndicator::new();
    let trace = driver.trace();
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        config,
        driver,
        delay.clone(),
        Arc::new(MockBattery::default()),
        MockLink::new(true),
    )
    .unwrap();

    indicator.on_wired_connection_changed(WiredConnectionState::Powered);
    assert!(indicator.scheduler().wait_idle(TIMEOUT));

    // Every step still writes, it just never waits
    assert_eq!(delay.total_ms(), 0);
    for light in 0..4 {
        assert!(trace.levels_for(light).contains(&100));
    }
}

// ============================================================================
// Slot Collapsing
// ============================================================================

#[test]
fn repeated_trigger_collapses_while_worker_busy() {
    let battery = Arc::new(MockBattery::new(10));
    let config = quiet().with_timings(
        quiet()
            .timings
            .with_wired_fade_ms(100)
            .with_battery_fade_ms(100)
            .with_hold_ms(1),
    );
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        config,
        MockIndicator::new(),
        StdDelay::new(),
        Arc::clone(&battery),
        MockLink::new(true),
    )
    .unwrap();

    indicator.on_wired_connection_changed(WiredConnectionState::Powered);
    wait_until_running(&indicator, JobKind::Wired);

    assert_eq!(
        indicator.on_battery_changed(),
        TriggerOutcome::Scheduled(JobKind::Battery)
    );
    battery.set_level(90);
    assert_eq!(
        indicator.on_battery_changed(),
        TriggerOutcome::Collapsed(JobKind::Battery)
    );

    assert!(indicator.scheduler().wait_idle(TIMEOUT));
    let jobs: Vec<_> = indicator
        .scheduler()
        .recent_jobs()
        .iter()
        .map(|r| r.job)
        .collect();
    assert_eq!(
        jobs,
        vec![
            Job::WiredSequence,
            Job::Pulse(AnimationJob::pulse(LightMask::from_bits(0b1110), 3, 100)),
        ]
    );
}

#[test]
fn profile_while_checking_keeps_single_tick() {
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        quiet().with_timings(quiet().timings.with_recheck_interval_ms(60_000)),
        MockIndicator::new(),
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(false),
    )
    .unwrap();

    assert_eq!(
        indicator.on_profile_changed(0),
        TriggerOutcome::Scheduled(JobKind::Profile)
    );
    indicator.on_profile_changed(1);
    indicator.on_profile_changed(2);

    // The watchdog was armed once and stays armed for the next minute
    assert_eq!(indicator.watchdog_state(), WatchdogState::Checking);
    assert!(indicator.scheduler().is_pending(JobKind::ConnectionCheck));
    assert!(indicator.scheduler().wait_for_completed(1, TIMEOUT));
    assert_eq!(indicator.watchdog_state(), WatchdogState::Checking);
    assert!(indicator
        .scheduler()
        .recent_jobs()
        .iter()
        .all(|r| r.kind == JobKind::Profile));
}

// ============================================================================
// Wired Connection States
// ============================================================================

#[test]
fn suspended_host_counts_as_link() {
    let driver = MockIndicator::new();
    let trace = driver.trace();
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        quiet(),
        driver,
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(false),
    )
    .unwrap();
    trace.clear();

    assert_eq!(
        indicator.on_wired_connection_changed(WiredConnectionState::Suspended),
        TriggerOutcome::Scheduled(JobKind::ConnectionCheck)
    );
    assert_eq!(indicator.watchdog_state(), WatchdogState::Checking);

    // The first tick finds the wired host and stands down without pulsing
    assert!(indicator.scheduler().wait_idle(TIMEOUT));
    assert_eq!(indicator.watchdog_state(), WatchdogState::Idle);
    assert!(trace.is_empty());
}

#[test]
fn suspend_before_sequence_runs_fades_out() {
    let driver = MockIndicator::new();
    let trace = driver.trace();
    let config = quiet().with_timings(quiet().timings.with_profile_fade_ms(400).with_hold_ms(1));
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        config,
        driver,
        StdDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(true),
    )
    .unwrap();

    // Keep the worker busy so the wired job is still queued when the host sleeps
    indicator.on_profile_changed(0);
    wait_until_running(&indicator, JobKind::Profile);
    indicator.on_wired_connection_changed(WiredConnectionState::Powered);
    indicator.on_wired_connection_changed(WiredConnectionState::Suspended);

    assert!(indicator.scheduler().wait_idle(TIMEOUT));
    let wired = indicator
        .scheduler()
        .recent_jobs()
        .into_iter()
        .find(|r| r.job == Job::WiredSequence)
        .unwrap();

    // Only the first light was lit by the profile pulse; nothing lights up
    // during the wired job
    let lit_during_wired = trace
        .writes()
        .iter()
        .filter(|w| wired.contains(w.at))
        .any(|w| w.percent > 0);
    assert!(!lit_during_wired);
}

#[test]
fn suspend_without_fade_option_plays_sequence() {
    let driver = MockIndicator::new();
    let trace = driver.trace();
    let config = quiet().with_indicator(
        IndicatorConfig::default()
            .with_show_battery_on_startup(false)
            .with_fade_out_on_suspend(false),
    );
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        config,
        driver,
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(true),
    )
    .unwrap();

    indicator.state().set_wired(WiredConnectionState::Suspended);
    indicator
        .scheduler()
        .schedule(JobKind::Wired, Job::WiredSequence, Duration::ZERO);
    assert!(indicator.scheduler().wait_idle(TIMEOUT));

    for light in 0..4 {
        assert!(trace.levels_for(light).contains(&100));
    }
}

// ============================================================================
// Failure Handling
// ============================================================================

#[test]
fn failing_light_does_not_stop_animation() {
    let driver = MockIndicator::new().failing_light(0);
    let trace = driver.trace();
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        quiet(),
        driver,
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(true),
    )
    .unwrap();

    indicator.on_wired_connection_changed(WiredConnectionState::Powered);
    assert!(indicator.scheduler().wait_idle(TIMEOUT));

    let record = indicator.scheduler().recent_jobs()[0];
    assert_eq!(record.outcome, JobOutcome::Completed);
    assert!(trace.levels_for(0).is_empty());
    for light in 1..4 {
        assert!(trace.levels_for(light).contains(&100));
    }
}

#[test]
fn hide_battery_is_a_no_op() {
    let driver = MockIndicator::new();
    let trace = driver.trace();
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        quiet(),
        driver,
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(true),
    )
    .unwrap();
    trace.clear();

    assert_eq!(
        indicator.hide_battery(),
        TriggerOutcome::Ignored {
            reason: IgnoreReason::NoEffect
        }
    );
    assert!(indicator.scheduler().wait_idle(TIMEOUT));
    assert!(trace.is_empty());
}

#[test]
fn jobs_after_shutdown_are_dropped() {
    let indicator = StatusIndicator::start::<_, _, _, 4>(
        quiet(),
        MockIndicator::new(),
        MockDelay::new(),
        Arc::new(MockBattery::default()),
        MockLink::new(true),
    )
    .unwrap();
    let handle = indicator.scheduler().clone();

    drop(indicator);

    assert_eq!(
        handle.schedule(JobKind::Profile, Job::ShowBattery, Duration::ZERO),
        ScheduleResult::Stopped
    );
}
