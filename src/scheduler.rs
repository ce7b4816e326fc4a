//! Single-worker animation scheduler.
//!
//! All light animation runs on one dedicated worker thread. Triggers never
//! touch the lights; they hand a [`Job`] to the scheduler through a
//! [`SchedulerHandle`] and return immediately.
//!
//! # Slots
//!
//! Instead of a general queue, every [`JobKind`] owns one pending slot:
//!
//! | Call | Slot empty | Slot pending |
//! |------|------------|--------------|
//! | [`schedule`](SchedulerHandle::schedule) | queue at `now + delay` | replace the job, keep the earlier deadline |
//! | [`reschedule`](SchedulerHandle::reschedule) | queue at `now + delay` | replace the job and the deadline |
//! | [`cancel`](SchedulerHandle::cancel) | no-op | empty the slot |
//!
//! A job that has started running has already left its slot, so scheduling
//! its kind again queues a fresh run behind it. When several slots are due
//! the one queued first runs first.
//!
//! # Failure Handling
//!
//! A job that returns an error or panics is logged and dropped. The worker
//! carries on with the next due job; nothing is retried.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use indicator_leds::jobs::{Job, JobKind};
//! use indicator_leds::scheduler::{AnimationScheduler, JobRunner, SchedulerHandle};
//! use indicator_leds::LightError;
//!
//! struct Count(u32);
//!
//! impl JobRunner for Count {
//!     fn run(&mut self, _job: Job, _scheduler: &SchedulerHandle) -> Result<(), LightError> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! let scheduler = AnimationScheduler::spawn(Count(0)).unwrap();
//! let handle = scheduler.handle();
//!
//! handle.schedule(JobKind::Battery, Job::ShowBattery, Duration::ZERO);
//! assert!(handle.wait_for_completed(1, Duration::from_secs(1)));
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use heapless::HistoryBuffer;
use log::{debug, error};

use crate::jobs::{Job, JobKind};
use crate::light_bank::LightError;

/// Number of finished jobs kept in the history.
pub const HISTORY_LEN: usize = 32;

// ============================================================================
// Public Types
// ============================================================================

/// Executes jobs on the worker thread.
///
/// The runner owns whatever the jobs drive (the light bank, the delay). It
/// receives the scheduler handle so a job can queue follow-up work, as the
/// reconnection watchdog does for its next tick.
pub trait JobRunner: Send {
    /// Run one job to completion.
    fn run(&mut self, job: Job, scheduler: &SchedulerHandle) -> Result<(), LightError>;
}

/// Result of handing a job to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleResult {
    /// The slot was empty; the job is now pending.
    Queued,
    /// A job of the same kind was already pending and has been replaced.
    Collapsed,
    /// The scheduler has shut down; the job was dropped.
    Stopped,
}

/// How a job ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Ran to completion.
    Completed,
    /// Returned an error.
    Failed,
    /// Panicked.
    Panicked,
}

/// One executed job, as recorded in the scheduler history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobRecord {
    /// Slot the job ran from.
    pub kind: JobKind,
    /// The job itself.
    pub job: Job,
    /// When the worker started it.
    pub started: Instant,
    /// When it returned.
    pub finished: Instant,
    /// How it ended.
    pub outcome: JobOutcome,
}

impl JobRecord {
    /// Returns true if `at` falls within this job's run.
    pub fn contains(&self, at: Instant) -> bool {
        self.started <= at && at <= self.finished
    }
}

// ============================================================================
// Slot Table
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct Pending {
    job: Job,
    due: Instant,
    seq: u64,
}

struct Slots {
    pending: [Option<Pending>; JobKind::COUNT],
    running: Option<JobKind>,
    next_seq: u64,
    completed: u64,
    history: HistoryBuffer<JobRecord, HISTORY_LEN>,
    shutdown: bool,
}

impl Slots {
    fn new() -> Self {
        Self {
            pending: [None; JobKind::COUNT],
            running: None,
            next_seq: 0,
            completed: 0,
            history: HistoryBuffer::new(),
            shutdown: false,
        }
    }

    fn seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Due slot queued earliest, if any.
    fn next_due(&self, now: Instant) -> Option<JobKind> {
        JobKind::ALL
            .iter()
            .filter_map(|&kind| self.pending[kind.slot()].map(|p| (kind, p)))
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| p.seq)
            .map(|(kind, _)| kind)
    }

    /// Earliest deadline among pending slots.
    fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().flatten().map(|p| p.due).min()
    }

    fn is_idle(&self) -> bool {
        self.running.is_none() && self.pending.iter().all(Option::is_none)
    }
}

struct Shared {
    slots: Mutex<Slots>,
    /// Signalled when a slot changes or on shutdown.
    wake: Condvar,
    /// Signalled when a job finishes.
    done: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable, thread-safe handle for queueing jobs.
///
/// Every method only takes a short internal lock; none waits for animation
/// except the explicit `wait_*` helpers.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<Shared>,
}

impl SchedulerHandle {
    /// Queue `job` in the `kind` slot to run after `delay`.
    ///
    /// If the slot is already pending the job is replaced but keeps its
    /// original deadline and queue position.
    pub fn schedule(&self, kind: JobKind, job: Job, delay: Duration) -> ScheduleResult {
        self.put(kind, job, delay, false)
    }

    /// Queue `job` in the `kind` slot to run after `delay`, replacing any
    /// pending job of that kind together with its deadline.
    pub fn reschedule(&self, kind: JobKind, job: Job, delay: Duration) -> ScheduleResult {
        self.put(kind, job, delay, true)
    }

    /// Drop the pending job of `kind`. Returns true if one was pending.
    ///
    /// A job of that kind that is already running is not affected.
    pub fn cancel(&self, kind: JobKind) -> bool {
        self.cancel_with(kind, || ()).1
    }

    /// Run `update` and drop the pending job of `kind` as one step.
    ///
    /// No other scheduling call can observe the state between the two.
    /// Returns the result of `update` and whether a job was pending.
    pub fn cancel_with<T>(&self, kind: JobKind, update: impl FnOnce() -> T) -> (T, bool) {
        let (value, cancelled) = {
            let mut slots = self.shared.lock();
            let value = update();
            (value, slots.pending[kind.slot()].take().is_some())
        };
        if cancelled {
            debug!("scheduler: cancelled pending {} job", kind.as_str());
            self.shared.wake.notify_all();
            self.shared.done.notify_all();
        }
        (value, cancelled)
    }

    /// Like [`reschedule`](Self::reschedule), but only if `condition` holds.
    ///
    /// The condition is checked in the same step as the job is queued, so it
    /// cannot race a [`cancel_with`](Self::cancel_with) that changes it.
    /// Returns `None` if the condition was false.
    pub fn reschedule_if(
        &self,
        kind: JobKind,
        job: Job,
        delay: Duration,
        condition: impl FnOnce() -> bool,
    ) -> Option<ScheduleResult> {
        let mut slots = self.shared.lock();
        if !condition() {
            return None;
        }
        let result = Self::put_locked(&mut slots, kind, job, delay, true);
        drop(slots);
        self.queued(kind, result, delay);
        Some(result)
    }

    /// Run `f` while holding the scheduler lock.
    ///
    /// Use this for a state decision that must not interleave with
    /// [`cancel_with`](Self::cancel_with) or
    /// [`reschedule_if`](Self::reschedule_if). `f` must not call back into
    /// the scheduler.
    pub fn with_lock<T>(&self, f: impl FnOnce() -> T) -> T {
        let _slots = self.shared.lock();
        f()
    }

    /// Returns true if a job of `kind` is waiting to run.
    pub fn is_pending(&self, kind: JobKind) -> bool {
        self.shared.lock().pending[kind.slot()].is_some()
    }

    /// Kind of the job currently running, if any.
    pub fn running(&self) -> Option<JobKind> {
        self.shared.lock().running
    }

    /// Number of jobs finished since the scheduler started.
    pub fn completed(&self) -> u64 {
        self.shared.lock().completed
    }

    /// The most recent finished jobs, oldest first.
    pub fn recent_jobs(&self) -> Vec<JobRecord> {
        self.shared.lock().history.oldest_ordered().copied().collect()
    }

    /// Block until at least `count` jobs have finished in total.
    ///
    /// Returns false if `timeout` elapses first.
    pub fn wait_for_completed(&self, count: u64, timeout: Duration) -> bool {
        self.wait_until(timeout, |slots| slots.completed >= count)
    }

    /// Block until no job is running or pending.
    ///
    /// Returns false if `timeout` elapses first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.wait_until(timeout, Slots::is_idle)
    }

    fn put(&self, kind: JobKind, job: Job, delay: Duration, replace_deadline: bool) -> ScheduleResult {
        let result = Self::put_locked(&mut self.shared.lock(), kind, job, delay, replace_deadline);
        self.queued(kind, result, delay);
        result
    }

    fn put_locked(
        slots: &mut Slots,
        kind: JobKind,
        job: Job,
        delay: Duration,
        replace_deadline: bool,
    ) -> ScheduleResult {
        if slots.shutdown {
            return ScheduleResult::Stopped;
        }

        let due = Instant::now() + delay;
        let seq = slots.seq();
        let slot = kind.slot();
        if slots.pending[slot].is_some() {
            if let Some(pending) = slots.pending[slot].as_mut() {
                pending.job = job;
                // A new deadline also moves the job to the back of the due order
                if replace_deadline {
                    pending.due = due;
                    pending.seq = seq;
                }
            }
            ScheduleResult::Collapsed
        } else {
            slots.pending[slot] = Some(Pending { job, due, seq });
            ScheduleResult::Queued
        }
    }

    fn queued(&self, kind: JobKind, result: ScheduleResult, delay: Duration) {
        if result == ScheduleResult::Stopped {
            debug!("scheduler: stopped, dropping {} job", kind.as_str());
            return;
        }
        debug!("scheduler: {} job {:?} in {:?}", kind.as_str(), result, delay);
        self.shared.wake.notify_all();
    }

    fn wait_until(&self, timeout: Duration, mut ready: impl FnMut(&Slots) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slots = self.shared.lock();
        loop {
            if ready(&slots) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            slots = self
                .shared
                .done
                .wait_timeout(slots, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Owner of the animation worker thread.
///
/// Dropping the scheduler lets the running job finish, discards pending
/// jobs and joins the worker.
pub struct AnimationScheduler {
    handle: SchedulerHandle,
    worker: Option<JoinHandle<()>>,
}

impl AnimationScheduler {
    /// Start the worker thread with `runner` executing every job.
    pub fn spawn<R: JobRunner + 'static>(runner: R) -> std::io::Result<Self> {
        let handle = SchedulerHandle {
            shared: Arc::new(Shared {
                slots: Mutex::new(Slots::new()),
                wake: Condvar::new(),
                done: Condvar::new(),
            }),
        };

        let worker_handle = handle.clone();
        let worker = thread::Builder::new()
            .name("indicator-animation".into())
            .spawn(move || worker_loop(runner, worker_handle))?;

        Ok(Self {
            handle,
            worker: Some(worker),
        })
    }

    /// Handle for queueing jobs. Clone it to hand it to other threads.
    pub fn handle(&self) -> &SchedulerHandle {
        &self.handle
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        {
            let mut slots = self.handle.shared.lock();
            slots.shutdown = true;
            slots.pending = [None; JobKind::COUNT];
        }
        self.handle.shared.wake.notify_all();
        self.handle.shared.done.notify_all();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("scheduler: worker thread panicked");
            }
        }
    }
}

fn worker_loop<R: JobRunner>(mut runner: R, handle: SchedulerHandle) {
    let shared = Arc::clone(&handle.shared);
    let mut slots = shared.lock();

    loop {
        if slots.shutdown {
            debug!("scheduler: worker stopping");
            return;
        }

        let now = Instant::now();
        let Some(kind) = slots.next_due(now) else {
            slots = match slots.next_deadline() {
                Some(due) => {
                    shared
                        .wake
                        .wait_timeout(slots, due.saturating_duration_since(now))
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => shared.wake.wait(slots).unwrap_or_else(PoisonError::into_inner),
            };
            continue;
        };

        let Some(pending) = slots.pending[kind.slot()].take() else {
            continue;
        };
        slots.running = Some(kind);
        drop(slots);

        debug!("scheduler: running {} job {:?}", kind.as_str(), pending.job);
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| runner.run(pending.job, &handle)));
        let finished = Instant::now();

        let outcome = match result {
            Ok(Ok(())) => JobOutcome::Completed,
            Ok(Err(e)) => {
                error!("scheduler: {} job failed: {}", kind.as_str(), e);
                JobOutcome::Failed
            }
            Err(_) => {
                error!("scheduler: {} job panicked", kind.as_str());
                JobOutcome::Panicked
            }
        };
        debug!(
            "scheduler: {} job finished in {:?} ({:?})",
            kind.as_str(),
            finished - started,
            outcome
        );

        slots = shared.lock();
        slots.running = None;
        slots.completed += 1;
        slots.history.write(JobRecord {
            kind,
            job: pending.job,
            started,
            finished,
            outcome,
        });
        shared.done.notify_all();
    }
}
