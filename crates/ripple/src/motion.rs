//! Background loop that settles a disturbed field
//!
//! A run is one bounded session of ticks on its own thread:
//!
//! ```text
//!   Idle ──start──▶ Running ──converged / timed out / stopped──▶ Terminated
//!                      ▲                                              │
//!                      └───────────────────start──────────────────────┘
//! ```
//!
//! Only one run exists at a time. Starting while a run is active is a no-op;
//! whatever was written to the field (a second impulse, say) is picked up by
//! the running loop on its next tick, and that run keeps its own timer.

use crate::error::{Result, SimulationError};
use crate::physics::SharedField;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

/// Cadence and time box of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionSettings {
    /// Simulated time per tick, also the sleep between ticks
    pub tick_interval: Duration,
    /// Simulated time after which a run stops without converging
    pub max_duration: Duration,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(10),
            max_duration: Duration::from_secs(2),
        }
    }
}

impl MotionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(SimulationError::invalid("tick interval must be positive"));
        }
        if self.max_duration < self.tick_interval {
            return Err(SimulationError::invalid(format!(
                "max duration {:?} is shorter than one tick ({:?})",
                self.max_duration, self.tick_interval
            )));
        }
        Ok(())
    }

    /// Ticks a run performs if it never converges.
    pub fn max_ticks(&self) -> u64 {
        let per_tick = self.tick_interval.as_nanos();
        self.max_duration.as_nanos().div_ceil(per_tick) as u64
    }
}

/// Why a run ended. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The field settled and was reset to rest
    Converged,
    /// `max_duration` elapsed; heights left as the last tick computed
    TimedOut,
    /// `stop()` was called; state left as of the last completed tick
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub ticks: u64,
    pub elapsed: Duration,
    pub termination: Termination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Terminated(RunReport),
}

struct Worker {
    handle: JoinHandle<()>,
    cancel: Arc<AtomicBool>,
}

/// The worker stays here until its run has terminated, so `stop()` can always
/// reach the cancel flag of the active run.
#[derive(Default)]
struct Control {
    state: RunState,
    worker: Option<Worker>,
    /// Number of the most recently started run
    run: u64,
    /// Report of the most recently finished run
    report: Option<RunReport>,
}

#[derive(Default)]
struct Shared {
    control: Mutex<Control>,
    finished: Condvar,
    active_runs: AtomicUsize,
    runs_started: AtomicU64,
}

impl Shared {
    /// Close the run. Callers that still hold the field lock keep the final
    /// tick and the state change atomic for anyone starting a new run.
    fn finish(&self, report: RunReport) {
        let mut control = self.control.lock();
        self.active_runs.fetch_sub(1, Ordering::SeqCst);
        control.state = RunState::Terminated(report);
        control.report = Some(report);
        self.finished.notify_all();
    }
}

pub struct MotionController {
    settings: MotionSettings,
    shared: Arc<Shared>,
}

impl MotionController {
    pub fn new(settings: MotionSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            shared: Arc::new(Shared::default()),
        })
    }

    pub fn settings(&self) -> MotionSettings {
        self.settings
    }

    /// Begin a run on `field` unless one is already active.
    ///
    /// Returns `true` when a new run was spawned. Safe to call while holding
    /// the field lock: the new thread waits for it before its first tick.
    pub fn start(&self, field: &SharedField) -> bool {
        let mut control = self.shared.control.lock();
        if control.state == RunState::Running {
            debug!("run already active, impulse layered onto it");
            return false;
        }

        // A finished worker has nothing left to do but return
        if let Some(previous) = control.worker.take() {
            let _ = previous.handle.join();
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let run = Run {
            field: Arc::clone(field),
            shared: Arc::clone(&self.shared),
            cancel: Arc::clone(&cancel),
            settings: self.settings,
        };

        self.shared.active_runs.fetch_add(1, Ordering::SeqCst);
        let number = self.shared.runs_started.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            run = number,
            tick_ms = self.settings.tick_interval.as_millis() as u64,
            max_ms = self.settings.max_duration.as_millis() as u64,
            "starting motion run"
        );

        let handle = thread::Builder::new()
            .name(format!("ripple-motion-{number}"))
            .spawn(move || run.execute());

        match handle {
            Ok(handle) => {
                control.state = RunState::Running;
                control.run = number;
                control.worker = Some(Worker { handle, cancel });
                true
            }
            Err(e) => {
                error!("failed to spawn motion thread: {}", e);
                self.shared.active_runs.fetch_sub(1, Ordering::SeqCst);
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.control.lock().state == RunState::Running
    }

    pub fn state(&self) -> RunState {
        self.shared.control.lock().state
    }

    pub fn last_report(&self) -> Option<RunReport> {
        match self.state() {
            RunState::Terminated(report) => Some(report),
            _ => None,
        }
    }

    /// Runs currently executing; never more than one.
    pub fn active_runs(&self) -> usize {
        self.shared.active_runs.load(Ordering::SeqCst)
    }

    /// Runs spawned over the controller's lifetime.
    pub fn runs_started(&self) -> u64 {
        self.shared.runs_started.load(Ordering::SeqCst)
    }

    /// Ask the active run to exit and wait for it.
    ///
    /// Returns the report of the run that was active, if any. The field keeps
    /// the state of the last completed tick. Callers blocked in [`wait`]
    /// wake up with the same report.
    ///
    /// [`wait`]: Self::wait
    pub fn stop(&self) -> Option<RunReport> {
        let control = self.shared.control.lock();
        if control.state == RunState::Running {
            if let Some(worker) = &control.worker {
                worker.cancel.store(true, Ordering::SeqCst);
                worker.handle.thread().unpark();
            }
        }
        self.settle(control)
    }

    /// Block until the active run ends on its own or is stopped.
    pub fn wait(&self) -> Option<RunReport> {
        let control = self.shared.control.lock();
        self.settle(control)
    }

    /// Wait for the run active on entry to terminate, then reap its thread.
    ///
    /// Returns `None` when there was no run left to wait for.
    fn settle(&self, mut control: MutexGuard<'_, Control>) -> Option<RunReport> {
        if control.state != RunState::Running && control.worker.is_none() {
            return None;
        }

        let run = control.run;
        while control.state == RunState::Running && control.run == run {
            self.shared.finished.wait(&mut control);
        }

        // A newer run may already be active; its worker is not ours to join
        let worker = match control.state {
            RunState::Running => None,
            _ => control.worker.take(),
        };
        let report = control.report;
        drop(control);

        if let Some(worker) = worker {
            let _ = worker.handle.join();
        }
        report
    }
}

impl Drop for MotionController {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Run {
    field: SharedField,
    shared: Arc<Shared>,
    cancel: Arc<AtomicBool>,
    settings: MotionSettings,
}

impl Run {
    fn execute(self) {
        let mut ticks = 0u64;
        let mut elapsed = Duration::ZERO;

        loop {
            if self.cancelled() {
                let report = RunReport {
                    ticks,
                    elapsed,
                    termination: Termination::Cancelled,
                };
                info!(ticks, "motion run cancelled");
                self.shared.finish(report);
                return;
            }

            {
                let mut field = self.field.lock();
                let at_rest = field.advance();
                ticks += 1;
                elapsed += self.settings.tick_interval;
                trace!(ticks, at_rest, "tick");

                let termination = if at_rest {
                    field.reset_to_rest();
                    Some(Termination::Converged)
                } else if elapsed >= self.settings.max_duration {
                    Some(Termination::TimedOut)
                } else {
                    None
                };

                if let Some(termination) = termination {
                    info!(
                        ticks,
                        elapsed_ms = elapsed.as_millis() as u64,
                        ?termination,
                        "motion run finished"
                    );
                    self.shared.finish(RunReport {
                        ticks,
                        elapsed,
                        termination,
                    });
                    return;
                }
            }

            self.sleep();
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Park until the next tick is due; `stop()` unparks early.
    fn sleep(&self) {
        let deadline = Instant::now() + self.settings.tick_interval;
        while !self.cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Field, FieldLayout, FieldParameters};

    fn settings(tick_ms: u64, max_ms: u64) -> MotionSettings {
        MotionSettings {
            tick_interval: Duration::from_millis(tick_ms),
            max_duration: Duration::from_millis(max_ms),
        }
    }

    fn field() -> SharedField {
        Field::new(
            FieldLayout {
                width: 16,
                sample_interval: 2,
            },
            FieldParameters::default(),
        )
        .unwrap()
        .into_shared()
    }

    #[test]
    fn test_settings_validation() {
        assert!(MotionSettings::default().validate().is_ok());
        assert!(settings(0, 10).validate().is_err());
        assert!(settings(10, 5).validate().is_err());
        assert!(MotionController::new(settings(0, 10)).is_err());
    }

    #[test]
    fn test_max_ticks() {
        assert_eq!(MotionSettings::default().max_ticks(), 200);
        assert_eq!(settings(3, 10).max_ticks(), 4);
    }

    #[test]
    fn test_starts_idle() {
        let controller = MotionController::new(settings(1, 10)).unwrap();
        assert_eq!(controller.state(), RunState::Idle);
        assert!(!controller.is_running());
        assert_eq!(controller.last_report(), None);
        assert_eq!(controller.stop(), None);
        assert_eq!(controller.wait(), None);
    }

    #[test]
    fn test_resting_field_converges_on_first_tick() {
        let controller = MotionController::new(settings(1, 100)).unwrap();
        let field = field();

        assert!(controller.start(&field));
        let report = controller.wait().unwrap();

        assert_eq!(report.termination, Termination::Converged);
        assert_eq!(report.ticks, 1);
        assert_eq!(controller.active_runs(), 0);
        assert!(field.lock().snapshot().is_flat());
    }

    #[test]
    fn test_restart_after_termination() {
        let controller = MotionController::new(settings(1, 100)).unwrap();
        let field = field();

        assert!(controller.start(&field));
        controller.wait();
        assert!(controller.start(&field));
        controller.wait();

        assert_eq!(controller.runs_started(), 2);
        assert_eq!(controller.active_runs(), 0);
    }

    #[test]
    fn test_stop_cancels_promptly() {
        let controller = MotionController::new(settings(50, 60_000)).unwrap();
        let field = field();
        field.lock().apply_impulse(3, 200.0).unwrap();

        assert!(controller.start(&field));
        let started = Instant::now();
        let report = controller.stop().unwrap();

        assert_eq!(report.termination, Termination::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!controller.is_running());
        assert_eq!(controller.active_runs(), 0);
    }

    #[test]
    fn test_stop_reaches_run_with_blocked_waiter() {
        let controller = MotionController::new(settings(10, 60_000)).unwrap();
        let field = field();
        field.lock().apply_impulse(3, 200.0).unwrap();
        assert!(controller.start(&field));

        let started = Instant::now();
        let (waited, stopped) = thread::scope(|scope| {
            let waiter = scope.spawn(|| controller.wait());
            thread::sleep(Duration::from_millis(30));
            let stopped = controller.stop();
            (waiter.join().unwrap(), stopped)
        });

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(stopped.map(|r| r.termination), Some(Termination::Cancelled));
        assert_eq!(waited, stopped);
        assert!(!controller.is_running());
        assert_eq!(controller.active_runs(), 0);
    }
}
