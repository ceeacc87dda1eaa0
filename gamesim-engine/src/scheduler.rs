//! Drivers that turn a run's waits into real or virtual delays.
use std::time::Duration;

use rand::Rng;

use crate::numbers::scale_ms;
use crate::run::{RunObserver, RunStatus, RunStep, SimulationRun};

/// Delay-then-continue primitive used to pace a run.
pub trait Scheduler {
    fn delay(&mut self, duration: Duration);
}

/// Scheduler that never sleeps; it only tallies the time it was asked to wait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    elapsed: Duration,
    delays: u64,
}

impl VirtualClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            delays: 0,
        }
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of non-zero delays requested.
    #[must_use]
    pub const fn delays(&self) -> u64 {
        self.delays
    }
}

impl Scheduler for VirtualClock {
    fn delay(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(duration);
        self.delays = self.delays.saturating_add(1);
    }
}

/// Scheduler that blocks the current thread for each delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn delay(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Presentation delay for a wait of `duration_ms` at `speed`.
///
/// Only scheduling is scaled; durations recorded in outcomes never are.
#[must_use]
pub fn scaled_delay(duration_ms: u64, speed: f64) -> Duration {
    Duration::from_millis(scale_ms(duration_ms, speed))
}

/// Step `run` to completion, sleeping through `scheduler` and reporting to `observer`.
pub fn drive<R, S, O>(
    run: &mut SimulationRun<R>,
    scheduler: &mut S,
    speed: f64,
    observer: &mut O,
) -> RunStatus
where
    R: Rng,
    S: Scheduler + ?Sized,
    O: RunObserver + ?Sized,
{
    loop {
        match run.step() {
            RunStep::Wait { duration_ms, .. } => scheduler.delay(scaled_delay(duration_ms, speed)),
            RunStep::ActionResolved {
                event_number,
                action,
            } => observer.on_action_resolved(event_number, &action),
            RunStep::EventComplete(outcome) => observer.on_event_complete(&outcome),
            RunStep::Finished(status) => {
                observer.on_simulation_complete(status);
                return status;
            }
        }
    }
}

/// Async counterpart of [`drive`] backed by `tokio::time::sleep`.
#[cfg(feature = "async")]
pub async fn drive_async<R, O>(run: &mut SimulationRun<R>, speed: f64, observer: &mut O) -> RunStatus
where
    R: Rng,
    O: RunObserver + ?Sized,
{
    loop {
        match run.step() {
            RunStep::Wait { duration_ms, .. } => {
                let delay = scaled_delay(duration_ms, speed);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            RunStep::ActionResolved {
                event_number,
                action,
            } => observer.on_action_resolved(event_number, &action),
            RunStep::EventComplete(outcome) => observer.on_event_complete(&outcome),
            RunStep::Finished(status) => {
                observer.on_simulation_complete(status);
                return status;
            }
        }
    }
}
