//! Trial controller: starts runs, drives them, and keeps the trial history.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::ResolvedAction;
use crate::config::{ConfigError, SimConfig};
use crate::constants::CONTINUOUS_RESTART_DELAY_MS;
use crate::export::{TrialRow, trial_rows};
use crate::generator::generate_events;
use crate::probability::ProbabilityError;
use crate::rng::{CountingRng, RngBundle};
use crate::run::{EventOutcome, RunHandle, RunObserver, RunStatus, SimulationRun};
use crate::scheduler::{Scheduler, drive, scaled_delay};
use crate::score::TrialStats;
use crate::trial::Trial;

#[derive(Debug, Error, PartialEq)]
pub enum SimulatorError {
    #[error("a simulation run is already in progress")]
    RunInProgress,
    #[error("no simulation run has been started")]
    NoActiveRun,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Probability(#[from] ProbabilityError),
}

/// What the controller is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Idle,
    Single,
    Continuous,
    Stopped,
}

/// Cloneable stop request shared with whoever is watching the simulator.
///
/// Raising it cancels the active run at its next action boundary and ends a
/// continuous session before its next restart.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn stop(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.raised.store(false, Ordering::SeqCst);
    }
}

type EngineRun = SimulationRun<CountingRng<SmallRng>>;

#[derive(Debug)]
struct ActiveRun {
    seed: u64,
    run: EngineRun,
}

/// Forwards callbacks and converts a raised stop signal into run cancellation.
struct StopAware<'a, O: ?Sized> {
    inner: &'a mut O,
    stop: &'a StopSignal,
    handle: RunHandle,
}

impl<O: RunObserver + ?Sized> StopAware<'_, O> {
    fn check(&self) {
        if self.stop.is_stopped() && !self.handle.is_cancelled() {
            self.handle.cancel();
        }
    }
}

impl<O: RunObserver + ?Sized> RunObserver for StopAware<'_, O> {
    fn on_action_resolved(&mut self, event_number: u32, action: &ResolvedAction) {
        self.inner.on_action_resolved(event_number, action);
        self.check();
    }

    fn on_event_complete(&mut self, outcome: &EventOutcome) {
        self.inner.on_event_complete(outcome);
        self.check();
    }

    fn on_simulation_complete(&mut self, status: RunStatus) {
        self.inner.on_simulation_complete(status);
    }
}

/// Owns the configuration, the single active run, and the trial history.
#[derive(Debug)]
pub struct Simulator {
    config: SimConfig,
    mode: RunMode,
    active: Option<ActiveRun>,
    trials: Vec<Trial>,
    stop: StopSignal,
}

impl Simulator {
    /// # Errors
    ///
    /// Returns [`SimulatorError::Config`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        Ok(Self {
            config,
            mode: RunMode::Idle,
            active: None,
            trials: Vec::new(),
            stop: StopSignal::default(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Handle of the run currently started, if any.
    #[must_use]
    pub fn active_handle(&self) -> Option<RunHandle> {
        self.active.as_ref().map(|active| active.run.handle())
    }

    fn run_in_progress(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| {
                let handle = active.run.handle();
                handle.is_active() && !handle.is_cancelled()
            })
    }

    /// Generate events for `seed` and make the new run the active one.
    ///
    /// A cancelled run that was never driven is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError::RunInProgress`] while another run is active.
    pub fn start_run(&mut self, seed: u64) -> Result<RunHandle, SimulatorError> {
        if self.run_in_progress() {
            return Err(SimulatorError::RunInProgress);
        }
        let mut bundle = RngBundle::from_user_seed(seed);
        let order = self.config.side_order();
        if order.is_none()
            && let Some(short) = &self.config.fixed_side_order
        {
            warn!(
                "Ignoring fixed side order with {} entries; generating sides for seed {seed}",
                short.len()
            );
        }
        let events = generate_events(order.as_deref(), &self.config.player, bundle.sides())?;
        let (_, errors) = bundle.into_streams();
        let run = SimulationRun::new(events, self.config.player.clone(), errors);
        let handle = run.handle();
        debug!("Run prepared | seed {seed}");
        self.active = Some(ActiveRun { seed, run });
        if self.mode != RunMode::Continuous {
            self.stop.reset();
            self.mode = RunMode::Single;
        }
        Ok(handle)
    }

    /// Drive the active run to its end and record it.
    ///
    /// Returns `None` when the run was cancelled; cancelled runs are not kept.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError::NoActiveRun`] if no run was started.
    pub fn finish_run<S, O>(
        &mut self,
        scheduler: &mut S,
        observer: &mut O,
    ) -> Result<Option<&Trial>, SimulatorError>
    where
        S: Scheduler + ?Sized,
        O: RunObserver + ?Sized,
    {
        let speed = self.config.speed_multiplier;
        let active = self.active.as_mut().ok_or(SimulatorError::NoActiveRun)?;
        let mut guarded = StopAware {
            inner: observer,
            stop: &self.stop,
            handle: active.run.handle(),
        };
        let status = drive(&mut active.run, scheduler, speed, &mut guarded);
        let seed = active.seed;
        let outcomes = active.run.outcomes().to_vec();

        if self.mode == RunMode::Single {
            self.mode = if status == RunStatus::Cancelled {
                RunMode::Stopped
            } else {
                RunMode::Idle
            };
        }
        if status == RunStatus::Cancelled {
            info!("Run for seed {seed} cancelled; no trial recorded");
            return Ok(None);
        }

        let trial_number = u32::try_from(self.trials.len() + 1).unwrap_or(u32::MAX);
        let trial = Trial::from_outcomes(trial_number, seed, outcomes, status);
        info!(
            "Trial {} recorded | seed {} score {} unique {} errors {} total {}ms",
            trial.trial_number,
            seed,
            trial.score,
            trial.unique_hits,
            trial.error_count,
            trial.total_duration_ms
        );
        self.trials.push(trial);
        Ok(self.trials.last())
    }

    /// Start and drive one run for `seed`.
    ///
    /// # Errors
    ///
    /// See [`Simulator::start_run`] and [`Simulator::finish_run`].
    pub fn run_trial<S, O>(
        &mut self,
        seed: u64,
        scheduler: &mut S,
        observer: &mut O,
    ) -> Result<Option<&Trial>, SimulatorError>
    where
        S: Scheduler + ?Sized,
        O: RunObserver + ?Sized,
    {
        self.start_run(seed)?;
        self.finish_run(scheduler, observer)
    }

    /// Run back to back over `seeds`, pausing briefly between runs, until the
    /// seeds run out or the stop signal is raised. Returns the number of
    /// trials recorded.
    ///
    /// # Errors
    ///
    /// Propagates the first error from starting or driving a run.
    pub fn run_continuous<I, S, O>(
        &mut self,
        seeds: I,
        scheduler: &mut S,
        observer: &mut O,
    ) -> Result<usize, SimulatorError>
    where
        I: IntoIterator<Item = u64>,
        S: Scheduler + ?Sized,
        O: RunObserver + ?Sized,
    {
        if self.run_in_progress() {
            return Err(SimulatorError::RunInProgress);
        }
        self.stop.reset();
        self.mode = RunMode::Continuous;
        let restart = scaled_delay(CONTINUOUS_RESTART_DELAY_MS, self.config.speed_multiplier);
        let mut recorded = 0;
        let mut seeds = seeds.into_iter().peekable();

        while let Some(seed) = seeds.next() {
            if self.stop.is_stopped() {
                break;
            }
            self.start_run(seed)?;
            if self.finish_run(scheduler, observer)?.is_some() {
                recorded += 1;
            }
            if self.stop.is_stopped() || seeds.peek().is_none() {
                break;
            }
            scheduler.delay(restart);
        }

        self.mode = if self.stop.is_stopped() {
            RunMode::Stopped
        } else {
            RunMode::Idle
        };
        debug!("Continuous session ended | trials {recorded} mode {:?}", self.mode);
        Ok(recorded)
    }

    /// Cancel the active run and end any continuous session.
    pub fn stop(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.active_handle() {
            handle.cancel();
        }
        self.mode = RunMode::Stopped;
    }

    #[must_use]
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn clear_trials(&mut self) {
        self.trials.clear();
    }

    #[must_use]
    pub fn stats(&self) -> TrialStats {
        TrialStats::from_trials(&self.trials)
    }

    #[must_use]
    pub fn export_rows(&self) -> Vec<TrialRow> {
        trial_rows(&self.trials)
    }
}
