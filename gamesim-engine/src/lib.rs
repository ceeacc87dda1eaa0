//! Gamesim Engine
//!
//! Platform-agnostic core of the pitch strategy simulator: a player standing
//! on a three-zone court passes a ball to one of six pitch sides, twenty
//! events per run, under a fixed time budget. This crate provides the
//! probability model, event generation, skill-driven timing and errors, the
//! run state machine and trial scoring without any rendering or I/O.

pub mod action;
pub mod config;
pub mod constants;
pub mod export;
pub mod generator;
pub mod numbers;
pub mod pitch;
pub mod plan;
pub mod player;
pub mod probability;
pub mod rng;
pub mod run;
pub mod scheduler;
pub mod score;
pub mod simulator;
pub mod timing;
pub mod trial;

// Re-export commonly used types
pub use action::{ACTIONS_PER_EVENT, ActionType, Event, PlannedAction, ResolvedAction};
pub use config::{ConfigError, SimConfig};
pub use export::{EXPORT_HEADERS, TrialRow, trial_rows};
pub use generator::{
    SideCandidate, SideDecisionTrace, SideSequence, SideSource, events_for_sides,
    generate_events, generate_side_sequence,
};
pub use pitch::{CourtZone, PitchSide, Stance};
pub use plan::{EventPlan, plan_event};
pub use player::{Player, PlayerError};
pub use probability::{ProbabilityError, SideProbabilities, calculate_probabilities};
pub use rng::{CountingRng, RngBundle};
pub use run::{
    ActionLog, CallbackObserver, EventOutcome, NullObserver, RunHandle, RunObserver, RunState,
    RunStatus, RunStep, SimulationRun, WaitKind,
};
pub use scheduler::{Scheduler, ThreadScheduler, VirtualClock, drive, scaled_delay};
#[cfg(feature = "async")]
pub use scheduler::drive_async;
pub use score::{TrialStats, calculate_score, calculate_unique_hits, scoring_events};
pub use simulator::{RunMode, Simulator, SimulatorError, StopSignal};
pub use timing::{
    TurnType, adjusted_duration, error_rate, move_duration, pass_duration, roll_error,
    turn_duration, turn_type,
};
pub use trial::Trial;
