//! Step-driven state machine executing one run of planned events.
//!
//! The machine never touches a clock. Each call to [`SimulationRun::step`]
//! yields the next thing that happens: a suspension the driver should wait
//! out, a resolved action, a completed event, or the terminal status. A
//! driver (see [`crate::scheduler`]) turns waits into real or virtual delays.
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::action::{ACTIONS_PER_EVENT, Event, PlannedAction, ResolvedAction};
use crate::constants::{ERROR_TIMEOUT_MS, INTER_EVENT_DELAY_MS, MAX_SIMULATION_TIME_MS};
use crate::pitch::{CourtZone, Stance};
use crate::plan::{EventPlan, plan_event};
use crate::player::Player;
use crate::timing::{TurnType, move_duration, roll_error, turn_duration_for, turn_type};

/// Zone the ball occupies when a run starts.
pub const INITIAL_BALL_ZONE: CourtZone = CourtZone::B;
/// Stance the player holds when a run starts.
pub const INITIAL_STANCE: Stance = Stance::Below;

/// Resolved actions of one event; always four entries once complete.
pub type ActionLog = SmallVec<[ResolvedAction; ACTIONS_PER_EVENT]>;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    TimeLimitExceeded,
    Cancelled,
}

impl RunStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::TimeLimitExceeded | Self::Cancelled
        )
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::TimeLimitExceeded => 3,
            Self::Cancelled => 4,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::TimeLimitExceeded,
            4 => Self::Cancelled,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug)]
struct RunControl {
    cancelled: AtomicBool,
    status: AtomicU8,
}

/// Shared handle to a run: query its status or request a stop.
///
/// Cancellation is observed between actions; an action already suspended
/// finishes its wait, and the event it belongs to is discarded.
#[derive(Debug, Clone)]
pub struct RunHandle {
    inner: Arc<RunControl>,
}

impl RunHandle {
    fn new() -> Self {
        Self {
            inner: Arc::new(RunControl {
                cancelled: AtomicBool::new(false),
                status: AtomicU8::new(RunStatus::Idle.to_u8()),
            }),
        }
    }

    /// Request that the run stop at its next action boundary.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        RunStatus::from_u8(self.inner.status.load(Ordering::SeqCst))
    }

    /// True until the run reaches a terminal status.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.status().is_terminal()
    }

    fn set_status(&self, status: RunStatus) {
        self.inner.status.store(status.to_u8(), Ordering::SeqCst);
    }
}

/// Record emitted once per processed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    /// One-based event number.
    pub event_number: u32,
    pub side_number: u8,
    pub side_name: String,
    pub start_position: CourtZone,
    pub required_position: CourtZone,
    /// Action time plus error timeouts for this event.
    pub event_duration_ms: u64,
    /// Cumulative duration including this event.
    pub total_duration_ms: u64,
    pub error: bool,
    pub error_count: u32,
    pub actions: ActionLog,
    /// Set on the event whose duration carried the run across the time budget.
    pub exceeds_time_limit: bool,
}

/// Why the machine paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitKind {
    Turn,
    Move,
    /// Ball travelling out to the target side.
    PassOut,
    /// Ball coming back to the player.
    PassReturn,
    ErrorTimeout,
    InterEvent,
}

/// Output of a single [`SimulationRun::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStep {
    /// Suspend for `duration_ms` (unscaled) before stepping again.
    Wait { kind: WaitKind, duration_ms: u64 },
    /// An action finished; emitted after its own waits, before any error timeout.
    ActionResolved {
        event_number: u32,
        action: ResolvedAction,
    },
    EventComplete(EventOutcome),
    /// Terminal; repeated calls keep returning the same status.
    Finished(RunStatus),
}

/// Mutable position and progress of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub ball_zone: CourtZone,
    pub stance: Stance,
    /// Zero-based index of the event being executed.
    pub event_index: usize,
    /// Zero-based index of the next action within the current event.
    pub action_index: usize,
    pub total_duration_ms: u64,
    pub events: Vec<Event>,
}

impl RunState {
    fn new(events: Vec<Event>) -> Self {
        Self {
            ball_zone: INITIAL_BALL_ZONE,
            stance: INITIAL_STANCE,
            event_index: 0,
            action_index: 0,
            total_duration_ms: 0,
            events,
        }
    }
}

#[derive(Debug, Clone)]
struct EventProgress {
    plan: EventPlan,
    turns_done: usize,
    actions: ActionLog,
}

/// Callbacks fired by the drivers while a run executes.
pub trait RunObserver {
    fn on_action_resolved(&mut self, _event_number: u32, _action: &ResolvedAction) {}

    fn on_event_complete(&mut self, outcome: &EventOutcome);

    fn on_simulation_complete(&mut self, status: RunStatus);
}

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn on_event_complete(&mut self, _outcome: &EventOutcome) {}

    fn on_simulation_complete(&mut self, _status: RunStatus) {}
}

/// Observer built from a pair of closures.
pub struct CallbackObserver<E, C>
where
    E: FnMut(&EventOutcome),
    C: FnMut(RunStatus),
{
    on_event: E,
    on_complete: C,
}

impl<E, C> CallbackObserver<E, C>
where
    E: FnMut(&EventOutcome),
    C: FnMut(RunStatus),
{
    pub const fn new(on_event: E, on_complete: C) -> Self {
        Self {
            on_event,
            on_complete,
        }
    }
}

impl<E, C> RunObserver for CallbackObserver<E, C>
where
    E: FnMut(&EventOutcome),
    C: FnMut(RunStatus),
{
    fn on_event_complete(&mut self, outcome: &EventOutcome) {
        (self.on_event)(outcome);
    }

    fn on_simulation_complete(&mut self, status: RunStatus) {
        (self.on_complete)(status);
    }
}

/// One run over a list of planned events.
#[derive(Debug)]
pub struct SimulationRun<R> {
    player: Player,
    rng: R,
    state: RunState,
    status: RunStatus,
    handle: RunHandle,
    progress: Option<EventProgress>,
    pending: VecDeque<RunStep>,
    outcomes: Vec<EventOutcome>,
    time_limit_reached: bool,
}

impl<R: Rng> SimulationRun<R> {
    /// Prepare a run; `rng` drives the error rolls.
    #[must_use]
    pub fn new(events: Vec<Event>, player: Player, rng: R) -> Self {
        Self {
            player,
            rng,
            state: RunState::new(events),
            status: RunStatus::Idle,
            handle: RunHandle::new(),
            progress: None,
            pending: VecDeque::new(),
            outcomes: Vec::new(),
            time_limit_reached: false,
        }
    }

    #[must_use]
    pub fn handle(&self) -> RunHandle {
        self.handle.clone()
    }

    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Outcomes emitted so far, in event order.
    #[must_use]
    pub fn outcomes(&self) -> &[EventOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn into_outcomes(self) -> Vec<EventOutcome> {
        self.outcomes
    }

    /// Advance the machine to its next observable step.
    pub fn step(&mut self) -> RunStep {
        if let Some(step) = self.pending.pop_front() {
            return step;
        }
        match self.status {
            RunStatus::Idle => {
                debug!(
                    "Run started | events {} player {}",
                    self.state.events.len(),
                    self.player.name
                );
                self.set_status(RunStatus::Running);
            }
            RunStatus::Running => {}
            terminal => return RunStep::Finished(terminal),
        }

        loop {
            if let Some(step) = self.advance() {
                return step;
            }
            if let Some(step) = self.pending.pop_front() {
                return step;
            }
        }
    }

    /// Step until the machine reaches a terminal status, discarding waits.
    pub fn run_to_end(&mut self) -> RunStatus {
        loop {
            if let RunStep::Finished(status) = self.step() {
                return status;
            }
        }
    }

    fn set_status(&mut self, status: RunStatus) {
        self.status = status;
        self.handle.set_status(status);
    }

    fn finish(&mut self, status: RunStatus) -> RunStep {
        if status == RunStatus::Cancelled && self.progress.take().is_some() {
            debug!(
                "Run cancelled mid-event {}; discarding partial actions",
                self.state.event_index + 1
            );
        }
        self.set_status(status);
        info!(
            "Run finished | status {:?} events {} total {}ms",
            status,
            self.outcomes.len(),
            self.state.total_duration_ms
        );
        RunStep::Finished(status)
    }

    /// Produce the next step directly, or queue steps and return `None`.
    fn advance(&mut self) -> Option<RunStep> {
        if self.time_limit_reached {
            return Some(self.finish(RunStatus::TimeLimitExceeded));
        }
        if self.handle.is_cancelled() {
            return Some(self.finish(RunStatus::Cancelled));
        }
        if self.state.event_index >= self.state.events.len() {
            return Some(self.finish(RunStatus::Completed));
        }
        if self.state.action_index >= ACTIONS_PER_EVENT {
            return Some(self.complete_event());
        }
        self.resolve_next_action();
        None
    }

    fn resolve_next_action(&mut self) {
        let event_index = self.state.event_index;
        let action_index = self.state.action_index;
        let Some(event) = self.state.events.get(event_index) else {
            return;
        };
        let Some(planned) = event.actions.get(action_index).cloned() else {
            return;
        };
        let event_number = event.id;
        if self.progress.is_none() {
            self.progress = Some(EventProgress {
                plan: plan_event(event, self.state.ball_zone),
                turns_done: 0,
                actions: ActionLog::new(),
            });
        }

        let resolved = match planned {
            PlannedAction::Turn => self.resolve_turn(),
            PlannedAction::Move { target_zone } => self.resolve_move(target_zone),
            PlannedAction::Pass {
                side,
                target_side_name,
                required_zone,
                duration_ms,
            } => {
                let has_error = roll_error(self.player.passing, &mut self.rng);
                let out_ms = duration_ms / 2;
                self.pending.push_back(RunStep::Wait {
                    kind: WaitKind::PassOut,
                    duration_ms: out_ms,
                });
                self.pending.push_back(RunStep::Wait {
                    kind: WaitKind::PassReturn,
                    duration_ms: duration_ms - out_ms,
                });
                ResolvedAction::Pass {
                    side,
                    target_side_name,
                    required_zone,
                    duration_ms,
                    has_error,
                }
            }
        };

        let has_error = resolved.has_error();
        self.pending.push_back(RunStep::ActionResolved {
            event_number,
            action: resolved.clone(),
        });
        if has_error {
            self.pending.push_back(RunStep::Wait {
                kind: WaitKind::ErrorTimeout,
                duration_ms: ERROR_TIMEOUT_MS,
            });
        }
        if let Some(progress) = self.progress.as_mut() {
            progress.actions.push(resolved);
        }
        self.state.action_index += 1;
    }

    fn resolve_turn(&mut self) -> ResolvedAction {
        let nth = self.progress.as_ref().map_or(0, |p| p.turns_done);
        let target = self
            .progress
            .as_ref()
            .and_then(|p| p.plan.turn_target(nth));
        if let Some(progress) = self.progress.as_mut() {
            progress.turns_done += 1;
        }

        let starting_stance = self.state.stance;
        let finishing_stance = target.unwrap_or(starting_stance);
        let kind = turn_type(starting_stance, finishing_stance);
        let duration_ms = turn_duration_for(self.player.control, kind);
        let has_error = kind != TurnType::Identity && roll_error(self.player.control, &mut self.rng);
        if duration_ms > 0 {
            self.pending.push_back(RunStep::Wait {
                kind: WaitKind::Turn,
                duration_ms,
            });
        }
        self.state.stance = finishing_stance;
        ResolvedAction::Turn {
            starting_stance,
            finishing_stance,
            turn_type: kind,
            duration_ms,
            has_error,
        }
    }

    fn resolve_move(&mut self, target_zone: CourtZone) -> ResolvedAction {
        let from_zone = self.state.ball_zone;
        let duration_ms = move_duration(self.player.dribbling, from_zone, target_zone);
        let mut has_error = false;
        if duration_ms > 0 {
            self.pending.push_back(RunStep::Wait {
                kind: WaitKind::Move,
                duration_ms,
            });
            self.state.ball_zone = target_zone;
            has_error = roll_error(self.player.dribbling, &mut self.rng);
        }
        ResolvedAction::Move {
            from_zone,
            target_zone,
            duration_ms,
            has_error,
        }
    }

    fn complete_event(&mut self) -> RunStep {
        let progress = self.progress.take();
        let (plan_start, actions) = match progress {
            Some(progress) => (progress.plan.start_zone, progress.actions),
            None => (self.state.ball_zone, ActionLog::new()),
        };
        let event = self.state.events.get(self.state.event_index);
        let event_number = event.map_or(0, |e| e.id);
        let side = event.and_then(Event::side);

        let action_ms: u64 = actions.iter().map(ResolvedAction::duration_ms).sum();
        let error_count = u32::try_from(actions.iter().filter(|a| a.has_error()).count())
            .unwrap_or(u32::MAX);
        let event_duration_ms = action_ms + u64::from(error_count) * ERROR_TIMEOUT_MS;

        let before = self.state.total_duration_ms;
        let after = before.saturating_add(event_duration_ms);
        self.state.total_duration_ms = after;
        let exceeds_time_limit = before < MAX_SIMULATION_TIME_MS && after >= MAX_SIMULATION_TIME_MS;

        let outcome = EventOutcome {
            event_number,
            side_number: side.map_or(0, |s| s.number()),
            side_name: side.map_or_else(String::new, |s| s.name().to_string()),
            start_position: plan_start,
            required_position: side.map_or(plan_start, |s| s.required_zone()),
            event_duration_ms,
            total_duration_ms: after,
            error: error_count > 0,
            error_count,
            actions,
            exceeds_time_limit,
        };
        debug!(
            "Event {} complete | side {} duration {}ms total {}ms errors {}",
            outcome.event_number,
            outcome.side_number,
            outcome.event_duration_ms,
            outcome.total_duration_ms,
            outcome.error_count
        );

        self.outcomes.push(outcome.clone());
        self.state.event_index += 1;
        self.state.action_index = 0;

        if after >= MAX_SIMULATION_TIME_MS {
            self.time_limit_reached = true;
        } else if self.state.event_index < self.state.events.len() {
            self.pending.push_back(RunStep::Wait {
                kind: WaitKind::InterEvent,
                duration_ms: INTER_EVENT_DELAY_MS,
            });
        }

        RunStep::EventComplete(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::events_for_sides;
    use crate::pitch::PitchSide;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn sides(numbers: &[u8]) -> Vec<PitchSide> {
        numbers.iter().filter_map(|n| PitchSide::from_number(*n)).collect()
    }

    fn run_for(numbers: &[u8], player: Player) -> SimulationRun<SmallRng> {
        let events = events_for_sides(&sides(numbers), &player);
        SimulationRun::new(events, player, SmallRng::seed_from_u64(1))
    }

    #[test]
    fn first_event_steps_in_order() {
        let mut run = run_for(&[1, 6], Player::uniform(10));
        assert_eq!(run.status(), RunStatus::Idle);

        // Turn 1 is an identity turn: ball B→A needs the player below, which they already are.
        let step = run.step();
        assert!(matches!(
            step,
            RunStep::ActionResolved {
                event_number: 1,
                action: ResolvedAction::Turn {
                    turn_type: TurnType::Identity,
                    duration_ms: 0,
                    ..
                }
            }
        ));
        assert_eq!(run.status(), RunStatus::Running);
        assert_eq!(
            run.step(),
            RunStep::Wait {
                kind: WaitKind::Move,
                duration_ms: 150
            }
        );
        assert!(matches!(run.step(), RunStep::ActionResolved { .. }));
        assert_eq!(
            run.step(),
            RunStep::Wait {
                kind: WaitKind::Turn,
                duration_ms: 150
            }
        );
        assert!(matches!(run.step(), RunStep::ActionResolved { .. }));
        assert_eq!(
            run.step(),
            RunStep::Wait {
                kind: WaitKind::PassOut,
                duration_ms: 125
            }
        );
        assert_eq!(
            run.step(),
            RunStep::Wait {
                kind: WaitKind::PassReturn,
                duration_ms: 125
            }
        );
        assert!(matches!(run.step(), RunStep::ActionResolved { .. }));
        let RunStep::EventComplete(outcome) = run.step() else {
            panic!("expected event completion");
        };
        assert_eq!(outcome.event_number, 1);
        assert_eq!(outcome.side_number, 1);
        assert_eq!(outcome.start_position, CourtZone::B);
        assert_eq!(outcome.required_position, CourtZone::A);
        assert_eq!(outcome.event_duration_ms, 550);
        assert_eq!(outcome.actions.len(), 4);
        assert_eq!(
            run.step(),
            RunStep::Wait {
                kind: WaitKind::InterEvent,
                duration_ms: 300
            }
        );
    }

    #[test]
    fn always_fumbling_player_pays_error_timeouts() {
        let mut run = run_for(&[3], Player::uniform(1));
        let mut error_waits = 0;
        let outcome = loop {
            match run.step() {
                RunStep::Wait {
                    kind: WaitKind::ErrorTimeout,
                    duration_ms,
                } => {
                    assert_eq!(duration_ms, 1_000);
                    error_waits += 1;
                }
                RunStep::EventComplete(outcome) => break outcome,
                RunStep::Finished(status) => panic!("finished early: {status:?}"),
                _ => {}
            }
        };
        // The opening half turn, the B→C move and the pass fumble; the second
        // turn is already lined up for a pass to the bottom side.
        assert_eq!(outcome.error_count, 3);
        assert_eq!(error_waits, 3);
        let action_ms: u64 = outcome.actions.iter().map(ResolvedAction::duration_ms).sum();
        assert_eq!(action_ms, 3_000 + 1_000 + 1_000);
        assert_eq!(outcome.event_duration_ms, action_ms + 3_000);
        assert_eq!(run.step(), RunStep::Finished(RunStatus::Completed));
    }

    #[test]
    fn cancellation_discards_the_interrupted_event() {
        let mut run = run_for(&[1, 6, 1], Player::uniform(10));
        let handle = run.handle();
        while !matches!(run.step(), RunStep::EventComplete(_)) {}
        // Mid-way through the second event.
        let _ = run.step();
        let _ = run.step();
        let _ = run.step();
        handle.cancel();
        let status = run.run_to_end();
        assert_eq!(status, RunStatus::Cancelled);
        assert_eq!(handle.status(), RunStatus::Cancelled);
        assert!(!handle.is_active());
        assert_eq!(run.outcomes().len(), 1);
    }

    #[test]
    fn finished_runs_stay_finished() {
        let mut run = run_for(&[2], Player::uniform(10));
        assert_eq!(run.run_to_end(), RunStatus::Completed);
        assert_eq!(run.step(), RunStep::Finished(RunStatus::Completed));
    }

    #[test]
    fn empty_event_list_completes_immediately() {
        let mut run = SimulationRun::new(Vec::new(), Player::default(), SmallRng::seed_from_u64(0));
        assert_eq!(run.step(), RunStep::Finished(RunStatus::Completed));
        assert!(run.outcomes().is_empty());
    }
}
