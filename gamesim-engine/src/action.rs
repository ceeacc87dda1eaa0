//! Planned events and the actions resolved while a run executes them.
use serde::{Deserialize, Serialize};

use crate::pitch::{CourtZone, PitchSide, Stance};
use crate::timing::TurnType;

/// Number of actions making up every event.
pub const ACTIONS_PER_EVENT: usize = 4;

/// Action as laid out by the event generator.
///
/// Turn stances and turn/move durations are only known once the run reaches
/// the action; the pass duration is fixed at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlannedAction {
    Turn,
    Move {
        target_zone: CourtZone,
    },
    Pass {
        side: PitchSide,
        target_side_name: String,
        required_zone: CourtZone,
        duration_ms: u64,
    },
}

impl PlannedAction {
    #[must_use]
    pub fn pass(side: PitchSide, duration_ms: u64) -> Self {
        Self::Pass {
            side,
            target_side_name: side.name().to_string(),
            required_zone: side.required_zone(),
            duration_ms,
        }
    }

    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Turn => ActionType::Turn,
            Self::Move { .. } => ActionType::Move,
            Self::Pass { .. } => ActionType::Pass,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Turn,
    Move,
    Pass,
}

/// A receive-and-pass sequence: `[Turn, Move, Turn, Pass]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// One-based position in the run.
    pub id: u32,
    pub actions: [PlannedAction; ACTIONS_PER_EVENT],
}

impl Event {
    /// Build the fixed action layout for a pass toward `side`.
    #[must_use]
    pub fn for_side(id: u32, side: PitchSide, pass_duration_ms: u64) -> Self {
        Self {
            id,
            actions: [
                PlannedAction::Turn,
                PlannedAction::Move {
                    target_zone: side.required_zone(),
                },
                PlannedAction::Turn,
                PlannedAction::pass(side, pass_duration_ms),
            ],
        }
    }

    /// Side targeted by this event's pass.
    #[must_use]
    pub fn side(&self) -> Option<PitchSide> {
        self.actions.iter().find_map(|action| match action {
            PlannedAction::Pass { side, .. } => Some(*side),
            _ => None,
        })
    }

    #[must_use]
    pub fn move_target(&self) -> Option<CourtZone> {
        self.actions.iter().find_map(|action| match action {
            PlannedAction::Move { target_zone } => Some(*target_zone),
            _ => None,
        })
    }

    #[must_use]
    pub fn action_types(&self) -> [ActionType; ACTIONS_PER_EVENT] {
        let [a, b, c, d] = &self.actions;
        [
            a.action_type(),
            b.action_type(),
            c.action_type(),
            d.action_type(),
        ]
    }
}

/// Action as actually performed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolvedAction {
    Turn {
        starting_stance: Stance,
        finishing_stance: Stance,
        turn_type: TurnType,
        duration_ms: u64,
        has_error: bool,
    },
    Move {
        from_zone: CourtZone,
        target_zone: CourtZone,
        duration_ms: u64,
        has_error: bool,
    },
    Pass {
        side: PitchSide,
        target_side_name: String,
        required_zone: CourtZone,
        duration_ms: u64,
        has_error: bool,
    },
}

impl ResolvedAction {
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Turn { .. } => ActionType::Turn,
            Self::Move { .. } => ActionType::Move,
            Self::Pass { .. } => ActionType::Pass,
        }
    }

    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        match self {
            Self::Turn { duration_ms, .. }
            | Self::Move { duration_ms, .. }
            | Self::Pass { duration_ms, .. } => *duration_ms,
        }
    }

    #[must_use]
    pub const fn has_error(&self) -> bool {
        match self {
            Self::Turn { has_error, .. }
            | Self::Move { has_error, .. }
            | Self::Pass { has_error, .. } => *has_error,
        }
    }

    /// Whether the player actually did something (identity turns and
    /// zero-length moves are skipped).
    #[must_use]
    pub const fn is_performed(&self) -> bool {
        match self {
            Self::Turn { turn_type, .. } => !matches!(turn_type, TurnType::Identity),
            Self::Move { duration_ms, .. } => *duration_ms > 0,
            Self::Pass { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_layout_is_turn_move_turn_pass() {
        let event = Event::for_side(1, PitchSide::Bottom, 400);
        assert_eq!(
            event.action_types(),
            [
                ActionType::Turn,
                ActionType::Move,
                ActionType::Turn,
                ActionType::Pass
            ]
        );
        assert_eq!(event.side(), Some(PitchSide::Bottom));
        assert_eq!(event.move_target(), Some(CourtZone::C));
    }

    #[test]
    fn planned_actions_serialize_with_type_tag() {
        let json = serde_json::to_value(PlannedAction::pass(PitchSide::Top, 250)).unwrap();
        assert_eq!(json["type"], "pass");
        assert_eq!(json["side"], 6);
        assert_eq!(json["target_side_name"], "Top");
        assert_eq!(json["required_zone"], "A");
    }

    #[test]
    fn skipped_actions_are_not_performed() {
        let identity = ResolvedAction::Turn {
            starting_stance: Stance::Left,
            finishing_stance: Stance::Left,
            turn_type: TurnType::Identity,
            duration_ms: 0,
            has_error: false,
        };
        let stay = ResolvedAction::Move {
            from_zone: CourtZone::A,
            target_zone: CourtZone::A,
            duration_ms: 0,
            has_error: false,
        };
        assert!(!identity.is_performed());
        assert!(!stay.is_performed());
        assert_eq!(stay.action_type(), ActionType::Move);
    }
}
