//! Stance planning for an event before it executes.
use serde::{Deserialize, Serialize};

use crate::action::{Event, PlannedAction};
use crate::pitch::{CourtZone, Stance};

/// Stances each turn of an event must reach, in action order.
///
/// `None` means the turn has nothing to line up for and resolves as an
/// identity turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPlan {
    pub start_zone: CourtZone,
    pub turn_targets: [Option<Stance>; 2],
}

impl EventPlan {
    /// Target stance for the `nth` turn (0-based) of the event.
    #[must_use]
    pub fn turn_target(&self, nth: usize) -> Option<Stance> {
        self.turn_targets.get(nth).copied().flatten()
    }
}

/// Resolve the stance each turn prepares for, given where the ball starts.
///
/// A turn prepares for the action that follows it: before a move the player
/// gets behind the ball relative to the direction of travel, before a pass
/// the player lines up opposite the target side.
#[must_use]
pub fn plan_event(event: &Event, start_zone: CourtZone) -> EventPlan {
    let mut zone = start_zone;
    let mut turn_targets = [None, None];
    let mut turn_slot = 0;

    for (idx, action) in event.actions.iter().enumerate() {
        match action {
            PlannedAction::Turn => {
                let target = match event.actions.get(idx + 1) {
                    Some(PlannedAction::Move { target_zone }) => zone.push_stance(*target_zone),
                    Some(PlannedAction::Pass { side, .. }) => Some(side.pass_stance()),
                    Some(PlannedAction::Turn) | None => None,
                };
                if let Some(slot) = turn_targets.get_mut(turn_slot) {
                    *slot = target;
                }
                turn_slot += 1;
            }
            PlannedAction::Move { target_zone } => zone = *target_zone,
            PlannedAction::Pass { .. } => {}
        }
    }

    EventPlan {
        start_zone,
        turn_targets,
    }
}
