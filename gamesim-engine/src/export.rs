//! Flat per-trial rows for tabular export.
use log::warn;
use serde::{Deserialize, Serialize};

use crate::action::ResolvedAction;
use crate::constants::PITCH_SIDE_COUNT;
use crate::timing::TurnType;
use crate::trial::Trial;

/// Column headers matching the field order of [`TrialRow`].
pub const EXPORT_HEADERS: [&str; 13] = [
    "ID",
    "Side1",
    "Side2",
    "Side3",
    "Side4",
    "Side5",
    "Side6",
    "Actions",
    "Quarter-turns",
    "Half-turns",
    "Moves",
    "Errors",
    "Score",
];

/// One exported trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrialRow {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Side1")]
    pub side1: u32,
    #[serde(rename = "Side2")]
    pub side2: u32,
    #[serde(rename = "Side3")]
    pub side3: u32,
    #[serde(rename = "Side4")]
    pub side4: u32,
    #[serde(rename = "Side5")]
    pub side5: u32,
    #[serde(rename = "Side6")]
    pub side6: u32,
    #[serde(rename = "Actions")]
    pub actions: u32,
    #[serde(rename = "Quarter-turns")]
    pub quarter_turns: u32,
    #[serde(rename = "Half-turns")]
    pub half_turns: u32,
    #[serde(rename = "Moves")]
    pub moves: u32,
    #[serde(rename = "Errors")]
    pub errors: u32,
    #[serde(rename = "Score")]
    pub score: u32,
}

impl TrialRow {
    /// Count hits and performed actions over the trial's scoring events.
    #[must_use]
    pub fn from_trial(trial: &Trial) -> Self {
        let mut hits = [0_u32; PITCH_SIDE_COUNT as usize];
        let mut row = Self {
            id: trial.trial_number,
            errors: trial.error_count,
            score: trial.score,
            ..Self::default()
        };

        for event in trial.scoring_events() {
            if let Some(slot) = usize::from(event.side_number)
                .checked_sub(1)
                .and_then(|idx| hits.get_mut(idx))
            {
                *slot += 1;
            }
            for action in event.actions.iter().filter(|a| a.is_performed()) {
                row.actions += 1;
                match action {
                    ResolvedAction::Turn {
                        turn_type: TurnType::Quarter,
                        ..
                    } => row.quarter_turns += 1,
                    ResolvedAction::Turn {
                        turn_type: TurnType::Half,
                        ..
                    } => row.half_turns += 1,
                    ResolvedAction::Move { .. } => row.moves += 1,
                    ResolvedAction::Turn { .. } | ResolvedAction::Pass { .. } => {}
                }
            }
        }

        let [side1, side2, side3, side4, side5, side6] = hits;
        Self {
            side1,
            side2,
            side3,
            side4,
            side5,
            side6,
            ..row
        }
    }

    /// Per-side hit counts, side 1 first.
    #[must_use]
    pub const fn side_hits(&self) -> [u32; 6] {
        [
            self.side1, self.side2, self.side3, self.side4, self.side5, self.side6,
        ]
    }
}

/// Export rows for a trial history; an empty history yields no rows.
#[must_use]
pub fn trial_rows(trials: &[Trial]) -> Vec<TrialRow> {
    if trials.is_empty() {
        warn!("No trials recorded; nothing to export");
        return Vec::new();
    }
    trials.iter().map(TrialRow::from_trial).collect()
}
