//! Scoring of completed event logs.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{FIRST_HIT_POINTS, REPEAT_HIT_POINTS};
use crate::numbers::{u64_to_f64, usize_to_f64};
use crate::run::EventOutcome;
use crate::trial::Trial;

/// Outcomes that count toward a trial's score.
///
/// The event that carried a run over its time budget is still logged but is
/// left out of scoring.
pub fn scoring_events(events: &[EventOutcome]) -> impl Iterator<Item = &EventOutcome> {
    events.iter().filter(|event| !event.exceeds_time_limit)
}

/// Two points the first time a side is hit, one point for every repeat.
///
/// Outcomes without a side (side number 0) score nothing.
#[must_use]
pub fn calculate_score(events: &[EventOutcome]) -> u32 {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|event| event.side_number != 0)
        .map(|event| {
            if seen.insert(event.side_number) {
                FIRST_HIT_POINTS
            } else {
                REPEAT_HIT_POINTS
            }
        })
        .sum()
}

/// Number of distinct sides hit.
#[must_use]
pub fn calculate_unique_hits(events: &[EventOutcome]) -> u32 {
    let unique: HashSet<u8> = events
        .iter()
        .filter(|event| event.side_number != 0)
        .map(|event| event.side_number)
        .collect();
    u32::try_from(unique.len()).unwrap_or(u32::MAX)
}

/// Aggregates over a trial history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrialStats {
    pub trials: usize,
    pub mean_score: f64,
    pub best_score: u32,
    pub mean_duration_ms: f64,
    pub mean_errors: f64,
    /// Fraction of trials that ran all events inside the time budget.
    pub completion_rate: f64,
}

impl TrialStats {
    /// Summarise `trials`; an empty history yields all zeros.
    #[must_use]
    pub fn from_trials(trials: &[Trial]) -> Self {
        if trials.is_empty() {
            return Self::default();
        }
        let count = usize_to_f64(trials.len());
        let score_sum: u64 = trials.iter().map(|t| u64::from(t.score)).sum();
        let duration_sum: u64 = trials.iter().map(|t| t.total_duration_ms).sum();
        let error_sum: u64 = trials.iter().map(|t| u64::from(t.error_count)).sum();
        let completed = trials.iter().filter(|t| t.completed()).count();
        Self {
            trials: trials.len(),
            mean_score: u64_to_f64(score_sum) / count,
            best_score: trials.iter().map(|t| t.score).max().unwrap_or(0),
            mean_duration_ms: u64_to_f64(duration_sum) / count,
            mean_errors: u64_to_f64(error_sum) / count,
            completion_rate: usize_to_f64(completed) / count,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::pitch::CourtZone;
    use crate::run::{ActionLog, EventOutcome};

    /// Minimal outcome carrying only a side number and duration.
    pub(crate) fn outcome(event_number: u32, side_number: u8) -> EventOutcome {
        EventOutcome {
            event_number,
            side_number,
            side_name: String::new(),
            start_position: CourtZone::B,
            required_position: CourtZone::A,
            event_duration_ms: 500,
            total_duration_ms: 500 * u64::from(event_number),
            error: false,
            error_count: 0,
            actions: ActionLog::new(),
            exceeds_time_limit: false,
        }
    }
}
