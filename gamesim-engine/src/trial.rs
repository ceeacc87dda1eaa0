//! Finished runs kept in the trial history.
use serde::{Deserialize, Serialize};

use crate::run::{EventOutcome, RunStatus};
use crate::score::{calculate_score, calculate_unique_hits, scoring_events};

/// One finished run and its aggregate results.
///
/// `events` keeps every emitted outcome, including one flagged as exceeding
/// the time limit; the aggregates only count scoring events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    /// One-based position in the history.
    pub trial_number: u32,
    pub seed: u64,
    pub events: Vec<EventOutcome>,
    pub total_duration_ms: u64,
    pub error_count: u32,
    pub score: u32,
    pub unique_hits: u32,
    pub termination: RunStatus,
}

impl Trial {
    /// Aggregate a run's outcomes into a trial record.
    #[must_use]
    pub fn from_outcomes(
        trial_number: u32,
        seed: u64,
        events: Vec<EventOutcome>,
        termination: RunStatus,
    ) -> Self {
        let scoring: Vec<EventOutcome> = scoring_events(&events).cloned().collect();
        let total_duration_ms = scoring.iter().map(|e| e.event_duration_ms).sum();
        let error_count = scoring.iter().map(|e| e.error_count).sum();
        Self {
            trial_number,
            seed,
            total_duration_ms,
            error_count,
            score: calculate_score(&scoring),
            unique_hits: calculate_unique_hits(&scoring),
            termination,
            events,
        }
    }

    /// Outcomes that contributed to the score.
    pub fn scoring_events(&self) -> impl Iterator<Item = &EventOutcome> {
        scoring_events(&self.events)
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.termination == RunStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::fixtures::outcome;

    #[test]
    fn aggregates_skip_the_flagged_event() {
        let mut events: Vec<EventOutcome> = [1_u8, 2, 1, 3]
            .iter()
            .zip(1..)
            .map(|(side, n)| outcome(n, *side))
            .collect();
        events[3].exceeds_time_limit = true;
        events[3].error_count = 2;
        events[0].error_count = 1;

        let trial = Trial::from_outcomes(1, 42, events, RunStatus::TimeLimitExceeded);
        assert_eq!(trial.events.len(), 4);
        assert_eq!(trial.scoring_events().count(), 3);
        assert_eq!(trial.score, 5);
        assert_eq!(trial.unique_hits, 2);
        assert_eq!(trial.error_count, 1);
        assert_eq!(trial.total_duration_ms, 1_500);
        assert!(!trial.completed());
    }
}
