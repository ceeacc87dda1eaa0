//! Skill-driven action durations and error probabilities.
//!
//! Every curve is a linear interpolation over a skill score in `1..=10`:
//! skill 1 maps to the base duration (and a certain error), skill 10 to the
//! minimum duration (and no error).
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MOVE_ACROSS_COURT_BASE_MS, MOVE_ACROSS_COURT_MIN_MS, MOVE_ADJACENT_BASE_MS,
    MOVE_ADJACENT_MIN_MS, PASS_BASE_MS, PASS_MIN_MS, SKILL_MAX, SKILL_MIN, TURN_HALF_BASE_MS,
    TURN_HALF_MIN_MS, TURN_QUARTER_BASE_MS, TURN_QUARTER_MIN_MS,
};
use crate::numbers::{round_f64_to_u64, u64_to_f64};
use crate::pitch::{CourtZone, Stance};

/// Rotation class of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnType {
    Identity,
    Quarter,
    Half,
}

/// Fraction of the way from skill 1 to skill 10, clamped to `[0, 1]`.
fn skill_fraction(skill: u8) -> f64 {
    let clamped = skill.clamp(SKILL_MIN, SKILL_MAX);
    f64::from(clamped - SKILL_MIN) / f64::from(SKILL_MAX - SKILL_MIN)
}

/// `round(base - ((skill - 1) / 9) * (base - min))`.
#[must_use]
pub fn adjusted_duration(skill: u8, base_ms: u64, min_ms: u64) -> u64 {
    let base = u64_to_f64(base_ms);
    let span = base - u64_to_f64(min_ms);
    round_f64_to_u64(skill_fraction(skill).mul_add(-span, base))
}

/// `1 - (skill - 1) / 9`.
#[must_use]
pub fn error_rate(skill: u8) -> f64 {
    1.0 - skill_fraction(skill)
}

/// Roll whether an action performed at `skill` fumbles.
///
/// A skill of 10 never draws an error, a skill of 1 always does.
pub fn roll_error<R: Rng>(skill: u8, rng: &mut R) -> bool {
    let rate = error_rate(skill);
    rng.r#gen::<f64>() < rate
}

#[must_use]
pub fn pass_duration(passing: u8) -> u64 {
    adjusted_duration(passing, PASS_BASE_MS, PASS_MIN_MS)
}

#[must_use]
pub fn turn_type(from: Stance, to: Stance) -> TurnType {
    match from.angle_to(to) {
        0 => TurnType::Identity,
        180 => TurnType::Half,
        // Only 90 is reachable with four stances; anything else times as a quarter turn.
        _ => TurnType::Quarter,
    }
}

#[must_use]
pub fn turn_duration_for(control: u8, kind: TurnType) -> u64 {
    match kind {
        TurnType::Identity => 0,
        TurnType::Quarter => adjusted_duration(control, TURN_QUARTER_BASE_MS, TURN_QUARTER_MIN_MS),
        TurnType::Half => adjusted_duration(control, TURN_HALF_BASE_MS, TURN_HALF_MIN_MS),
    }
}

#[must_use]
pub fn turn_duration(control: u8, from: Stance, to: Stance) -> u64 {
    turn_duration_for(control, turn_type(from, to))
}

#[must_use]
pub fn move_duration(dribbling: u8, from: CourtZone, to: CourtZone) -> u64 {
    match from.distance(to) {
        0 => 0,
        1 => adjusted_duration(dribbling, MOVE_ADJACENT_BASE_MS, MOVE_ADJACENT_MIN_MS),
        _ => adjusted_duration(dribbling, MOVE_ACROSS_COURT_BASE_MS, MOVE_ACROSS_COURT_MIN_MS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn adjusted_duration_hits_both_endpoints() {
        assert_eq!(adjusted_duration(1, 1_000, 250), 1_000);
        assert_eq!(adjusted_duration(10, 1_000, 250), 250);
        assert_eq!(adjusted_duration(1, 3_000, 500), 3_000);
        assert_eq!(adjusted_duration(10, 3_000, 500), 500);
    }

    #[test]
    fn adjusted_duration_never_increases_with_skill() {
        let pairs = [(1_000, 250), (1_000, 150), (3_000, 500), (3_000, 250)];
        for (base, min) in pairs {
            let curve: Vec<u64> = (1..=10).map(|s| adjusted_duration(s, base, min)).collect();
            assert!(curve.windows(2).all(|w| w[0] >= w[1]), "{curve:?}");
        }
        assert_eq!(adjusted_duration(5, 1_000, 250), 667);
    }

    #[test]
    fn error_rate_bounds_and_monotonicity() {
        assert!((error_rate(1) - 1.0).abs() < f64::EPSILON);
        assert!(error_rate(10).abs() < f64::EPSILON);
        let rates: Vec<f64> = (1..=10).map(error_rate).collect();
        assert!(rates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn extreme_skills_roll_deterministically() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..500 {
            assert!(roll_error(1, &mut rng));
            assert!(!roll_error(10, &mut rng));
        }
    }

    #[test]
    fn turn_durations_follow_rotation() {
        assert_eq!(turn_type(Stance::Left, Stance::Left), TurnType::Identity);
        assert_eq!(turn_type(Stance::Below, Stance::Left), TurnType::Quarter);
        assert_eq!(turn_type(Stance::Right, Stance::Left), TurnType::Half);
        assert_eq!(turn_duration(1, Stance::Left, Stance::Left), 0);
        assert_eq!(turn_duration(1, Stance::Above, Stance::Right), 1_000);
        assert_eq!(turn_duration(10, Stance::Above, Stance::Below), 250);
    }

    #[test]
    fn move_durations_follow_distance() {
        assert_eq!(move_duration(1, CourtZone::B, CourtZone::B), 0);
        assert_eq!(move_duration(10, CourtZone::B, CourtZone::A), 150);
        assert_eq!(move_duration(1, CourtZone::C, CourtZone::B), 1_000);
        assert_eq!(move_duration(10, CourtZone::A, CourtZone::C), 500);
        assert_eq!(pass_duration(10), 250);
    }
}
