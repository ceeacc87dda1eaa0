//! Side selection weights biased toward sides not yet hit.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::PITCH_SIDE_COUNT;
use crate::numbers::u64_to_f64;

/// Per-side probability for hit and unhit sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideProbabilities {
    pub p_hit: f64,
    pub p_unhit: f64,
}

impl SideProbabilities {
    /// Total probability mass across `unhit` and `hit` sides.
    #[must_use]
    pub fn total_mass(&self, unhit: u32, hit: u32) -> f64 {
        f64::from(unhit).mul_add(self.p_unhit, f64::from(hit) * self.p_hit)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProbabilityError {
    #[error("side counts must cover all {expected} sides (unhit {unhit} + hit {hit})")]
    InvalidInput { unhit: u32, hit: u32, expected: u32 },
    #[error("bias multiplier must be finite and positive (got {k})")]
    InvalidBias { k: f64 },
}

/// Solve `p_hit * (u*k + h) = 1` so unhit sides are `k` times as likely as hit ones.
///
/// # Errors
///
/// Returns [`ProbabilityError::InvalidInput`] unless `unhit + hit == 6`, and
/// [`ProbabilityError::InvalidBias`] for a non-positive or non-finite `k`.
pub fn calculate_probabilities(
    k: f64,
    unhit: u32,
    hit: u32,
) -> Result<SideProbabilities, ProbabilityError> {
    if unhit.checked_add(hit) != Some(PITCH_SIDE_COUNT) {
        return Err(ProbabilityError::InvalidInput {
            unhit,
            hit,
            expected: PITCH_SIDE_COUNT,
        });
    }
    if !k.is_finite() || k <= 0.0 {
        return Err(ProbabilityError::InvalidBias { k });
    }

    let uniform = 1.0 / u64_to_f64(u64::from(PITCH_SIDE_COUNT));
    if hit == 0 {
        return Ok(SideProbabilities {
            p_hit: 0.0,
            p_unhit: uniform,
        });
    }
    if unhit == 0 {
        return Ok(SideProbabilities {
            p_hit: uniform,
            p_unhit: 0.0,
        });
    }

    let denominator = f64::from(unhit).mul_add(k, f64::from(hit));
    Ok(SideProbabilities {
        p_hit: 1.0 / denominator,
        p_unhit: k / denominator,
    })
}
