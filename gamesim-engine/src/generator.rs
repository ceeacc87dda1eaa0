//! Event generation: weighted side selection with anti-repetition.
use log::{debug, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::Event;
use crate::constants::{EVENTS_PER_RUN, MAX_SIDE_RETRIES, PITCH_SIDE_COUNT, UNHIT_BIAS_K};
use crate::pitch::PitchSide;
use crate::player::Player;
use crate::probability::{ProbabilityError, calculate_probabilities};
use crate::timing::pass_duration;

/// How a side was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSource {
    /// Taken verbatim from a fixed side order.
    Fixed,
    /// Uniform draw for the opening side.
    Uniform,
    /// Weighted draw favouring unhit sides.
    Weighted,
    /// Uniform pick from the five sides other than the previous one.
    Fallback,
}

/// Candidate probability telemetry captured during a weighted draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideCandidate {
    pub side: PitchSide,
    pub hit: bool,
    pub probability: f64,
}

/// Explainability telemetry for a single side selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideDecisionTrace {
    /// One-based event number the side was chosen for.
    pub event_number: u32,
    pub source: SideSource,
    /// Last weighted draw in `[0, 1)`; `None` for fixed and uniform picks.
    pub roll: Option<f64>,
    /// Weighted draws discarded because they repeated the previous side.
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<SideCandidate>,
    pub chosen: PitchSide,
}

/// Side sequence together with how each entry was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSequence {
    pub sides: Vec<PitchSide>,
    pub traces: Vec<SideDecisionTrace>,
}

/// Hit bookkeeping for the current generation pass.
#[derive(Debug, Clone, Copy, Default)]
struct HitSet {
    hit: [bool; 6],
}

impl HitSet {
    fn mark(&mut self, side: PitchSide) {
        self.hit[side.index()] = true;
    }

    fn contains(self, side: PitchSide) -> bool {
        self.hit[side.index()]
    }

    fn hit_count(self) -> u32 {
        let count = self.hit.iter().filter(|hit| **hit).count();
        u32::try_from(count).unwrap_or(PITCH_SIDE_COUNT)
    }
}

/// Build the side-weighted candidate table: hit sides first, then unhit sides.
fn build_candidates(hits: HitSet) -> Result<Vec<SideCandidate>, ProbabilityError> {
    let hit = hits.hit_count();
    let probs = calculate_probabilities(UNHIT_BIAS_K, PITCH_SIDE_COUNT - hit, hit)?;
    let hit_sides = PitchSide::ALL.iter().filter(|side| hits.contains(**side));
    let unhit_sides = PitchSide::ALL.iter().filter(|side| !hits.contains(**side));
    let candidates = hit_sides
        .map(|side| SideCandidate {
            side: *side,
            hit: true,
            probability: probs.p_hit,
        })
        .chain(unhit_sides.map(|side| SideCandidate {
            side: *side,
            hit: false,
            probability: probs.p_unhit,
        }))
        .collect();
    Ok(candidates)
}

/// Walk cumulative probability mass until it exceeds `roll`.
fn choose_cumulative(candidates: &[SideCandidate], roll: f64) -> Option<PitchSide> {
    let mut cumulative = 0.0;
    for candidate in candidates {
        cumulative += candidate.probability;
        if roll < cumulative {
            return Some(candidate.side);
        }
    }
    // Rounding can leave the total a hair under 1.0.
    candidates
        .iter()
        .rev()
        .find(|candidate| candidate.probability > 0.0)
        .map(|candidate| candidate.side)
}

fn uniform_side<R: Rng>(rng: &mut R) -> PitchSide {
    let idx = rng.gen_range(0..PitchSide::ALL.len());
    PitchSide::ALL[idx]
}

fn fallback_side<R: Rng>(previous: PitchSide, rng: &mut R) -> PitchSide {
    let others: Vec<PitchSide> = PitchSide::ALL
        .iter()
        .copied()
        .filter(|side| *side != previous)
        .collect();
    let idx = rng.gen_range(0..others.len());
    others[idx]
}

fn next_weighted_side<R: Rng>(
    event_number: u32,
    previous: PitchSide,
    hits: HitSet,
    rng: &mut R,
) -> Result<SideDecisionTrace, ProbabilityError> {
    let candidates = build_candidates(hits)?;
    let mut roll = None;
    // One initial draw, then up to MAX_SIDE_RETRIES redraws.
    for retries in 0..=MAX_SIDE_RETRIES {
        let draw = rng.r#gen::<f64>();
        roll = Some(draw);
        if let Some(side) = choose_cumulative(&candidates, draw)
            && side != previous
        {
            return Ok(SideDecisionTrace {
                event_number,
                source: SideSource::Weighted,
                roll,
                retries,
                candidates,
                chosen: side,
            });
        }
    }

    let chosen = fallback_side(previous, rng);
    Ok(SideDecisionTrace {
        event_number,
        source: SideSource::Fallback,
        roll,
        retries: MAX_SIDE_RETRIES,
        candidates,
        chosen,
    })
}

fn fixed_sequence(order: &[PitchSide]) -> SideSequence {
    let sides: Vec<PitchSide> = order.iter().copied().take(EVENTS_PER_RUN).collect();
    let traces = sides
        .iter()
        .zip(1_u32..)
        .map(|(side, event_number)| SideDecisionTrace {
            event_number,
            source: SideSource::Fixed,
            roll: None,
            retries: 0,
            candidates: Vec::new(),
            chosen: *side,
        })
        .collect();
    SideSequence { sides, traces }
}

/// Produce the ordered side sequence for one run.
///
/// A fixed order with at least 20 entries is used verbatim; anything shorter
/// is ignored in favour of random generation.
///
/// # Errors
///
/// Propagates [`ProbabilityError`] if hit bookkeeping ever stops covering all
/// six sides, which would indicate a bug in this module.
pub fn generate_side_sequence<R: Rng>(
    fixed_side_order: Option<&[PitchSide]>,
    rng: &mut R,
) -> Result<SideSequence, ProbabilityError> {
    if let Some(order) = fixed_side_order {
        if order.len() >= EVENTS_PER_RUN {
            debug!("Using fixed side order of {} entries", order.len());
            return Ok(fixed_sequence(order));
        }
        warn!(
            "Fixed side order has {} entries (need {EVENTS_PER_RUN}); generating randomly",
            order.len()
        );
    }

    let mut sides = Vec::with_capacity(EVENTS_PER_RUN);
    let mut traces = Vec::with_capacity(EVENTS_PER_RUN);
    let mut hits = HitSet::default();

    let first = uniform_side(rng);
    hits.mark(first);
    sides.push(first);
    traces.push(SideDecisionTrace {
        event_number: 1,
        source: SideSource::Uniform,
        roll: None,
        retries: 0,
        candidates: Vec::new(),
        chosen: first,
    });

    let mut previous = first;
    for event_number in 2..=u32::try_from(EVENTS_PER_RUN).unwrap_or(u32::MAX) {
        let decision = next_weighted_side(event_number, previous, hits, rng)?;
        trace!(
            "Side selection | event {} source {:?} roll {:?} retries {} chosen {}",
            decision.event_number,
            decision.source,
            decision.roll,
            decision.retries,
            decision.chosen.number()
        );
        previous = decision.chosen;
        hits.mark(previous);
        sides.push(previous);
        traces.push(decision);
    }

    Ok(SideSequence { sides, traces })
}

/// Turn a side sequence into planned events for `player`.
#[must_use]
pub fn events_for_sides(sides: &[PitchSide], player: &Player) -> Vec<Event> {
    let pass_ms = pass_duration(player.passing);
    sides
        .iter()
        .zip(1_u32..)
        .map(|(side, id)| Event::for_side(id, *side, pass_ms))
        .collect()
}

/// Generate the 20 planned events of a run.
///
/// # Errors
///
/// See [`generate_side_sequence`].
pub fn generate_events<R: Rng>(
    fixed_side_order: Option<&[PitchSide]>,
    player: &Player,
    rng: &mut R,
) -> Result<Vec<Event>, ProbabilityError> {
    let sequence = generate_side_sequence(fixed_side_order, rng)?;
    Ok(events_for_sides(&sequence.sides, player))
}
