//! Centralized timing and balance constants for the strategy simulator.
//!
//! These values define the deterministic math of a run. Renderers and
//! exported trial logs rely on them, so they are compile-time constants
//! rather than configuration.

// Run shape ----------------------------------------------------------------
pub const EVENTS_PER_RUN: usize = 20;
pub const PITCH_SIDE_COUNT: u32 = 6;
pub const MAX_SIMULATION_TIME_MS: u64 = 10_000;

// Side selection -----------------------------------------------------------
/// Unhit sides are this many times as likely to be drawn as hit sides.
pub const UNHIT_BIAS_K: f64 = 1.2;
pub const MAX_SIDE_RETRIES: u32 = 10;

// Skill bounds -------------------------------------------------------------
pub const SKILL_MIN: u8 = 1;
pub const SKILL_MAX: u8 = 10;
pub const DEFAULT_SKILL: u8 = 5;
pub const DEFAULT_PLAYER_NAME: &str = "Player";

// Action durations (ms) ----------------------------------------------------
pub const PASS_BASE_MS: u64 = 1_000;
pub const PASS_MIN_MS: u64 = 250;
pub const MOVE_ADJACENT_BASE_MS: u64 = 1_000;
pub const MOVE_ADJACENT_MIN_MS: u64 = 150;
pub const MOVE_ACROSS_COURT_BASE_MS: u64 = 3_000;
pub const MOVE_ACROSS_COURT_MIN_MS: u64 = 500;
pub const TURN_QUARTER_BASE_MS: u64 = 1_000;
pub const TURN_QUARTER_MIN_MS: u64 = 150;
pub const TURN_HALF_BASE_MS: u64 = 3_000;
pub const TURN_HALF_MIN_MS: u64 = 250;

// Scheduling delays (ms) ---------------------------------------------------
pub const ERROR_TIMEOUT_MS: u64 = 1_000;
pub const INTER_EVENT_DELAY_MS: u64 = 300;
pub const CONTINUOUS_RESTART_DELAY_MS: u64 = 100;

// Presentation speed -------------------------------------------------------
pub const DEFAULT_SPEED_MULTIPLIER: f64 = 1.0;
pub const MIN_SPEED_MULTIPLIER: f64 = 0.25;
pub const MAX_SPEED_MULTIPLIER: f64 = 50.0;

// Scoring ------------------------------------------------------------------
pub const FIRST_HIT_POINTS: u32 = 2;
pub const REPEAT_HIT_POINTS: u32 = 1;

// RNG stream tags ----------------------------------------------------------
pub(crate) const RNG_STREAM_SIDES: &[u8] = b"sides";
pub(crate) const RNG_STREAM_ERRORS: &[u8] = b"errors";
