//! Simulator configuration supplied by the surrounding UI or CLI.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_SPEED_MULTIPLIER, EVENTS_PER_RUN, MAX_SPEED_MULTIPLIER, MIN_SPEED_MULTIPLIER,
};
use crate::pitch::PitchSide;
use crate::player::{Player, PlayerError};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("speed multiplier must be between {min:.2} and {max:.2} (got {value:.2})")]
    SpeedOutOfRange { min: f64, max: f64, value: f64 },
    #[error("fixed side order entry {index} is {value}; sides are numbered 1..=6")]
    InvalidSide { index: usize, value: u8 },
    #[error("failed to parse simulator config: {0}")]
    Parse(String),
}

/// Immutable configuration for a run or series of runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub player: Player,
    /// Divides every presentation delay; never affects durations, errors or scoring.
    #[serde(default = "SimConfig::default_speed_multiplier")]
    pub speed_multiplier: f64,
    /// Scripted side numbers; used when at least 20 entries are supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_side_order: Option<Vec<u8>>,
    /// Start a new run automatically after each one finishes.
    #[serde(default)]
    pub continuous: bool,
}

impl SimConfig {
    const fn default_speed_multiplier() -> f64 {
        DEFAULT_SPEED_MULTIPLIER
    }

    /// Parse a configuration from JSON, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check player skills, speed range and scripted side numbers.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate()?;
        if !(MIN_SPEED_MULTIPLIER..=MAX_SPEED_MULTIPLIER).contains(&self.speed_multiplier) {
            return Err(ConfigError::SpeedOutOfRange {
                min: MIN_SPEED_MULTIPLIER,
                max: MAX_SPEED_MULTIPLIER,
                value: self.speed_multiplier,
            });
        }
        if let Some(order) = &self.fixed_side_order {
            for (index, value) in order.iter().enumerate() {
                if PitchSide::from_number(*value).is_none() {
                    return Err(ConfigError::InvalidSide {
                        index,
                        value: *value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Scripted side order, if one long enough to drive a run is configured.
    #[must_use]
    pub fn side_order(&self) -> Option<Vec<PitchSide>> {
        let order = self.fixed_side_order.as_ref()?;
        if order.len() < EVENTS_PER_RUN {
            return None;
        }
        order.iter().map(|n| PitchSide::from_number(*n)).collect()
    }

    #[must_use]
    pub fn with_player(mut self, player: Player) -> Self {
        self.player = player;
        self
    }

    #[must_use]
    pub fn with_fixed_side_order(mut self, order: Vec<u8>) -> Self {
        self.fixed_side_order = Some(order);
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player: Player::default(),
            speed_multiplier: DEFAULT_SPEED_MULTIPLIER,
            fixed_side_order: None,
            continuous: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = SimConfig::from_json("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn validation_rejects_bad_speed_and_sides() {
        let slow = SimConfig {
            speed_multiplier: 0.1,
            ..SimConfig::default()
        };
        assert!(matches!(
            slow.validate(),
            Err(ConfigError::SpeedOutOfRange { .. })
        ));

        let bad_side = SimConfig::default().with_fixed_side_order(vec![1, 2, 7]);
        assert_eq!(
            bad_side.validate(),
            Err(ConfigError::InvalidSide { index: 2, value: 7 })
        );

        let bad_player = SimConfig::from_json(r#"{"player": {"dribbling": 12}}"#);
        assert!(matches!(bad_player, Err(ConfigError::Player(_))));
        assert!(matches!(
            SimConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn side_order_requires_a_full_run() {
        let short = SimConfig::default().with_fixed_side_order(vec![1, 2, 3]);
        assert_eq!(short.side_order(), None);
        let full = SimConfig::default().with_fixed_side_order([1, 6].repeat(10));
        let order = full.side_order().unwrap();
        assert_eq!(order.len(), 20);
        assert_eq!(order[1], PitchSide::Top);
    }
}
