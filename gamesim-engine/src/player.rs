//! Player skill profile.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_PLAYER_NAME, DEFAULT_SKILL, SKILL_MAX, SKILL_MIN};

/// Skill attributes consumed by the duration and error model.
///
/// A run takes the player by value; edits only apply to the next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default = "Player::default_name")]
    pub name: String,
    #[serde(default = "Player::default_skill")]
    pub passing: u8,
    #[serde(default = "Player::default_skill")]
    pub control: u8,
    #[serde(default = "Player::default_skill")]
    pub dribbling: u8,
}

/// Errors raised when a skill falls outside the supported range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    SkillOutOfRange {
        field: &'static str,
        min: u8,
        max: u8,
        value: u8,
    },
}

impl Player {
    fn default_name() -> String {
        DEFAULT_PLAYER_NAME.to_string()
    }

    const fn default_skill() -> u8 {
        DEFAULT_SKILL
    }

    #[must_use]
    pub fn new(name: impl Into<String>, passing: u8, control: u8, dribbling: u8) -> Self {
        Self {
            name: name.into(),
            passing,
            control,
            dribbling,
        }
    }

    /// Player with every skill set to `skill`.
    #[must_use]
    pub fn uniform(skill: u8) -> Self {
        Self::new(DEFAULT_PLAYER_NAME, skill, skill, skill)
    }

    /// Check every skill lies in `1..=10`.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range skill.
    pub fn validate(&self) -> Result<(), PlayerError> {
        for (field, value) in [
            ("passing", self.passing),
            ("control", self.control),
            ("dribbling", self.dribbling),
        ] {
            if !(SKILL_MIN..=SKILL_MAX).contains(&value) {
                return Err(PlayerError::SkillOutOfRange {
                    field,
                    min: SKILL_MIN,
                    max: SKILL_MAX,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::uniform(DEFAULT_SKILL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let player: Player = serde_json::from_str(r#"{"passing": 9}"#).unwrap();
        assert_eq!(player.name, "Player");
        assert_eq!(player.passing, 9);
        assert_eq!(player.control, 5);
        assert_eq!(player.dribbling, 5);
    }

    #[test]
    fn validate_rejects_out_of_range_skills() {
        assert!(Player::default().validate().is_ok());
        let err = Player::new("x", 5, 0, 5).validate().unwrap_err();
        assert_eq!(
            err,
            PlayerError::SkillOutOfRange {
                field: "control",
                min: 1,
                max: 10,
                value: 0
            }
        );
        assert!(Player::new("x", 5, 5, 11).validate().is_err());
    }
}
