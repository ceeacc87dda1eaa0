//! Pitch geometry: boundary sides, court zones, and player stances.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six boundary segments of the pitch, numbered 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PitchSide {
    TopRight = 1,
    BottomRight = 2,
    Bottom = 3,
    BottomLeft = 4,
    TopLeft = 5,
    Top = 6,
}

impl PitchSide {
    pub const ALL: [Self; 6] = [
        Self::TopRight,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::TopLeft,
        Self::Top,
    ];

    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::TopRight),
            2 => Some(Self::BottomRight),
            3 => Some(Self::Bottom),
            4 => Some(Self::BottomLeft),
            5 => Some(Self::TopLeft),
            6 => Some(Self::Top),
            _ => None,
        }
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based slot, handy for per-side tallies.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TopRight => "Top-Right",
            Self::BottomRight => "Bottom-Right",
            Self::Bottom => "Bottom",
            Self::BottomLeft => "Bottom-Left",
            Self::TopLeft => "Top-Left",
            Self::Top => "Top",
        }
    }

    /// Zone the ball must occupy before a pass to this side.
    #[must_use]
    pub const fn required_zone(self) -> CourtZone {
        match self {
            Self::TopRight | Self::TopLeft | Self::Top => CourtZone::A,
            Self::BottomRight | Self::Bottom | Self::BottomLeft => CourtZone::C,
        }
    }

    /// Stance the player holds relative to the ball to strike toward this side.
    #[must_use]
    pub const fn pass_stance(self) -> Stance {
        match self {
            Self::TopRight | Self::BottomRight => Stance::Left,
            Self::Bottom => Stance::Above,
            Self::BottomLeft | Self::TopLeft => Stance::Right,
            Self::Top => Stance::Below,
        }
    }
}

impl TryFrom<u8> for PitchSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| format!("pitch side must be 1..=6 (got {value})"))
    }
}

impl From<PitchSide> for u8 {
    fn from(side: PitchSide) -> Self {
        side.number()
    }
}

impl fmt::Display for PitchSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Horizontal band of the court the ball sits in: `A` near the top, `C` near the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourtZone {
    A,
    B,
    C,
}

impl CourtZone {
    const fn row(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    /// Number of zone boundaries crossed moving from `self` to `other`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u8 {
        self.row().abs_diff(other.row())
    }

    /// Stance the player takes to push the ball from `self` toward `target`.
    ///
    /// Returns `None` when the ball does not change zone.
    #[must_use]
    pub const fn push_stance(self, target: Self) -> Option<Stance> {
        let from = self.row();
        let to = target.row();
        if to < from {
            Some(Stance::Below)
        } else if to > from {
            Some(Stance::Above)
        } else {
            None
        }
    }
}

impl fmt::Display for CourtZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(label)
    }
}

/// Player position relative to the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Above,
    Right,
    Below,
    Left,
}

impl Stance {
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Above => 0,
            Self::Right => 90,
            Self::Below => 180,
            Self::Left => 270,
        }
    }

    /// Shortest rotation between two stances, in degrees (0..=180).
    #[must_use]
    pub const fn angle_to(self, other: Self) -> u16 {
        let diff = self.degrees().abs_diff(other.degrees());
        if diff > 180 { 360 - diff } else { diff }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_round_trip_through_numbers() {
        for side in PitchSide::ALL {
            assert_eq!(PitchSide::from_number(side.number()), Some(side));
        }
        assert_eq!(PitchSide::from_number(0), None);
        assert_eq!(PitchSide::from_number(7), None);
    }

    #[test]
    fn top_sides_require_zone_a() {
        let top: Vec<u8> = PitchSide::ALL
            .iter()
            .filter(|side| side.required_zone() == CourtZone::A)
            .map(|side| side.number())
            .collect();
        assert_eq!(top, vec![1, 5, 6]);
    }

    #[test]
    fn push_stance_follows_direction() {
        assert_eq!(CourtZone::B.push_stance(CourtZone::A), Some(Stance::Below));
        assert_eq!(CourtZone::A.push_stance(CourtZone::C), Some(Stance::Above));
        assert_eq!(CourtZone::C.push_stance(CourtZone::C), None);
    }

    #[test]
    fn stance_angles_take_the_short_way_round() {
        assert_eq!(Stance::Above.angle_to(Stance::Left), 90);
        assert_eq!(Stance::Left.angle_to(Stance::Right), 180);
        assert_eq!(Stance::Below.angle_to(Stance::Below), 0);
    }

    #[test]
    fn side_serializes_as_number() {
        let json = serde_json::to_string(&PitchSide::BottomLeft).unwrap();
        assert_eq!(json, "4");
        let parsed: PitchSide = serde_json::from_str("6").unwrap();
        assert_eq!(parsed, PitchSide::Top);
        assert!(serde_json::from_str::<PitchSide>("9").is_err());
    }
}
