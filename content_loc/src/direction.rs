//! Compass directions with localised names.

use std::fmt;

/// One of the eight compass directions, or `Invalid`.
///
/// The [`Display`](fmt::Display) form is the suffix of the message id that
/// [`crate::LocalizationManager::format_direction`] resolves, e.g.
/// `zzzz-fmt-direction-NorthEast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// No direction.
    Invalid,
    /// South.
    South,
    /// South-east.
    SouthEast,
    /// East.
    East,
    /// North-east.
    NorthEast,
    /// North.
    North,
    /// North-west.
    NorthWest,
    /// West.
    West,
    /// South-west.
    SouthWest,
}

impl Direction {
    /// Every direction, `Invalid` first.
    pub const ALL: [Self; 9] = [
        Self::Invalid,
        Self::South,
        Self::SouthEast,
        Self::East,
        Self::NorthEast,
        Self::North,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
    ];

    const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::South => "South",
            Self::SouthEast => "SouthEast",
            Self::East => "East",
            Self::NorthEast => "NorthEast",
            Self::North => "North",
            Self::NorthWest => "NorthWest",
            Self::West => "West",
            Self::SouthWest => "SouthWest",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
