//! Rounding modes shared by every arithmetic backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tie-breaking/truncation rule applied when a division or rounding
/// cannot be represented exactly at the requested scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round away from zero whenever the discarded digit is non-zero.
    Up,
    /// Truncate toward zero.
    Down,
    /// Round toward positive infinity.
    Ceiling,
    /// Round toward negative infinity.
    Floor,
    /// Round away from zero on a discarded digit of 5 or more.
    #[default]
    HalfUp,
    /// Round away from zero on a discarded digit strictly above 5.
    HalfDown,
    /// Banker's rounding: ties go to the even neighbour.
    HalfEven,
    /// Ties go to the odd neighbour.
    HalfOdd,
}

impl RoundingMode {
    /// Whether discarding digit `next` (0-9) rounds the magnitude away
    /// from zero. `negative` is the sign of the value being rounded and
    /// `last_kept` is the final retained digit, consulted only by the
    /// half-even/half-odd modes.
    pub(crate) fn rounds_away(self, negative: bool, next: u8, last_kept: u8) -> bool {
        match self {
            RoundingMode::Up => next > 0,
            RoundingMode::Down => false,
            RoundingMode::Ceiling => !negative && next > 0,
            RoundingMode::Floor => negative && next > 0,
            RoundingMode::HalfUp => next >= 5,
            RoundingMode::HalfDown => next > 5,
            RoundingMode::HalfEven => next > 5 || (next == 5 && last_kept % 2 == 1),
            RoundingMode::HalfOdd => next > 5 || (next == 5 && last_kept % 2 == 0),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Ceiling => "ceiling",
            RoundingMode::Floor => "floor",
            RoundingMode::HalfUp => "half-up",
            RoundingMode::HalfDown => "half-down",
            RoundingMode::HalfEven => "half-even",
            RoundingMode::HalfOdd => "half-odd",
        };
        write!(f, "{name}")
    }
}
