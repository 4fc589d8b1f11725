//! Single-wheel roulette: one number in [0, 36], predicates derived from it.

use crate::errors::RngError;
use crate::games::types::Evaluation;
use crate::money::Multiplier;
use crate::rng::SecureRng;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Highest number on the wheel.
pub const WHEEL_MAX: u8 = 36;

/// The 18 red numbers of a standard wheel.
pub static RED_NUMBERS: Lazy<HashSet<u8>> = Lazy::new(|| {
    [
        1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
    ]
    .into_iter()
    .collect()
});

/// Outside bets pay even money (stake × 2 returned).
const EVEN_MONEY: Multiplier = Multiplier::from_whole(2);
/// A straight-up number pays stake × 36.
const STRAIGHT_UP: Multiplier = Multiplier::from_whole(36);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WheelColor {
    Green,
    Red,
    Black,
}

/// A spun number with its derived predicates.
///
/// Every predicate is computed from the number exactly once, at
/// construction; nothing here is sampled independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouletteOutcome {
    pub number: u8,
    pub color: WheelColor,
    pub is_even: bool,
    pub is_odd: bool,
    pub is_low: bool,
    pub is_high: bool,
}

impl RouletteOutcome {
    /// Derive the full outcome from a wheel number.
    ///
    /// Zero is green and counts as neither even nor odd, neither low nor
    /// high.
    pub fn from_number(number: u8) -> Self {
        assert!(number <= WHEEL_MAX, "wheel number out of range");
        let color = if number == 0 {
            WheelColor::Green
        } else if RED_NUMBERS.contains(&number) {
            WheelColor::Red
        } else {
            WheelColor::Black
        };
        Self {
            number,
            color,
            is_even: number != 0 && number % 2 == 0,
            is_odd: number % 2 == 1,
            is_low: (1..=18).contains(&number),
            is_high: (19..=36).contains(&number),
        }
    }
}

/// Spin the wheel.
pub fn spin(rng: &SecureRng) -> Result<RouletteOutcome, RngError> {
    let number = rng.random_int(0, WHEEL_MAX as u64)? as u8;
    Ok(RouletteOutcome::from_number(number))
}

/// A parsed roulette bet selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RouletteBet {
    Red,
    Black,
    Even,
    Odd,
    Low,
    High,
    Straight(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized roulette bet {0:?}")]
pub struct ParseBetError(pub String);

impl FromStr for RouletteBet {
    type Err = ParseBetError;

    /// Accepts the outside-bet names and straight numbers `"0"`..`"36"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(RouletteBet::Red),
            "black" => Ok(RouletteBet::Black),
            "even" => Ok(RouletteBet::Even),
            "odd" => Ok(RouletteBet::Odd),
            "low" => Ok(RouletteBet::Low),
            "high" => Ok(RouletteBet::High),
            other => match other.parse::<u8>() {
                Ok(n) if n <= WHEEL_MAX && !other.starts_with('+') => {
                    Ok(RouletteBet::Straight(n))
                }
                _ => Err(ParseBetError(s.to_string())),
            },
        }
    }
}

impl fmt::Display for RouletteBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouletteBet::Red => write!(f, "red"),
            RouletteBet::Black => write!(f, "black"),
            RouletteBet::Even => write!(f, "even"),
            RouletteBet::Odd => write!(f, "odd"),
            RouletteBet::Low => write!(f, "low"),
            RouletteBet::High => write!(f, "high"),
            RouletteBet::Straight(n) => write!(f, "{n}"),
        }
    }
}

impl TryFrom<String> for RouletteBet {
    type Error = ParseBetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RouletteBet> for String {
    fn from(bet: RouletteBet) -> Self {
        bet.to_string()
    }
}

/// Evaluate a bet against a spun outcome.
pub fn evaluate(outcome: &RouletteOutcome, bet: RouletteBet) -> Evaluation {
    let (hit, multiplier) = match bet {
        RouletteBet::Red => (outcome.color == WheelColor::Red, EVEN_MONEY),
        RouletteBet::Black => (outcome.color == WheelColor::Black, EVEN_MONEY),
        RouletteBet::Even => (outcome.is_even, EVEN_MONEY),
        RouletteBet::Odd => (outcome.is_odd, EVEN_MONEY),
        RouletteBet::Low => (outcome.is_low, EVEN_MONEY),
        RouletteBet::High => (outcome.is_high, EVEN_MONEY),
        RouletteBet::Straight(n) => (outcome.number == n, STRAIGHT_UP),
    };
    if hit {
        Evaluation::win(multiplier)
    } else {
        Evaluation::no_win()
    }
}
