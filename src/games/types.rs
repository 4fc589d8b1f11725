use crate::games::{color_match::ColorMatchOutcome, roulette::RouletteOutcome, slot::SlotOutcome};
use crate::money::Multiplier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Slot,
    Roulette,
    ColorMatch,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Slot => write!(f, "slot"),
            GameType::Roulette => write!(f, "roulette"),
            GameType::ColorMatch => write!(f, "colormatch"),
        }
    }
}

/// Player-chosen bet parameters, tagged by game.
///
/// A tagged union rather than a free-form map, so malformed parameters are
/// rejected at the boundary instead of reaching settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum BetParams {
    /// The slot machine takes no extra parameters.
    Slot,
    Roulette {
        bet: crate::games::roulette::RouletteBet,
    },
    ColorMatch {
        /// Ordered selection; repeats allowed, length checked at settlement.
        selected_colors: Vec<u8>,
    },
}

impl BetParams {
    pub fn game_type(&self) -> GameType {
        match self {
            BetParams::Slot => GameType::Slot,
            BetParams::Roulette { .. } => GameType::Roulette,
            BetParams::ColorMatch { .. } => GameType::ColorMatch,
        }
    }
}

/// Game-specific outcome (discriminated union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Outcome {
    Slot(SlotOutcome),
    Roulette(RouletteOutcome),
    ColorMatch(ColorMatchOutcome),
}

/// Result of evaluating an outcome against the player's selection.
///
/// Pure data; the settlement engine turns the multiplier into money.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evaluation {
    pub is_win: bool,
    pub multiplier: Multiplier,
}

impl Evaluation {
    pub fn no_win() -> Self {
        Self {
            is_win: false,
            multiplier: Multiplier::ZERO,
        }
    }

    pub fn win(multiplier: Multiplier) -> Self {
        Self {
            is_win: true,
            multiplier,
        }
    }
}
