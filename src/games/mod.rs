pub mod color_match;
pub mod roulette;
pub mod slot;
pub mod types;

pub use types::{BetParams, Evaluation, GameType, Outcome};
