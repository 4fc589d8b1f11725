//! Color-matching jackpot: six distinct colors drawn from a twelve-color
//! palette, compared position by position against the player's picks.

use crate::errors::RngError;
use crate::games::types::Evaluation;
use crate::money::Multiplier;
use crate::rng::SecureRng;
use serde::{Deserialize, Serialize};

/// Size of the color palette. Color ids on the wire are `0..PALETTE_SIZE`.
pub const PALETTE_SIZE: u8 = 12;

/// Length of both the system draw and the player selection.
pub const SEQUENCE_LEN: usize = 6;

/// Display names, indexed by color id.
pub const COLOR_NAMES: [&str; PALETTE_SIZE as usize] = [
    "red", "orange", "yellow", "green", "teal", "blue", "indigo", "violet", "pink", "brown",
    "black", "white",
];

/// The system draw: six pairwise-distinct color ids, in draw order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorMatchOutcome {
    pub drawn: [u8; SEQUENCE_LEN],
}

/// Draw six distinct colors without replacement.
///
/// Keeps a shrinking pool of the remaining ids and picks a uniformly random
/// index into it at each step, so every 6-permutation of the palette is
/// equally likely.
pub fn draw(rng: &SecureRng) -> Result<ColorMatchOutcome, RngError> {
    let mut pool: Vec<u8> = (0..PALETTE_SIZE).collect();
    let mut drawn = [0u8; SEQUENCE_LEN];
    for slot in drawn.iter_mut() {
        let index = rng.random_int(0, pool.len() as u64 - 1)? as usize;
        *slot = pool.remove(index);
    }
    Ok(ColorMatchOutcome { drawn })
}

/// Number of positions where the player's pick equals the system draw.
pub fn match_count(selected: &[u8; SEQUENCE_LEN], outcome: &ColorMatchOutcome) -> u8 {
    selected
        .iter()
        .zip(outcome.drawn.iter())
        .filter(|(s, d)| s == d)
        .count() as u8
}

/// The authoritative paytable, keyed by match count.
///
/// This is the single source of truth; anything shown to the client must be
/// rendered from [`paytable`], never recomputed elsewhere.
pub fn multiplier_for_matches(matches: u8) -> Multiplier {
    match matches {
        6 => Multiplier::from_whole(50),
        5 => Multiplier::from_whole(20),
        4 => Multiplier::from_whole(10),
        3 => Multiplier::from_whole(5),
        2 => Multiplier::from_whole(2),
        1 => Multiplier::from_whole(1),
        _ => Multiplier::ZERO,
    }
}

/// The full paytable for display, derived from the same lookup the
/// evaluator uses.
pub fn paytable() -> [(u8, Multiplier); SEQUENCE_LEN + 1] {
    let mut table = [(0u8, Multiplier::ZERO); SEQUENCE_LEN + 1];
    for (matches, entry) in table.iter_mut().enumerate() {
        *entry = (matches as u8, multiplier_for_matches(matches as u8));
    }
    table
}

/// Evaluate the player's selection against the system draw.
pub fn evaluate(selected: &[u8; SEQUENCE_LEN], outcome: &ColorMatchOutcome) -> Evaluation {
    let multiplier = multiplier_for_matches(match_count(selected, outcome));
    if multiplier.is_zero() {
        Evaluation::no_win()
    } else {
        Evaluation::win(multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedByteSource, SeededByteSource};
    use std::sync::Arc;

    #[test]
    fn test_draws_are_pairwise_distinct() {
        let rng = SecureRng::new(Arc::new(SeededByteSource::new([9; 32])));
        for _ in 0..200 {
            let outcome = draw(&rng).unwrap();
            let mut seen = [false; PALETTE_SIZE as usize];
            for &color in &outcome.drawn {
                assert!(color < PALETTE_SIZE);
                assert!(!seen[color as usize], "duplicate color in {:?}", outcome.drawn);
                seen[color as usize] = true;
            }
        }
    }

    #[test]
    fn test_scripted_draw_walks_the_pool() {
        // Index 0 three times picks 0, 1, 2; then index 6 into the
        // shrinking pool picks 9, 10, 11.
        let rng = SecureRng::new(Arc::new(ScriptedByteSource::new(vec![0, 0, 0, 6, 6, 6])));
        let outcome = draw(&rng).unwrap();
        assert_eq!(outcome.drawn, [0, 1, 2, 9, 10, 11]);
    }

    #[test]
    fn test_match_count_is_positional() {
        let outcome = ColorMatchOutcome {
            drawn: [0, 1, 2, 3, 4, 5],
        };
        assert_eq!(match_count(&[0, 1, 2, 3, 4, 5], &outcome), 6);
        // Same colors, rotated one position: no positional matches.
        assert_eq!(match_count(&[5, 0, 1, 2, 3, 4], &outcome), 0);
        assert_eq!(match_count(&[0, 1, 2, 9, 9, 9], &outcome), 3);
    }

    #[test]
    fn test_repeated_player_picks_are_allowed() {
        let outcome = ColorMatchOutcome {
            drawn: [7, 7, 7, 7, 7, 7],
        };
        // The system never draws repeats, but the player may pick them;
        // each position is compared independently.
        assert_eq!(match_count(&[7, 7, 0, 0, 7, 1], &outcome), 3);
    }

    #[test]
    fn test_paytable_values() {
        assert_eq!(multiplier_for_matches(6), Multiplier::from_whole(50));
        assert_eq!(multiplier_for_matches(5), Multiplier::from_whole(20));
        assert_eq!(multiplier_for_matches(4), Multiplier::from_whole(10));
        assert_eq!(multiplier_for_matches(3), Multiplier::from_whole(5));
        assert_eq!(multiplier_for_matches(2), Multiplier::from_whole(2));
        assert_eq!(multiplier_for_matches(1), Multiplier::from_whole(1));
        assert_eq!(multiplier_for_matches(0), Multiplier::ZERO);
    }

    #[test]
    fn test_displayed_paytable_matches_evaluator() {
        for (matches, multiplier) in paytable() {
            assert_eq!(multiplier, multiplier_for_matches(matches));
        }
    }

    #[test]
    fn test_evaluate_zero_matches_is_no_win() {
        let outcome = ColorMatchOutcome {
            drawn: [6, 7, 8, 9, 10, 11],
        };
        let eval = evaluate(&[0, 1, 2, 3, 4, 5], &outcome);
        assert!(!eval.is_win);
        assert!(eval.multiplier.is_zero());
    }

    #[test]
    fn test_color_names_cover_palette() {
        assert_eq!(COLOR_NAMES.len(), PALETTE_SIZE as usize);
    }
}
