//! Three-reel slot machine: symbol table, spin, and win evaluation.

use crate::errors::RngError;
use crate::games::types::Evaluation;
use crate::money::Multiplier;
use crate::rng::SecureRng;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Number of reels on the machine.
pub const REEL_COUNT: usize = 3;

/// A slot symbol with its payout weight.
#[derive(Debug, Clone, Copy)]
pub struct SlotSymbol {
    pub name: &'static str,
    pub glyph: &'static str,
    /// Base payout weight; three of a kind pays weight × 3, a pair pays
    /// weight × 0.5.
    pub weight: Multiplier,
}

/// Fixed symbol table. Reel draws index into this, so symbol ids on the
/// wire are stable.
pub static SYMBOLS: Lazy<Vec<SlotSymbol>> = Lazy::new(|| {
    vec![
        SlotSymbol {
            name: "cherry",
            glyph: "🍒",
            weight: Multiplier::from_hundredths(100),
        },
        SlotSymbol {
            name: "lemon",
            glyph: "🍋",
            weight: Multiplier::from_hundredths(150),
        },
        SlotSymbol {
            name: "orange",
            glyph: "🍊",
            weight: Multiplier::from_hundredths(200),
        },
        SlotSymbol {
            name: "grape",
            glyph: "🍇",
            weight: Multiplier::from_hundredths(250),
        },
        SlotSymbol {
            name: "bell",
            glyph: "🔔",
            weight: Multiplier::from_hundredths(500),
        },
        SlotSymbol {
            name: "seven",
            glyph: "7️⃣",
            weight: Multiplier::from_hundredths(1000),
        },
        SlotSymbol {
            name: "diamond",
            glyph: "💎",
            weight: Multiplier::from_hundredths(2000),
        },
    ]
});

/// One spin: three symbol ids, one per reel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotOutcome {
    pub reels: [u8; REEL_COUNT],
}

impl SlotOutcome {
    pub fn glyphs(&self) -> [&'static str; REEL_COUNT] {
        self.reels.map(|id| SYMBOLS[id as usize].glyph)
    }
}

/// Draw each reel independently and uniformly over the symbol table.
pub fn spin(rng: &SecureRng) -> Result<SlotOutcome, RngError> {
    let max = SYMBOLS.len() as u64 - 1;
    let mut reels = [0u8; REEL_COUNT];
    for reel in reels.iter_mut() {
        *reel = rng.random_int(0, max)? as u8;
    }
    Ok(SlotOutcome { reels })
}

/// Evaluate a spin.
///
/// Three of a kind pays the symbol weight × 3; exactly two matching reels
/// pay the pair's weight × 0.5, with the pair found by checking reel pairs
/// (0,1), (1,2), (0,2) in that order. No match pays nothing.
pub fn evaluate(outcome: &SlotOutcome) -> Evaluation {
    let [a, b, c] = outcome.reels;

    if a == b && b == c {
        let weight = SYMBOLS[a as usize].weight;
        return Evaluation::win(Multiplier::from_hundredths(weight.hundredths() * 3));
    }

    let pair = if a == b {
        Some(a)
    } else if b == c {
        Some(b)
    } else if a == c {
        Some(a)
    } else {
        None
    };

    match pair {
        Some(symbol) => {
            let weight = SYMBOLS[symbol as usize].weight;
            Evaluation::win(Multiplier::from_hundredths(weight.hundredths() / 2))
        }
        None => Evaluation::no_win(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedByteSource;
    use std::sync::Arc;

    fn rng_from(stream: Vec<u8>) -> SecureRng {
        SecureRng::new(Arc::new(ScriptedByteSource::new(stream)))
    }

    #[test]
    fn test_spin_draws_one_symbol_per_reel() {
        // Symbol table has 7 entries; bytes below the rejection threshold
        // map directly through v % 7.
        let rng = rng_from(vec![0, 8, 2]);
        let outcome = spin(&rng).unwrap();
        assert_eq!(outcome.reels, [0, 1, 2]);
    }

    #[test]
    fn test_three_of_a_kind_pays_triple_weight() {
        let outcome = SlotOutcome { reels: [0, 0, 0] };
        let eval = evaluate(&outcome);
        assert!(eval.is_win);
        assert_eq!(eval.multiplier, Multiplier::from_hundredths(300));

        let diamonds = SlotOutcome { reels: [6, 6, 6] };
        assert_eq!(
            evaluate(&diamonds).multiplier,
            Multiplier::from_hundredths(6000)
        );
    }

    #[test]
    fn test_pair_pays_half_weight() {
        let outcome = SlotOutcome { reels: [4, 4, 1] };
        let eval = evaluate(&outcome);
        assert!(eval.is_win);
        assert_eq!(eval.multiplier, Multiplier::from_hundredths(250));
    }

    #[test]
    fn test_pair_positions_all_detected() {
        // Pair in front, back, and straddling the middle reel.
        for reels in [[2, 2, 5], [5, 2, 2], [2, 5, 2]] {
            let eval = evaluate(&SlotOutcome { reels });
            assert!(eval.is_win, "pair not detected in {reels:?}");
            assert_eq!(eval.multiplier, Multiplier::from_hundredths(100));
        }
    }

    #[test]
    fn test_mismatch_pays_nothing() {
        let eval = evaluate(&SlotOutcome { reels: [0, 1, 2] });
        assert!(!eval.is_win);
        assert!(eval.multiplier.is_zero());
    }

    #[test]
    fn test_triple_beats_pair_for_every_symbol() {
        for id in 0..SYMBOLS.len() as u8 {
            let other = if id == 0 { 1 } else { 0 };
            let triple = evaluate(&SlotOutcome {
                reels: [id, id, id],
            });
            let pair = evaluate(&SlotOutcome {
                reels: [id, id, other],
            });
            assert!(
                triple.multiplier > pair.multiplier,
                "symbol {id}: triple must out-pay pair"
            );
        }
    }

    #[test]
    fn test_glyphs_follow_symbol_ids() {
        let outcome = SlotOutcome { reels: [0, 0, 0] };
        assert_eq!(outcome.glyphs(), ["🍒", "🍒", "🍒"]);
    }
}
