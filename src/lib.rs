//! Croupier - Provably-Fair Outcome & Settlement Engine
//!
//! Library core for a casino backend: cryptographically secure outcome
//! generation for slot, roulette and color-match rounds, fixed paytable
//! evaluation, and atomic wager settlement against an append-only
//! transaction ledger. The HTTP layer, sessions and admin tooling live
//! elsewhere; they call into [`settlement::SettlementEngine`].

pub mod config;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod money;
pub mod rng;
pub mod settlement;

pub use config::{CasinoConfig, GameSettings};
pub use errors::{EngineError, LedgerError, RngError};
pub use games::{BetParams, Evaluation, GameType, Outcome};
pub use ledger::{
    BalanceStore, InMemoryBalanceStore, InMemoryTransactionStore, TransactionRecord,
    TransactionStatus, TransactionStore, TransactionType,
};
pub use money::{Amount, Multiplier};
pub use rng::{ByteSource, OsByteSource, ScriptedByteSource, SecureRng, SeededByteSource};
pub use settlement::{RoundReceipt, RoundStage, SettlementEngine, WagerRequest};
