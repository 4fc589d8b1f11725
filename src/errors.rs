//! Error types for the wagering engine.
//!
//! Pre-mutation rejections carry a stable error code the caller can act on;
//! post-debit settlement failures carry the stage reached so orphaned debits
//! can be found and reconciled.

use crate::money::Amount;
use crate::settlement::RoundStage;

/// Failure of the cryptographically secure byte source.
///
/// This is unrecoverable: a broken entropy source must never be papered over
/// with a weaker generator, so callers propagate it and abort the operation.
#[derive(Debug, thiserror::Error)]
pub enum RngError {
    #[error("secure byte source failed: {0}")]
    SourceFailure(String),

    #[error("scripted byte source exhausted after {consumed} bytes")]
    StreamExhausted { consumed: usize },
}

/// Errors from the balance and transaction stores.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient funds: tried to debit {requested} from balance {available}")]
    InsufficientFunds {
        requested: Amount,
        available: Amount,
    },

    #[error("balance overflow crediting {amount}")]
    BalanceOverflow { amount: Amount },

    #[error("duplicate transaction id {0}")]
    DuplicateTransaction(uuid::Uuid),

    #[error("unknown transaction id {0}")]
    UnknownTransaction(uuid::Uuid),

    #[error("transaction {0} is already finalized")]
    AlreadyFinalized(uuid::Uuid),
}

/// Engine-level errors returned to the caller of `place_wager` and the
/// other ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("bet amount {amount} outside allowed range {min}..={max}")]
    InvalidBetAmount {
        amount: Amount,
        min: Amount,
        max: Amount,
    },

    #[error("stake {stake} exceeds balance {balance}")]
    InsufficientBalance { stake: Amount, balance: Amount },

    #[error("unknown or inactive game {0:?}")]
    GameNotFound(String),

    #[error("invalid bet parameters: {0}")]
    InvalidBetType(String),

    #[error("settlement failed after {stage}: {reason}")]
    Settlement { stage: RoundStage, reason: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Rng(#[from] RngError),
}

impl EngineError {
    /// Stable machine-readable code for the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidBetAmount { .. } => "INVALID_BET_AMOUNT",
            EngineError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EngineError::GameNotFound(_) => "GAME_NOT_FOUND",
            EngineError::InvalidBetType(_) => "INVALID_BET_TYPE",
            EngineError::Ledger(LedgerError::InsufficientFunds { .. }) => "INSUFFICIENT_BALANCE",
            EngineError::Settlement { .. } | EngineError::Ledger(_) | EngineError::Rng(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// True when the error occurred after money had already moved.
    pub fn is_post_debit(&self) -> bool {
        matches!(self, EngineError::Settlement { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = EngineError::InvalidBetAmount {
            amount: Amount::from_units(1000),
            min: Amount::from_units(1),
            max: Amount::from_units(100),
        };
        assert_eq!(err.code(), "INVALID_BET_AMOUNT");

        let err = EngineError::InsufficientBalance {
            stake: Amount::from_units(10),
            balance: Amount::from_units(5),
        };
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");

        assert_eq!(EngineError::GameNotFound("dice".into()).code(), "GAME_NOT_FOUND");
        assert_eq!(
            EngineError::InvalidBetType("bad color".into()).code(),
            "INVALID_BET_TYPE"
        );
        assert_eq!(
            EngineError::Rng(RngError::SourceFailure("os".into())).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = EngineError::InsufficientBalance {
            stake: Amount::from_units(10),
            balance: Amount::from_units(5),
        };
        let msg = err.to_string();
        assert!(msg.contains("10.00"));
        assert!(msg.contains("5.00"));
    }
}
