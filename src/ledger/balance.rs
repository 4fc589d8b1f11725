//! Player balance store with atomic conditional debits.

use crate::errors::LedgerError;
use crate::money::Amount;
use async_trait::async_trait;
use dashmap::DashMap;

/// Storage for player balances.
///
/// `try_debit` is the linearization point for a player's money: it must
/// atomically check and decrement, failing without any mutation when the
/// balance cannot cover the amount. Concurrent debits against one player
/// must never both succeed past the available funds.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance; players without an account read as zero.
    async fn balance_of(&self, player_id: &str) -> Result<Amount, LedgerError>;

    /// Conditional decrement. Returns the new balance, or fails with
    /// `InsufficientFunds` leaving the balance untouched.
    async fn try_debit(&self, player_id: &str, amount: Amount) -> Result<Amount, LedgerError>;

    /// Increment. Returns the new balance.
    async fn credit(&self, player_id: &str, amount: Amount) -> Result<Amount, LedgerError>;
}

/// In-memory balance store.
///
/// The map's per-entry lock serializes all mutations for one player, which
/// is exactly the conditional-update guarantee a database row with
/// `UPDATE ... WHERE balance >= amount` would give.
#[derive(Default)]
pub struct InMemoryBalanceStore {
    balances: DashMap<String, Amount>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a balance directly, bypassing the ledger. Test setup only.
    pub fn with_balance(player_id: impl Into<String>, balance: Amount) -> Self {
        let store = Self::new();
        store.balances.insert(player_id.into(), balance);
        store
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn balance_of(&self, player_id: &str) -> Result<Amount, LedgerError> {
        Ok(self
            .balances
            .get(player_id)
            .map(|b| *b.value())
            .unwrap_or(Amount::ZERO))
    }

    async fn try_debit(&self, player_id: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let mut entry = self
            .balances
            .entry(player_id.to_string())
            .or_insert(Amount::ZERO);
        match entry.checked_sub(amount) {
            Some(rest) => {
                *entry = rest;
                Ok(rest)
            }
            None => Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: *entry,
            }),
        }
    }

    async fn credit(&self, player_id: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let mut entry = self
            .balances
            .entry(player_id.to_string())
            .or_insert(Amount::ZERO);
        match entry.checked_add(amount) {
            Some(total) => {
                *entry = total;
                Ok(total)
            }
            None => Err(LedgerError::BalanceOverflow { amount }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unknown_player_reads_zero() {
        let store = InMemoryBalanceStore::new();
        assert_eq!(store.balance_of("nobody").await.unwrap(), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_debit_and_credit() {
        let store = InMemoryBalanceStore::with_balance("alice", Amount::from_units(100));

        let after = store
            .try_debit("alice", Amount::from_units(30))
            .await
            .unwrap();
        assert_eq!(after, Amount::from_units(70));

        let after = store.credit("alice", Amount::from_units(5)).await.unwrap();
        assert_eq!(after, Amount::from_units(75));
    }

    #[tokio::test]
    async fn test_overdraft_rejected_without_mutation() {
        let store = InMemoryBalanceStore::with_balance("alice", Amount::from_units(5));

        let err = store
            .try_debit("alice", Amount::from_units(10))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(
            store.balance_of("alice").await.unwrap(),
            Amount::from_units(5)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let store = Arc::new(InMemoryBalanceStore::with_balance(
            "alice",
            Amount::from_units(100),
        ));

        // 30 tasks each try to take 10 from a balance of 100; exactly 10
        // can succeed.
        let mut handles = Vec::new();
        for _ in 0..30 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.try_debit("alice", Amount::from_units(10)).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 10);
        assert_eq!(store.balance_of("alice").await.unwrap(), Amount::ZERO);
    }
}
