//! Append-only transaction ledger and player balance store.
//!
//! Both stores are traits so the settlement engine can run against the
//! in-memory implementations here or a database-backed pair with the same
//! atomicity contract. No other component writes balance or transaction
//! state.

pub mod balance;
pub mod transactions;

pub use balance::{BalanceStore, InMemoryBalanceStore};
pub use transactions::{
    InMemoryTransactionStore, TransactionRecord, TransactionStatus, TransactionStore,
    TransactionType,
};
