//! Transaction records and the append-only transaction store.

use crate::errors::LedgerError;
use crate::money::Amount;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Bet,
    Win,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    /// Final statuses never change again.
    pub fn is_final(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// One ledger entry. Immutable once final; until then only `status` and
/// `updated_at` may change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub player_id: String,
    pub tx_type: TransactionType,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// New pending record with a fresh id.
    pub fn new(
        player_id: impl Into<String>,
        tx_type: TransactionType,
        amount: Amount,
        description: impl Into<String>,
        game_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            player_id: player_id.into(),
            tx_type,
            amount,
            status: TransactionStatus::Pending,
            description: description.into(),
            game_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persistence for transaction records.
///
/// `create` must reject duplicate ids — that is where idempotency of
/// financial writes is enforced, not by retry loops above it.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(&self, record: TransactionRecord) -> Result<(), LedgerError>;

    /// Move a record to a new status. Rejects changes to finalized records.
    async fn update_status(&self, id: Uuid, status: TransactionStatus) -> Result<(), LedgerError>;

    async fn get(&self, id: Uuid) -> Result<Option<TransactionRecord>, LedgerError>;

    /// All records for a player, oldest first.
    async fn for_player(&self, player_id: &str) -> Result<Vec<TransactionRecord>, LedgerError>;
}

/// In-memory store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    records: DashMap<Uuid, TransactionRecord>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stuck outside `completed`/`cancelled` — the reconciliation
    /// worklist after a settlement failure.
    pub fn unsettled(&self) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .records
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    TransactionStatus::Pending | TransactionStatus::Failed
                )
            })
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create(&self, record: TransactionRecord) -> Result<(), LedgerError> {
        use dashmap::mapref::entry::Entry;
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateTransaction(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn update_status(&self, id: Uuid, status: TransactionStatus) -> Result<(), LedgerError> {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or(LedgerError::UnknownTransaction(id))?;
        if record.status.is_final() {
            return Err(LedgerError::AlreadyFinalized(id));
        }
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn for_player(&self, player_id: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
        let mut records: Vec<TransactionRecord> = self
            .records
            .iter()
            .filter(|r| r.player_id == player_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}
