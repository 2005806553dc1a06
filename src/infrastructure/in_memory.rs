use crate::domain::filter::{Page, TransactionFilter};
use crate::domain::ports::{TransactionRepository, Visibility};
use crate::domain::stats::{StatsScope, TransactionStats};
use crate::domain::transaction::{
    StateChange, StatusGuard, Transaction, TransactionId, TransactionPatch,
};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Records {
    by_id: HashMap<TransactionId, Transaction>,
    by_provider_ref: HashMap<String, TransactionId>,
}

impl Records {
    fn live(&self) -> impl Iterator<Item = &Transaction> {
        self.by_id.values().filter(|tx| !tx.is_deleted())
    }

    fn live_mut(&mut self, id: &TransactionId) -> Option<&mut Transaction> {
        self.by_id.get_mut(id).filter(|tx| !tx.is_deleted())
    }
}

/// A thread-safe in-memory transaction repository.
///
/// Uses `Arc<RwLock<..>>` for shared concurrent access. Every write, including
/// the status compare-and-swap, runs under the write guard, and every
/// aggregate runs under one read guard, which gives snapshot consistency.
/// Ideal for testing or small datasets where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryTransactionRepository {
    records: Arc<RwLock<Records>>,
}

impl InMemoryTransactionRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn create(&self, tx: Transaction) -> Result<Transaction> {
        tx.ensure_new()?;
        let mut records = self.records.write().await;
        if records
            .by_provider_ref
            .contains_key(tx.provider_transaction_id())
        {
            return Err(LedgerError::ConflictError(format!(
                "providerTransactionId {} already exists",
                tx.provider_transaction_id()
            )));
        }
        if records.by_id.contains_key(&tx.id()) {
            return Err(LedgerError::ConflictError(format!(
                "transaction {} already exists",
                tx.id()
            )));
        }
        records
            .by_provider_ref
            .insert(tx.provider_transaction_id().to_string(), tx.id());
        records.by_id.insert(tx.id(), tx.clone());
        Ok(tx)
    }

    async fn find_by_id(
        &self,
        id: TransactionId,
        visibility: Visibility,
    ) -> Result<Option<Transaction>> {
        let records = self.records.read().await;
        Ok(records
            .by_id
            .get(&id)
            .filter(|tx| visibility == Visibility::IncludeDeleted || !tx.is_deleted())
            .cloned())
    }

    async fn find_by_provider_transaction_id(
        &self,
        provider_transaction_id: &str,
    ) -> Result<Option<Transaction>> {
        let records = self.records.read().await;
        Ok(records
            .by_provider_ref
            .get(provider_transaction_id)
            .and_then(|id| records.by_id.get(id))
            .filter(|tx| !tx.is_deleted())
            .cloned())
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let mut records = self.records.write().await;
        Ok(records.live_mut(&id).map(|tx| {
            tx.apply_patch(patch);
            tx.clone()
        }))
    }

    async fn update_status_if(
        &self,
        id: TransactionId,
        expected: StatusGuard,
        change: StateChange,
    ) -> Result<Option<Transaction>> {
        let mut records = self.records.write().await;
        Ok(records
            .by_id
            .get_mut(&id)
            .filter(|tx| expected.holds(tx))
            .map(|tx| {
                tx.apply(&change);
                tx.clone()
            }))
    }

    async fn soft_delete(&self, id: TransactionId) -> Result<bool> {
        let mut records = self.records.write().await;
        Ok(records.live_mut(&id).map(|tx| tx.mark_deleted()).is_some())
    }

    async fn query(&self, filter: &TransactionFilter, page: &Page) -> Result<Vec<Transaction>> {
        let records = self.records.read().await;
        let matching = records
            .live()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        Ok(page.apply(matching))
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.live().filter(|tx| filter.matches(tx)).count() as u64)
    }

    async fn sum_amount(&self, filter: &TransactionFilter) -> Result<Decimal> {
        let records = self.records.read().await;
        Ok(records
            .live()
            .filter(|tx| filter.matches(tx))
            .map(|tx| tx.amount().value())
            .sum())
    }

    async fn stats(&self, scope: &StatsScope) -> Result<TransactionStats> {
        let records = self.records.read().await;
        Ok(TransactionStats::collect(scope, records.by_id.values()))
    }

    async fn exists(&self, id: TransactionId) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.by_id.get(&id).is_some_and(|tx| !tx.is_deleted()))
    }

    async fn provider_transaction_id_exists(&self, provider_transaction_id: &str) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.by_provider_ref.contains_key(provider_transaction_id))
    }
}
