use super::filter::{Page, TransactionFilter};
use super::stats::{StatsScope, TransactionStats};
use super::transaction::{
    StateChange, StatusGuard, Transaction, TransactionId, TransactionPatch, TransactionStatus,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Whether reads may see soft-deleted rows. Only audit paths ask for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Active,
    IncludeDeleted,
}

/// Storage boundary for transactions.
///
/// Implementations must make every write atomic per record and must never
/// physically remove a row. Reads exclude soft-deleted rows unless the caller
/// asks for [`Visibility::IncludeDeleted`].
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Stores a new record. Fails with `ValidationError` unless the record is
    /// a fresh pending one, and with `ConflictError` if the provider
    /// transaction id is already taken.
    async fn create(&self, tx: Transaction) -> Result<Transaction>;

    async fn find_by_id(
        &self,
        id: TransactionId,
        visibility: Visibility,
    ) -> Result<Option<Transaction>>;

    async fn find_by_provider_transaction_id(
        &self,
        provider_transaction_id: &str,
    ) -> Result<Option<Transaction>>;

    /// Merges mutable fields into a live record. `None` if there is no such
    /// live record.
    async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>>;

    /// Atomic compare-and-swap: applies `change` only if the stored record is
    /// live and `expected` still holds for it. `None` means the precondition
    /// did not hold and nothing was written.
    async fn update_status_if(
        &self,
        id: TransactionId,
        expected: StatusGuard,
        change: StateChange,
    ) -> Result<Option<Transaction>>;

    /// Marks a live record deleted. `false` if there was none.
    async fn soft_delete(&self, id: TransactionId) -> Result<bool>;

    /// One page of live records matching `filter`, ordered by `page`.
    async fn query(&self, filter: &TransactionFilter, page: &Page) -> Result<Vec<Transaction>>;

    async fn count(&self, filter: &TransactionFilter) -> Result<u64>;

    async fn sum_amount(&self, filter: &TransactionFilter) -> Result<Decimal>;

    /// Rollup computed from a single consistent snapshot.
    async fn stats(&self, scope: &StatsScope) -> Result<TransactionStats>;

    async fn exists(&self, id: TransactionId) -> Result<bool>;

    async fn provider_transaction_id_exists(&self, provider_transaction_id: &str) -> Result<bool>;

    async fn find_by_tenant(&self, tenant_id: &str, page: &Page) -> Result<Vec<Transaction>> {
        self.query(&TransactionFilter::for_tenant(tenant_id), page)
            .await
    }

    async fn find_by_payment(&self, payment_id: &str, page: &Page) -> Result<Vec<Transaction>> {
        self.query(&TransactionFilter::for_payment(payment_id), page)
            .await
    }

    async fn find_by_status(
        &self,
        status: TransactionStatus,
        page: &Page,
    ) -> Result<Vec<Transaction>> {
        self.query(&TransactionFilter::default().with_status(status), page)
            .await
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: &Page,
    ) -> Result<Vec<Transaction>> {
        self.query(&TransactionFilter::default().between(start, end), page)
            .await
    }

    async fn count_by_tenant(&self, tenant_id: &str) -> Result<u64> {
        self.count(&TransactionFilter::for_tenant(tenant_id)).await
    }

    async fn count_by_status(&self, status: TransactionStatus) -> Result<u64> {
        self.count(&TransactionFilter::default().with_status(status))
            .await
    }

    async fn sum_by_tenant(&self, tenant_id: &str) -> Result<Decimal> {
        self.sum_amount(&TransactionFilter::for_tenant(tenant_id))
            .await
    }
}

pub type TransactionRepositoryBox = Box<dyn TransactionRepository>;
