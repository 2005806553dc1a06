//! Outbound representations of transactions and statistics.

use crate::domain::filter::Page;
use crate::domain::provider_data::ProviderData;
use crate::domain::stats::TransactionStats;
use crate::domain::transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Detail view of a transaction: string enums, RFC 3339 timestamps, decimal
/// amounts as strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: TransactionId,
    pub payment_id: String,
    pub tenant_id: String,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub provider_transaction_id: String,
    pub provider_data: ProviderData,
    pub retry_count: u32,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id(),
            payment_id: tx.payment_id().to_string(),
            tenant_id: tx.tenant_id().to_string(),
            r#type: tx.r#type(),
            amount: tx.amount().value(),
            status: tx.status(),
            provider_transaction_id: tx.provider_transaction_id().to_string(),
            provider_data: tx.provider_data().clone(),
            retry_count: tx.retry_count(),
            processed_at: tx.processed_at(),
            created_at: tx.created_at(),
            updated_at: tx.updated_at(),
            deleted_at: tx.deleted_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_transactions: u64,
    pub completed_transactions: u64,
    pub failed_transactions: u64,
    pub pending_transactions: u64,
    pub total_amount: Decimal,
    pub average_transaction_value: Decimal,
    pub success_rate: f64,
}

impl From<&TransactionStats> for StatsView {
    fn from(stats: &TransactionStats) -> Self {
        Self {
            total_transactions: stats.total_transactions,
            completed_transactions: stats.completed_transactions,
            failed_transactions: stats.failed_transactions,
            pending_transactions: stats.pending_transactions,
            total_amount: stats.total_amount,
            average_transaction_value: stats.average_transaction_value.normalize(),
            success_rate: stats.success_rate,
        }
    }
}

/// One page of a filtered query. Re-issuing the same filter against an
/// unchanged store yields the same page.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub limit: usize,
    pub offset: usize,
}

impl TransactionPage {
    pub(crate) fn new(items: Vec<Transaction>, page: &Page) -> Self {
        Self {
            items,
            limit: page.limit,
            offset: page.offset,
        }
    }

    /// Summaries are built lazily as the caller iterates.
    pub fn summaries(&self) -> impl Iterator<Item = TransactionView> + '_ {
        self.items.iter().map(TransactionView::from)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Offset of the following page, if this one was full.
    pub fn next_offset(&self) -> Option<usize> {
        (self.items.len() == self.limit).then_some(self.offset + self.limit)
    }
}

impl IntoIterator for TransactionPage {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
