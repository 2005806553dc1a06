use super::transaction::{Transaction, TransactionStatus};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Population a statistics report is computed over.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsScope {
    /// `None` means every tenant.
    pub tenant_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl StatsScope {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(LedgerError::ValidationError(
                "startDate is after endDate".to_string(),
            ));
        }
        Ok(())
    }

    pub fn contains(&self, tx: &Transaction) -> bool {
        !tx.is_deleted()
            && self
                .tenant_id
                .as_deref()
                .is_none_or(|t| tx.tenant_id() == t)
            && self.start_date.is_none_or(|d| tx.created_at() >= d)
            && self.end_date.is_none_or(|d| tx.created_at() <= d)
    }
}

/// Rollup metrics over a transaction population.
///
/// `processing` and `cancelled` rows count toward `total_transactions` but are
/// not broken out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionStats {
    pub total_transactions: u64,
    pub completed_transactions: u64,
    pub failed_transactions: u64,
    pub pending_transactions: u64,
    pub total_amount: Decimal,
    pub average_transaction_value: Decimal,
    pub success_rate: f64,
}

impl TransactionStats {
    /// Folds one consistent view of the store. Callers must hand in rows read
    /// under a single snapshot.
    pub fn collect<'a, I>(scope: &StatsScope, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut stats = Self::default();
        for tx in rows.into_iter().filter(|tx| scope.contains(tx)) {
            stats.total_transactions += 1;
            stats.total_amount += tx.amount().value();
            match tx.status() {
                TransactionStatus::Completed => stats.completed_transactions += 1,
                TransactionStatus::Failed => stats.failed_transactions += 1,
                TransactionStatus::Pending => stats.pending_transactions += 1,
                TransactionStatus::Processing | TransactionStatus::Cancelled => {}
            }
        }
        stats.finish()
    }

    fn finish(mut self) -> Self {
        if self.total_transactions > 0 {
            let total = Decimal::from(self.total_transactions);
            self.average_transaction_value = self.total_amount / total;
            self.success_rate =
                self.completed_transactions as f64 / self.total_transactions as f64;
        }
        self
    }
}
