use super::transaction::{Transaction, TransactionStatus, TransactionType};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::cmp::Ordering;

/// Page size used when a filter does not carry a limit.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Upper bound on any single page.
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Amount,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Conjunctive filter over the transaction store. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionFilter {
    pub payment_id: Option<String>,
    pub tenant_id: Option<String>,
    pub r#type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Resolved pagination and ordering for a validated filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl TransactionFilter {
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    pub fn for_payment(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: Some(payment_id.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn paged(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn sorted(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self.sort_order = Some(sort_order);
        self
    }

    /// Checks range consistency only. Aggregates ignore paging, so this is
    /// all they need.
    pub fn validate_ranges(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount)
            && min > max
        {
            return Err(LedgerError::ValidationError(format!(
                "minAmount ({}) is greater than maxAmount ({})",
                min, max
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(LedgerError::ValidationError(
                "startDate is after endDate".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks range consistency and resolves the page. Runs before any storage
    /// access.
    pub fn validate(&self, default_limit: usize, max_limit: usize) -> Result<Page> {
        self.validate_ranges()?;

        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 || limit > max_limit {
            return Err(LedgerError::ValidationError(format!(
                "limit must be between 1 and {}",
                max_limit
            )));
        }

        Ok(Page {
            limit,
            offset: self.offset.unwrap_or(0),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        })
    }

    /// Predicate part of the filter; ignores pagination and soft deletion.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.payment_id
            .as_deref()
            .is_none_or(|p| tx.payment_id() == p)
            && self
                .tenant_id
                .as_deref()
                .is_none_or(|t| tx.tenant_id() == t)
            && self.r#type.is_none_or(|t| tx.r#type() == t)
            && self.status.is_none_or(|s| tx.status() == s)
            && self.start_date.is_none_or(|d| tx.created_at() >= d)
            && self.end_date.is_none_or(|d| tx.created_at() <= d)
            && self.min_amount.is_none_or(|m| tx.amount().value() >= m)
            && self.max_amount.is_none_or(|m| tx.amount().value() <= m)
    }
}

impl Page {
    /// Total order over transactions; ties fall back to creation time then id
    /// so repeated queries return identical pages.
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let primary = match self.sort_by {
            SortBy::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortBy::Amount => a.amount().cmp(&b.amount()),
            SortBy::Status => a.status().cmp(&b.status()),
        };
        let ordered = primary
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(&b.id()));
        match self.sort_order {
            SortOrder::Asc => ordered,
            SortOrder::Desc => ordered.reverse(),
        }
    }

    /// Sorts the matching population and cuts out this page.
    pub fn apply(&self, mut population: Vec<Transaction>) -> Vec<Transaction> {
        population.sort_by(|a, b| self.compare(a, b));
        population
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}
