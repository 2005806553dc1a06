use super::commands::CreateTransaction;
use super::money::Amount;
use super::provider_data::ProviderData;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type TransactionId = Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Payment,
    Refund,
    Chargeback,
    Adjustment,
    Fee,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "payment",
            TransactionType::Refund => "refund",
            TransactionType::Chargeback => "chargeback",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Fee => "fee",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "payment" => Ok(TransactionType::Payment),
            "refund" => Ok(TransactionType::Refund),
            "chargeback" => Ok(TransactionType::Chargeback),
            "adjustment" => Ok(TransactionType::Adjustment),
            "fee" => Ok(TransactionType::Fee),
            other => Err(LedgerError::ValidationError(format!(
                "Unknown transaction type: {}",
                other
            ))),
        }
    }
}

/// Lifecycle status. Declaration order is the lifecycle order and is what
/// `sortBy=status` sorts on.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    /// Completed and cancelled accept no further transitions. Failed is not
    /// terminal here because retry leads back to pending.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "processing" => Ok(TransactionStatus::Processing),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            other => Err(LedgerError::ValidationError(format!(
                "Unknown transaction status: {}",
                other
            ))),
        }
    }
}

/// A status write prepared by the transition engine and applied by a
/// repository under its compare-and-swap.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub to: TransactionStatus,
    /// Stamp `processed_at` if it has never been set.
    pub mark_processed: bool,
    pub merge: ProviderData,
    pub clear: Vec<&'static str>,
    pub increment_retry: bool,
}

impl StateChange {
    pub fn to(status: TransactionStatus) -> Self {
        Self {
            to: status,
            mark_processed: false,
            merge: ProviderData::new(),
            clear: Vec::new(),
            increment_retry: false,
        }
    }
}

/// Mutable fields accepted by the external update path.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionPatch {
    #[serde(default)]
    pub provider_data: Option<ProviderData>,
}

const IMMUTABLE_FIELDS: [&str; 9] = [
    "id",
    "paymentId",
    "tenantId",
    "type",
    "amount",
    "providerTransactionId",
    "createdAt",
    "retryCount",
    "deletedAt",
];

const ENGINE_FIELDS: [&str; 2] = ["status", "processedAt"];

impl TransactionPatch {
    pub fn provider_data(data: ProviderData) -> Self {
        Self {
            provider_data: Some(data),
        }
    }

    /// Parses a partial update, rejecting any attempt to touch a field that
    /// is immutable or owned by the transition engine.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            LedgerError::ValidationError("Update must be a JSON object".to_string())
        })?;

        if let Some(field) = object
            .keys()
            .find(|k| IMMUTABLE_FIELDS.contains(&k.as_str()))
        {
            return Err(LedgerError::ValidationError(format!(
                "Field `{}` is immutable",
                field
            )));
        }
        if let Some(field) = object.keys().find(|k| ENGINE_FIELDS.contains(&k.as_str())) {
            return Err(LedgerError::ValidationError(format!(
                "Field `{}` can only change through a transition",
                field
            )));
        }

        serde_json::from_value(value.clone())
            .map_err(|e| LedgerError::ValidationError(format!("Invalid update: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        self.provider_data.is_none()
    }
}

/// The state-carrying record of a monetary transaction.
///
/// Fields are only readable from outside the crate; status and timestamps move
/// exclusively through [`StateChange`]s applied by a repository on behalf of
/// the transition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    payment_id: String,
    tenant_id: String,
    r#type: TransactionType,
    amount: Amount,
    status: TransactionStatus,
    provider_transaction_id: String,
    provider_data: ProviderData,
    #[serde(default)]
    retry_count: u32,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// The part of a record a transition decided on. A compare-and-swap writes
/// only while the stored record is live and still matches it; `updated_at`
/// moves on every write, so a record that left `status` and came back does
/// not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusGuard {
    pub status: TransactionStatus,
    pub updated_at: DateTime<Utc>,
}

impl StatusGuard {
    pub fn of(tx: &Transaction) -> Self {
        Self {
            status: tx.status,
            updated_at: tx.updated_at,
        }
    }

    pub fn holds(&self, tx: &Transaction) -> bool {
        !tx.is_deleted() && tx.status == self.status && tx.updated_at == self.updated_at
    }
}

/// Identifiers are stored exactly as given; blank ones are rejected.
fn required(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        Err(LedgerError::ValidationError(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(value)
    }
}

impl Transaction {
    /// Validates a create command and builds a pending transaction.
    pub fn create(cmd: CreateTransaction) -> Result<Self> {
        let payment_id = required("paymentId", cmd.payment_id)?;
        let tenant_id = required("tenantId", cmd.tenant_id)?;
        let provider_transaction_id =
            required("providerTransactionId", cmd.provider_transaction_id)?;
        let amount = Amount::new(cmd.amount)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            payment_id,
            tenant_id,
            r#type: cmd.r#type,
            amount,
            status: TransactionStatus::Pending,
            provider_transaction_id,
            provider_data: cmd.provider_data.unwrap_or_default(),
            retry_count: 0,
            processed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn provider_transaction_id(&self) -> &str {
        &self.provider_transaction_id
    }

    pub fn provider_data(&self) -> &ProviderData {
        &self.provider_data
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Refreshes `updated_at`, keeping it strictly increasing even when the
    /// clock has not advanced since the previous write.
    fn touch(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
        self.updated_at
    }

    /// Rejects records that [`Transaction::create`] could not have produced.
    /// Repositories call this before storing a new row.
    pub(crate) fn ensure_new(&self) -> Result<()> {
        for (field, value) in [
            ("paymentId", &self.payment_id),
            ("tenantId", &self.tenant_id),
            ("providerTransactionId", &self.provider_transaction_id),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::ValidationError(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        if self.status != TransactionStatus::Pending
            || self.processed_at.is_some()
            || self.deleted_at.is_some()
            || self.retry_count != 0
        {
            return Err(LedgerError::ValidationError(format!(
                "transaction {} is not a new pending record",
                self.id
            )));
        }
        Ok(())
    }

    pub(crate) fn apply(&mut self, change: &StateChange) {
        let at = self.touch();
        self.status = change.to;
        if change.mark_processed && self.processed_at.is_none() {
            self.processed_at = Some(at);
        }
        for key in &change.clear {
            self.provider_data.remove(key);
        }
        self.provider_data.merge(change.merge.clone());
        if change.increment_retry {
            self.retry_count += 1;
        }
    }

    pub(crate) fn apply_patch(&mut self, patch: TransactionPatch) {
        self.touch();
        if let Some(data) = patch.provider_data {
            self.provider_data.merge(data);
        }
    }

    pub(crate) fn mark_deleted(&mut self) {
        let at = self.touch();
        self.deleted_at = Some(at);
    }
}
