//! Inbound commands accepted by the transition engine.

use super::provider_data::ProviderData;
use super::transaction::{TransactionId, TransactionType};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub payment_id: String,
    pub tenant_id: String,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub provider_transaction_id: String,
    #[serde(default)]
    pub provider_data: Option<ProviderData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTransaction {
    pub transaction_id: TransactionId,
    pub processed_by: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTransaction {
    pub transaction_id: TransactionId,
    pub completed_by: String,
    #[serde(default)]
    pub provider_data: Option<ProviderData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailTransaction {
    pub transaction_id: TransactionId,
    pub failure_reason: String,
    pub failed_by: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTransaction {
    pub transaction_id: TransactionId,
    pub cancellation_reason: String,
    pub cancelled_by: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryTransaction {
    pub transaction_id: TransactionId,
    pub retried_by: String,
}

/// Provider metadata update outside of any status transition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    pub transaction_id: TransactionId,
    pub provider_data: ProviderData,
}
