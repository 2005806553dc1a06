use super::csv::command_reader::{CommandOp, CommandRecord};
use crate::application::engine::TransactionEngine;
use crate::domain::commands::{
    CancelTransaction, CompleteTransaction, CreateTransaction, FailTransaction,
    ProcessTransaction, RetryTransaction,
};
use crate::error::{LedgerError, Result};

fn field(name: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| LedgerError::ValidationError(format!("{} is required", name)))
}

/// Applies command log rows to an engine.
pub struct Replayer<'a> {
    engine: &'a TransactionEngine,
    default_tenant: Option<String>,
}

impl<'a> Replayer<'a> {
    /// `default_tenant` fills the tenant column of create rows that omit it.
    pub fn new(engine: &'a TransactionEngine, default_tenant: Option<String>) -> Self {
        Self {
            engine,
            default_tenant,
        }
    }

    pub async fn apply(&self, record: CommandRecord) -> Result<()> {
        if record.op == CommandOp::Create {
            return self.create(record).await;
        }

        let transaction_id = self
            .engine
            .find_by_provider_transaction_id(&record.provider_tx)
            .await?
            .id();
        let actor = field("actor", record.actor);

        match record.op {
            CommandOp::Process => {
                self.engine
                    .process(ProcessTransaction {
                        transaction_id,
                        processed_by: actor?,
                    })
                    .await?;
            }
            CommandOp::Complete => {
                self.engine
                    .complete(CompleteTransaction {
                        transaction_id,
                        completed_by: actor?,
                        provider_data: None,
                    })
                    .await?;
            }
            CommandOp::Fail => {
                self.engine
                    .fail(FailTransaction {
                        transaction_id,
                        failure_reason: field("reason", record.reason)?,
                        failed_by: actor?,
                    })
                    .await?;
            }
            CommandOp::Cancel => {
                self.engine
                    .cancel(CancelTransaction {
                        transaction_id,
                        cancellation_reason: field("reason", record.reason)?,
                        cancelled_by: actor?,
                    })
                    .await?;
            }
            CommandOp::Retry => {
                self.engine
                    .retry(RetryTransaction {
                        transaction_id,
                        retried_by: actor?,
                    })
                    .await?;
            }
            CommandOp::Delete => self.engine.delete(transaction_id).await?,
            CommandOp::Create => {} // handled above
        }
        Ok(())
    }

    async fn create(&self, record: CommandRecord) -> Result<()> {
        let tenant_id = field(
            "tenant",
            record.tenant.or_else(|| self.default_tenant.clone()),
        )?;
        self.engine
            .create(CreateTransaction {
                payment_id: field("payment", record.payment)?,
                tenant_id,
                r#type: record
                    .r#type
                    .ok_or_else(|| LedgerError::ValidationError("type is required".to_string()))?,
                amount: record
                    .amount
                    .ok_or_else(|| LedgerError::ValidationError("amount is required".to_string()))?,
                provider_transaction_id: record.provider_tx,
                provider_data: None,
            })
            .await?;
        Ok(())
    }
}
