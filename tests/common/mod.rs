#![allow(dead_code)]

use rand::Rng;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use txlife::application::engine::TransactionEngine;
use txlife::config::EngineConfig;
use txlife::domain::commands::{
    CancelTransaction, CompleteTransaction, CreateTransaction, FailTransaction,
    ProcessTransaction,
};
use txlife::domain::transaction::{Transaction, TransactionStatus, TransactionType};
use txlife::infrastructure::in_memory::InMemoryTransactionRepository;

pub const HEADER: &str = "op, payment, tenant, type, amount, provider_tx, actor, reason";

pub fn engine() -> TransactionEngine {
    TransactionEngine::new(
        Box::new(InMemoryTransactionRepository::new()),
        EngineConfig::default(),
    )
}

pub fn create_cmd(tenant: &str, provider_tx: &str, amount: Decimal) -> CreateTransaction {
    CreateTransaction {
        payment_id: format!("pay_{}", provider_tx),
        tenant_id: tenant.to_string(),
        r#type: TransactionType::Payment,
        amount,
        provider_transaction_id: provider_tx.to_string(),
        provider_data: None,
    }
}

/// Creates a transaction and walks it to `status` through the engine.
pub async fn create_in_status(
    engine: &TransactionEngine,
    cmd: CreateTransaction,
    status: TransactionStatus,
) -> Transaction {
    let tx = engine.create(cmd).await.unwrap();
    let id = tx.id();
    let process = ProcessTransaction {
        transaction_id: id,
        processed_by: "worker".to_string(),
    };
    match status {
        TransactionStatus::Pending => tx,
        TransactionStatus::Processing => engine.process(process).await.unwrap(),
        TransactionStatus::Completed => {
            engine.process(process).await.unwrap();
            engine
                .complete(CompleteTransaction {
                    transaction_id: id,
                    completed_by: "sys".to_string(),
                    provider_data: None,
                })
                .await
                .unwrap()
        }
        TransactionStatus::Failed => {
            engine.process(process).await.unwrap();
            engine
                .fail(FailTransaction {
                    transaction_id: id,
                    failure_reason: "declined".to_string(),
                    failed_by: "gateway".to_string(),
                })
                .await
                .unwrap()
        }
        TransactionStatus::Cancelled => engine
            .cancel(CancelTransaction {
                transaction_id: id,
                cancellation_reason: "requested".to_string(),
                cancelled_by: "support".to_string(),
            })
            .await
            .unwrap(),
    }
}

pub fn random_status<R: Rng>(rng: &mut R) -> TransactionStatus {
    match rng.gen_range(0..5) {
        0 => TransactionStatus::Pending,
        1 => TransactionStatus::Processing,
        2 => TransactionStatus::Completed,
        3 => TransactionStatus::Failed,
        _ => TransactionStatus::Cancelled,
    }
}

pub fn random_amount<R: Rng>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(1..=1_000_000), 2)
}

pub fn write_commands(path: &Path, rows: &[&str]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", HEADER)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}
