use super::transitions::{Operation, validate_transition};
use super::views::TransactionPage;
use crate::config::EngineConfig;
use crate::domain::commands::{
    CancelTransaction, CompleteTransaction, CreateTransaction, FailTransaction,
    ProcessTransaction, RetryTransaction, UpdateTransaction,
};
use crate::domain::filter::TransactionFilter;
use crate::domain::ports::{TransactionRepositoryBox, Visibility};
use crate::domain::provider_data::{
    CANCELLATION_REASON, CANCELLED_BY, FAILED_BY, FAILURE_REASON, ProviderData,
};
use crate::domain::stats::{StatsScope, TransactionStats};
use crate::domain::transaction::{
    StateChange, StatusGuard, Transaction, TransactionId, TransactionPatch, TransactionStatus,
};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::future::Future;
use tracing::{debug, info, warn};

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(LedgerError::ValidationError(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(trimmed)
    }
}

/// The transition engine.
///
/// `TransactionEngine` is the only writer of transaction status. Every
/// transition reads the current record, checks the edge table, and then
/// writes through the repository's compare-and-swap, so two callers racing on
/// the same transaction can never both succeed. Repository calls are bounded
/// by the configured storage timeout; a timeout surfaces as a transient
/// `StorageError` and says nothing about whether the write landed.
pub struct TransactionEngine {
    repository: TransactionRepositoryBox,
    config: EngineConfig,
}

impl TransactionEngine {
    /// Creates a new `TransactionEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `repository` - The storage backend for transactions.
    /// * `config` - Retry ceiling, paging bounds and storage timeout.
    pub fn new(repository: TransactionRepositoryBox, config: EngineConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn storage<T, F>(&self, call: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.storage_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(call, "Storage call timed out");
                Err(LedgerError::transient(format!("{} timed out", call)))
            }
        }
    }

    /// Validates and stores a new pending transaction.
    pub async fn create(&self, cmd: CreateTransaction) -> Result<Transaction> {
        let tx = Transaction::create(cmd)?;
        let stored = self
            .storage("create", self.repository.create(tx))
            .await?;
        info!(
            transaction_id = %stored.id(),
            tenant_id = stored.tenant_id(),
            kind = %stored.r#type(),
            amount = %stored.amount(),
            "Transaction created"
        );
        Ok(stored)
    }

    pub async fn process(&self, cmd: ProcessTransaction) -> Result<Transaction> {
        let actor = required("processedBy", &cmd.processed_by)?;
        self.transition(cmd.transaction_id, Operation::Process, actor, |_, target| {
            let mut change = StateChange::to(target);
            change.mark_processed = true;
            Ok(change)
        })
        .await
    }

    pub async fn complete(&self, cmd: CompleteTransaction) -> Result<Transaction> {
        let actor = required("completedBy", &cmd.completed_by)?;
        let merge = cmd.provider_data.unwrap_or_default();
        self.transition(cmd.transaction_id, Operation::Complete, actor, |_, target| {
            let mut change = StateChange::to(target);
            change.mark_processed = true;
            change.merge = merge;
            Ok(change)
        })
        .await
    }

    pub async fn fail(&self, cmd: FailTransaction) -> Result<Transaction> {
        let actor = required("failedBy", &cmd.failed_by)?;
        let reason = required("failureReason", &cmd.failure_reason)?;
        self.transition(cmd.transaction_id, Operation::Fail, actor, |_, target| {
            let mut change = StateChange::to(target);
            change.mark_processed = true;
            change.merge = ProviderData::new()
                .with(FAILURE_REASON, reason)
                .with(FAILED_BY, actor);
            Ok(change)
        })
        .await
    }

    pub async fn cancel(&self, cmd: CancelTransaction) -> Result<Transaction> {
        let actor = required("cancelledBy", &cmd.cancelled_by)?;
        let reason = required("cancellationReason", &cmd.cancellation_reason)?;
        self.transition(cmd.transaction_id, Operation::Cancel, actor, |_, target| {
            let mut change = StateChange::to(target);
            change.mark_processed = true;
            change.merge = ProviderData::new()
                .with(CANCELLATION_REASON, reason)
                .with(CANCELLED_BY, actor);
            Ok(change)
        })
        .await
    }

    /// Sends a failed transaction back to pending, up to `max_retries` times.
    /// `processed_at` is left untouched.
    pub async fn retry(&self, cmd: RetryTransaction) -> Result<Transaction> {
        let actor = required("retriedBy", &cmd.retried_by)?;
        let max_retries = self.config.max_retries;
        self.transition(cmd.transaction_id, Operation::Retry, actor, |current, target| {
            if current.retry_count() >= max_retries {
                return Err(LedgerError::InvalidTransitionError(format!(
                    "transaction {} reached the retry limit of {}",
                    current.id(),
                    max_retries
                )));
            }
            let mut change = StateChange::to(target);
            change.clear = vec![FAILURE_REASON, FAILED_BY];
            change.increment_retry = true;
            Ok(change)
        })
        .await
    }

    async fn transition<B>(
        &self,
        id: TransactionId,
        op: Operation,
        actor: &str,
        build: B,
    ) -> Result<Transaction>
    where
        B: FnOnce(&Transaction, TransactionStatus) -> Result<StateChange>,
    {
        let current = self.read_for_transition(id).await?;
        let target = validate_transition(&current, op)?;
        let change = build(&current, target)?;

        let from = current.status();
        let written = self
            .storage(
                "update_status_if",
                self.repository
                    .update_status_if(id, StatusGuard::of(&current), change),
            )
            .await?;

        match written {
            Some(tx) => {
                info!(
                    transaction_id = %id,
                    operation = %op,
                    from = %from,
                    to = %tx.status(),
                    actor,
                    "Transaction transitioned"
                );
                Ok(tx)
            }
            None => {
                // Lost the compare-and-swap; report against what is stored now.
                warn!(
                    transaction_id = %id,
                    operation = %op,
                    expected = %from,
                    "Concurrent transition detected"
                );
                let latest = self.read_for_transition(id).await?;
                match validate_transition(&latest, op) {
                    Err(e) => Err(e),
                    Ok(_) => Err(LedgerError::InvalidTransitionError(format!(
                        "transaction {} was modified concurrently; re-read and retry {}",
                        id, op
                    ))),
                }
            }
        }
    }

    async fn read_for_transition(&self, id: TransactionId) -> Result<Transaction> {
        self.storage(
            "find_by_id",
            self.repository.find_by_id(id, Visibility::IncludeDeleted),
        )
        .await?
        .ok_or_else(|| LedgerError::NotFoundError(format!("transaction {}", id)))
    }

    /// Merges provider metadata into a live transaction without touching its
    /// status.
    pub async fn update(&self, cmd: UpdateTransaction) -> Result<Transaction> {
        self.apply_patch(cmd.transaction_id, TransactionPatch::provider_data(cmd.provider_data))
            .await
    }

    /// Applies a raw partial update, rejecting immutable or engine-owned
    /// fields before any storage access.
    pub async fn patch(&self, id: TransactionId, update: &serde_json::Value) -> Result<Transaction> {
        let patch = TransactionPatch::from_json(update)?;
        self.apply_patch(id, patch).await
    }

    async fn apply_patch(&self, id: TransactionId, patch: TransactionPatch) -> Result<Transaction> {
        let updated = self
            .storage("update", self.repository.update(id, patch))
            .await?
            .ok_or_else(|| LedgerError::NotFoundError(format!("transaction {}", id)))?;
        debug!(transaction_id = %id, "Provider data updated");
        Ok(updated)
    }

    /// Soft-deletes a live transaction. The row stays readable for audit.
    pub async fn delete(&self, id: TransactionId) -> Result<()> {
        if self
            .storage("soft_delete", self.repository.soft_delete(id))
            .await?
        {
            info!(transaction_id = %id, "Transaction soft-deleted");
            Ok(())
        } else {
            Err(LedgerError::NotFoundError(format!("transaction {}", id)))
        }
    }

    pub async fn get(&self, id: TransactionId) -> Result<Transaction> {
        self.storage("find_by_id", self.repository.find_by_id(id, Visibility::Active))
            .await?
            .ok_or_else(|| LedgerError::NotFoundError(format!("transaction {}", id)))
    }

    /// Reads a transaction even if it has been soft-deleted.
    pub async fn get_for_audit(&self, id: TransactionId) -> Result<Transaction> {
        self.read_for_transition(id).await
    }

    pub async fn find_by_provider_transaction_id(
        &self,
        provider_transaction_id: &str,
    ) -> Result<Transaction> {
        self.storage(
            "find_by_provider_transaction_id",
            self.repository
                .find_by_provider_transaction_id(provider_transaction_id),
        )
        .await?
        .ok_or_else(|| {
            LedgerError::NotFoundError(format!(
                "providerTransactionId {}",
                provider_transaction_id
            ))
        })
    }

    pub async fn exists(&self, id: TransactionId) -> Result<bool> {
        self.storage("exists", self.repository.exists(id)).await
    }

    pub async fn provider_transaction_id_exists(&self, provider_transaction_id: &str) -> Result<bool> {
        self.storage(
            "provider_transaction_id_exists",
            self.repository
                .provider_transaction_id_exists(provider_transaction_id),
        )
        .await
    }

    /// Runs a filtered, paginated query. Invalid filters fail before storage
    /// is touched; an empty page is a valid result.
    pub async fn list(&self, filter: &TransactionFilter) -> Result<TransactionPage> {
        let page = filter.validate(self.config.default_page_size, self.config.max_page_size)?;
        let items = self
            .storage("query", self.repository.query(filter, &page))
            .await?;
        debug!(returned = items.len(), limit = page.limit, offset = page.offset, "Query executed");
        Ok(TransactionPage::new(items, &page))
    }

    pub async fn count(&self, filter: &TransactionFilter) -> Result<u64> {
        filter.validate_ranges()?;
        self.storage("count", self.repository.count(filter)).await
    }

    pub async fn sum_amount(&self, filter: &TransactionFilter) -> Result<Decimal> {
        filter.validate_ranges()?;
        self.storage("sum_amount", self.repository.sum_amount(filter))
            .await
    }

    pub async fn stats(&self, scope: &StatsScope) -> Result<TransactionStats> {
        scope.validate()?;
        self.storage("stats", self.repository.stats(scope)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{Page, TransactionFilter};
    use crate::domain::ports::TransactionRepository;
    use crate::domain::provider_data::ProviderValue;
    use crate::domain::transaction::TransactionType;
    use crate::infrastructure::in_memory::InMemoryTransactionRepository;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn engine() -> TransactionEngine {
        TransactionEngine::new(
            Box::new(InMemoryTransactionRepository::new()),
            EngineConfig::default(),
        )
    }

    fn create_cmd(ptx: &str) -> CreateTransaction {
        CreateTransaction {
            payment_id: "pay_1".to_string(),
            tenant_id: "tenant_1".to_string(),
            r#type: TransactionType::Payment,
            amount: dec!(150.00),
            provider_transaction_id: ptx.to_string(),
            provider_data: None,
        }
    }

    fn process(id: TransactionId) -> ProcessTransaction {
        ProcessTransaction {
            transaction_id: id,
            processed_by: "worker".to_string(),
        }
    }

    fn complete(id: TransactionId) -> CompleteTransaction {
        CompleteTransaction {
            transaction_id: id,
            completed_by: "sys".to_string(),
            provider_data: None,
        }
    }

    fn fail(id: TransactionId) -> FailTransaction {
        FailTransaction {
            transaction_id: id,
            failure_reason: "card_declined".to_string(),
            failed_by: "gateway".to_string(),
        }
    }

    fn retry(id: TransactionId) -> RetryTransaction {
        RetryTransaction {
            transaction_id: id,
            retried_by: "ops".to_string(),
        }
    }

    #[tokio::test]
    async fn test_payment_lifecycle() {
        let engine = engine();
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert!(tx.processed_at().is_none());

        let processing = engine.process(process(tx.id())).await.unwrap();
        assert_eq!(processing.status(), TransactionStatus::Processing);
        assert!(processing.updated_at() > tx.updated_at());

        let completed = engine.complete(complete(tx.id())).await.unwrap();
        assert_eq!(completed.status(), TransactionStatus::Completed);
        assert!(completed.processed_at().is_some());

        let again = engine.complete(complete(tx.id())).await;
        assert!(matches!(
            again,
            Err(LedgerError::InvalidTransitionError(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_merges_provider_data() {
        let engine = engine();
        let mut cmd = create_cmd("ptx_1");
        cmd.provider_data = Some(ProviderData::new().with("charge", "ch_1"));
        let tx = engine.create(cmd).await.unwrap();
        engine.process(process(tx.id())).await.unwrap();

        let mut done = complete(tx.id());
        done.provider_data = Some(ProviderData::new().with("captured", true));
        let completed = engine.complete(done).await.unwrap();

        assert_eq!(
            completed.provider_data().get("charge"),
            Some(&ProviderValue::from("ch_1"))
        );
        assert_eq!(
            completed.provider_data().get("captured"),
            Some(&ProviderValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn test_fail_then_retry_keeps_processed_at() {
        let engine = engine();
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();
        let processing = engine.process(process(tx.id())).await.unwrap();
        let stamped = processing.processed_at().unwrap();

        let failed = engine.fail(fail(tx.id())).await.unwrap();
        assert_eq!(failed.status(), TransactionStatus::Failed);
        assert_eq!(
            failed.provider_data().get(FAILURE_REASON),
            Some(&ProviderValue::from("card_declined"))
        );

        let retried = engine.retry(retry(tx.id())).await.unwrap();
        assert_eq!(retried.status(), TransactionStatus::Pending);
        assert_eq!(retried.processed_at(), Some(stamped));
        assert!(!retried.provider_data().contains_key(FAILURE_REASON));
        assert_eq!(retried.retry_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_ceiling() {
        let engine = TransactionEngine::new(
            Box::new(InMemoryTransactionRepository::new()),
            EngineConfig {
                max_retries: 1,
                ..EngineConfig::default()
            },
        );
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();

        engine.process(process(tx.id())).await.unwrap();
        engine.fail(fail(tx.id())).await.unwrap();
        engine.retry(retry(tx.id())).await.unwrap();
        engine.process(process(tx.id())).await.unwrap();
        engine.fail(fail(tx.id())).await.unwrap();

        let capped = engine.retry(retry(tx.id())).await;
        assert!(matches!(
            capped,
            Err(LedgerError::InvalidTransitionError(msg)) if msg.contains("retry limit")
        ));
        assert_eq!(
            engine.get(tx.id()).await.unwrap().status(),
            TransactionStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_cancel_from_pending_and_processing() {
        let engine = engine();
        let a = engine.create(create_cmd("a")).await.unwrap();
        let b = engine.create(create_cmd("b")).await.unwrap();
        engine.process(process(b.id())).await.unwrap();

        for id in [a.id(), b.id()] {
            let cancelled = engine
                .cancel(CancelTransaction {
                    transaction_id: id,
                    cancellation_reason: "customer request".to_string(),
                    cancelled_by: "support".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(cancelled.status(), TransactionStatus::Cancelled);
            assert!(cancelled.provider_data().contains_key(CANCELLATION_REASON));
        }

        assert!(engine.process(process(a.id())).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let engine = engine();
        let result = engine.process(process(uuid::Uuid::new_v4())).await;
        assert!(matches!(result, Err(LedgerError::NotFoundError(_))));
    }

    #[tokio::test]
    async fn test_blank_actor_is_rejected_before_storage() {
        let engine = engine();
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();
        let result = engine
            .process(ProcessTransaction {
                transaction_id: tx.id(),
                processed_by: " ".to_string(),
            })
            .await;
        assert!(matches!(result, Err(LedgerError::ValidationError(_))));
        assert_eq!(
            engine.get(tx.id()).await.unwrap().status(),
            TransactionStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_deleted_transaction_cannot_transition() {
        let engine = engine();
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();
        engine.delete(tx.id()).await.unwrap();

        let result = engine.process(process(tx.id())).await;
        assert!(matches!(
            result,
            Err(LedgerError::InvalidTransitionError(msg)) if msg.contains("deleted")
        ));
        assert!(matches!(
            engine.get(tx.id()).await,
            Err(LedgerError::NotFoundError(_))
        ));
        assert!(engine.get_for_audit(tx.id()).await.unwrap().is_deleted());
        assert!(matches!(
            engine.delete(tx.id()).await,
            Err(LedgerError::NotFoundError(_))
        ));
    }

    #[tokio::test]
    async fn test_patch_rejects_immutable_fields() {
        let engine = engine();
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();

        let result = engine
            .patch(tx.id(), &serde_json::json!({"amount": "1.00"}))
            .await;
        assert!(matches!(result, Err(LedgerError::ValidationError(_))));

        let updated = engine
            .patch(tx.id(), &serde_json::json!({"providerData": {"note": "ok"}}))
            .await
            .unwrap();
        assert!(updated.provider_data().contains_key("note"));
        assert_eq!(updated.status(), TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_provider_reference() {
        let engine = engine();
        engine.create(create_cmd("ptx_1")).await.unwrap();
        let result = engine.create(create_cmd("ptx_1")).await;
        assert!(matches!(result, Err(LedgerError::ConflictError(_))));
        assert!(engine.provider_transaction_id_exists("ptx_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_filter_fails_before_storage() {
        let engine = engine();
        let filter = TransactionFilter {
            min_amount: Some(dec!(10)),
            max_amount: Some(dec!(1)),
            ..Default::default()
        };
        assert!(matches!(
            engine.list(&filter).await,
            Err(LedgerError::ValidationError(_))
        ));
    }

    /// Holds the next compare-and-swap until released.
    #[derive(Default)]
    struct CasPause {
        armed: AtomicBool,
        reached: Notify,
        release: Notify,
    }

    /// Delegates to an in-memory repository, optionally stalling point reads
    /// or a compare-and-swap.
    struct StagedRepository {
        inner: InMemoryTransactionRepository,
        read_delay: Duration,
        cas_pause: Option<Arc<CasPause>>,
    }

    #[async_trait]
    impl TransactionRepository for StagedRepository {
        async fn create(&self, tx: Transaction) -> Result<Transaction> {
            self.inner.create(tx).await
        }

        async fn find_by_id(
            &self,
            id: TransactionId,
            visibility: Visibility,
        ) -> Result<Option<Transaction>> {
            if !self.read_delay.is_zero() {
                tokio::time::sleep(self.read_delay).await;
            }
            self.inner.find_by_id(id, visibility).await
        }

        async fn find_by_provider_transaction_id(
            &self,
            provider_transaction_id: &str,
        ) -> Result<Option<Transaction>> {
            self.inner
                .find_by_provider_transaction_id(provider_transaction_id)
                .await
        }

        async fn update(
            &self,
            id: TransactionId,
            patch: TransactionPatch,
        ) -> Result<Option<Transaction>> {
            self.inner.update(id, patch).await
        }

        async fn update_status_if(
            &self,
            id: TransactionId,
            expected: StatusGuard,
            change: StateChange,
        ) -> Result<Option<Transaction>> {
            if let Some(pause) = &self.cas_pause
                && pause.armed.swap(false, Ordering::SeqCst)
            {
                pause.reached.notify_one();
                pause.release.notified().await;
            }
            self.inner.update_status_if(id, expected, change).await
        }

        async fn soft_delete(&self, id: TransactionId) -> Result<bool> {
            self.inner.soft_delete(id).await
        }

        async fn query(
            &self,
            filter: &TransactionFilter,
            page: &Page,
        ) -> Result<Vec<Transaction>> {
            self.inner.query(filter, page).await
        }

        async fn count(&self, filter: &TransactionFilter) -> Result<u64> {
            self.inner.count(filter).await
        }

        async fn sum_amount(&self, filter: &TransactionFilter) -> Result<Decimal> {
            self.inner.sum_amount(filter).await
        }

        async fn stats(&self, scope: &StatsScope) -> Result<TransactionStats> {
            self.inner.stats(scope).await
        }

        async fn exists(&self, id: TransactionId) -> Result<bool> {
            self.inner.exists(id).await
        }

        async fn provider_transaction_id_exists(
            &self,
            provider_transaction_id: &str,
        ) -> Result<bool> {
            self.inner
                .provider_transaction_id_exists(provider_transaction_id)
                .await
        }
    }

    #[tokio::test]
    async fn test_storage_timeout_is_transient() {
        let engine = TransactionEngine::new(
            Box::new(StagedRepository {
                inner: InMemoryTransactionRepository::new(),
                read_delay: Duration::from_millis(500),
                cas_pause: None,
            }),
            EngineConfig {
                storage_timeout_ms: 20,
                ..EngineConfig::default()
            },
        );
        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();

        let err = engine.process(process(tx.id())).await.unwrap_err();
        assert!(matches!(err, LedgerError::StorageError { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_stale_retry_cannot_pass_ceiling() {
        let shared = InMemoryTransactionRepository::new();
        let config = EngineConfig {
            max_retries: 1,
            ..EngineConfig::default()
        };
        let pause = Arc::new(CasPause::default());
        let paused = Arc::new(TransactionEngine::new(
            Box::new(StagedRepository {
                inner: shared.clone(),
                read_delay: Duration::ZERO,
                cas_pause: Some(Arc::clone(&pause)),
            }),
            config.clone(),
        ));
        let engine = TransactionEngine::new(Box::new(shared), config);

        let tx = engine.create(create_cmd("ptx_1")).await.unwrap();
        engine.process(process(tx.id())).await.unwrap();
        engine.fail(fail(tx.id())).await.unwrap();

        // First retry reads `failed` with retry_count 0, then stalls.
        pause.armed.store(true, Ordering::SeqCst);
        let stale = {
            let paused = Arc::clone(&paused);
            let id = tx.id();
            tokio::spawn(async move { paused.retry(retry(id)).await })
        };
        pause.reached.notified().await;

        // Meanwhile the record goes round the loop and is failed again.
        engine.retry(retry(tx.id())).await.unwrap();
        engine.process(process(tx.id())).await.unwrap();
        engine.fail(fail(tx.id())).await.unwrap();
        assert!(matches!(
            engine.retry(retry(tx.id())).await,
            Err(LedgerError::InvalidTransitionError(msg)) if msg.contains("retry limit")
        ));

        pause.release.notify_one();
        let result = stale.await.unwrap();
        assert!(matches!(
            result,
            Err(LedgerError::InvalidTransitionError(msg)) if msg.contains("concurrently")
        ));

        let stored = engine.get(tx.id()).await.unwrap();
        assert_eq!(stored.status(), TransactionStatus::Failed);
        assert_eq!(stored.retry_count(), 1);
    }

    #[tokio::test]
    async fn test_aggregates_ignore_paging_bounds() {
        let engine = engine();
        engine.create(create_cmd("ptx_1")).await.unwrap();
        let filter = TransactionFilter::default().paged(engine.config().max_page_size + 1, 0);

        assert_eq!(engine.count(&filter).await.unwrap(), 1);
        assert_eq!(engine.sum_amount(&filter).await.unwrap(), dec!(150.00));
        assert!(matches!(
            engine.list(&filter).await,
            Err(LedgerError::ValidationError(_))
        ));
    }
}
