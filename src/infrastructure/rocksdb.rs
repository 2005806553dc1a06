use crate::domain::filter::{Page, TransactionFilter};
use crate::domain::ports::{TransactionRepository, Visibility};
use crate::domain::stats::{StatsScope, TransactionStats};
use crate::domain::transaction::{
    StateChange, StatusGuard, Transaction, TransactionId, TransactionPatch,
};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for storing transaction records, keyed by id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family mapping provider transaction ids to record ids.
pub const CF_PROVIDER_INDEX: &str = "provider_index";

/// A persistent repository implementation using RocksDB.
///
/// Records are JSON-encoded. Writers are serialized through an async mutex so
/// each read-check-write (including the status compare-and-swap) is atomic per
/// record; scans and aggregates read from a RocksDB snapshot.
///
/// There are no secondary indexes beyond the provider reference: every
/// `query`, `count`, `sum_amount` and `stats` call decodes the whole
/// `transactions` column family, so paging through a store costs one full scan
/// per page. Fine for replay-sized stores, not for large ones.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("transactions" and
    /// "provider_index") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());
        let cf_provider_index = ColumnFamilyDescriptor::new(CF_PROVIDER_INDEX, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_transactions, cf_provider_index])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::storage(format!("{} column family not found", name)))
    }

    fn read(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_live(&self, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.read(id)?.filter(|tx| !tx.is_deleted()))
    }

    fn write(&self, tx: &Transaction) -> Result<()> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let value = serde_json::to_vec(tx)?;
        self.db.put_cf(cf, tx.id().as_bytes(), value)?;
        Ok(())
    }

    fn lookup_provider_ref(&self, provider_transaction_id: &str) -> Result<Option<TransactionId>> {
        let cf = self.cf(CF_PROVIDER_INDEX)?;
        match self.db.get_cf(cf, provider_transaction_id.as_bytes())? {
            Some(bytes) => Uuid::from_slice(&bytes)
                .map(Some)
                .map_err(|e| LedgerError::storage(format!("Corrupt provider index: {}", e))),
            None => Ok(None),
        }
    }

    /// Every record, deleted ones included, read from one snapshot.
    fn snapshot_rows(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let snapshot = self.db.snapshot();
        let mut rows = Vec::new();
        for item in snapshot.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn matching(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        Ok(self
            .snapshot_rows()?
            .into_iter()
            .filter(|tx| !tx.is_deleted() && filter.matches(tx))
            .collect())
    }
}

#[async_trait]
impl TransactionRepository for RocksDBStore {
    async fn create(&self, tx: Transaction) -> Result<Transaction> {
        tx.ensure_new()?;
        let _guard = self.write_lock.lock().await;
        if self
            .lookup_provider_ref(tx.provider_transaction_id())?
            .is_some()
        {
            return Err(LedgerError::ConflictError(format!(
                "providerTransactionId {} already exists",
                tx.provider_transaction_id()
            )));
        }
        if self.read(tx.id())?.is_some() {
            return Err(LedgerError::ConflictError(format!(
                "transaction {} already exists",
                tx.id()
            )));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_TRANSACTIONS)?,
            tx.id().as_bytes(),
            serde_json::to_vec(&tx)?,
        );
        batch.put_cf(
            self.cf(CF_PROVIDER_INDEX)?,
            tx.provider_transaction_id().as_bytes(),
            tx.id().as_bytes(),
        );
        self.db.write(batch)?;
        Ok(tx)
    }

    async fn find_by_id(
        &self,
        id: TransactionId,
        visibility: Visibility,
    ) -> Result<Option<Transaction>> {
        match visibility {
            Visibility::Active => self.read_live(id),
            Visibility::IncludeDeleted => self.read(id),
        }
    }

    async fn find_by_provider_transaction_id(
        &self,
        provider_transaction_id: &str,
    ) -> Result<Option<Transaction>> {
        match self.lookup_provider_ref(provider_transaction_id)? {
            Some(id) => self.read_live(id),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut tx) = self.read_live(id)? else {
            return Ok(None);
        };
        tx.apply_patch(patch);
        self.write(&tx)?;
        Ok(Some(tx))
    }

    async fn update_status_if(
        &self,
        id: TransactionId,
        expected: StatusGuard,
        change: StateChange,
    ) -> Result<Option<Transaction>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut tx) = self.read(id)? else {
            return Ok(None);
        };
        if !expected.holds(&tx) {
            return Ok(None);
        }
        tx.apply(&change);
        self.write(&tx)?;
        Ok(Some(tx))
    }

    async fn soft_delete(&self, id: TransactionId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut tx) = self.read_live(id)? else {
            return Ok(false);
        };
        tx.mark_deleted();
        self.write(&tx)?;
        Ok(true)
    }

    async fn query(&self, filter: &TransactionFilter, page: &Page) -> Result<Vec<Transaction>> {
        Ok(page.apply(self.matching(filter)?))
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<u64> {
        Ok(self.matching(filter)?.len() as u64)
    }

    async fn sum_amount(&self, filter: &TransactionFilter) -> Result<Decimal> {
        Ok(self
            .matching(filter)?
            .iter()
            .map(|tx| tx.amount().value())
            .sum())
    }

    async fn stats(&self, scope: &StatsScope) -> Result<TransactionStats> {
        let rows = self.snapshot_rows()?;
        Ok(TransactionStats::collect(scope, &rows))
    }

    async fn exists(&self, id: TransactionId) -> Result<bool> {
        Ok(self.read_live(id)?.is_some())
    }

    async fn provider_transaction_id_exists(&self, provider_transaction_id: &str) -> Result<bool> {
        Ok(self
            .lookup_provider_ref(provider_transaction_id)?
            .is_some())
    }
}
