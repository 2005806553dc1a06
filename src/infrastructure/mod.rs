//! Storage adapters implementing [`crate::domain::ports::TransactionRepository`].

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
