//! Domain layer: the transaction entity, its value objects, the filter and
//! statistics models, and the storage port the engine depends on.

pub mod commands;
pub mod filter;
pub mod money;
pub mod ports;
pub mod provider_data;
pub mod stats;
pub mod transaction;
