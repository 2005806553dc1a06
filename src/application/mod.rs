//! Application layer containing the transaction lifecycle orchestration.
//!
//! This module defines the `TransactionEngine`, the single entry point for
//! creating, transitioning, querying and reporting on transactions, together
//! with the pure state machine it enforces and the outbound views it returns.

pub mod engine;
pub mod transitions;
pub mod views;
