//! Outer adapters: CSV command-log replay in, JSON report out.

pub mod csv;
pub mod replay;
pub mod report;
