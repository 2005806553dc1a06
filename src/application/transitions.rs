//! Transaction state machine
//!
//! Pure edge table for the lifecycle; the engine consults it before every
//! compare-and-swap write.

use crate::domain::transaction::{Transaction, TransactionStatus};
use crate::error::{LedgerError, Result};
use std::fmt;

/// A caller-requested lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Process,
    Complete,
    Fail,
    Cancel,
    Retry,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Process,
        Operation::Complete,
        Operation::Fail,
        Operation::Cancel,
        Operation::Retry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Process => "process",
            Operation::Complete => "complete",
            Operation::Fail => "fail",
            Operation::Cancel => "cancel",
            Operation::Retry => "retry",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status `op` leads to from `from`, or `None` if there is no such edge.
pub fn next_status(from: TransactionStatus, op: Operation) -> Option<TransactionStatus> {
    use Operation::*;
    use TransactionStatus::*;

    match (from, op) {
        (Pending, Process) => Some(Processing),
        (Processing, Complete) => Some(Completed),
        (Processing, Fail) => Some(Failed),
        (Pending | Processing, Cancel) => Some(Cancelled),
        (Failed, Retry) => Some(Pending),
        _ => None,
    }
}

pub(crate) fn rejected(tx: &Transaction, op: Operation) -> LedgerError {
    if tx.is_deleted() {
        LedgerError::InvalidTransitionError(format!(
            "cannot {} transaction {}: it has been deleted",
            op,
            tx.id()
        ))
    } else {
        LedgerError::InvalidTransitionError(format!(
            "cannot {} transaction {} in status {}",
            op,
            tx.id(),
            tx.status()
        ))
    }
}

/// Checks `op` against a freshly read record and returns the target status.
pub fn validate_transition(tx: &Transaction, op: Operation) -> Result<TransactionStatus> {
    if tx.is_deleted() {
        return Err(rejected(tx, op));
    }
    next_status(tx.status(), op).ok_or_else(|| rejected(tx, op))
}
