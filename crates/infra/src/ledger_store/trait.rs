use std::sync::Arc;

use fixtrack_inventory::BorrowEntry;

use crate::error::StorageError;

/// Durable home of the borrow ledger.
///
/// Rows are never deleted: check-out appends, check-in rewrites rows in place
/// with their returned timestamp set. Both writes must be durable before they
/// return. Implementations do no locking of their own; `BorrowLedger` serializes
/// access.
pub trait LedgerStore: Send + Sync {
    /// Every entry, in ledger order.
    fn load(&self) -> Result<Vec<BorrowEntry>, StorageError>;

    /// Append one entry.
    fn append(&self, entry: &BorrowEntry) -> Result<(), StorageError>;

    /// Replace the full ledger contents (same rows, updated return state).
    fn rewrite(&self, entries: &[BorrowEntry]) -> Result<(), StorageError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn load(&self) -> Result<Vec<BorrowEntry>, StorageError> {
        (**self).load()
    }

    fn append(&self, entry: &BorrowEntry) -> Result<(), StorageError> {
        (**self).append(entry)
    }

    fn rewrite(&self, entries: &[BorrowEntry]) -> Result<(), StorageError> {
        (**self).rewrite(entries)
    }
}
