use std::sync::RwLock;

use fixtrack_inventory::BorrowEntry;

use super::r#trait::LedgerStore;
use crate::error::StorageError;

/// In-memory ledger.
///
/// Intended for tests/dev; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: RwLock<Vec<BorrowEntry>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<BorrowEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<Vec<BorrowEntry>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.clone())
    }

    fn append(&self, entry: &BorrowEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.push(entry.clone());
        Ok(())
    }

    fn rewrite(&self, replacement: &[BorrowEntry]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        *entries = replacement.to_vec();
        Ok(())
    }
}
