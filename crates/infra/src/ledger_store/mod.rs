//! Borrow ledger persistence boundary.
//!
//! Defines the storage abstraction for the ledger plus the file-backed store used
//! in production and an in-memory store for tests/dev.

pub mod csv_file;
pub mod in_memory;
pub mod r#trait;

pub use csv_file::CsvLedgerStore;
pub use in_memory::InMemoryLedgerStore;
pub use r#trait::LedgerStore;
