//! Infrastructure layer: configuration, table files, ledger persistence.

pub mod config;
pub mod error;
pub mod inventory_source;
pub mod ledger;
pub mod ledger_store;

mod table;

pub use config::{AppConfig, ConfigError};
pub use error::{DataError, LedgerError, LoadError, StorageError};
pub use inventory_source::{InventoryLoad, load_inventory, read_inventory};
pub use ledger::{BorrowLedger, CheckinReceipt, CheckoutReceipt, ReturnReceipt};
pub use ledger_store::{CsvLedgerStore, InMemoryLedgerStore, LedgerStore};
