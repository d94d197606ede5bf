use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::Context;

use fixtrack_infra::{
    AppConfig, BorrowLedger, CsvLedgerStore, InventoryLoad, LedgerStore, LoadError, load_inventory,
};
use fixtrack_inventory::Catalog;

/// Shared state behind every handler.
///
/// The catalog is swapped whole on reload; handlers hold their own `Arc` for the
/// duration of a request. The ledger serializes its own access.
pub struct AppServices {
    inventory_path: PathBuf,
    catalog: RwLock<Arc<Catalog>>,
    ledger: BorrowLedger<Arc<dyn LedgerStore>>,
}

impl AppServices {
    pub fn new(inventory_path: PathBuf, catalog: Catalog, store: Arc<dyn LedgerStore>) -> Self {
        Self {
            inventory_path,
            catalog: RwLock::new(Arc::new(catalog)),
            ledger: BorrowLedger::new(store),
        }
    }

    /// Load the inventory table and open (or create) the ledger file.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let load = load_inventory(&config.inventory_path).with_context(|| {
            format!("failed to load inventory from {}", config.inventory_path.display())
        })?;
        let store = CsvLedgerStore::open(config.ledger_path.clone()).with_context(|| {
            format!("failed to open ledger at {}", config.ledger_path.display())
        })?;
        tracing::info!(ledger = %store.path().display(), "borrow ledger ready");

        let services = Self::new(config.inventory_path.clone(), load.catalog, Arc::new(store));
        services.report_orphans();
        Ok(services)
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        match self.catalog.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn ledger(&self) -> &BorrowLedger<Arc<dyn LedgerStore>> {
        &self.ledger
    }

    /// Run file-backed work (ledger, inventory reload) off the async worker threads.
    pub async fn run_blocking<T, F>(self: &Arc<Self>, f: F) -> Result<T, tokio::task::JoinError>
    where
        F: FnOnce(&AppServices) -> T + Send + 'static,
        T: Send + 'static,
    {
        let services = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&services)).await
    }

    /// Re-read the inventory table and swap the catalog in.
    ///
    /// On failure the previous catalog stays in place.
    pub fn reload_inventory(&self) -> Result<InventoryLoad, LoadError> {
        let load = load_inventory(&self.inventory_path)?;
        let next = Arc::new(load.catalog.clone());
        match self.catalog.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!(
            rows = load.catalog.len(),
            skipped = load.skipped.len(),
            "inventory reloaded"
        );
        self.report_orphans();
        Ok(load)
    }

    fn report_orphans(&self) {
        let catalog = self.catalog();
        match self.ledger.orphans(&catalog) {
            Ok(orphans) => {
                for entry in &orphans {
                    tracing::warn!(
                        borrow_id = %entry.borrow_id,
                        fixture = %entry.key(),
                        quantity = entry.quantity,
                        "outstanding ledger entry references a fixture missing from the inventory"
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not check ledger for orphaned entries"),
        }
    }
}
