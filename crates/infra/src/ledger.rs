//! Borrow ledger service (application-level orchestration).
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! lock ledger
//!   ↓
//! 1. Load entries from the store
//!   ↓
//! 2. Run the pure lending rule (fixtrack-inventory)
//!   ↓
//! 3. Persist the result (append or rewrite)
//!   ↓
//! unlock, return receipt
//! ```
//!
//! The lock covers read-check-write, so two check-outs racing for the last units
//! of a fixture cannot both pass the availability check. The ledger is re-read on
//! every call: the file is the source of truth and may be edited by hand between
//! requests.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use fixtrack_core::{BorrowId, DomainError};
use fixtrack_inventory::{
    Availability, BorrowEntry, Catalog, CheckinSelection, CheckoutRequest, FixtureKey,
    apply_checkin, apply_return, orphans, outstanding, outstanding_quantity, plan_checkout,
};

use crate::error::{LedgerError, StorageError};
use crate::ledger_store::LedgerStore;

/// Outcome of a successful check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub entry: BorrowEntry,
    pub availability: Availability,
}

/// Outcome of a check-in; `cleared` is empty when nothing was outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckinReceipt {
    pub cleared: Vec<BorrowEntry>,
    pub availability: Availability,
}

/// Outcome of a return by borrow id; one availability per pair touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnReceipt {
    pub cleared: Vec<BorrowEntry>,
    pub availability: Vec<(FixtureKey, Availability)>,
}

/// The borrow ledger: a [`LedgerStore`] plus the lock that serializes access.
#[derive(Debug)]
pub struct BorrowLedger<S> {
    store: S,
    lock: Mutex<()>,
}

impl<S> BorrowLedger<S>
where
    S: LedgerStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.lock.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Append an outstanding entry if the requested units are available.
    ///
    /// Rejections (validation, unknown fixture, insufficient availability) leave the
    /// ledger untouched.
    pub fn record_checkout(
        &self,
        catalog: &Catalog,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckoutReceipt, LedgerError> {
        let _guard = self.guard()?;
        let mut entries = self.store.load()?;

        let entry = plan_checkout(catalog, &entries, request, now)?;
        self.store.append(&entry)?;
        entries.push(entry.clone());

        let availability = Availability::compute(catalog, &entries, &entry.key());
        tracing::info!(
            borrow_id = %entry.borrow_id,
            fixture = %entry.key(),
            borrower = %entry.borrower,
            quantity = entry.quantity,
            available = availability.available,
            "fixture checked out"
        );

        Ok(CheckoutReceipt {
            entry,
            availability,
        })
    }

    /// Mark outstanding entries of a fixture as returned.
    ///
    /// Calling this with nothing outstanding is not an error; the receipt simply
    /// lists no cleared entries. A pair that is neither in the catalog nor in the
    /// ledger is `NotFound`. Orphaned entries (ledger only) can still be returned.
    pub fn record_checkin(
        &self,
        catalog: &Catalog,
        key: &FixtureKey,
        selection: &CheckinSelection,
        now: DateTime<Utc>,
    ) -> Result<CheckinReceipt, LedgerError> {
        let _guard = self.guard()?;
        let mut entries = self.store.load()?;

        let in_catalog = catalog.contains(key);
        if !in_catalog && !entries.iter().any(|e| e.is_for(key)) {
            return Err(DomainError::not_found(format!("fixture {key}")).into());
        }

        let cleared = apply_checkin(&mut entries, key, selection, now);
        if !cleared.is_empty() {
            self.store.rewrite(&entries)?;
        }

        let availability = Availability::compute(catalog, &entries, key);
        if !in_catalog {
            tracing::warn!(
                fixture = %key,
                cleared = cleared.len(),
                "check-in on orphaned ledger entries"
            );
        }
        tracing::info!(
            fixture = %key,
            cleared = cleared.len(),
            available = availability.available,
            "fixture checked in"
        );

        Ok(CheckinReceipt {
            cleared,
            availability,
        })
    }

    /// Mark outstanding entries as returned by id alone, across pairs.
    ///
    /// An empty id list is a validation error; ids that match no outstanding entry
    /// are `NotFound`. The ledger is only rewritten when something was cleared.
    pub fn record_return(
        &self,
        catalog: &Catalog,
        ids: &[BorrowId],
        now: DateTime<Utc>,
    ) -> Result<ReturnReceipt, LedgerError> {
        if ids.is_empty() {
            return Err(DomainError::validation("at least one borrow id is required").into());
        }

        let _guard = self.guard()?;
        let mut entries = self.store.load()?;

        let cleared = apply_return(&mut entries, ids, now);
        if cleared.is_empty() {
            return Err(DomainError::not_found("outstanding borrow with the given id(s)").into());
        }
        self.store.rewrite(&entries)?;

        let mut keys: Vec<FixtureKey> = cleared.iter().map(BorrowEntry::key).collect();
        keys.sort();
        keys.dedup();
        let availability: Vec<(FixtureKey, Availability)> = keys
            .into_iter()
            .map(|key| {
                let a = Availability::compute(catalog, &entries, &key);
                (key, a)
            })
            .collect();

        tracing::info!(
            cleared = cleared.len(),
            fixtures = availability.len(),
            "fixtures returned by id"
        );

        Ok(ReturnReceipt {
            cleared,
            availability,
        })
    }

    pub fn outstanding_quantity(&self, key: &FixtureKey) -> Result<u32, StorageError> {
        let entries = self.entries()?;
        Ok(outstanding_quantity(&entries, key))
    }

    /// Outstanding entries of a fixture, oldest first.
    pub fn outstanding_entries(&self, key: &FixtureKey) -> Result<Vec<BorrowEntry>, StorageError> {
        let entries = self.entries()?;
        let mut open: Vec<BorrowEntry> = outstanding(&entries, key).cloned().collect();
        open.sort_by_key(|e| e.borrowed_at);
        Ok(open)
    }

    pub fn availability(
        &self,
        catalog: &Catalog,
        key: &FixtureKey,
    ) -> Result<Availability, StorageError> {
        let entries = self.entries()?;
        Ok(Availability::compute(catalog, &entries, key))
    }

    /// Outstanding entries referencing fixtures the catalog does not know.
    pub fn orphans(&self, catalog: &Catalog) -> Result<Vec<BorrowEntry>, StorageError> {
        let entries = self.entries()?;
        Ok(orphans(catalog, &entries))
    }

    /// Full ledger history, in ledger order.
    pub fn entries(&self) -> Result<Vec<BorrowEntry>, StorageError> {
        let _guard = self.guard()?;
        self.store.load()
    }
}
