//! Borrow entries and the lending rules over them.
//!
//! The functions here are pure: callers load the ledger, run a rule, and persist
//! whatever the rule produced. Serializing that sequence is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fixtrack_core::{BorrowId, DomainError, DomainResult};

use crate::availability::availability;
use crate::catalog::Catalog;
use crate::classifier::SystemLabel;
use crate::fixture::FixtureKey;

/// One ledger row: units of a fixture handed to a borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowEntry {
    pub borrow_id: BorrowId,
    pub article: String,
    pub part_number: String,
    pub system: SystemLabel,
    pub quantity: u32,
    pub borrower: String,
    pub borrower_phone: String,
    pub location: String,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowEntry {
    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            article: self.article.clone(),
            system: self.system.clone(),
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn is_for(&self, key: &FixtureKey) -> bool {
        self.article == key.article && self.system == key.system
    }
}

/// Check-out command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub key: FixtureKey,
    pub borrower: String,
    pub borrower_phone: Option<String>,
    /// Defaults to the fixture's primary location.
    pub location: Option<String>,
    pub quantity: u32,
}

/// Which outstanding entries of a pair a check-in returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckinSelection {
    #[default]
    All,
    Only(Vec<BorrowId>),
}

impl CheckinSelection {
    fn includes(&self, id: &BorrowId) -> bool {
        match self {
            CheckinSelection::All => true,
            CheckinSelection::Only(ids) => ids.contains(id),
        }
    }
}

/// Outstanding entries for a pair, in ledger order.
pub fn outstanding<'a>(
    entries: &'a [BorrowEntry],
    key: &'a FixtureKey,
) -> impl Iterator<Item = &'a BorrowEntry> + 'a {
    entries
        .iter()
        .filter(move |e| e.is_outstanding() && e.is_for(key))
}

pub fn outstanding_quantity(entries: &[BorrowEntry], key: &FixtureKey) -> u32 {
    outstanding(entries, key).fold(0u32, |total, e| total.saturating_add(e.quantity))
}

/// Validate a check-out against the catalog and current ledger and build the entry
/// to append. Nothing is appended when this returns an error.
pub fn plan_checkout(
    catalog: &Catalog,
    entries: &[BorrowEntry],
    request: &CheckoutRequest,
    now: DateTime<Utc>,
) -> DomainResult<BorrowEntry> {
    let key = &request.key;
    if key.article.is_empty() {
        return Err(DomainError::validation("article is required"));
    }
    if key.system.is_empty() {
        return Err(DomainError::validation("system is required"));
    }
    let borrower = request.borrower.trim();
    if borrower.is_empty() {
        return Err(DomainError::validation("borrower is required"));
    }
    if request.quantity == 0 {
        return Err(DomainError::validation("quantity must be at least 1"));
    }

    let fixture = catalog
        .summary(key)
        .ok_or_else(|| DomainError::not_found(format!("fixture {key}")))?;

    let available = availability(fixture.baseline, outstanding_quantity(entries, key));
    if request.quantity > available {
        return Err(DomainError::insufficient(request.quantity, available));
    }

    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or(fixture.primary_location())
        .unwrap_or_default()
        .to_string();

    Ok(BorrowEntry {
        borrow_id: BorrowId::new(),
        article: fixture.article.clone(),
        part_number: fixture.part_number.clone(),
        system: fixture.system.clone(),
        quantity: request.quantity,
        borrower: borrower.to_string(),
        borrower_phone: request
            .borrower_phone
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        location,
        borrowed_at: now,
        returned_at: None,
    })
}

/// Mark the selected outstanding entries of a pair as returned.
///
/// Returns the entries that changed; an empty list when nothing was outstanding.
pub fn apply_checkin(
    entries: &mut [BorrowEntry],
    key: &FixtureKey,
    selection: &CheckinSelection,
    now: DateTime<Utc>,
) -> Vec<BorrowEntry> {
    let mut cleared = Vec::new();
    for entry in entries.iter_mut() {
        if entry.is_outstanding() && entry.is_for(key) && selection.includes(&entry.borrow_id) {
            entry.returned_at = Some(now);
            cleared.push(entry.clone());
        }
    }
    cleared
}

/// Mark outstanding entries with the given ids as returned, whatever their pair.
///
/// Ids that are unknown or already returned are ignored.
pub fn apply_return(
    entries: &mut [BorrowEntry],
    ids: &[BorrowId],
    now: DateTime<Utc>,
) -> Vec<BorrowEntry> {
    let mut cleared = Vec::new();
    for entry in entries.iter_mut() {
        if entry.is_outstanding() && ids.contains(&entry.borrow_id) {
            entry.returned_at = Some(now);
            cleared.push(entry.clone());
        }
    }
    cleared
}

/// Outstanding entries whose (article, system) pair is missing from the catalog.
pub fn orphans(catalog: &Catalog, entries: &[BorrowEntry]) -> Vec<BorrowEntry> {
    entries
        .iter()
        .filter(|e| e.is_outstanding() && !catalog.contains(&e.key()))
        .cloned()
        .collect()
}
