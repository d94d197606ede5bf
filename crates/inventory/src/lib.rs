//! Fixture inventory domain module.
//!
//! This crate contains the business rules for fixture lending, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage): classification of
//! fixtures into manufacturing systems, the catalog built from the inventory table,
//! borrow entries and the availability arithmetic that ties them together.

pub mod availability;
pub mod borrow;
pub mod catalog;
pub mod classifier;
pub mod fixture;

pub use availability::{Availability, availability};
pub use borrow::{
    BorrowEntry, CheckinSelection, CheckoutRequest, apply_checkin, apply_return, orphans,
    outstanding, outstanding_quantity, plan_checkout,
};
pub use catalog::{Catalog, FixtureChoice, FixtureSummary, MAX_CHOICES, SearchOutcome};
pub use classifier::{FALLBACK_LABEL, Field, SYSTEM_RULES, SystemLabel, SystemRule, classify};
pub use fixture::{FixtureKey, FixtureRecord};
