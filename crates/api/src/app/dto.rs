use serde::Deserialize;
use serde_json::json;

use fixtrack_core::BorrowId;
use fixtrack_inventory::{Availability, BorrowEntry, CheckinSelection, FixtureSummary};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub article: Option<String>,
    pub system: Option<String>,
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailsQuery {
    pub article: Option<String>,
    pub system: Option<String>,
}

/// Quantity as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(i64),
    Text(String),
}

impl QuantityInput {
    pub fn to_quantity(&self) -> Result<u32, String> {
        let n = match self {
            QuantityInput::Number(n) => *n,
            QuantityInput::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("quantity must be a whole number, got {s:?}"))?,
        };
        u32::try_from(n).map_err(|_| format!("quantity out of range: {n}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    #[serde(default)]
    pub article: String,
    #[serde(default)]
    pub system: String,
    #[serde(default, alias = "client_name")]
    pub borrower: String,
    #[serde(default, alias = "client_phone")]
    pub borrower_phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub quantity: Option<QuantityInput>,
}

impl CheckoutBody {
    /// Requested units; one when omitted.
    pub fn quantity(&self) -> Result<u32, String> {
        match &self.quantity {
            Some(q) => q.to_quantity(),
            None => Ok(1),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckinBody {
    #[serde(default)]
    pub article: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub borrow_ids: Option<Vec<String>>,
    #[serde(default)]
    pub borrow_id: Option<String>,
}

impl CheckinBody {
    /// Both article and system given; otherwise the body names entries by id only.
    pub fn has_pair(&self) -> bool {
        !self.article.trim().is_empty() && !self.system.trim().is_empty()
    }

    /// Ids from `borrow_ids`, falling back to a single `borrow_id`; blanks skipped.
    pub fn ids(&self) -> Result<Vec<BorrowId>, String> {
        let raw: Vec<&str> = match (&self.borrow_ids, &self.borrow_id) {
            (Some(ids), _) if !ids.is_empty() => ids.iter().map(String::as_str).collect(),
            (_, Some(one)) => vec![one.as_str()],
            _ => Vec::new(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<BorrowId>().map_err(|e| e.to_string()))
            .collect()
    }

    /// All outstanding entries of the pair unless ids narrow it.
    pub fn selection(&self) -> Result<CheckinSelection, String> {
        let ids = self.ids()?;
        if ids.is_empty() {
            Ok(CheckinSelection::All)
        } else {
            Ok(CheckinSelection::Only(ids))
        }
    }
}

// -------------------------
// Response mapping helpers
// -------------------------

pub fn summary_to_json(summary: &FixtureSummary, availability: &Availability) -> serde_json::Value {
    json!({
        "article": summary.article,
        "system": summary.system.as_str(),
        "description": summary.description,
        "part_number": summary.part_number,
        "name": summary.name,
        "fixture_type": summary.fixture_type,
        "baseline": availability.baseline,
        "outstanding": availability.outstanding,
        "available_units": availability.available,
    })
}

pub fn entry_to_json(entry: &BorrowEntry) -> serde_json::Value {
    json!({
        "borrow_id": entry.borrow_id.to_string(),
        "article": entry.article,
        "part_number": entry.part_number,
        "system": entry.system.as_str(),
        "quantity": entry.quantity,
        "borrower": entry.borrower,
        "borrower_phone": entry.borrower_phone,
        "location": entry.location,
        "borrowed_at": entry.borrowed_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "returned_at": entry
            .returned_at
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
    })
}
