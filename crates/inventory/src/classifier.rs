//! Manufacturing-system classification.
//!
//! The inventory table does not carry a system column; the system a fixture belongs
//! to is derived from its type and description. All markers live in
//! [`SYSTEM_RULES`], evaluated top to bottom; the first hit wins.

use serde::{Deserialize, Serialize};

/// Label used when no rule matches.
pub const FALLBACK_LABEL: &str = "OTHER";

/// Manufacturing-line label (e.g. `SAFT`, `SPEA3030`).
///
/// Always stored trimmed and upper-case, so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemLabel(String);

impl SystemLabel {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn fallback() -> Self {
        Self(FALLBACK_LABEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for SystemLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SystemLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which inventory column a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FixtureType,
    Description,
}

/// One `(field, marker, label)` classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemRule {
    pub field: Field,
    /// Upper-case substring looked for in the field.
    pub marker: &'static str,
    pub label: &'static str,
}

const fn rule(field: Field, marker: &'static str, label: &'static str) -> SystemRule {
    SystemRule {
        field,
        marker,
        label,
    }
}

/// Classification table, in priority order.
///
/// The fixture type column is authoritative when it names a system. Otherwise a
/// `SPEA` mention in the description means the SPEA 3030 flying-probe line, and the
/// remaining markers are looked up in the description for tables without a type
/// column.
pub const SYSTEM_RULES: &[SystemRule] = &[
    rule(Field::FixtureType, "VSFT", "VSFT"),
    rule(Field::FixtureType, "VSICT", "VSICT"),
    rule(Field::FixtureType, "SAFT", "SAFT"),
    rule(Field::Description, "SPEA", "SPEA3030"),
    rule(Field::Description, "VSFT", "VSFT"),
    rule(Field::Description, "VSICT", "VSICT"),
    rule(Field::Description, "SAFT", "SAFT"),
];

/// Classify a fixture by its type and description.
///
/// Never fails: unmatched input yields [`FALLBACK_LABEL`].
pub fn classify(fixture_type: &str, description: &str) -> SystemLabel {
    let fixture_type = fixture_type.to_uppercase();
    let description = description.to_uppercase();

    SYSTEM_RULES
        .iter()
        .find(|rule| {
            let haystack = match rule.field {
                Field::FixtureType => &fixture_type,
                Field::Description => &description,
            };
            haystack.contains(rule.marker)
        })
        .map(|rule| SystemLabel::new(rule.label))
        .unwrap_or_else(SystemLabel::fallback)
}
