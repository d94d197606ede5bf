use serde::{Deserialize, Serialize};

use crate::classifier::{SystemLabel, classify};

/// Identity of a lendable fixture: article number plus manufacturing system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureKey {
    pub article: String,
    pub system: SystemLabel,
}

impl FixtureKey {
    pub fn new(article: &str, system: &str) -> Self {
        Self {
            article: article.trim().to_string(),
            system: SystemLabel::new(system),
        }
    }
}

impl core::fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.article, self.system)
    }
}

/// One row of the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub article: String,
    pub system: SystemLabel,
    pub description: String,
    /// Units on the shelf when nothing is borrowed.
    pub baseline: u32,
    pub part_number: String,
    pub name: String,
    pub fixture_type: String,
    pub location: String,
    /// 1-based line in the source table.
    pub source_line: usize,
}

impl FixtureRecord {
    /// Build a record, deriving the system label from type and description.
    pub fn new(article: &str, fixture_type: &str, description: &str, baseline: u32) -> Self {
        Self {
            article: article.trim().to_string(),
            system: classify(fixture_type, description),
            description: description.to_string(),
            baseline,
            part_number: String::new(),
            name: String::new(),
            fixture_type: fixture_type.trim().to_string(),
            location: String::new(),
            source_line: 0,
        }
    }

    pub fn with_part_number(mut self, part_number: &str) -> Self {
        self.part_number = part_number.trim().to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.trim().to_string();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.trim().to_string();
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = line;
        self
    }

    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            article: self.article.clone(),
            system: self.system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_derives_system_and_trims_article() {
        let rec = FixtureRecord::new("  4711 ", "SAFT", "adapter", 3).with_location(" Shelf A ");
        assert_eq!(rec.key(), FixtureKey::new("4711", "saft"));
        assert_eq!(rec.location, "Shelf A");
    }
}
