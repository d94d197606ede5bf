use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::classifier::SystemLabel;
use crate::fixture::{FixtureKey, FixtureRecord};

/// Upper bound on the choice list returned by an ambiguous search.
pub const MAX_CHOICES: usize = 20;

/// Consolidated view of every inventory row sharing one (article, system) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureSummary {
    pub article: String,
    pub system: SystemLabel,
    pub description: String,
    pub part_number: String,
    pub name: String,
    pub fixture_type: String,
    /// Sum of the rows' quantities.
    pub baseline: u32,
    /// Distinct non-empty locations in table order.
    pub locations: Vec<String>,
}

impl FixtureSummary {
    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            article: self.article.clone(),
            system: self.system.clone(),
        }
    }

    pub fn primary_location(&self) -> Option<&str> {
        self.locations.first().map(String::as_str)
    }
}

/// Entry of the choice list returned when a partial article number is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureChoice {
    pub article: String,
    pub part_number: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        article: String,
        part_number: String,
        name: String,
        systems: Vec<FixtureSummary>,
    },
    Multiple(Vec<FixtureChoice>),
    NotFound,
}

/// The static fixture catalog (immutable once built).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FixtureRecord>,
    index: BTreeMap<FixtureKey, Vec<usize>>,
}

impl Catalog {
    pub fn new(records: Vec<FixtureRecord>) -> Self {
        let mut index: BTreeMap<FixtureKey, Vec<usize>> = BTreeMap::new();
        for (pos, record) in records.iter().enumerate() {
            index.entry(record.key()).or_default().push(pos);
        }
        Self { records, index }
    }

    /// Number of inventory rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FixtureRecord] {
        &self.records
    }

    /// Distinct (article, system) pairs.
    pub fn keys(&self) -> impl Iterator<Item = &FixtureKey> {
        self.index.keys()
    }

    pub fn contains(&self, key: &FixtureKey) -> bool {
        self.index.contains_key(key)
    }

    /// Baseline units for a pair; 0 for unknown pairs.
    pub fn baseline(&self, key: &FixtureKey) -> u32 {
        self.rows(key)
            .fold(0u32, |total, record| total.saturating_add(record.baseline))
    }

    pub fn summary(&self, key: &FixtureKey) -> Option<FixtureSummary> {
        let mut rows = self.rows(key).peekable();
        let first = (*rows.peek()?).clone();

        let mut baseline = 0u32;
        let mut locations: Vec<String> = Vec::new();
        for record in rows {
            baseline = baseline.saturating_add(record.baseline);
            if !record.location.is_empty() && !locations.contains(&record.location) {
                locations.push(record.location.clone());
            }
        }

        Some(FixtureSummary {
            article: first.article,
            system: first.system,
            description: first.description,
            part_number: first.part_number,
            name: first.name,
            fixture_type: first.fixture_type,
            baseline,
            locations,
        })
    }

    /// Look up fixtures by article number.
    ///
    /// An exact match wins. Otherwise the article is matched as a substring; when
    /// that spans more than one article a choice list is returned instead.
    pub fn search(&self, article: &str, system: Option<&SystemLabel>) -> SearchOutcome {
        let needle = article.trim();
        if needle.is_empty() {
            return SearchOutcome::NotFound;
        }

        let mut rows: Vec<&FixtureRecord> =
            self.records.iter().filter(|r| r.article == needle).collect();

        if rows.is_empty() {
            rows = self
                .records
                .iter()
                .filter(|r| r.article.contains(needle))
                .collect();

            // One choice per article, described by its first row.
            let mut choices: Vec<FixtureChoice> = Vec::new();
            for r in &rows {
                if choices.iter().all(|c| c.article != r.article) {
                    choices.push(FixtureChoice {
                        article: r.article.clone(),
                        part_number: r.part_number.clone(),
                        name: r.name.clone(),
                    });
                }
            }

            if choices.len() > 1 {
                choices.truncate(MAX_CHOICES);
                return SearchOutcome::Multiple(choices);
            }
        }

        let Some(first) = rows.first() else {
            return SearchOutcome::NotFound;
        };

        let systems: BTreeSet<&SystemLabel> = rows
            .iter()
            .map(|r| &r.system)
            .filter(|s| system.is_none_or(|wanted| wanted == *s))
            .collect();

        let systems = systems
            .into_iter()
            .filter_map(|s| {
                self.summary(&FixtureKey {
                    article: first.article.clone(),
                    system: s.clone(),
                })
            })
            .collect();

        SearchOutcome::Found {
            article: first.article.clone(),
            part_number: first.part_number.clone(),
            name: first.name.clone(),
            systems,
        }
    }

    fn rows<'a>(&'a self, key: &FixtureKey) -> impl Iterator<Item = &'a FixtureRecord> + 'a {
        self.index
            .get(key)
            .map(|positions| positions.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&pos| &self.records[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            FixtureRecord::new("ART-1", "SAFT", "adapter", 6)
                .with_name("Main adapter")
                .with_location("Shelf A"),
            FixtureRecord::new("ART-1", "SAFT", "adapter", 4).with_location("Shelf B"),
            FixtureRecord::new("ART-1", "", "SPEA probe plate", 2).with_location("Shelf A"),
            FixtureRecord::new("ART-10", "VSFT", "functional", 1),
            FixtureRecord::new("ART-11", "VSICT", "in circuit", 1),
        ])
    }

    #[test]
    fn baseline_sums_rows_of_one_pair() {
        let c = catalog();
        assert_eq!(c.baseline(&FixtureKey::new("ART-1", "SAFT")), 10);
        assert_eq!(c.baseline(&FixtureKey::new("ART-1", "VSFT")), 0);
    }

    #[test]
    fn summary_collects_distinct_locations_in_order() {
        let s = catalog().summary(&FixtureKey::new("ART-1", "saft")).unwrap();
        assert_eq!(s.locations, vec!["Shelf A", "Shelf B"]);
        assert_eq!(s.primary_location(), Some("Shelf A"));
        assert_eq!(s.name, "Main adapter");
    }

    #[test]
    fn exact_match_beats_substring() {
        match catalog().search("ART-1", None) {
            SearchOutcome::Found { article, systems, .. } => {
                assert_eq!(article, "ART-1");
                let labels: Vec<_> = systems.iter().map(|s| s.system.as_str()).collect();
                assert_eq!(labels, vec!["SAFT", "SPEA3030"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn system_filter_narrows_result() {
        match catalog().search("ART-1", Some(&SystemLabel::new("spea3030"))) {
            SearchOutcome::Found { systems, .. } => {
                assert_eq!(systems.len(), 1);
                assert_eq!(systems[0].baseline, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn ambiguous_substring_returns_choices() {
        match catalog().search("ART-", None) {
            SearchOutcome::Multiple(choices) => {
                let articles: Vec<_> = choices.iter().map(|c| c.article.as_str()).collect();
                assert_eq!(articles, vec!["ART-1", "ART-10", "ART-11"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn unique_substring_resolves_to_article() {
        match catalog().search("-11", None) {
            SearchOutcome::Found { article, .. } => assert_eq!(article, "ART-11"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn unknown_article_is_not_found() {
        assert_eq!(catalog().search("nope", None), SearchOutcome::NotFound);
        assert_eq!(catalog().search("  ", None), SearchOutcome::NotFound);
    }
}
