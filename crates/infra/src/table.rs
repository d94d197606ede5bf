//! Cell-level helpers shared by the inventory and ledger tables.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use csv::StringRecord;

/// Format accepted for timestamps typed into the sheet by hand.
const SHEET_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    names: Vec<String>,
}

impl Header {
    pub(crate) fn new(record: &StringRecord) -> Self {
        let names = record
            .iter()
            .map(|name| normalize_name(name))
            .collect();
        Self { names }
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }

    /// Position of a column, compared case-insensitively.
    pub(crate) fn position(&self, column: &str) -> Option<usize> {
        let wanted = normalize_name(column);
        self.names.iter().position(|name| *name == wanted)
    }

    /// Required columns that are absent.
    pub(crate) fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| self.position(c).is_none())
            .collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Trimmed cell contents; empty when the row is short or the column is absent.
pub(crate) fn cell(record: &StringRecord, position: Option<usize>) -> &str {
    position
        .and_then(|p| record.get(p))
        .map(str::trim)
        .unwrap_or_default()
}

pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

pub(crate) fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Parse a unit count. Blank is 0; integral decimals (`"3.0"`) are accepted since
/// spreadsheet exports write whole numbers that way.
pub(crate) fn parse_quantity(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = raw.parse::<u32>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v < 0.0 => Err(format!("negative quantity {raw:?}")),
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        Ok(_) => Err(format!("quantity {raw:?} is not a whole number")),
        Err(_) => Err(format!("non-numeric quantity {raw:?}")),
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an optional timestamp cell. Naive sheet timestamps are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nat") || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(raw, SHEET_TIMESTAMP)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| format!("invalid timestamp {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity(""), Ok(0));
        assert_eq!(parse_quantity(" 7 "), Ok(7));
        assert_eq!(parse_quantity("3.0"), Ok(3));
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("-1").unwrap_err().contains("negative"));
        assert!(parse_quantity("lots").unwrap_err().contains("non-numeric"));
        assert!(parse_quantity("NaN").is_err());
    }

    #[test]
    fn timestamps_accept_rfc3339_and_sheet_format() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(parse_timestamp("2025-03-04T05:06:07Z"), Ok(Some(expected)));
        assert_eq!(parse_timestamp("2025-03-04 05:06:07"), Ok(Some(expected)));
        assert_eq!(parse_timestamp(&format_timestamp(expected)), Ok(Some(expected)));
        assert_eq!(parse_timestamp(" "), Ok(None));
        assert_eq!(parse_timestamp("NaT"), Ok(None));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn header_lookup_ignores_case_and_bom() {
        let header = Header::new(&StringRecord::from(vec!["\u{feff}Article", " Fixture Type "]));
        assert_eq!(header.position("article"), Some(0));
        assert_eq!(header.position("FIXTURE TYPE"), Some(1));
        assert_eq!(header.missing(&["Article", "Location"]), vec!["Location"]);
    }
}
