//! Inventory table reader.
//!
//! Reads the static fixture table (CSV export of the inventory workbook) into a
//! [`Catalog`]. Shape problems fail the whole load; bad rows are skipped and
//! reported so one typo does not take the catalog down.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use fixtrack_inventory::{Catalog, FixtureRecord};

use crate::error::{DataError, LoadError};
use crate::table::{Header, cell, is_blank, line_of, parse_quantity};

pub const ARTICLE: &str = "Article";
pub const DESCRIPTION: &str = "Fixture Description";
pub const QUANTITY: &str = "Available Units (Qty.)";
pub const PART_NUMBER: &str = "Part Number";
pub const NAME: &str = "Name";
pub const FIXTURE_TYPE: &str = "Fixture Type";
pub const LOCATION: &str = "Location";

const REQUIRED: [&str; 3] = [ARTICLE, DESCRIPTION, QUANTITY];

/// Result of reading the inventory table.
#[derive(Debug, Clone)]
pub struct InventoryLoad {
    pub catalog: Catalog,
    /// Rows left out of the catalog, with the reason.
    pub skipped: Vec<DataError>,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    article: usize,
    description: usize,
    quantity: usize,
    part_number: Option<usize>,
    name: Option<usize>,
    fixture_type: Option<usize>,
    location: Option<usize>,
}

impl Columns {
    fn locate(record: &StringRecord) -> Result<Self, Vec<&'static str>> {
        let header = Header::new(record);
        let missing = header.missing(&REQUIRED);
        match (
            header.position(ARTICLE),
            header.position(DESCRIPTION),
            header.position(QUANTITY),
        ) {
            (Some(article), Some(description), Some(quantity)) => Ok(Self {
                article,
                description,
                quantity,
                part_number: header.position(PART_NUMBER),
                name: header.position(NAME),
                fixture_type: header.position(FIXTURE_TYPE),
                location: header.position(LOCATION),
            }),
            _ => Err(missing),
        }
    }
}

pub fn load_inventory(path: &Path) -> Result<InventoryLoad, LoadError> {
    let file = File::open(path)?;
    let load = read_inventory(file)?;
    tracing::info!(
        path = %path.display(),
        rows = load.catalog.len(),
        fixtures = load.catalog.keys().count(),
        skipped = load.skipped.len(),
        "inventory loaded"
    );
    Ok(load)
}

/// Parse an inventory table from any reader.
///
/// The header is the first row; a single banner row above it is tolerated.
pub fn read_inventory<R: Read>(reader: R) -> Result<InventoryLoad, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.records();

    let first = records
        .next()
        .transpose()?
        .ok_or_else(|| LoadError::Parse("table is empty".to_string()))?;

    let columns = match Columns::locate(&first) {
        Ok(columns) => columns,
        Err(missing) => {
            let second = records.next().transpose()?;
            match second.as_ref().map(Columns::locate) {
                Some(Ok(columns)) => columns,
                _ => {
                    return Err(LoadError::Parse(format!(
                        "missing required column(s): {}",
                        missing.join(", ")
                    )));
                }
            }
        }
    };

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for record in records {
        let record = record?;
        match parse_row(&columns, &record) {
            Ok(Some(fixture)) => rows.push(fixture),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(line = err.line, "skipping inventory row: {}", err.message);
                skipped.push(err);
            }
        }
    }

    Ok(InventoryLoad {
        catalog: Catalog::new(rows),
        skipped,
    })
}

fn parse_row(columns: &Columns, record: &StringRecord) -> Result<Option<FixtureRecord>, DataError> {
    if is_blank(record) {
        return Ok(None);
    }
    let line = line_of(record);

    let article = cell(record, Some(columns.article));
    if article.is_empty() {
        return Err(DataError {
            line,
            message: "article is empty".to_string(),
        });
    }

    let baseline = parse_quantity(cell(record, Some(columns.quantity)))
        .map_err(|message| DataError { line, message })?;

    let fixture = FixtureRecord::new(
        article,
        cell(record, columns.fixture_type),
        cell(record, Some(columns.description)),
        baseline,
    )
    .with_part_number(cell(record, columns.part_number))
    .with_name(cell(record, columns.name))
    .with_location(cell(record, columns.location))
    .at_line(line as usize);

    Ok(Some(fixture))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtrack_inventory::FixtureKey;

    const TABLE: &str = "\
Article,Part Number,Name,Fixture Type,Fixture Description,Location,Available Units (Qty.)
ART-1,PN-1,Adapter,SAFT,adapter plate,Shelf A,6
ART-1,PN-1,Adapter,SAFT,adapter plate,Shelf B,4
ART-2,PN-2,Probe,,SPEA probe,Shelf C,2
";

    #[test]
    fn reads_rows_into_catalog() {
        let load = read_inventory(TABLE.as_bytes()).unwrap();
        assert!(load.skipped.is_empty());
        assert_eq!(load.catalog.len(), 3);
        assert_eq!(load.catalog.baseline(&FixtureKey::new("ART-1", "SAFT")), 10);
        assert_eq!(load.catalog.baseline(&FixtureKey::new("ART-2", "SPEA3030")), 2);
        assert_eq!(load.catalog.records()[2].source_line, 4);
    }

    #[test]
    fn banner_row_above_header_is_tolerated() {
        let table = format!("Test Fixture Location,,,\n{TABLE}");
        let load = read_inventory(table.as_bytes()).unwrap();
        assert_eq!(load.catalog.len(), 3);
    }

    #[test]
    fn missing_required_columns_fail_fast() {
        let err = read_inventory("Article,Location\nART-1,Shelf\n".as_bytes()).unwrap_err();
        match err {
            LoadError::Parse(msg) => {
                assert!(msg.contains(DESCRIPTION), "{msg}");
                assert!(msg.contains(QUANTITY), "{msg}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn empty_table_is_a_parse_error() {
        assert!(matches!(read_inventory("".as_bytes()), Err(LoadError::Parse(_))));
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let table = "\
article,fixture description,available units (qty.)
ART-1,SAFT adapter,lots
,orphan row,1
ART-2,VSFT box,-2

ART-3,VSICT bed,
ART-4,SPEA plate,3
";
        let load = read_inventory(table.as_bytes()).unwrap();
        let lines: Vec<u64> = load.skipped.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(load.skipped[0].message.contains("non-numeric"));

        // Blank quantity counts as zero units; the row itself is kept.
        assert_eq!(load.catalog.len(), 2);
        assert!(load.catalog.contains(&FixtureKey::new("ART-3", "VSICT")));
        assert_eq!(load.catalog.baseline(&FixtureKey::new("ART-4", "SPEA3030")), 3);
    }

    #[test]
    fn short_rows_read_missing_cells_as_blank() {
        let table = "Article,Fixture Description,Available Units (Qty.),Location\nART-1,SAFT,1\n";
        let load = read_inventory(table.as_bytes()).unwrap();
        assert_eq!(load.catalog.records()[0].location, "");
    }

    #[test]
    fn load_inventory_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.csv");
        std::fs::write(&path, TABLE).unwrap();
        assert_eq!(load_inventory(&path).unwrap().catalog.len(), 3);

        let missing = dir.path().join("nope.csv");
        assert!(matches!(load_inventory(&missing), Err(LoadError::Storage(_))));
    }
}
