//! CSV-file ledger (the spreadsheet the shop floor opens).
//!
//! Layout is fixed by [`COLUMNS`]. A check-out appends one fully encoded row and
//! syncs it; a check-in writes the whole table to a temp file next to the ledger,
//! syncs it and renames it over the original, so a crash leaves either the old or
//! the new table, never a mix.
//!
//! The file may be edited by hand while the service runs. Every read and append
//! first brings it back into [`COLUMNS`] order and fills blank ids, so an appended
//! row always lines up with the header above it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tempfile::NamedTempFile;

use fixtrack_core::BorrowId;
use fixtrack_inventory::{BorrowEntry, SystemLabel};

use super::r#trait::LedgerStore;
use crate::error::StorageError;
use crate::table::{
    Header, cell, format_timestamp, is_blank, line_of, parse_quantity, parse_timestamp,
};

pub const BORROW_ID: &str = "borrow_id";
pub const ARTICLE: &str = "Article";
pub const PART_NUMBER: &str = "Part Number";
pub const SYSTEM: &str = "System";
pub const QUANTITY: &str = "Quantity";
pub const CLIENT_NAME: &str = "Client Name";
pub const CLIENT_PHONE: &str = "Client Phone";
pub const LOCATION: &str = "Location";
pub const BORROWED_AT: &str = "Borrowed At";
pub const RETURNED_AT: &str = "Returned At";

const WIDTH: usize = 10;

/// Ledger columns, in file order.
pub const COLUMNS: [&str; WIDTH] = [
    BORROW_ID,
    ARTICLE,
    PART_NUMBER,
    SYSTEM,
    QUANTITY,
    CLIENT_NAME,
    CLIENT_PHONE,
    LOCATION,
    BORROWED_AT,
    RETURNED_AT,
];

const REQUIRED: [&str; 3] = [ARTICLE, SYSTEM, QUANTITY];

type Positions = [Option<usize>; WIDTH];

/// Borrow ledger kept in a CSV file.
#[derive(Debug, Clone)]
pub struct CsvLedgerStore {
    path: PathBuf,
}

impl CsvLedgerStore {
    /// Open the ledger, creating it (with its header row) if absent.
    ///
    /// A ledger written by an older layout is rewritten once into [`COLUMNS`]:
    /// unknown columns are dropped, missing ones added empty, blank ids filled.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self { path: path.into() };
        fs::create_dir_all(store.dir())?;
        store.normalize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn ensure_exists(&self) -> Result<(), StorageError> {
        let empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if empty {
            tracing::info!(path = %self.path.display(), "creating borrow ledger");
            self.replace_rows(std::iter::empty::<[String; WIDTH]>())?;
        }
        Ok(())
    }

    fn read_table(&self) -> Result<(Header, Vec<StringRecord>), StorageError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let header = Header::new(rdr.headers()?);
        let missing = header.missing(&REQUIRED);
        if !missing.is_empty() {
            return Err(StorageError::MissingColumns(missing.join(", ")));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if !is_blank(&record) {
                rows.push(record);
            }
        }
        Ok((header, rows))
    }

    /// Rewrite the table into [`COLUMNS`] order if it drifted from it; returns the
    /// (now canonical) header and rows.
    fn normalize(&self) -> Result<(Header, Vec<StringRecord>), StorageError> {
        self.ensure_exists()?;
        let (header, rows) = self.read_table()?;
        let positions = column_positions(&header);

        let canonical = header.len() == WIDTH
            && positions
                .iter()
                .enumerate()
                .all(|(expected, actual)| *actual == Some(expected));
        let blank_ids = rows.iter().any(|r| cell(r, positions[0]).is_empty());
        if canonical && !blank_ids {
            return Ok((header, rows));
        }

        tracing::warn!(
            path = %self.path.display(),
            rows = rows.len(),
            "rewriting borrow ledger into the current column layout"
        );
        let migrated = rows.iter().map(|record| {
            let mut row = positions.map(|pos| cell(record, pos).to_string());
            if row[0].is_empty() {
                row[0] = BorrowId::new().to_string();
            }
            row
        });
        self.replace_rows(migrated)?;
        self.read_table()
    }

    /// Write header plus `rows` to a temp file and atomically move it into place.
    fn replace_rows<I, R>(&self, rows: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<[u8]>,
    {
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file_mut());
            wtr.write_record(COLUMNS)?;
            for row in rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load(&self) -> Result<Vec<BorrowEntry>, StorageError> {
        let (header, rows) = self.normalize()?;
        let positions = column_positions(&header);
        rows.iter()
            .map(|record| {
                decode(&positions, record).map_err(|message| StorageError::Malformed {
                    line: line_of(record),
                    message,
                })
            })
            .collect()
    }

    fn append(&self, entry: &BorrowEntry) -> Result<(), StorageError> {
        self.normalize()?;

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(encode(entry))?;
        let mut line = wtr
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;

        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        if !ends_with_newline(&mut file)? {
            line.insert(0, b'\n');
        }
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(())
    }

    fn rewrite(&self, entries: &[BorrowEntry]) -> Result<(), StorageError> {
        self.replace_rows(entries.iter().map(encode))
    }
}

fn column_positions(header: &Header) -> Positions {
    COLUMNS.map(|column| header.position(column))
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn encode(entry: &BorrowEntry) -> [String; WIDTH] {
    [
        entry.borrow_id.to_string(),
        entry.article.clone(),
        entry.part_number.clone(),
        entry.system.to_string(),
        entry.quantity.to_string(),
        entry.borrower.clone(),
        entry.borrower_phone.clone(),
        entry.location.clone(),
        format_timestamp(entry.borrowed_at),
        entry.returned_at.map(format_timestamp).unwrap_or_default(),
    ]
}

fn decode(positions: &Positions, record: &StringRecord) -> Result<BorrowEntry, String> {
    let field = |column: usize| cell(record, positions[column]);

    let borrow_id: BorrowId = field(0)
        .parse()
        .map_err(|e: fixtrack_core::DomainError| e.to_string())?;
    let article = field(1);
    if article.is_empty() {
        return Err("article is empty".to_string());
    }
    let system = SystemLabel::new(field(3));
    if system.is_empty() {
        return Err("system is empty".to_string());
    }
    let quantity = parse_quantity(field(4))?;
    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    let borrowed_at =
        parse_timestamp(field(8))?.ok_or_else(|| "borrowed-at timestamp is empty".to_string())?;

    Ok(BorrowEntry {
        borrow_id,
        article: article.to_string(),
        part_number: field(2).to_string(),
        system,
        quantity,
        borrower: field(5).to_string(),
        borrower_phone: field(6).to_string(),
        location: field(7).to_string(),
        borrowed_at,
        returned_at: parse_timestamp(field(9))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(article: &str, quantity: u32) -> BorrowEntry {
        BorrowEntry {
            borrow_id: BorrowId::new(),
            article: article.to_string(),
            part_number: "PN-1".to_string(),
            system: SystemLabel::new("SAFT"),
            quantity,
            borrower: "Alice, QA".to_string(),
            borrower_phone: "555-0100".to_string(),
            location: "Shelf A".to_string(),
            borrowed_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            returned_at: None,
        }
    }

    fn header_line(path: &Path) -> String {
        fs::read_to_string(path).unwrap().lines().next().unwrap().to_string()
    }

    #[test]
    fn open_creates_ledger_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("ledger.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert_eq!(header_line(&path), COLUMNS.join(","));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn appended_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let first = entry("ART-1", 3);
        let second = entry("ART-2", 1);
        {
            let store = CsvLedgerStore::open(&path).unwrap();
            store.append(&first).unwrap();
            store.append(&second).unwrap();
        }
        let reopened = CsvLedgerStore::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), vec![first, second]);
    }

    #[test]
    fn rewrite_persists_return_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::open(dir.path().join("ledger.csv")).unwrap();
        let mut e = entry("ART-1", 2);
        store.append(&e).unwrap();

        e.returned_at = Some(Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap());
        store.rewrite(std::slice::from_ref(&e)).unwrap();

        assert_eq!(store.load().unwrap(), vec![e]);
    }

    #[test]
    fn legacy_layout_is_normalized_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(
            &path,
            "Article,System,Quantity,Employee Name,Client Name,Borrowed At\n\
             ART-1,saft,2,old,Bob,2024-05-06 07:08:09\n",
        )
        .unwrap();

        let store = CsvLedgerStore::open(&path).unwrap();
        assert_eq!(header_line(&path), COLUMNS.join(","));

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].borrower, "Bob");
        assert_eq!(entries[0].system.as_str(), "SAFT");
        assert!(entries[0].is_outstanding());

        // Ids generated during normalization are stable afterwards.
        let again = CsvLedgerStore::open(&path).unwrap().load().unwrap();
        assert_eq!(again[0].borrow_id, entries[0].borrow_id);
    }

    #[test]
    fn missing_required_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "Article,Client Name\nART-1,Bob\n").unwrap();
        match CsvLedgerStore::open(&path) {
            Err(StorageError::MissingColumns(cols)) => assert_eq!(cols, "System, Quantity"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_rows_surface_with_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        store.append(&entry("ART-1", 1)).unwrap();

        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str(&format!("{},ART-1,,SAFT,many,,,,2025-01-01 00:00:00,\n", BorrowId::new()));
        fs::write(&path, text).unwrap();

        match store.load() {
            Err(StorageError::Malformed { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("non-numeric"), "{message}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn append_repairs_missing_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        let first = entry("ART-1", 1);
        store.append(&first).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.trim_end()).unwrap();

        let second = entry("ART-2", 1);
        store.append(&second).unwrap();
        assert_eq!(store.load().unwrap(), vec![first, second]);
    }

    #[test]
    fn append_realigns_hand_edited_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let store = CsvLedgerStore::open(&path).unwrap();

        // Someone inserts a column in the spreadsheet while the service runs.
        let mut edited = COLUMNS.to_vec();
        edited.insert(1, "Notes");
        fs::write(&path, format!("{}\n", edited.join(","))).unwrap();

        let e = entry("ART-1", 3);
        store.append(&e).unwrap();

        assert_eq!(header_line(&path), COLUMNS.join(","));
        assert_eq!(store.load().unwrap(), vec![e]);
    }

    #[test]
    fn hand_added_row_without_id_loads_at_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let store = CsvLedgerStore::open(&path).unwrap();

        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str(",ART-1,,SAFT,2,Bob,,,2025-01-01 00:00:00,\n");
        fs::write(&path, text).unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].borrower, "Bob");
        assert_eq!(entries[0].quantity, 2);

        // The generated id was written back, so it is stable across reads.
        let again = store.load().unwrap();
        assert_eq!(again[0].borrow_id, entries[0].borrow_id);
    }

    #[test]
    fn deleted_ledger_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let store = CsvLedgerStore::open(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(header_line(&path), COLUMNS.join(","));
    }
}
