use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::isbn::Isbn13;
use crate::models::{BookRecord, CatalogEntry, PageCount, TIMESTAMP_FORMAT};

/// Column order of every catalog file, header included.
pub const COLUMNS: [&str; 10] = [
    "isbn",
    "title",
    "author",
    "publisher",
    "publish_date",
    "description",
    "pages",
    "genre",
    "language",
    "timestamp",
];

/// One CSV row. Field order must match [`COLUMNS`] because rows are written
/// without serde-generated headers.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogRow {
    isbn: String,
    title: String,
    author: String,
    publisher: String,
    publish_date: String,
    description: String,
    pages: String,
    genre: String,
    language: String,
    timestamp: String,
}

impl From<&CatalogEntry> for CatalogRow {
    fn from(entry: &CatalogEntry) -> Self {
        let record = &entry.record;
        Self {
            isbn: record.isbn.to_string(),
            title: record.title.clone(),
            author: record.author.clone(),
            publisher: record.publisher.clone(),
            publish_date: record.publish_date.clone(),
            description: record.description.clone(),
            pages: record.pages.to_string(),
            genre: record.genre.clone(),
            language: record.language.clone(),
            timestamp: entry.timestamp(),
        }
    }
}

impl CatalogRow {
    fn into_entry(self) -> Result<CatalogEntry, String> {
        let isbn = Isbn13::parse(&self.isbn)
            .map_err(|err| format!("bad isbn '{}': {err}", self.isbn))?;
        let acquired_at = NaiveDateTime::parse_from_str(self.timestamp.trim(), TIMESTAMP_FORMAT)
            .map_err(|err| format!("bad timestamp '{}': {err}", self.timestamp))?;

        let record = BookRecord {
            isbn,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            publish_date: self.publish_date,
            description: self.description,
            pages: PageCount::parse(&self.pages),
            genre: self.genre,
            language: self.language,
        };
        Ok(CatalogEntry::new(record, acquired_at))
    }
}

/// Read every row of a catalog file in file order. Opening errors are
/// returned as [`StoreError::Io`] so callers can special-case a missing file.
pub fn read_entries(path: &Path) -> Result<Vec<CatalogEntry>, StoreError> {
    let file = File::open(path).map_err(|err| StoreError::io(path, err))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| StoreError::csv(path, err))?
        .clone();
    if let Some(missing) = COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(StoreError::MalformedRow {
            path: path.to_path_buf(),
            line: 1,
            reason: format!("missing column '{missing}'"),
        });
    }

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|err| StoreError::csv(path, err))?
    {
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let malformed = |reason: String| StoreError::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let row: CatalogRow = record
            .deserialize(Some(&headers))
            .map_err(|err| malformed(err.to_string()))?;
        let entry = row.into_entry().map_err(malformed)?;
        if !seen.insert(entry.isbn().clone()) {
            return Err(malformed(format!("duplicate isbn {}", entry.isbn())));
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// Serialize entries, header first, to any writer. Fields containing the
/// delimiter, quotes or line breaks are quoted by the CSV writer.
pub fn write_entries<'a, W, I>(writer: W, entries: I) -> Result<W, csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for entry in entries {
        csv_writer.serialize(CatalogRow::from(entry))?;
    }
    csv_writer.flush()?;
    csv_writer
        .into_inner()
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::Other, err.to_string())))
}

/// Replace `path` with the serialized entries. Rows go to a sibling temporary
/// file that is renamed over the target once fully written, so readers only
/// ever see a complete catalog.
pub fn write_file<'a, I>(path: &Path, entries: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path).map_err(|err| StoreError::io(&temp_path, err))?;
    let result = write_entries(file, entries)
        .map_err(|err| StoreError::csv(&temp_path, err))
        .and_then(|file| file.sync_all().map_err(|err| StoreError::io(&temp_path, err)))
        .and_then(|_| fs::rename(&temp_path, path).map_err(|err| StoreError::io(path, err)));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "catalog.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}
