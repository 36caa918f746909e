//! Domain models for the book catalog. These stay light-weight data holders:
//! the resolver fills them in, the store orders and persists them, and the
//! terminal front end only ever reads them.
//!
//! Missing metadata is represented by the literal `"N/A"` sentinel rather
//! than `Option`, because every persisted row must carry every column.

use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};

use crate::isbn::Isbn13;

/// Placeholder written for any field a provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Second-precision wall clock format used for acquisition timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Turn an optional provider value into a field, substituting the sentinel
/// for absent or blank input.
pub fn or_not_available(value: Option<String>) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Page count reported by a provider. Unknown counts render as the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageCount {
    Known(u32),
    /// Free text from a hand-edited or older file (`"xii, 320"`), kept as is.
    Text(String),
    #[default]
    Unknown,
}

impl PageCount {
    /// Parse a persisted column. Blank cells and the sentinel are unknown;
    /// anything else that is not a plain integer is kept verbatim so a load
    /// followed by a save never rewrites it.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == NOT_AVAILABLE {
            return PageCount::Unknown;
        }
        text.parse::<u32>()
            .map(PageCount::Known)
            .unwrap_or_else(|_| PageCount::Text(text.to_string()))
    }
}

impl From<Option<u32>> for PageCount {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(pages) if pages > 0 => PageCount::Known(pages),
            _ => PageCount::Unknown,
        }
    }
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCount::Known(pages) => write!(f, "{pages}"),
            PageCount::Text(text) => f.write_str(text),
            PageCount::Unknown => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Canonical metadata for one book, independent of which provider supplied
/// it. Multi-valued provider fields (authors, categories) collapse to their
/// first element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub isbn: Isbn13,
    pub title: String,
    /// Primary author only.
    pub author: String,
    pub publisher: String,
    /// Free-form; granularity depends on the provider ("2004", "May 2004"...).
    pub publish_date: String,
    pub description: String,
    pub pages: PageCount,
    /// Primary category or subject.
    pub genre: String,
    pub language: String,
}

impl BookRecord {
    /// A record with every field set to the sentinel.
    pub fn empty(isbn: Isbn13) -> Self {
        Self {
            isbn,
            title: NOT_AVAILABLE.to_string(),
            author: NOT_AVAILABLE.to_string(),
            publisher: NOT_AVAILABLE.to_string(),
            publish_date: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            pages: PageCount::Unknown,
            genre: NOT_AVAILABLE.to_string(),
            language: NOT_AVAILABLE.to_string(),
        }
    }

    /// Label/value pairs in display order, used by the detail panel.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Title", self.title.clone()),
            ("Author", self.author.clone()),
            ("Publisher", self.publisher.clone()),
            ("Published Date", self.publish_date.clone()),
            ("Description", self.description.clone()),
            ("Pages", self.pages.to_string()),
            ("Genre", self.genre.clone()),
            ("Language", self.language.clone()),
        ]
    }
}

/// One accepted book. Entries are never edited in place; the catalog only
/// appends and deletes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub record: BookRecord,
    /// Wall clock time the book was added, truncated to whole seconds.
    pub acquired_at: NaiveDateTime,
}

impl CatalogEntry {
    pub fn new(record: BookRecord, acquired_at: NaiveDateTime) -> Self {
        Self {
            record,
            acquired_at: truncate_to_seconds(acquired_at),
        }
    }

    /// Stamp the record with the current local time.
    pub fn acquired_now(record: BookRecord) -> Self {
        Self::new(record, Local::now().naive_local())
    }

    pub fn isbn(&self) -> &Isbn13 {
        &self.record.isbn
    }

    pub fn timestamp(&self) -> String {
        self.acquired_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// `isbn - title`, the line shown in the book list.
    pub fn list_label(&self) -> String {
        format!("{} - {}", self.record.isbn, self.record.title)
    }
}

fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}
