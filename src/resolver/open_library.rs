use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::TransportError;
use crate::isbn::Isbn13;
use crate::models::{or_not_available, BookRecord, PageCount};

use super::http::HttpFetch;
use super::{fetch_json, Provider};

const BOOKS_URL: &str = "https://openlibrary.org/api/books";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookData {
    title: Option<String>,
    authors: Vec<Named>,
    publishers: Vec<Named>,
    publish_date: Option<String>,
    notes: Option<Notes>,
    number_of_pages: Option<u32>,
    subjects: Vec<Named>,
    languages: Vec<Keyed>,
}

impl BookData {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_empty()
            && self.publishers.is_empty()
            && self.publish_date.is_none()
            && self.number_of_pages.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Keyed {
    key: Option<String>,
}

/// `notes` is either plain text or a typed text object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Notes {
    Text(String),
    Typed { value: String },
}

impl Notes {
    fn into_text(self) -> String {
        match self {
            Notes::Text(text) | Notes::Typed { value: text } => text,
        }
    }
}

/// Open Library books API (`jscmd=data`), queried when Google Books has no
/// usable answer.
pub struct OpenLibraryProvider {
    fetcher: Arc<dyn HttpFetch>,
}

impl OpenLibraryProvider {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher }
    }

    pub fn url_for(isbn: &Isbn13) -> String {
        format!("{BOOKS_URL}?bibkeys=ISBN:{isbn}&format=json&jscmd=data")
    }
}

impl Provider for OpenLibraryProvider {
    fn name(&self) -> &'static str {
        "Open Library"
    }

    fn lookup(&self, isbn: &Isbn13) -> Result<Option<BookRecord>, TransportError> {
        let mut response: HashMap<String, BookData> =
            fetch_json(self.fetcher.as_ref(), &Self::url_for(isbn))?;
        Ok(response
            .remove(&format!("ISBN:{isbn}"))
            .and_then(|data| normalize(data, isbn)))
    }
}

fn normalize(data: BookData, isbn: &Isbn13) -> Option<BookRecord> {
    if data.is_empty() {
        return None;
    }

    let first_name = |values: Vec<Named>| values.into_iter().next().and_then(|named| named.name);
    let language = data
        .languages
        .into_iter()
        .next()
        .and_then(|lang| lang.key)
        .and_then(|key| key.rsplit('/').next().map(str::to_string));

    Some(BookRecord {
        isbn: isbn.clone(),
        title: or_not_available(data.title),
        author: or_not_available(first_name(data.authors)),
        publisher: or_not_available(first_name(data.publishers)),
        publish_date: or_not_available(data.publish_date),
        description: or_not_available(data.notes.map(Notes::into_text)),
        pages: PageCount::from(data.number_of_pages),
        genre: or_not_available(first_name(data.subjects)),
        language: or_not_available(language),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;

    fn isbn() -> Isbn13 {
        Isbn13::parse("9780306406157").unwrap()
    }

    fn parse(body: &str) -> Option<BookRecord> {
        let mut response: HashMap<String, BookData> = serde_json::from_str(body).unwrap();
        response
            .remove("ISBN:9780306406157")
            .and_then(|data| normalize(data, &isbn()))
    }

    #[test]
    fn builds_url_with_bibkey() {
        assert_eq!(
            OpenLibraryProvider::url_for(&isbn()),
            "https://openlibrary.org/api/books?bibkeys=ISBN:9780306406157&format=json&jscmd=data"
        );
    }

    #[test]
    fn maps_named_lists_and_language_key() {
        let record = parse(
            r#"{"ISBN:9780306406157": {
                "title": "Mathematical Methods",
                "authors": [{"name": "First Author", "url": "x"}, {"name": "Second"}],
                "publishers": [{"name": "Plenum Press"}],
                "publish_date": "1985",
                "notes": "Includes index.",
                "number_of_pages": 532,
                "subjects": [{"name": "Mathematical physics"}],
                "languages": [{"key": "/languages/eng"}]
            }}"#,
        )
        .unwrap();

        assert_eq!(record.title, "Mathematical Methods");
        assert_eq!(record.author, "First Author");
        assert_eq!(record.publisher, "Plenum Press");
        assert_eq!(record.publish_date, "1985");
        assert_eq!(record.description, "Includes index.");
        assert_eq!(record.pages, PageCount::Known(532));
        assert_eq!(record.genre, "Mathematical physics");
        assert_eq!(record.language, "eng");
    }

    #[test]
    fn typed_notes_and_missing_fields() {
        let record = parse(
            r#"{"ISBN:9780306406157": {
                "title": "Sparse",
                "notes": {"type": "/type/text", "value": "Typed note"}
            }}"#,
        )
        .unwrap();
        assert_eq!(record.description, "Typed note");
        assert_eq!(record.author, NOT_AVAILABLE);
        assert_eq!(record.publisher, NOT_AVAILABLE);
        assert_eq!(record.language, NOT_AVAILABLE);
        assert_eq!(record.pages, PageCount::Unknown);
    }

    #[test]
    fn empty_object_and_empty_entry_are_not_matches() {
        assert!(parse("{}").is_none());
        assert!(parse(r#"{"ISBN:9780306406157": {}}"#).is_none());
    }
}
