use std::sync::Arc;

use serde::Deserialize;

use crate::error::TransportError;
use crate::isbn::Isbn13;
use crate::models::{or_not_available, BookRecord, PageCount};

use super::http::HttpFetch;
use super::{fetch_json, Provider};

const VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes?q=isbn:";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    total_items: u64,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: Option<String>,
    authors: Vec<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    page_count: Option<u32>,
    categories: Vec<String>,
    language: Option<String>,
    industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

/// Google Books volumes search, queried first.
pub struct GoogleBooksProvider {
    fetcher: Arc<dyn HttpFetch>,
}

impl GoogleBooksProvider {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher }
    }

    pub fn url_for(isbn: &Isbn13) -> String {
        format!("{VOLUMES_URL}{isbn}")
    }
}

impl Provider for GoogleBooksProvider {
    fn name(&self) -> &'static str {
        "Google Books"
    }

    fn lookup(&self, isbn: &Isbn13) -> Result<Option<BookRecord>, TransportError> {
        let response: VolumesResponse =
            fetch_json(self.fetcher.as_ref(), &Self::url_for(isbn))?;
        Ok(normalize(response, isbn))
    }
}

/// Only the first volume counts, and it must carry an ISBN-13 identifier;
/// volumes identified some other way are not treated as authoritative.
fn normalize(response: VolumesResponse, isbn: &Isbn13) -> Option<BookRecord> {
    if response.total_items == 0 {
        return None;
    }
    let info = response.items.into_iter().next()?.volume_info?;
    let has_isbn13 = info
        .industry_identifiers
        .iter()
        .any(|id| id.kind == "ISBN_13" && Isbn13::parse_canonical(&id.identifier).is_ok());
    if !has_isbn13 {
        return None;
    }

    Some(BookRecord {
        isbn: isbn.clone(),
        title: or_not_available(info.title),
        author: or_not_available(info.authors.into_iter().next()),
        publisher: or_not_available(info.publisher),
        publish_date: or_not_available(info.published_date),
        description: or_not_available(info.description),
        pages: PageCount::from(info.page_count),
        genre: or_not_available(info.categories.into_iter().next()),
        language: or_not_available(info.language),
    })
}
