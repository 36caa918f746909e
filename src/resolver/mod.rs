//! Metadata resolution: an ordered chain of providers, each owning the
//! translation of its own response schema into a [`BookRecord`].
//!
//! Provider failures never escape the chain. A transport error, a non-2xx
//! status or an unparseable body is logged and counted as "no match" so the
//! next provider still gets a chance.

mod google_books;
mod http;
mod open_library;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::isbn::Isbn13;
use crate::models::BookRecord;

pub use google_books::GoogleBooksProvider;
pub use http::{HttpFetch, HttpResponse, ReqwestFetcher};
pub use open_library::OpenLibraryProvider;

/// One external metadata source.
pub trait Provider {
    /// Short human readable name used in logs.
    fn name(&self) -> &'static str;

    /// Query the source. `Ok(None)` means the source answered but has no
    /// usable record for `isbn`.
    fn lookup(&self, isbn: &Isbn13) -> Result<Option<BookRecord>, TransportError>;

    /// [`Provider::lookup`] with failures folded into a non-match.
    fn try_fetch(&self, isbn: &Isbn13) -> Option<BookRecord> {
        match self.lookup(isbn) {
            Ok(found) => found,
            Err(err) => {
                warn!(provider = self.name(), %isbn, error = %err, "provider request failed");
                None
            }
        }
    }
}

/// Calls its providers in order until one yields a record.
pub struct MetadataResolver {
    providers: Vec<Box<dyn Provider>>,
}

impl MetadataResolver {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Google Books first, Open Library as the fallback.
    pub fn with_default_providers(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self::new(vec![
            Box::new(GoogleBooksProvider::new(Arc::clone(&fetcher))),
            Box::new(OpenLibraryProvider::new(fetcher)),
        ])
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// `None` when every provider came up empty. That is an ordinary outcome,
    /// not an error.
    pub fn resolve(&self, isbn: &Isbn13) -> Option<BookRecord> {
        for provider in &self.providers {
            match provider.try_fetch(isbn) {
                Some(record) => {
                    info!(provider = provider.name(), %isbn, title = %record.title, "metadata resolved");
                    return Some(record);
                }
                None => debug!(provider = provider.name(), %isbn, "provider miss"),
            }
        }
        info!(%isbn, "no provider knows this isbn");
        None
    }
}

/// GET `url` and decode a JSON body, treating non-2xx statuses and bad JSON
/// as transport failures.
fn fetch_json<T: DeserializeOwned>(fetcher: &dyn HttpFetch, url: &str) -> Result<T, TransportError> {
    let response = fetcher.fetch(url)?;
    if !response.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    serde_json::from_str(&response.body).map_err(|err| TransportError::Body(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers from a fixed URL table and records every request.
    #[derive(Default)]
    struct StaticFetcher {
        responses: HashMap<String, Result<HttpResponse, String>>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn respond(mut self, url: String, status: u16, body: &str) -> Self {
            self.responses.insert(
                url,
                Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        fn fail(mut self, url: String) -> Self {
            self.responses.insert(url, Err("connection refused".into()));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpFetch for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(reason)) => Err(TransportError::Request {
                    url: url.to_string(),
                    reason: reason.clone(),
                }),
                None => Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }

    const GOOGLE_HIT: &str = r#"{"totalItems": 1, "items": [{"volumeInfo": {
        "title": "From Google",
        "industryIdentifiers": [{"type": "ISBN_13", "identifier": "9780306406157"}]
    }}]}"#;
    const OPEN_LIBRARY_HIT: &str =
        r#"{"ISBN:9780306406157": {"title": "From Open Library", "authors": [{"name": "OL Author"}]}}"#;

    fn isbn() -> Isbn13 {
        Isbn13::parse("9780306406157").unwrap()
    }

    fn chain(fetcher: StaticFetcher) -> (MetadataResolver, Arc<StaticFetcher>) {
        let fetcher = Arc::new(fetcher);
        let shared: Arc<dyn HttpFetch> = fetcher.clone();
        (MetadataResolver::with_default_providers(shared), fetcher)
    }

    #[test]
    fn first_provider_hit_short_circuits() {
        let (resolver, fetcher) = chain(
            StaticFetcher::default()
                .respond(GoogleBooksProvider::url_for(&isbn()), 200, GOOGLE_HIT)
                .respond(OpenLibraryProvider::url_for(&isbn()), 200, OPEN_LIBRARY_HIT),
        );
        let record = resolver.resolve(&isbn()).unwrap();
        assert_eq!(record.title, "From Google");
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn transport_failure_falls_back_to_open_library() {
        let (resolver, _) = chain(
            StaticFetcher::default()
                .fail(GoogleBooksProvider::url_for(&isbn()))
                .respond(OpenLibraryProvider::url_for(&isbn()), 200, OPEN_LIBRARY_HIT),
        );
        let record = resolver.resolve(&isbn()).unwrap();
        assert_eq!(record.title, "From Open Library");
        assert_eq!(record.author, "OL Author");
        assert_eq!(record.isbn, isbn());
    }

    #[test]
    fn server_error_and_bad_json_fall_back() {
        let (resolver, _) = chain(
            StaticFetcher::default()
                .respond(GoogleBooksProvider::url_for(&isbn()), 503, "unavailable")
                .respond(OpenLibraryProvider::url_for(&isbn()), 200, OPEN_LIBRARY_HIT),
        );
        assert!(resolver.resolve(&isbn()).is_some());

        let (resolver, _) = chain(
            StaticFetcher::default()
                .respond(GoogleBooksProvider::url_for(&isbn()), 200, "<html>")
                .respond(OpenLibraryProvider::url_for(&isbn()), 200, OPEN_LIBRARY_HIT),
        );
        assert!(resolver.resolve(&isbn()).is_some());
    }

    #[test]
    fn google_answer_without_isbn13_falls_through() {
        let (resolver, fetcher) = chain(
            StaticFetcher::default()
                .respond(
                    GoogleBooksProvider::url_for(&isbn()),
                    200,
                    r#"{"totalItems": 1, "items": [{"volumeInfo": {"title": "Unidentified"}}]}"#,
                )
                .respond(OpenLibraryProvider::url_for(&isbn()), 200, OPEN_LIBRARY_HIT),
        );
        assert_eq!(resolver.resolve(&isbn()).unwrap().title, "From Open Library");
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn no_match_anywhere_is_none() {
        let (resolver, fetcher) = chain(
            StaticFetcher::default()
                .respond(GoogleBooksProvider::url_for(&isbn()), 200, r#"{"totalItems": 0}"#)
                .respond(OpenLibraryProvider::url_for(&isbn()), 200, "{}"),
        );
        assert!(resolver.resolve(&isbn()).is_none());
        assert_eq!(
            fetcher.requests(),
            vec![
                GoogleBooksProvider::url_for(&isbn()),
                OpenLibraryProvider::url_for(&isbn())
            ]
        );
    }

    #[test]
    fn default_chain_order() {
        let (resolver, _) = chain(StaticFetcher::default());
        assert_eq!(resolver.provider_names(), ["Google Books", "Open Library"]);
    }

    #[test]
    #[ignore = "network probe for manual debugging"]
    fn live_provider_probe() {
        let fetcher: Arc<dyn HttpFetch> =
            Arc::new(ReqwestFetcher::new(Duration::from_secs(5)).unwrap());
        let resolver = MetadataResolver::with_default_providers(fetcher);
        let isbn = Isbn13::parse("9780140328721").unwrap();
        println!("probe isbn={isbn} record={:?}", resolver.resolve(&isbn));
    }
}
