//! Scan/entry pipeline. Every raw string, typed or scanned, runs through the
//! same steps:
//!
//! 1. normalize with the codec (failure: `Invalid`)
//! 2. canonicalize to ISBN-13 (failure: `Invalid`)
//! 3. duplicate check against the store (`Duplicate`)
//! 4. resolve metadata (`NotFound` when no provider knows the book)
//! 5. add and persist (`Stored`)
//!
//! The result is a plain value; wording and colours belong to the front end.

use tracing::info;

use crate::error::{IsbnError, StoreError};
use crate::isbn::{self, Isbn13};
use crate::models::CatalogEntry;
use crate::resolver::MetadataResolver;
use crate::store::CatalogStore;

/// Where a raw identifier came from, kept for display provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Manual,
    Scanned,
}

impl EntrySource {
    pub fn label(self) -> &'static str {
        match self {
            EntrySource::Manual => "MANUAL ENTRY",
            EntrySource::Scanned => "SCANNED",
        }
    }
}

/// Feedback category a front end maps to colours or sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Success,
    Warning,
    Error,
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The raw input is not a usable ISBN.
    Invalid { raw: String, error: IsbnError },
    Duplicate { isbn: Isbn13 },
    NotFound { isbn: Isbn13 },
    Stored { entry: CatalogEntry },
}

impl Outcome {
    pub fn feedback(&self) -> Feedback {
        match self {
            Outcome::Stored { .. } => Feedback::Success,
            Outcome::Duplicate { .. } => Feedback::Warning,
            Outcome::Invalid { .. } | Outcome::NotFound { .. } => Feedback::Error,
        }
    }

    pub fn isbn(&self) -> Option<&Isbn13> {
        match self {
            Outcome::Invalid { .. } => None,
            Outcome::Duplicate { isbn } | Outcome::NotFound { isbn } => Some(isbn),
            Outcome::Stored { entry } => Some(entry.isbn()),
        }
    }

    fn state(&self) -> &'static str {
        match self {
            Outcome::Invalid { .. } => "invalid",
            Outcome::Duplicate { .. } => "duplicate",
            Outcome::NotFound { .. } => "not_found",
            Outcome::Stored { .. } => "stored",
        }
    }
}

/// An outcome tagged with the source of its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub source: EntrySource,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Reject identifiers whose check digit does not match. Off by default:
    /// barcode decoders already verify EAN-13 checksums and providers simply
    /// miss on mistyped manual entries.
    pub verify_check_digit: bool,
}

pub struct Pipeline {
    resolver: MetadataResolver,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(resolver: MetadataResolver, options: PipelineOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Run one raw identifier to a terminal state. Only a failed save is an
    /// `Err`; every other failure is an [`Outcome`].
    pub fn process(
        &self,
        store: &mut CatalogStore,
        raw: &str,
        source: EntrySource,
    ) -> Result<ScanOutcome, StoreError> {
        let outcome = self.run(store, raw)?;
        info!(
            source = source.label(),
            raw,
            state = outcome.state(),
            isbn = outcome.isbn().map(Isbn13::as_str).unwrap_or("-"),
            "pipeline finished"
        );
        Ok(ScanOutcome { source, outcome })
    }

    fn run(&self, store: &mut CatalogStore, raw: &str) -> Result<Outcome, StoreError> {
        let invalid = |error: IsbnError| Outcome::Invalid {
            raw: raw.trim().to_string(),
            error,
        };

        let normalized = match isbn::normalize(raw) {
            Ok(normalized) => normalized,
            Err(error) => return Ok(invalid(error)),
        };
        if self.options.verify_check_digit {
            if let Err(error) = isbn::verify(&normalized) {
                return Ok(invalid(error));
            }
        }
        let isbn = match Isbn13::from_normalized(&normalized) {
            Ok(isbn) => isbn,
            Err(error) => return Ok(invalid(error)),
        };

        if store.contains(&isbn) {
            return Ok(Outcome::Duplicate { isbn });
        }

        let Some(mut record) = self.resolver.resolve(&isbn) else {
            return Ok(Outcome::NotFound { isbn });
        };
        record.isbn = isbn.clone();

        let entry = CatalogEntry::acquired_now(record);
        match store.add(entry.clone()) {
            Ok(()) => Ok(Outcome::Stored { entry }),
            Err(StoreError::DuplicateIdentifier(_)) => Ok(Outcome::Duplicate { isbn }),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::models::BookRecord;
    use crate::resolver::Provider;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Knows exactly one ISBN and counts lookups.
    struct OneBook {
        known: Isbn13,
        calls: Rc<Cell<usize>>,
    }

    impl Provider for OneBook {
        fn name(&self) -> &'static str {
            "one book"
        }

        fn lookup(&self, isbn: &Isbn13) -> Result<Option<BookRecord>, TransportError> {
            self.calls.set(self.calls.get() + 1);
            if *isbn != self.known {
                return Ok(None);
            }
            let mut record = BookRecord::empty(isbn.clone());
            record.title = "Known Book".to_string();
            Ok(Some(record))
        }
    }

    fn pipeline(known: &str, options: PipelineOptions) -> (Pipeline, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let provider = OneBook {
            known: Isbn13::parse(known).unwrap(),
            calls: Rc::clone(&calls),
        };
        let resolver = MetadataResolver::new(vec![Box::new(provider)]);
        (Pipeline::new(resolver, options), calls)
    }

    fn store() -> (tempfile::TempDir, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("scanned_books.csv")).unwrap();
        (dir, store)
    }

    #[test]
    fn stores_then_reports_duplicate() {
        let (pipeline, calls) = pipeline("9780306406153", PipelineOptions::default());
        let (_dir, mut store) = store();

        let first = pipeline
            .process(&mut store, "9780306406153", EntrySource::Scanned)
            .unwrap();
        match &first.outcome {
            Outcome::Stored { entry } => {
                assert_eq!(entry.isbn().as_str(), "9780306406153");
                assert_eq!(entry.record.title, "Known Book");
            }
            other => panic!("expected Stored, got {other:?}"),
        }
        assert_eq!(first.outcome.feedback(), Feedback::Success);
        assert_eq!(first.source.label(), "SCANNED");

        let second = pipeline
            .process(&mut store, "9780306406153", EntrySource::Scanned)
            .unwrap();
        assert!(matches!(second.outcome, Outcome::Duplicate { .. }));
        assert_eq!(second.outcome.feedback(), Feedback::Warning);
        assert_eq!(calls.get(), 1, "duplicates must not reach the resolver");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn isbn10_input_is_stored_as_isbn13() {
        let (pipeline, _) = pipeline("9780306406157", PipelineOptions::default());
        let (_dir, mut store) = store();

        let result = pipeline
            .process(&mut store, "0-306-40615-2", EntrySource::Manual)
            .unwrap();
        assert_eq!(result.outcome.isbn().unwrap().as_str(), "9780306406157");
        assert_eq!(result.source.label(), "MANUAL ENTRY");

        let again = pipeline
            .process(&mut store, "978-0-306-40615-7", EntrySource::Manual)
            .unwrap();
        assert!(matches!(again.outcome, Outcome::Duplicate { .. }));
    }

    #[test]
    fn malformed_input_is_invalid_without_lookup() {
        let (pipeline, calls) = pipeline("9780306406157", PipelineOptions::default());
        let (_dir, mut store) = store();

        for raw in ["", "12345", "97803064061577", "97803O6406157"] {
            let result = pipeline.process(&mut store, raw, EntrySource::Manual).unwrap();
            assert!(
                matches!(
                    result.outcome,
                    Outcome::Invalid {
                        error: IsbnError::InvalidFormat(_),
                        ..
                    }
                ),
                "{raw}: {:?}",
                result.outcome
            );
            assert_eq!(result.outcome.feedback(), Feedback::Error);
        }
        assert_eq!(calls.get(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_book_is_not_found() {
        let (pipeline, calls) = pipeline("9780306406157", PipelineOptions::default());
        let (_dir, mut store) = store();

        let result = pipeline
            .process(&mut store, "9780804429573", EntrySource::Scanned)
            .unwrap();
        assert!(matches!(result.outcome, Outcome::NotFound { ref isbn } if isbn.as_str() == "9780804429573"));
        assert_eq!(calls.get(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn strict_mode_rejects_bad_check_digit() {
        let options = PipelineOptions {
            verify_check_digit: true,
        };
        let (pipeline, calls) = pipeline("9780306406153", options);
        let (_dir, mut store) = store();

        let result = pipeline
            .process(&mut store, "9780306406153", EntrySource::Manual)
            .unwrap();
        assert!(matches!(
            result.outcome,
            Outcome::Invalid {
                error: IsbnError::InvalidChecksum { expected: '7', .. },
                ..
            }
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn failed_save_is_an_error_and_leaves_store_empty() {
        let (pipeline, _) = pipeline("9780306406157", PipelineOptions::default());
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let mut store = CatalogStore::new(blocker.join("books.csv"));

        let result = pipeline.process(&mut store, "9780306406157", EntrySource::Manual);
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(store.is_empty());
    }
}
