//! Core library surface for the ISBN Shelf cataloguing tool.
//!
//! A raw identifier, typed by hand or decoded from a barcode, flows through
//! [`pipeline::Pipeline`]: the [`isbn`] codec normalizes it, the
//! [`store::CatalogStore`] rejects duplicates, the [`resolver`] chain looks
//! up metadata, and the store appends and persists the result. The terminal
//! front end in [`ui`] is a thin layer over those pieces.
pub mod config;
pub mod error;
pub mod isbn;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod store;
pub mod ui;

/// Typed failures of the codec, the store and the HTTP capability.
pub use error::{IsbnError, StoreError, TransportError};

/// The canonical identifier and the records stored under it.
pub use isbn::Isbn13;
pub use models::{BookRecord, CatalogEntry, PageCount};

/// Orchestration and its structured results.
pub use pipeline::{EntrySource, Feedback, Outcome, Pipeline, PipelineOptions, ScanOutcome};
pub use resolver::MetadataResolver;
pub use store::CatalogStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
