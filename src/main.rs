//! Binary entry point that wires configuration, logging, the catalog store and
//! the metadata providers into the terminal front end.
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use isbn_shelf::config::Config;
use isbn_shelf::resolver::{HttpFetch, ReqwestFetcher};
use isbn_shelf::scanner::{FrameSource, LineFeed};
use isbn_shelf::{run_app, App, CatalogStore, MetadataResolver, Pipeline};

/// Load configuration and the catalog, then run the Ratatui event loop.
///
/// Configuration, logging and feed failures end the process with their
/// context chain. A catalog that fails to load is reported in the UI, which
/// then refuses to save over it.
fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(&config.log_path)?;
    info!(catalog = %config.catalog_path.display(), "starting isbn-shelf");

    let mut store = CatalogStore::new(&config.catalog_path);
    let load_error = store.load().err();

    let fetcher: Arc<dyn HttpFetch> =
        Arc::new(ReqwestFetcher::new(config.http_timeout).context("failed to build HTTP client")?);
    let resolver = MetadataResolver::with_default_providers(fetcher);
    let pipeline = Pipeline::new(resolver, config.pipeline);

    let feed = match &config.feed_path {
        Some(path) => {
            let feed = LineFeed::open(path)
                .with_context(|| format!("failed to open barcode feed {}", path.display()))?;
            Some(Box::new(feed) as Box<dyn FrameSource>)
        }
        None => None,
    };

    let mut app = App::new(store, pipeline, feed);
    if let Some(err) = load_error {
        app.report_error(
            &anyhow::Error::new(err)
                .context(format!("failed to load {}", config.catalog_path.display())),
        );
    }
    run_app(&mut app, config.tick)
}

/// Send log lines to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "isbn_shelf=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
