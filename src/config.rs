use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

use crate::pipeline::PipelineOptions;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".isbn-shelf";
/// Backing catalog file stored inside the application data directory.
const CATALOG_FILE_NAME: &str = "scanned_books.csv";
const LOG_FILE_NAME: &str = "isbn-shelf.log";

/// Command-line arguments. Every path option falls back to an environment
/// variable and then to a file beneath `~/.isbn-shelf`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "isbn-shelf")]
#[command(about = "Scan or type ISBNs into a CSV-backed book catalog")]
#[command(version)]
pub struct Args {
    /// Catalog CSV file
    #[arg(long, env = "ISBN_SHELF_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Barcode feed (file or FIFO of `SYMBOLOGY:data` lines, e.g. from zbarcam)
    #[arg(long, env = "ISBN_SHELF_FEED")]
    pub feed: Option<PathBuf>,

    /// Per-provider HTTP timeout in seconds
    #[arg(long, env = "ISBN_SHELF_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Log file
    #[arg(long, env = "ISBN_SHELF_LOG")]
    pub log_file: Option<PathBuf>,

    /// Frame poll period in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Reject identifiers whose check digit does not match
    #[arg(long)]
    pub strict_checksum: bool,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub feed_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub http_timeout: Duration,
    pub tick: Duration,
    pub pipeline: PipelineOptions,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

    /// Parse the process arguments and resolve defaults.
    pub fn from_env() -> Result<Self> {
        Self::resolve(Args::parse())
    }

    pub fn resolve(args: Args) -> Result<Self> {
        let data_dir = match (&args.catalog, &args.log_file) {
            (Some(_), Some(_)) => None,
            _ => Some(data_dir()?),
        };
        let in_data_dir = |name: &str| {
            data_dir
                .as_ref()
                .map(|dir| dir.join(name))
                .unwrap_or_default()
        };

        Ok(Self {
            catalog_path: args
                .catalog
                .unwrap_or_else(|| in_data_dir(CATALOG_FILE_NAME)),
            feed_path: args.feed,
            log_path: args.log_file.unwrap_or_else(|| in_data_dir(LOG_FILE_NAME)),
            http_timeout: args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(Self::DEFAULT_TIMEOUT),
            tick: args
                .tick_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(Self::DEFAULT_TICK),
            pipeline: PipelineOptions {
                verify_check_digit: args.strict_checksum,
            },
        })
    }
}

/// Resolve `~/.isbn-shelf`.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_arguments_win() {
        let args = Args::try_parse_from([
            "isbn-shelf",
            "--catalog",
            "/tmp/books.csv",
            "--log-file",
            "/tmp/shelf.log",
            "--feed",
            "/tmp/zbar.fifo",
            "--timeout-secs",
            "2",
            "--tick-ms",
            "100",
            "--strict-checksum",
        ])
        .unwrap();
        let config = Config::resolve(args).unwrap();

        assert_eq!(config.catalog_path, PathBuf::from("/tmp/books.csv"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/shelf.log"));
        assert_eq!(config.feed_path, Some(PathBuf::from("/tmp/zbar.fifo")));
        assert_eq!(config.http_timeout, Duration::from_secs(2));
        assert_eq!(config.tick, Duration::from_millis(100));
        assert!(config.pipeline.verify_check_digit);
    }

    #[test]
    fn defaults_live_in_the_data_directory() {
        let Ok(data_dir) = data_dir() else {
            return;
        };
        let config = Config::resolve(Args::default()).unwrap();

        assert_eq!(config.catalog_path, data_dir.join("scanned_books.csv"));
        assert_eq!(config.log_path, data_dir.join("isbn-shelf.log"));
        assert_eq!(config.feed_path, None);
        assert_eq!(config.http_timeout, Config::DEFAULT_TIMEOUT);
        assert_eq!(config.tick, Config::DEFAULT_TICK);
        assert!(!config.pipeline.verify_check_digit);
    }

    #[test]
    fn zero_tick_falls_back_to_default() {
        let args = Args {
            catalog: Some("/tmp/a.csv".into()),
            log_file: Some("/tmp/a.log".into()),
            tick_ms: Some(0),
            ..Args::default()
        };
        assert_eq!(Config::resolve(args).unwrap().tick, Config::DEFAULT_TICK);
    }
}
