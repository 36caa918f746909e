use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::isbn::Isbn13;
use crate::models::CatalogEntry;

use super::catalog::Catalog;
use super::csv_file::{read_entries, write_file};

/// The catalog together with the CSV file that backs it. Every mutation is
/// written through before it returns; if the write fails the in-memory change
/// is undone so memory never runs ahead of disk.
///
/// A backing file that exists but fails to load blocks ordinary saves, so
/// rows that were never read cannot be overwritten. Only [`CatalogStore::reset`],
/// [`CatalogStore::import`] or a later successful [`CatalogStore::load`]
/// lift the block.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    catalog: Catalog,
    saves_blocked: bool,
}

impl CatalogStore {
    /// An empty store backed by `path`. Nothing is read or written yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            catalog: Catalog::new(),
            saves_blocked: false,
        }
    }

    /// Create the store and load whatever the backing file holds.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        self.catalog.entries()
    }

    pub fn contains(&self, isbn: &Isbn13) -> bool {
        self.catalog.contains(isbn)
    }

    pub fn get(&self, isbn: &Isbn13) -> Option<&CatalogEntry> {
        self.catalog.get(isbn)
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// False while a failed load keeps the backing file read-only.
    pub fn is_writable(&self) -> bool {
        !self.saves_blocked
    }

    /// Append and persist. Duplicates are rejected before anything is written.
    pub fn add(&mut self, entry: CatalogEntry) -> Result<(), StoreError> {
        let isbn = entry.isbn().clone();
        self.catalog.add(entry)?;
        if let Err(err) = self.persist() {
            warn!(%isbn, error = %err, "rolling back add after failed save");
            self.catalog.remove_last_added(&isbn);
            return Err(err);
        }
        info!(%isbn, count = self.catalog.len(), "added catalog entry");
        Ok(())
    }

    /// Remove and persist, returning the deleted entry.
    pub fn delete(&mut self, isbn: &Isbn13) -> Result<CatalogEntry, StoreError> {
        let (position, entry) = self.catalog.delete(isbn)?;
        if let Err(err) = self.persist() {
            warn!(%isbn, error = %err, "rolling back delete after failed save");
            self.catalog.restore(position, entry);
            return Err(err);
        }
        info!(%isbn, count = self.catalog.len(), "deleted catalog entry");
        Ok(entry)
    }

    /// Start a new, empty catalog and write it out.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.replace_catalog(Catalog::new())?;
        info!(path = %self.path.display(), "started new catalog");
        Ok(())
    }

    /// Overwrite the backing file with the full ordered catalog.
    pub fn persist(&self) -> Result<(), StoreError> {
        if self.saves_blocked {
            return Err(StoreError::NotLoaded(self.path.clone()));
        }
        write_file(&self.path, self.catalog.iter())?;
        debug!(path = %self.path.display(), count = self.catalog.len(), "catalog saved");
        Ok(())
    }

    /// Replace the in-memory catalog with the backing file's rows. A missing
    /// file means a first run and yields an empty catalog. On any other
    /// failure the in-memory catalog is left as it was and saves are blocked
    /// until a load succeeds or the catalog is replaced.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let loaded = match read_entries(&self.path) {
            Ok(entries) => Catalog::from_entries(entries),
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no catalog file yet, starting empty");
                Ok(Catalog::new())
            }
            Err(err) => Err(err),
        };

        match loaded {
            Ok(catalog) => {
                self.catalog = catalog;
                self.saves_blocked = false;
                info!(path = %self.path.display(), count = self.catalog.len(), "catalog loaded");
                Ok(())
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "catalog failed to load, saves blocked");
                self.saves_blocked = true;
                Err(err)
            }
        }
    }

    /// Replace the catalog with the rows of an arbitrary file and save the
    /// result to the backing file. The current catalog is kept if either the
    /// read or the save fails.
    pub fn import(&mut self, source: &Path) -> Result<usize, StoreError> {
        let imported = Catalog::from_entries(read_entries(source)?)?;
        self.replace_catalog(imported)?;
        info!(source = %source.display(), count = self.catalog.len(), "imported catalog");
        Ok(self.catalog.len())
    }

    /// Write the current catalog to an arbitrary file.
    pub fn export(&self, destination: &Path) -> Result<usize, StoreError> {
        write_file(destination, self.catalog.iter())?;
        info!(destination = %destination.display(), count = self.catalog.len(), "exported catalog");
        Ok(self.catalog.len())
    }

    /// Swap in a whole new catalog and write it, even over a file that failed
    /// to load. The previous catalog is restored if the write fails.
    fn replace_catalog(&mut self, catalog: Catalog) -> Result<(), StoreError> {
        let previous = std::mem::replace(&mut self.catalog, catalog);
        if let Err(err) = write_file(&self.path, self.catalog.iter()) {
            self.catalog = previous;
            return Err(err);
        }
        self.saves_blocked = false;
        Ok(())
    }
}
