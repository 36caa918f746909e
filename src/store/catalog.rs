use std::collections::HashSet;

use crate::error::StoreError;
use crate::isbn::Isbn13;
use crate::models::CatalogEntry;

/// Ordered, duplicate-free collection of catalog entries. The vector keeps
/// display order while the set answers membership checks; every mutation
/// updates both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashSet<Isbn13>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from entries in the given order, rejecting repeats.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, StoreError> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.add(entry)?;
        }
        Ok(catalog)
    }

    pub fn contains(&self, isbn: &Isbn13) -> bool {
        self.index.contains(isbn)
    }

    /// Append an entry. A repeated identifier leaves the catalog untouched.
    pub fn add(&mut self, entry: CatalogEntry) -> Result<(), StoreError> {
        if self.contains(entry.isbn()) {
            return Err(StoreError::DuplicateIdentifier(entry.isbn().to_string()));
        }
        self.index.insert(entry.isbn().clone());
        self.entries.push(entry);
        Ok(())
    }

    /// Remove an entry, returning it together with the position it held so a
    /// failed save can put it back.
    pub fn delete(&mut self, isbn: &Isbn13) -> Result<(usize, CatalogEntry), StoreError> {
        let position = self
            .position(isbn)
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))?;
        let entry = self.entries.remove(position);
        self.index.remove(entry.isbn());
        Ok((position, entry))
    }

    /// Put a previously deleted entry back at its old position.
    pub(crate) fn restore(&mut self, position: usize, entry: CatalogEntry) {
        if self.contains(entry.isbn()) {
            return;
        }
        let position = position.min(self.entries.len());
        self.index.insert(entry.isbn().clone());
        self.entries.insert(position, entry);
    }

    /// Undo the most recent append of `isbn`.
    pub(crate) fn remove_last_added(&mut self, isbn: &Isbn13) {
        if self.entries.last().map(|entry| entry.isbn()) == Some(isbn) {
            self.entries.pop();
            self.index.remove(isbn);
        }
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn get(&self, isbn: &Isbn13) -> Option<&CatalogEntry> {
        self.position(isbn).map(|position| &self.entries[position])
    }

    pub fn position(&self, isbn: &Isbn13) -> Option<usize> {
        if !self.contains(isbn) {
            return None;
        }
        self.entries.iter().position(|entry| entry.isbn() == isbn)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
