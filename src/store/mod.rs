//! Catalog persistence split across logical submodules: the in-memory ordered
//! catalog, the CSV row codec, and the store that ties the two together.

mod catalog;
mod catalog_store;
mod csv_file;

pub use catalog::Catalog;
pub use catalog_store::CatalogStore;
pub use csv_file::{read_entries, write_entries, write_file, COLUMNS};
