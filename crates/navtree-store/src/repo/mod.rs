//! SQLite implementations of the core store traits

mod rows;
pub mod sqlite_store;
pub mod taxon_source;

pub use sqlite_store::SqliteStore;
pub use taxon_source::SqliteTaxonSource;
