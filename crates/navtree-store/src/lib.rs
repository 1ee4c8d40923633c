//! NavTree Store - SQLite persistence for navigation trees
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteStore`, the closure store and unit of work on SQLite
//! - `SqliteTaxonSource`, nested-set taxonomy reads in one range query
//! - Taxonomy seed parser and importer

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod seed;

// Re-export key types
pub use errors::Result;
pub use repo::{SqliteStore, SqliteTaxonSource};
