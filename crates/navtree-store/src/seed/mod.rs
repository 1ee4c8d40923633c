//! Taxonomy seed import
//!
//! Provides:
//! - Seed file schema (YAML)
//! - Parser with validation
//! - Digest canonicalization
//! - Importer writing nested-set rows

pub mod digest;
pub mod format;
pub mod importer;
pub mod parser;

pub use digest::compute_seed_digest;
pub use format::TaxonomySeed;
pub use importer::{import_seed, import_taxonomy, ImportReport};
pub use parser::{parse_seed_file, parse_seed_str};
