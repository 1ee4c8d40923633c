//! Seed file schema
//!
//! ```yaml
//! schema_version: 0
//! taxonomies:
//!   - code: catalog
//!     name: Catalog
//!     children:
//!       - code: shoes
//!         name: Shoes
//! ```

use navtree_core::taxonomy::TaxonTree;
use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySeed {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Independent taxonomy trees; each replaces the tree with the same root code
    pub taxonomies: Vec<TaxonTree>,
}
