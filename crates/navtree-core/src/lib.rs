//! NavTree Core - closure-table navigation trees
//!
//! This crate provides the domain model and operations for navigation menus
//! stored as closure tables, including:
//! - Navigation and Item models with a registry of item kinds
//! - Closure store traits and an in-memory store
//! - Tree mutations (create, remove subtree, move) without full recomputation
//! - Bulk materialization of a navigation from a nested-set taxonomy
//! - Graph reconstruction from depth-1 closure records
//! - Markdown menu rendering behind a cache invalidated by change hooks

pub mod config;
pub mod errors;
pub mod graph;
pub mod hooks;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod render;
pub mod taxonomy;

#[doc(hidden)]
pub use navtree_core_types;

// Re-export commonly used types
pub use config::NavTreeConfig;
pub use errors::{ExError, ExErrorKind, NavTreeError, Result};
pub use graph::{build_graph, NavigationGraph};
pub use hooks::{CacheInvalidationHook, NavigationChangeHook, NoopChangeHook};
pub use model::{BuildState, ClosureRecord, Item, ItemKind, Navigation};
pub use ops::builder::build_from_taxon;
pub use ops::{ClosureStore, Store, TreeStore, UnitOfWork};
pub use taxonomy::{NestedSetTaxonomy, TaxonNode, TaxonSource, TaxonTree};
