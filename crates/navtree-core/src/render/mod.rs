//! Menu rendering and the render cache

pub mod cache;
pub mod menu_render;
pub mod tree_export;

pub use cache::RenderCache;
pub use menu_render::{render_menu, MenuRenderer};
pub use tree_export::{export_tree, ExportedNode};
