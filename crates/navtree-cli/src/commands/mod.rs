pub mod item;
pub mod navigation;
pub mod taxon;
