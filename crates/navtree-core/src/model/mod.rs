pub mod closure;
pub mod item;
pub mod item_kind;
pub mod navigation;

pub use closure::ClosureRecord;
pub use item::Item;
pub use item_kind::{ItemFactory, ItemKind, ItemKindRegistry, KindItemFactory};
pub use navigation::{BuildState, Navigation};
