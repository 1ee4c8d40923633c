pub mod builder;
pub mod closure_ops;
pub mod closure_store;
pub mod navigation_ops;
pub mod store;

pub use closure_store::{ClosureStore, TreeStore, UnitOfWork};
pub use store::Store;
