//! Storage seams for the closure-table engine
//!
//! [`ClosureStore`] is the read side: set-based queries over closure records
//! that never loop per item. [`UnitOfWork`] is the write side: persist,
//! remove, one set-based sibling shift, and `flush` as the commit point.
//! Both the in-memory [`Store`](super::Store) and the SQLite store implement
//! them.

use crate::errors::{NavTreeError, Result};
use crate::model::{ClosureRecord, Item, Navigation};

/// Read-side queries over items, navigations and closure records
pub trait ClosureStore {
    fn get_item(&self, item_id: &str) -> Result<Option<Item>>;

    /// Batch lookup; ids that do not resolve are skipped
    fn get_items(&self, item_ids: &[String]) -> Result<Vec<Item>>;

    fn get_navigation(&self, navigation_id: &str) -> Result<Option<Navigation>>;

    fn get_navigation_by_code(&self, code: &str) -> Result<Option<Navigation>>;

    fn list_navigations(&self) -> Result<Vec<Navigation>>;

    /// All records naming `item_id` as descendant, self-record first
    ///
    /// Ordered by depth, so the result walks from the item up to its root.
    fn find_ancestors(&self, item_id: &str) -> Result<Vec<ClosureRecord>>;

    /// Depth-1 records naming `item_id` as ancestor
    fn find_children(&self, item_id: &str) -> Result<Vec<ClosureRecord>>;

    /// Items of the navigation with no depth>0 record naming them as
    /// descendant, ordered by position then id
    ///
    /// The navigation's hidden root item is never part of the result.
    fn find_root_items(&self, navigation: &Navigation) -> Result<Vec<Item>>;

    /// Every record whose ancestor is `root_id` or one of its descendants
    fn find_graph(&self, root_id: &str) -> Result<Vec<ClosureRecord>>;

    /// Every record whose descendant belongs to the navigation
    fn find_by_navigation(&self, navigation_id: &str) -> Result<Vec<ClosureRecord>>;

    /// Like `get_item` but a missing item is an error
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    fn require_item(&self, item_id: &str) -> Result<Item> {
        self.get_item(item_id)?
            .ok_or_else(|| NavTreeError::ItemNotFound {
                item_id: item_id.to_string(),
            })
    }

    /// Like `get_navigation` but a missing navigation is an error
    ///
    /// # Errors
    ///
    /// Returns `NavigationNotFound` if the navigation does not exist.
    fn require_navigation(&self, navigation_id: &str) -> Result<Navigation> {
        self.get_navigation(navigation_id)?
            .ok_or_else(|| NavTreeError::NavigationNotFound {
                navigation: navigation_id.to_string(),
            })
    }
}

/// Write-side unit of work
///
/// Writes become durable at `flush`. Backends without transactions treat
/// `flush` as a marker.
pub trait UnitOfWork {
    /// Insert or update an item
    fn persist_item(&mut self, item: &Item) -> Result<()>;

    /// Hard-delete an item together with every closure record mentioning it
    fn remove_item(&mut self, item_id: &str) -> Result<()>;

    /// Insert or update a navigation
    fn persist_navigation(&mut self, navigation: &Navigation) -> Result<()>;

    /// Append a closure record (no deduplication)
    fn persist_closure(&mut self, record: &ClosureRecord) -> Result<()>;

    /// Delete every stored record equal to `record`
    fn remove_closure(&mut self, record: &ClosureRecord) -> Result<()>;

    /// Increment the position of every sibling at or after `from_position`
    ///
    /// Siblings are the depth-1 children of `parent_id`, or the root items of
    /// the navigation when `parent_id` is `None`. `exclude_item_id` is left
    /// untouched. Executed as one set-based update; returns the number of
    /// shifted items.
    fn shift_sibling_positions(
        &mut self,
        navigation_id: &str,
        parent_id: Option<&str>,
        from_position: u32,
        exclude_item_id: &str,
    ) -> Result<usize>;

    fn flush(&mut self) -> Result<()>;
}

/// Everything the mutation engine and the bulk builder need
pub trait TreeStore: ClosureStore + UnitOfWork {}

impl<T: ClosureStore + UnitOfWork> TreeStore for T {}
