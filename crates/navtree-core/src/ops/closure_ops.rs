//! Tree mutation engine
//!
//! Creates, removes and moves items by inserting and deleting closure
//! records. No operation recomputes the whole tree: creating an item costs
//! O(depth of parent) writes, removing a subtree touches only its sub-graph.
//!
//! Every operation:
//! - logs `start` / `end` / `end_error` through the logging facility
//! - notifies the [`NavigationChangeHook`] with the owning navigation
//!
//! Callers must serialize structural mutations of one navigation; the
//! engine takes no locks.

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use super::closure_store::TreeStore;
use crate::errors::{NavTreeError, Result};
use crate::hooks::NavigationChangeHook;
use crate::model::{ClosureRecord, Item};
use crate::{log_op_end, log_op_error, log_op_start};

/// Insert the closure records of a freshly persisted item
///
/// Writes the self-relationship and, when `parent_id` is given, one record
/// `(A, item, d + 1)` for every ancestor record `(A, parent, d)` of the
/// parent (its own self-record included). Existing records of other items
/// are not touched and sibling positions are not changed.
///
/// Calling this twice for the same item writes duplicate rows.
///
/// # Errors
/// * `ParentNotInTree` - If the parent has no self-relationship record
/// * `Persistence` - If the store fails
pub fn create_item<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    item: &Item,
    parent_id: Option<&str>,
) -> Result<()> {
    log_op_start!("create_item", item_id = %item.id, parent_id = ?parent_id);
    let start = Instant::now();

    let written = create_item_impl(store, hook, item, parent_id).map_err(|e| {
        log_op_error!(
            "create_item",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "create_item",
        duration_ms = start.elapsed().as_millis() as u64,
        closure_count = written
    );
    Ok(())
}

fn create_item_impl<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    item: &Item,
    parent_id: Option<&str>,
) -> Result<usize> {
    let mut records = vec![ClosureRecord::self_relation(item.id.as_str())];
    if let Some(parent) = parent_id {
        records.extend(ancestor_links(store, &item.id, parent)?);
    }

    for record in &records {
        store.persist_closure(record)?;
    }

    notify_navigation(store, hook, &item.navigation_id)?;
    Ok(records.len())
}

/// Hard-delete an item and its whole subtree
///
/// Fetches the sub-graph of `root_id`, then deletes every item referenced in
/// it and every closure record of it. Records linking the subtree to
/// ancestors above `root_id` go too. Calling this on an already removed
/// root is a no-op.
///
/// # Errors
/// * `Persistence` - If the store fails
pub fn remove_tree<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    root_id: &str,
) -> Result<()> {
    log_op_start!("remove_tree", item_id = %root_id);
    let start = Instant::now();

    let removed = remove_tree_impl(store, hook, root_id).map_err(|e| {
        log_op_error!(
            "remove_tree",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "remove_tree",
        duration_ms = start.elapsed().as_millis() as u64,
        item_count = removed
    );
    Ok(())
}

fn remove_tree_impl<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    root_id: &str,
) -> Result<usize> {
    let graph = store.find_graph(root_id)?;
    if graph.is_empty() {
        tracing::debug!(item_id = %root_id, "empty sub-graph, nothing to remove");
        return Ok(0);
    }

    // Resolve the owning navigation before its items disappear
    let navigation_id = store.get_item(root_id)?.map(|i| i.navigation_id);

    let item_ids: BTreeSet<&str> = graph
        .iter()
        .flat_map(|c| [c.ancestor_id.as_str(), c.descendant_id.as_str()])
        .collect();

    for record in &graph {
        store.remove_closure(record)?;
    }
    for item_id in &item_ids {
        store.remove_item(item_id)?;
    }

    if let Some(navigation_id) = navigation_id {
        notify_navigation(store, hook, &navigation_id)?;
    }
    Ok(item_ids.len())
}

/// Re-parent an item and place it at `position` among its new siblings
///
/// Phase one drops every ancestor record of the item with depth > 0 (the
/// self-record stays) and links it below `new_parent_id` the same way
/// `create_item` does; `None` makes the item a root. Phase two sets the
/// item's position and shifts every new sibling at or after `position` by
/// one, in a single set-based update.
///
/// The item's own descendants are NOT relinked: their records to ancestors
/// above the item still point at the old location. Descendant checks
/// therefore climb the depth-1 records from the new parent.
///
/// # Errors
/// * `ItemNotFound` - If the item doesn't exist
/// * `ParentNotInTree` - If the new parent has no self-relationship record
/// * `CycleDetected` - If the new parent is the item or one of its descendants
/// * `Persistence` - If the store fails
pub fn move_item<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    item_id: &str,
    new_parent_id: Option<&str>,
    position: u32,
) -> Result<()> {
    log_op_start!(
        "move_item",
        item_id = %item_id,
        parent_id = ?new_parent_id,
        position = position
    );
    let start = Instant::now();

    let shifted = move_item_impl(store, hook, item_id, new_parent_id, position).map_err(|e| {
        log_op_error!(
            "move_item",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "move_item",
        duration_ms = start.elapsed().as_millis() as u64,
        shifted = shifted
    );
    Ok(())
}

fn move_item_impl<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    item_id: &str,
    new_parent_id: Option<&str>,
    position: u32,
) -> Result<usize> {
    let mut item = store.require_item(item_id)?;

    // Validate before touching anything so a rejected move leaves no trace
    let new_links = match new_parent_id {
        Some(parent) => {
            if has_edge_ancestor(store, parent, item_id)? {
                return Err(NavTreeError::CycleDetected {
                    item_id: item_id.to_string(),
                    parent_id: parent.to_string(),
                });
            }
            ancestor_links(store, item_id, parent)?
        }
        None => Vec::new(),
    };

    for record in store.find_ancestors(item_id)? {
        if record.depth > 0 {
            store.remove_closure(&record)?;
        }
    }
    for record in &new_links {
        store.persist_closure(record)?;
    }

    item.position = position;
    item.touch();
    store.persist_item(&item)?;

    let shifted =
        store.shift_sibling_positions(&item.navigation_id, new_parent_id, position, item_id)?;

    notify_navigation(store, hook, &item.navigation_id)?;
    Ok(shifted)
}

/// Records linking `item_id` below every ancestor of `parent_id`
fn ancestor_links<S: TreeStore>(
    store: &S,
    item_id: &str,
    parent_id: &str,
) -> Result<Vec<ClosureRecord>> {
    let parent_chain = store.find_ancestors(parent_id)?;

    if !parent_chain.iter().any(ClosureRecord::is_self) {
        return Err(NavTreeError::ParentNotInTree {
            parent_id: parent_id.to_string(),
        });
    }
    if parent_chain.iter().any(|c| c.ancestor_id == item_id) {
        return Err(NavTreeError::CycleDetected {
            item_id: item_id.to_string(),
            parent_id: parent_id.to_string(),
        });
    }

    Ok(parent_chain
        .iter()
        .map(|c| ClosureRecord::new(c.ancestor_id.as_str(), item_id, c.depth + 1))
        .collect())
}

/// Whether `ancestor_id` is reachable from `item_id` by climbing depth-1 records
///
/// Deeper records can be stale after a move, so only direct parent links
/// are trusted here.
fn has_edge_ancestor<S: TreeStore>(store: &S, item_id: &str, ancestor_id: &str) -> Result<bool> {
    let mut visited = HashSet::new();
    let mut pending = vec![item_id.to_string()];

    while let Some(current) = pending.pop() {
        if current == ancestor_id {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        pending.extend(
            store
                .find_ancestors(&current)?
                .into_iter()
                .filter(ClosureRecord::is_edge)
                .map(|record| record.ancestor_id),
        );
    }
    Ok(false)
}

/// Report a content change of the navigation to the hook
pub(crate) fn notify_navigation<S: TreeStore>(
    store: &S,
    hook: &dyn NavigationChangeHook,
    navigation_id: &str,
) -> Result<()> {
    match store.get_navigation(navigation_id)? {
        Some(navigation) => hook.on_navigation_changed(&navigation),
        None => tracing::debug!(navigation_id, "no navigation to notify"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{NoopChangeHook, RecordingChangeHook};
    use crate::model::ItemKind;
    use crate::ops::{ClosureStore, Store, UnitOfWork};

    fn persist(store: &mut Store, id: &str) -> Item {
        let item = Item::new(id.to_string(), "nav".to_string(), ItemKind::Text);
        store.persist_item(&item).unwrap();
        item
    }

    #[test]
    fn test_create_root_writes_only_self_record() {
        let mut store = Store::new();
        let a = persist(&mut store, "a");

        create_item(&mut store, &NoopChangeHook, &a, None).unwrap();

        assert_eq!(store.closures(), &[ClosureRecord::self_relation("a")]);
    }

    #[test]
    fn test_create_under_parent_copies_parent_chain() {
        let mut store = Store::new();
        let a = persist(&mut store, "a");
        let b = persist(&mut store, "b");
        let c = persist(&mut store, "c");

        create_item(&mut store, &NoopChangeHook, &a, None).unwrap();
        create_item(&mut store, &NoopChangeHook, &b, Some("a")).unwrap();
        create_item(&mut store, &NoopChangeHook, &c, Some("b")).unwrap();

        let ancestors = store.find_ancestors("c").unwrap();
        assert_eq!(
            ancestors,
            vec![
                ClosureRecord::self_relation("c"),
                ClosureRecord::new("b", "c", 1),
                ClosureRecord::new("a", "c", 2),
            ]
        );
    }

    #[test]
    fn test_create_with_unknown_parent_fails() {
        let mut store = Store::new();
        let a = persist(&mut store, "a");

        let result = create_item(&mut store, &NoopChangeHook, &a, Some("ghost"));

        assert!(matches!(result, Err(NavTreeError::ParentNotInTree { .. })));
        assert!(store.closures().is_empty());
    }

    #[test]
    fn test_remove_tree_on_missing_root_is_noop() {
        let mut store = Store::new();
        let hook = RecordingChangeHook::default();

        remove_tree(&mut store, &hook, "ghost").unwrap();

        assert!(hook.codes().is_empty());
    }

    #[test]
    fn test_move_under_own_descendant_is_rejected() {
        let mut store = Store::new();
        let a = persist(&mut store, "a");
        let b = persist(&mut store, "b");
        create_item(&mut store, &NoopChangeHook, &a, None).unwrap();
        create_item(&mut store, &NoopChangeHook, &b, Some("a")).unwrap();
        let before = store.closures().to_vec();

        let result = move_item(&mut store, &NoopChangeHook, "a", Some("b"), 0);

        assert!(matches!(result, Err(NavTreeError::CycleDetected { .. })));
        assert_eq!(store.closures(), before.as_slice());
    }

    #[test]
    fn test_move_under_itself_is_rejected() {
        let mut store = Store::new();
        let a = persist(&mut store, "a");
        create_item(&mut store, &NoopChangeHook, &a, None).unwrap();

        let result = move_item(&mut store, &NoopChangeHook, "a", Some("a"), 0);

        assert!(matches!(result, Err(NavTreeError::CycleDetected { .. })));
    }

    #[test]
    fn test_move_under_grandchild_with_stale_links_is_rejected() {
        let mut store = Store::new();
        let a = persist(&mut store, "a");
        let b = persist(&mut store, "b");
        let c = persist(&mut store, "c");
        create_item(&mut store, &NoopChangeHook, &a, None).unwrap();
        create_item(&mut store, &NoopChangeHook, &b, None).unwrap();
        create_item(&mut store, &NoopChangeHook, &c, Some("b")).unwrap();
        move_item(&mut store, &NoopChangeHook, "b", Some("a"), 0).unwrap();
        let before = store.closures().to_vec();

        let result = move_item(&mut store, &NoopChangeHook, "a", Some("c"), 0);

        assert!(matches!(result, Err(NavTreeError::CycleDetected { .. })));
        assert_eq!(store.closures(), before.as_slice());
    }
}
