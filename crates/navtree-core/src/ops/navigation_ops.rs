use std::collections::BTreeSet;
use std::time::Instant;

use uuid::Uuid;

use super::closure_ops::{create_item, notify_navigation};
use super::closure_store::TreeStore;
use crate::errors::{NavTreeError, Result};
use crate::hooks::NavigationChangeHook;
use crate::model::{BuildState, Item, ItemFactory, Navigation};
use crate::{log_op_end, log_op_error, log_op_start};

/// Create a navigation together with its hidden root item
///
/// The root item is produced by `root_factory`, labelled with the code and
/// persisted disabled. It gets no closure records: it is never rendered and
/// never returned as a root item.
///
/// # Errors
/// * `InvalidCode` - If the code is empty or contains whitespace
/// * `NavigationCodeTaken` - If another navigation already uses the code
/// * `Persistence` - If the store fails
pub fn create_navigation<S: TreeStore>(
    store: &mut S,
    root_factory: &dyn ItemFactory,
    code: &str,
    max_depth: Option<u32>,
    channels: BTreeSet<String>,
) -> Result<Navigation> {
    log_op_start!("create_navigation", navigation_code = %code);
    let start = Instant::now();

    let navigation =
        create_navigation_impl(store, root_factory, code, max_depth, channels).map_err(|e| {
            log_op_error!(
                "create_navigation",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "create_navigation",
        duration_ms = start.elapsed().as_millis() as u64,
        navigation_id = %navigation.id
    );
    Ok(navigation)
}

fn create_navigation_impl<S: TreeStore>(
    store: &mut S,
    root_factory: &dyn ItemFactory,
    code: &str,
    max_depth: Option<u32>,
    channels: BTreeSet<String>,
) -> Result<Navigation> {
    validate_code(code)?;
    if store.get_navigation_by_code(code)?.is_some() {
        return Err(NavTreeError::NavigationCodeTaken {
            code: code.to_string(),
        });
    }

    let navigation_id = Uuid::now_v7().to_string();

    let mut root = root_factory.create_new(&navigation_id);
    root.label = code.to_string();
    root.enabled = false;

    let mut navigation = Navigation::new(navigation_id, code.to_string(), root.id.clone());
    navigation.max_depth = max_depth;
    navigation.channels = channels;

    store.persist_item(&root)?;
    store.persist_navigation(&navigation)?;
    store.flush()?;

    Ok(navigation)
}

fn validate_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(NavTreeError::InvalidCode {
            code: code.to_string(),
            reason: "Code cannot be empty or whitespace-only".to_string(),
        });
    }
    if code.chars().any(char::is_whitespace) {
        return Err(NavTreeError::InvalidCode {
            code: code.to_string(),
            reason: "Code cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

/// Create, persist and link a new item in one step
///
/// The item is placed at `position` without shifting existing siblings;
/// use [`move_item`](super::closure_ops::move_item) to insert between them.
///
/// # Errors
/// * `NavigationNotFound` - If the navigation doesn't exist
/// * `ParentNotInTree` - If the parent has no self-relationship record
/// * `Persistence` - If the store fails
pub fn add_item<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    factory: &dyn ItemFactory,
    navigation_id: &str,
    label: &str,
    parent_id: Option<&str>,
    position: u32,
) -> Result<Item> {
    store.require_navigation(navigation_id)?;

    let item = factory
        .create_new(navigation_id)
        .with_label(label)
        .with_position(position);

    store.persist_item(&item)?;
    create_item(store, hook, &item, parent_id)?;
    store.flush()?;

    Ok(item)
}

/// Enable or disable an item; disabled items hide their subtree when rendering
///
/// # Errors
/// * `ItemNotFound` - If the item doesn't exist
/// * `Persistence` - If the store fails
pub fn set_item_enabled<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    item_id: &str,
    enabled: bool,
) -> Result<()> {
    let mut item = store.require_item(item_id)?;
    if item.enabled == enabled {
        return Ok(());
    }

    item.enabled = enabled;
    item.touch();
    store.persist_item(&item)?;
    store.flush()?;

    notify_navigation(store, hook, &item.navigation_id)
}

/// Persist a new build state and flush it immediately
///
/// # Errors
/// * `NavigationNotFound` - If the navigation doesn't exist
/// * `Persistence` - If the store fails
pub fn set_navigation_state<S: TreeStore>(
    store: &mut S,
    navigation_id: &str,
    state: Option<BuildState>,
) -> Result<Navigation> {
    let mut navigation = store.require_navigation(navigation_id)?;
    navigation.set_state(state);
    store.persist_navigation(&navigation)?;
    store.flush()?;

    tracing::debug!(
        navigation_code = %navigation.code,
        state = state.map(|s| s.as_str()).unwrap_or("idle"),
        "navigation state changed"
    );
    Ok(navigation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NoopChangeHook;
    use crate::model::{ItemKind, KindItemFactory};
    use crate::ops::{ClosureStore, Store};

    fn text_factory() -> KindItemFactory {
        KindItemFactory::new(ItemKind::Text)
    }

    #[test]
    fn test_create_navigation_with_hidden_root() {
        let mut store = Store::new();
        let nav =
            create_navigation(&mut store, &text_factory(), "main", Some(3), BTreeSet::new())
                .unwrap();

        let root = store.get_item(&nav.root_item_id).unwrap().unwrap();
        assert!(!root.enabled);
        assert_eq!(root.label, "main");
        assert_eq!(nav.max_depth, Some(3));
        assert!(nav.state.is_none());
        assert!(store.find_root_items(&nav).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut store = Store::new();
        create_navigation(&mut store, &text_factory(), "main", None, BTreeSet::new()).unwrap();

        let result =
            create_navigation(&mut store, &text_factory(), "main", None, BTreeSet::new());
        assert!(matches!(
            result,
            Err(NavTreeError::NavigationCodeTaken { .. })
        ));
    }

    #[test]
    fn test_invalid_code_rejected() {
        let mut store = Store::new();
        for code in ["", "   ", "main menu"] {
            let result =
                create_navigation(&mut store, &text_factory(), code, None, BTreeSet::new());
            assert!(matches!(result, Err(NavTreeError::InvalidCode { .. })));
        }
    }

    #[test]
    fn test_add_item_links_under_parent() {
        let mut store = Store::new();
        let nav =
            create_navigation(&mut store, &text_factory(), "main", None, BTreeSet::new())
                .unwrap();

        let home = add_item(
            &mut store,
            &NoopChangeHook,
            &text_factory(),
            &nav.id,
            "Home",
            None,
            0,
        )
        .unwrap();
        let about = add_item(
            &mut store,
            &NoopChangeHook,
            &text_factory(),
            &nav.id,
            "About",
            Some(home.id.as_str()),
            0,
        )
        .unwrap();

        let children = store.find_children(&home.id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].descendant_id, about.id);
    }

    #[test]
    fn test_set_navigation_state_persists() {
        let mut store = Store::new();
        let nav =
            create_navigation(&mut store, &text_factory(), "main", None, BTreeSet::new())
                .unwrap();

        set_navigation_state(&mut store, &nav.id, Some(BuildState::Building)).unwrap();

        let reloaded = store.require_navigation(&nav.id).unwrap();
        assert!(reloaded.is_building());
    }
}
