//! Bulk tree builder
//!
//! Materializes a navigation's whole item tree from a taxonomy subtree with
//! one range query against the source. The navigation moves through
//! `Building` and ends in `Completed` or `Failed`; a failed build leaves its
//! partial tree in place and the next build clears it first.

use std::collections::HashMap;
use std::time::Instant;

use super::closure_ops::{create_item, remove_tree};
use super::closure_store::TreeStore;
use super::navigation_ops::set_navigation_state;
use crate::errors::{NavTreeError, Result};
use crate::hooks::NavigationChangeHook;
use crate::model::{BuildState, ItemFactory, ItemKind, Navigation};
use crate::taxonomy::{TaxonNode, TaxonSource};
use crate::{log_op_end, log_op_error, log_op_start};

/// Rebuild the item tree of a navigation from a taxonomy subtree
///
/// Steps:
/// 1. persist the navigation as `Building`
/// 2. remove every existing root item with [`remove_tree`]
/// 3. fetch the source root and all its descendants in pre-order
/// 4. create one item per node, linked below the item of its parent node
///
/// With `include_root` unset the source root produces no item and its
/// children become root items. `max_depth` caps the levels below the root:
/// the absolute level filter is `root.level + max_depth - 1` when the root
/// is included and `root.level + max_depth` otherwise.
///
/// Items come from `factory`; taxon items get the node code as target. All
/// writes are flushed once after the loop.
///
/// # Errors
/// * `NavigationNotFound` - If the navigation doesn't exist (state untouched)
/// * `BuildFailed` - Any other failure; the navigation is left `Failed`
#[allow(clippy::too_many_arguments)]
pub fn build_from_taxon<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    source: &dyn TaxonSource,
    factory: &dyn ItemFactory,
    navigation_id: &str,
    source_root_code: &str,
    include_root: bool,
    max_depth: Option<u32>,
) -> Result<()> {
    log_op_start!(
        "build_from_taxon",
        navigation_id = %navigation_id,
        taxon_code = %source_root_code,
        include_root = include_root,
        max_depth = ?max_depth
    );
    let start = Instant::now();

    let navigation = store.require_navigation(navigation_id).map_err(|e| {
        log_op_error!(
            "build_from_taxon",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    let outcome = set_navigation_state(store, navigation_id, Some(BuildState::Building))
        .and_then(|building| {
            build_impl(
                store,
                hook,
                source,
                factory,
                &building,
                source_root_code,
                include_root,
                max_depth,
            )
        })
        .and_then(|created| {
            let completed = set_navigation_state(store, navigation_id, Some(BuildState::Completed))?;
            Ok((created, completed))
        });

    match outcome {
        Ok((created, completed)) => {
            hook.on_navigation_changed(&completed);
            log_op_end!(
                "build_from_taxon",
                duration_ms = start.elapsed().as_millis() as u64,
                item_count = created
            );
            Ok(())
        }
        Err(cause) => {
            mark_failed(store, hook, navigation_id);
            let err = NavTreeError::BuildFailed {
                navigation_code: navigation.code,
                cause: Box::new(cause),
            };
            log_op_error!(
                "build_from_taxon",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_impl<S: TreeStore>(
    store: &mut S,
    hook: &dyn NavigationChangeHook,
    source: &dyn TaxonSource,
    factory: &dyn ItemFactory,
    navigation: &Navigation,
    source_root_code: &str,
    include_root: bool,
    max_depth: Option<u32>,
) -> Result<usize> {
    for root in store.find_root_items(navigation)? {
        remove_tree(store, hook, &root.id)?;
    }

    let root = source
        .find_by_code(source_root_code)?
        .ok_or_else(|| NavTreeError::TaxonNotFound {
            taxon_code: source_root_code.to_string(),
        })?;

    let nodes = match level_cap(&root, include_root, max_depth) {
        LevelCap::Nothing => Vec::new(),
        LevelCap::Upto(cap) => source.find_descendants(&root, cap)?,
    };

    // Source node id -> created item id
    let mut mapping: HashMap<u64, String> = HashMap::with_capacity(nodes.len());

    for node in &nodes {
        if node.id == root.id && !include_root {
            continue;
        }

        // The included source root always becomes a root item
        let parent_id = if node.id == root.id { None } else { node.parent_id };

        let parent_item_id = match parent_id {
            None => None,
            Some(parent) if parent == root.id && !include_root => None,
            Some(parent) => match mapping.get(&parent) {
                Some(item_id) => Some(item_id.clone()),
                None => {
                    return Err(NavTreeError::TaxonOrderViolation {
                        taxon_code: node.code.clone(),
                        parent_id: parent.to_string(),
                    })
                }
            },
        };

        let mut item = factory
            .create_new(&navigation.id)
            .with_label(node.name.as_str())
            .with_position(node.position);
        if let ItemKind::Taxon { taxon_code } = &mut item.kind {
            *taxon_code = node.code.clone();
        }

        store.persist_item(&item)?;
        create_item(store, hook, &item, parent_item_id.as_deref())?;
        mapping.insert(node.id, item.id);
    }

    store.flush()?;

    tracing::debug!(
        navigation_code = %navigation.code,
        item_count = mapping.len(),
        "taxonomy materialized"
    );
    Ok(mapping.len())
}

enum LevelCap {
    /// No node passes the filter
    Nothing,
    Upto(Option<u32>),
}

fn level_cap(root: &TaxonNode, include_root: bool, max_depth: Option<u32>) -> LevelCap {
    match (max_depth, include_root) {
        (None, _) => LevelCap::Upto(None),
        (Some(0), true) => LevelCap::Nothing,
        (Some(depth), true) => LevelCap::Upto(Some(root.level.saturating_add(depth - 1))),
        (Some(depth), false) => LevelCap::Upto(Some(root.level.saturating_add(depth))),
    }
}

/// Best effort: the build error is what the caller sees
fn mark_failed<S: TreeStore>(store: &mut S, hook: &dyn NavigationChangeHook, navigation_id: &str) {
    match set_navigation_state(store, navigation_id, Some(BuildState::Failed)) {
        Ok(failed) => hook.on_navigation_changed(&failed),
        Err(e) => tracing::warn!(
            navigation_id,
            error = %e,
            "could not persist failed build state"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{NoopChangeHook, RecordingChangeHook};
    use crate::model::KindItemFactory;
    use crate::ops::navigation_ops::create_navigation;
    use crate::ops::{ClosureStore, Store};
    use crate::taxonomy::{NestedSetTaxonomy, TaxonTree};
    use std::collections::BTreeSet;

    fn taxonomy() -> NestedSetTaxonomy {
        NestedSetTaxonomy::from_tree(
            &TaxonTree::new("root", "Root").with_child(
                TaxonTree::new("a", "A").with_child(TaxonTree::new("b", "B")),
            ),
        )
        .unwrap()
    }

    fn setup() -> (Store, Navigation, KindItemFactory) {
        let mut store = Store::new();
        let factory = KindItemFactory::new(ItemKind::Taxon {
            taxon_code: String::new(),
        });
        let nav = create_navigation(&mut store, &factory, "main", None, BTreeSet::new()).unwrap();
        (store, nav, factory)
    }

    fn labels(store: &Store, nav: &Navigation) -> Vec<String> {
        let mut labels: Vec<String> = store
            .items
            .values()
            .filter(|i| i.navigation_id == nav.id && i.id != nav.root_item_id)
            .map(|i| i.label.clone())
            .collect();
        labels.sort();
        labels
    }

    #[test]
    fn test_level_cap_asymmetry() {
        let root = taxonomy().find_by_code("a").unwrap().unwrap();
        assert!(matches!(
            level_cap(&root, true, Some(2)),
            LevelCap::Upto(Some(2))
        ));
        assert!(matches!(
            level_cap(&root, false, Some(2)),
            LevelCap::Upto(Some(3))
        ));
        assert!(matches!(level_cap(&root, true, Some(0)), LevelCap::Nothing));
        assert!(matches!(level_cap(&root, false, None), LevelCap::Upto(None)));
    }

    #[test]
    fn test_level_cap_saturates_on_huge_depth() {
        let root = taxonomy().find_by_code("a").unwrap().unwrap();
        assert!(matches!(
            level_cap(&root, false, Some(u32::MAX)),
            LevelCap::Upto(Some(u32::MAX))
        ));
        assert!(matches!(
            level_cap(&root, true, Some(u32::MAX)),
            LevelCap::Upto(Some(u32::MAX))
        ));

        let (mut store, nav, factory) = setup();
        build_from_taxon(
            &mut store,
            &NoopChangeHook,
            &taxonomy(),
            &factory,
            &nav.id,
            "a",
            false,
            Some(u32::MAX),
        )
        .unwrap();

        assert_eq!(labels(&store, &nav), vec!["B"]);
    }

    #[test]
    fn test_include_root_makes_source_root_an_item() {
        let (mut store, nav, factory) = setup();

        build_from_taxon(
            &mut store,
            &NoopChangeHook,
            &taxonomy(),
            &factory,
            &nav.id,
            "root",
            true,
            None,
        )
        .unwrap();

        assert_eq!(labels(&store, &nav), vec!["A", "B", "Root"]);
        let roots = store.find_root_items(&nav).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(
            roots[0].kind,
            ItemKind::Taxon {
                taxon_code: "root".to_string()
            }
        );
    }

    #[test]
    fn test_max_depth_one_without_root_keeps_first_level() {
        let (mut store, nav, factory) = setup();

        build_from_taxon(
            &mut store,
            &NoopChangeHook,
            &taxonomy(),
            &factory,
            &nav.id,
            "root",
            false,
            Some(1),
        )
        .unwrap();

        assert_eq!(labels(&store, &nav), vec!["A"]);
    }

    #[test]
    fn test_max_depth_one_with_root_keeps_only_root() {
        let (mut store, nav, factory) = setup();

        build_from_taxon(
            &mut store,
            &NoopChangeHook,
            &taxonomy(),
            &factory,
            &nav.id,
            "root",
            true,
            Some(1),
        )
        .unwrap();

        assert_eq!(labels(&store, &nav), vec!["Root"]);
    }

    #[test]
    fn test_unknown_taxon_marks_failed() {
        let (mut store, nav, factory) = setup();
        let hook = RecordingChangeHook::default();

        let result = build_from_taxon(
            &mut store,
            &hook,
            &taxonomy(),
            &factory,
            &nav.id,
            "missing",
            false,
            None,
        );

        match result {
            Err(NavTreeError::BuildFailed {
                navigation_code,
                cause,
            }) => {
                assert_eq!(navigation_code, "main");
                assert!(matches!(*cause, NavTreeError::TaxonNotFound { .. }));
            }
            other => panic!("expected BuildFailed, got {:?}", other),
        }
        let reloaded = store.require_navigation(&nav.id).unwrap();
        assert_eq!(reloaded.state, Some(BuildState::Failed));
        assert_eq!(hook.codes(), vec!["main".to_string()]);
    }

    #[test]
    fn test_unknown_navigation_is_not_wrapped() {
        let (mut store, _nav, factory) = setup();

        let result = build_from_taxon(
            &mut store,
            &NoopChangeHook,
            &taxonomy(),
            &factory,
            "ghost",
            "root",
            false,
            None,
        );

        assert!(matches!(
            result,
            Err(NavTreeError::NavigationNotFound { .. })
        ));
    }

    #[test]
    fn test_leaf_source_completes_empty() {
        let (mut store, nav, factory) = setup();

        build_from_taxon(
            &mut store,
            &NoopChangeHook,
            &taxonomy(),
            &factory,
            &nav.id,
            "b",
            false,
            None,
        )
        .unwrap();

        assert!(labels(&store, &nav).is_empty());
        let reloaded = store.require_navigation(&nav.id).unwrap();
        assert_eq!(reloaded.state, Some(BuildState::Completed));
    }
}
