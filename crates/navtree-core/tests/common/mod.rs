use std::collections::BTreeSet;

use navtree_core::hooks::NoopChangeHook;
use navtree_core::model::KindItemFactory;
use navtree_core::ops::navigation_ops;
use navtree_core::{ItemKind, Navigation, NestedSetTaxonomy, Store, TaxonTree};

/// Create a new empty Store for testing
#[allow(dead_code)]
pub fn new_store() -> Store {
    Store::new()
}

#[allow(dead_code)]
pub fn text_factory() -> KindItemFactory {
    KindItemFactory::new(ItemKind::Text)
}

#[allow(dead_code)]
pub fn taxon_factory() -> KindItemFactory {
    KindItemFactory::new(ItemKind::Taxon {
        taxon_code: String::new(),
    })
}

/// Create an enabled navigation without depth limit or channels
#[allow(dead_code)]
pub fn create_test_navigation(store: &mut Store, code: &str) -> Navigation {
    navigation_ops::create_navigation(store, &text_factory(), code, None, BTreeSet::new())
        .expect("Should create navigation")
}

/// Add a text item and return its id
#[allow(dead_code)]
pub fn add_test_item(
    store: &mut Store,
    navigation: &Navigation,
    label: &str,
    parent_id: Option<&str>,
    position: u32,
) -> String {
    navigation_ops::add_item(
        store,
        &NoopChangeHook,
        &text_factory(),
        &navigation.id,
        label,
        parent_id,
        position,
    )
    .expect("Should add item")
    .id
}

/// `Root > A > B`
#[allow(dead_code)]
pub fn root_a_b_taxonomy() -> NestedSetTaxonomy {
    NestedSetTaxonomy::from_tree(
        &TaxonTree::new("root", "Root")
            .with_child(TaxonTree::new("a", "A").with_child(TaxonTree::new("b", "B"))),
    )
    .expect("Should build taxonomy")
}

/// Root with two branches, three levels deep
#[allow(dead_code)]
pub fn catalog_taxonomy() -> NestedSetTaxonomy {
    NestedSetTaxonomy::from_tree(
        &TaxonTree::new("catalog", "Catalog")
            .with_child(
                TaxonTree::new("clothing", "Clothing")
                    .with_child(
                        TaxonTree::new("shirts", "Shirts")
                            .with_child(TaxonTree::new("polo", "Polo")),
                    )
                    .with_child(TaxonTree::new("jeans", "Jeans")),
            )
            .with_child(TaxonTree::new("shoes", "Shoes")),
    )
    .expect("Should build taxonomy")
}

/// Label of the item with the given id
#[allow(dead_code)]
pub fn label_of(store: &Store, item_id: &str) -> String {
    use navtree_core::ClosureStore;
    store
        .get_item(item_id)
        .expect("Should read item")
        .expect("Item should exist")
        .label
}
