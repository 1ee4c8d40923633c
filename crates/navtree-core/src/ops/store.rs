use std::collections::{HashMap, HashSet};

use super::closure_store::{ClosureStore, UnitOfWork};
use crate::errors::Result;
use crate::model::{ClosureRecord, Item, Navigation};

/// In-memory store for items, navigations and closure records
///
/// HashMap-backed implementation of [`ClosureStore`] and [`UnitOfWork`].
/// Writes are visible immediately; `flush` only counts commit points so
/// tests can observe how often an operation flushes.
/// Not thread-safe (no Arc/RwLock) - designed for single-writer use.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub(crate) items: HashMap<String, Item>,
    pub(crate) navigations: HashMap<String, Navigation>,
    /// Closure rows in insertion order; duplicates are kept like a plain table
    pub(crate) closures: Vec<ClosureRecord>,
    flush_count: usize,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `flush` calls so far
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// Every stored closure record
    pub fn closures(&self) -> &[ClosureRecord] {
        &self.closures
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn has_ancestor_above_self(&self, item_id: &str) -> bool {
        self.closures
            .iter()
            .any(|c| c.descendant_id == item_id && c.depth > 0)
    }

    fn root_item_ids(&self, navigation: &Navigation) -> HashSet<String> {
        self.items
            .values()
            .filter(|i| i.navigation_id == navigation.id && i.id != navigation.root_item_id)
            .filter(|i| !self.has_ancestor_above_self(&i.id))
            .map(|i| i.id.clone())
            .collect()
    }
}

impl ClosureStore for Store {
    fn get_item(&self, item_id: &str) -> Result<Option<Item>> {
        Ok(self.items.get(item_id).cloned())
    }

    fn get_items(&self, item_ids: &[String]) -> Result<Vec<Item>> {
        Ok(item_ids
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect())
    }

    fn get_navigation(&self, navigation_id: &str) -> Result<Option<Navigation>> {
        Ok(self.navigations.get(navigation_id).cloned())
    }

    fn get_navigation_by_code(&self, code: &str) -> Result<Option<Navigation>> {
        Ok(self.navigations.values().find(|n| n.code == code).cloned())
    }

    fn list_navigations(&self) -> Result<Vec<Navigation>> {
        let mut navigations: Vec<Navigation> = self.navigations.values().cloned().collect();
        navigations.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(navigations)
    }

    fn find_ancestors(&self, item_id: &str) -> Result<Vec<ClosureRecord>> {
        let mut records: Vec<ClosureRecord> = self
            .closures
            .iter()
            .filter(|c| c.descendant_id == item_id)
            .cloned()
            .collect();
        records.sort_by_key(|c| c.depth);
        Ok(records)
    }

    fn find_children(&self, item_id: &str) -> Result<Vec<ClosureRecord>> {
        Ok(self
            .closures
            .iter()
            .filter(|c| c.ancestor_id == item_id && c.depth == 1)
            .cloned()
            .collect())
    }

    fn find_root_items(&self, navigation: &Navigation) -> Result<Vec<Item>> {
        let root_ids = self.root_item_ids(navigation);
        let mut roots: Vec<Item> = root_ids
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect();
        roots.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Ok(roots)
    }

    fn find_graph(&self, root_id: &str) -> Result<Vec<ClosureRecord>> {
        let subtree: HashSet<&str> = self
            .closures
            .iter()
            .filter(|c| c.ancestor_id == root_id)
            .map(|c| c.descendant_id.as_str())
            .collect();

        Ok(self
            .closures
            .iter()
            .filter(|c| subtree.contains(c.ancestor_id.as_str()))
            .cloned()
            .collect())
    }

    fn find_by_navigation(&self, navigation_id: &str) -> Result<Vec<ClosureRecord>> {
        Ok(self
            .closures
            .iter()
            .filter(|c| {
                self.items
                    .get(&c.descendant_id)
                    .is_some_and(|i| i.navigation_id == navigation_id)
            })
            .cloned()
            .collect())
    }
}

impl UnitOfWork for Store {
    fn persist_item(&mut self, item: &Item) -> Result<()> {
        self.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    fn remove_item(&mut self, item_id: &str) -> Result<()> {
        self.items.remove(item_id);
        self.closures.retain(|c| !c.references(item_id));
        Ok(())
    }

    fn persist_navigation(&mut self, navigation: &Navigation) -> Result<()> {
        self.navigations
            .insert(navigation.id.clone(), navigation.clone());
        Ok(())
    }

    fn persist_closure(&mut self, record: &ClosureRecord) -> Result<()> {
        self.closures.push(record.clone());
        Ok(())
    }

    fn remove_closure(&mut self, record: &ClosureRecord) -> Result<()> {
        self.closures.retain(|c| c != record);
        Ok(())
    }

    fn shift_sibling_positions(
        &mut self,
        navigation_id: &str,
        parent_id: Option<&str>,
        from_position: u32,
        exclude_item_id: &str,
    ) -> Result<usize> {
        let siblings: HashSet<String> = match parent_id {
            Some(parent) => self
                .closures
                .iter()
                .filter(|c| c.ancestor_id == parent && c.depth == 1)
                .map(|c| c.descendant_id.clone())
                .collect(),
            None => match self.navigations.get(navigation_id) {
                Some(navigation) => self.root_item_ids(navigation),
                None => HashSet::new(),
            },
        };

        let mut shifted = 0;
        for item in self.items.values_mut() {
            if item.navigation_id == navigation_id
                && item.id != exclude_item_id
                && item.position >= from_position
                && siblings.contains(&item.id)
            {
                item.position += 1;
                shifted += 1;
            }
        }

        Ok(shifted)
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_count += 1;
        Ok(())
    }
}
