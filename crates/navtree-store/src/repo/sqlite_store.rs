//! SQLite closure store
//!
//! Every query is set-based: subtrees, roots and navigation-wide record sets
//! come back from one statement, and sibling shifts are a single `UPDATE`.
//!
//! Writes open a transaction lazily; `flush` commits it. Writes that were
//! never flushed are rolled back when the store is dropped.

use std::path::Path;

use navtree_core::errors::{NavTreeError, Result};
use navtree_core::model::{ClosureRecord, Item, Navigation};
use navtree_core::ops::{ClosureStore, UnitOfWork};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Params};

use super::rows::{
    closure_from_row, item_from_row, navigation_from_row, to_json, CLOSURE_COLUMNS, ITEM_COLUMNS,
    NAVIGATION_COLUMNS,
};
use crate::db;
use crate::errors::store_error;
use crate::migrations::apply_migrations;

/// Upper bound on `IN (...)` placeholders per statement
const MAX_IN_PARAMS: usize = 500;

/// Closure store and unit of work on a SQLite connection
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already configured and migrated connection
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (creating if needed) and migrate the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Ok(Self::new(db::open_migrated(path)?))
    }

    /// Migrated in-memory database
    pub fn open_in_memory() -> crate::Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self::new(conn))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether writes are waiting for `flush`
    pub fn has_pending_writes(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn begin(&self, op: &'static str) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN").map_err(store_error(op))?;
        }
        Ok(())
    }

    fn query_items<P: Params>(&self, op: &'static str, sql: &str, params: P) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql).map_err(store_error(op))?;
        let items = stmt
            .query_map(params, item_from_row)
            .map_err(store_error(op))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_error(op))?;
        Ok(items)
    }

    fn query_closures<P: Params>(
        &self,
        op: &'static str,
        sql: &str,
        params: P,
    ) -> Result<Vec<ClosureRecord>> {
        let mut stmt = self.conn.prepare(sql).map_err(store_error(op))?;
        let records = stmt
            .query_map(params, closure_from_row)
            .map_err(store_error(op))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_error(op))?;
        Ok(records)
    }

    fn query_navigation<P: Params>(
        &self,
        op: &'static str,
        sql: &str,
        params: P,
    ) -> Result<Option<Navigation>> {
        self.conn
            .query_row(sql, params, navigation_from_row)
            .optional()
            .map_err(store_error(op))
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        if !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %e, "rollback of unflushed writes failed");
            } else {
                tracing::debug!("unflushed writes rolled back");
            }
        }
    }
}

impl ClosureStore for SqliteStore {
    fn get_item(&self, item_id: &str) -> Result<Option<Item>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS),
                [item_id],
                item_from_row,
            )
            .optional()
            .map_err(store_error("get_item"))
    }

    fn get_items(&self, item_ids: &[String]) -> Result<Vec<Item>> {
        let mut items = Vec::with_capacity(item_ids.len());
        for chunk in item_ids.chunks(MAX_IN_PARAMS) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT {} FROM items WHERE id IN ({})",
                ITEM_COLUMNS, placeholders
            );
            items.extend(self.query_items("get_items", &sql, params_from_iter(chunk.iter()))?);
        }
        Ok(items)
    }

    fn get_navigation(&self, navigation_id: &str) -> Result<Option<Navigation>> {
        self.query_navigation(
            "get_navigation",
            &format!("SELECT {} FROM navigations WHERE id = ?1", NAVIGATION_COLUMNS),
            [navigation_id],
        )
    }

    fn get_navigation_by_code(&self, code: &str) -> Result<Option<Navigation>> {
        self.query_navigation(
            "get_navigation_by_code",
            &format!("SELECT {} FROM navigations WHERE code = ?1", NAVIGATION_COLUMNS),
            [code],
        )
    }

    fn list_navigations(&self) -> Result<Vec<Navigation>> {
        let op = "list_navigations";
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM navigations ORDER BY code",
                NAVIGATION_COLUMNS
            ))
            .map_err(store_error(op))?;
        let navigations = stmt
            .query_map([], navigation_from_row)
            .map_err(store_error(op))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_error(op))?;
        Ok(navigations)
    }

    fn find_ancestors(&self, item_id: &str) -> Result<Vec<ClosureRecord>> {
        self.query_closures(
            "find_ancestors",
            &format!(
                "SELECT {} FROM item_closures WHERE descendant_id = ?1 ORDER BY depth, id",
                CLOSURE_COLUMNS
            ),
            [item_id],
        )
    }

    fn find_children(&self, item_id: &str) -> Result<Vec<ClosureRecord>> {
        self.query_closures(
            "find_children",
            &format!(
                "SELECT {} FROM item_closures WHERE ancestor_id = ?1 AND depth = 1 ORDER BY id",
                CLOSURE_COLUMNS
            ),
            [item_id],
        )
    }

    fn find_root_items(&self, navigation: &Navigation) -> Result<Vec<Item>> {
        self.query_items(
            "find_root_items",
            &format!(
                "SELECT {} FROM items i
                 WHERE i.navigation_id = ?1
                   AND i.id != ?2
                   AND NOT EXISTS (
                       SELECT 1 FROM item_closures c
                       WHERE c.descendant_id = i.id AND c.depth > 0
                   )
                 ORDER BY i.position, i.id",
                ITEM_COLUMNS
            ),
            params![navigation.id, navigation.root_item_id],
        )
    }

    fn find_graph(&self, root_id: &str) -> Result<Vec<ClosureRecord>> {
        self.query_closures(
            "find_graph",
            &format!(
                "SELECT {} FROM item_closures
                 WHERE ancestor_id IN (
                     SELECT descendant_id FROM item_closures WHERE ancestor_id = ?1
                 )
                 ORDER BY id",
                CLOSURE_COLUMNS
            ),
            [root_id],
        )
    }

    fn find_by_navigation(&self, navigation_id: &str) -> Result<Vec<ClosureRecord>> {
        self.query_closures(
            "find_by_navigation",
            "SELECT c.ancestor_id, c.descendant_id, c.depth
             FROM item_closures c
             JOIN items i ON i.id = c.descendant_id
             WHERE i.navigation_id = ?1
             ORDER BY c.id",
            [navigation_id],
        )
    }
}

impl UnitOfWork for SqliteStore {
    fn persist_item(&mut self, item: &Item) -> Result<()> {
        let op = "persist_item";
        self.begin(op)?;
        self.conn
            .execute(
                "INSERT INTO items (id, navigation_id, item_type, kind, label, enabled, position,
                                    channels, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    navigation_id = excluded.navigation_id,
                    item_type = excluded.item_type,
                    kind = excluded.kind,
                    label = excluded.label,
                    enabled = excluded.enabled,
                    position = excluded.position,
                    channels = excluded.channels,
                    updated_at = excluded.updated_at",
                params![
                    item.id,
                    item.navigation_id,
                    item.kind.type_name(),
                    to_json(&item.kind)?,
                    item.label,
                    item.enabled,
                    item.position,
                    to_json(&item.channels)?,
                    item.created_at.timestamp_millis(),
                    item.updated_at.timestamp_millis(),
                ],
            )
            .map_err(store_error(op))?;
        Ok(())
    }

    fn remove_item(&mut self, item_id: &str) -> Result<()> {
        let op = "remove_item";
        self.begin(op)?;
        self.conn
            .execute(
                "DELETE FROM item_closures WHERE ancestor_id = ?1 OR descendant_id = ?1",
                [item_id],
            )
            .map_err(store_error(op))?;
        self.conn
            .execute("DELETE FROM items WHERE id = ?1", [item_id])
            .map_err(store_error(op))?;
        Ok(())
    }

    fn persist_navigation(&mut self, navigation: &Navigation) -> Result<()> {
        let op = "persist_navigation";
        self.begin(op)?;
        self.conn
            .execute(
                "INSERT INTO navigations (id, code, enabled, max_depth, root_item_id, channels,
                                          state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    code = excluded.code,
                    enabled = excluded.enabled,
                    max_depth = excluded.max_depth,
                    root_item_id = excluded.root_item_id,
                    channels = excluded.channels,
                    state = excluded.state,
                    updated_at = excluded.updated_at",
                params![
                    navigation.id,
                    navigation.code,
                    navigation.enabled,
                    navigation.max_depth,
                    navigation.root_item_id,
                    to_json(&navigation.channels)?,
                    navigation.state.map(|s| s.as_str()),
                    navigation.created_at.timestamp_millis(),
                    navigation.updated_at.timestamp_millis(),
                ],
            )
            .map_err(store_error(op))?;
        Ok(())
    }

    fn persist_closure(&mut self, record: &ClosureRecord) -> Result<()> {
        let op = "persist_closure";
        self.begin(op)?;
        self.conn
            .execute(
                "INSERT INTO item_closures (ancestor_id, descendant_id, depth) VALUES (?1, ?2, ?3)",
                params![record.ancestor_id, record.descendant_id, record.depth],
            )
            .map_err(store_error(op))?;
        Ok(())
    }

    fn remove_closure(&mut self, record: &ClosureRecord) -> Result<()> {
        let op = "remove_closure";
        self.begin(op)?;
        self.conn
            .execute(
                "DELETE FROM item_closures
                 WHERE ancestor_id = ?1 AND descendant_id = ?2 AND depth = ?3",
                params![record.ancestor_id, record.descendant_id, record.depth],
            )
            .map_err(store_error(op))?;
        Ok(())
    }

    fn shift_sibling_positions(
        &mut self,
        navigation_id: &str,
        parent_id: Option<&str>,
        from_position: u32,
        exclude_item_id: &str,
    ) -> Result<usize> {
        let op = "shift_sibling_positions";
        self.begin(op)?;
        let shifted = match parent_id {
            Some(parent) => self.conn.execute(
                "UPDATE items SET position = position + 1
                 WHERE navigation_id = ?1
                   AND id != ?2
                   AND position >= ?3
                   AND id IN (
                       SELECT descendant_id FROM item_closures
                       WHERE ancestor_id = ?4 AND depth = 1
                   )",
                params![navigation_id, exclude_item_id, from_position, parent],
            ),
            None => self.conn.execute(
                "UPDATE items SET position = position + 1
                 WHERE navigation_id = ?1
                   AND id != ?2
                   AND position >= ?3
                   AND id NOT IN (SELECT root_item_id FROM navigations WHERE id = ?1)
                   AND NOT EXISTS (
                       SELECT 1 FROM item_closures c
                       WHERE c.descendant_id = items.id AND c.depth > 0
                   )",
                params![navigation_id, exclude_item_id, from_position],
            ),
        }
        .map_err(store_error(op))?;
        Ok(shifted)
    }

    fn flush(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn
                .execute_batch("COMMIT")
                .map_err(store_error("flush"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_core::model::ItemKind;

    fn seeded() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let nav = Navigation::new("n".to_string(), "main".to_string(), "hidden".to_string());
        let hidden = Item::new("hidden".to_string(), "n".to_string(), ItemKind::Text);
        store.persist_item(&hidden).unwrap();
        store.persist_navigation(&nav).unwrap();
        store.flush().unwrap();
        store
    }

    fn item(id: &str, position: u32) -> Item {
        Item::new(id.to_string(), "n".to_string(), ItemKind::Text).with_position(position)
    }

    #[test]
    fn test_item_round_trip_keeps_kind_and_channels() {
        let mut store = seeded();
        let mut link = Item::new(
            "l".to_string(),
            "n".to_string(),
            ItemKind::Link {
                url: "/docs".to_string(),
            },
        )
        .with_label("Docs")
        .with_position(3);
        link.channels.insert("web".to_string());

        store.persist_item(&link).unwrap();
        store.flush().unwrap();

        let loaded = store.get_item("l").unwrap().unwrap();
        assert_eq!(loaded.kind, link.kind);
        assert_eq!(loaded.channels, link.channels);
        assert_eq!(loaded.position, 3);
        assert_eq!(loaded.label, "Docs");
    }

    #[test]
    fn test_flush_commits_and_drop_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            let nav = Navigation::new("n".to_string(), "main".to_string(), "hidden".to_string());
            store
                .persist_item(&Item::new("hidden".to_string(), "n".to_string(), ItemKind::Text))
                .unwrap();
            store.persist_navigation(&nav).unwrap();
            store.flush().unwrap();

            store.persist_item(&item("unflushed", 0)).unwrap();
            assert!(store.has_pending_writes());
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.get_navigation("n").unwrap().is_some());
        assert!(store.get_item("unflushed").unwrap().is_none());
    }

    #[test]
    fn test_remove_item_drops_its_closures() {
        let mut store = seeded();
        store.persist_item(&item("a", 0)).unwrap();
        store.persist_item(&item("b", 0)).unwrap();
        store.persist_closure(&ClosureRecord::self_relation("a")).unwrap();
        store.persist_closure(&ClosureRecord::self_relation("b")).unwrap();
        store.persist_closure(&ClosureRecord::new("a", "b", 1)).unwrap();

        store.remove_item("b").unwrap();
        store.flush().unwrap();

        assert_eq!(
            store.find_by_navigation("n").unwrap(),
            vec![ClosureRecord::self_relation("a")]
        );
    }

    #[test]
    fn test_duplicate_closures_are_kept() {
        let mut store = seeded();
        store.persist_item(&item("a", 0)).unwrap();
        store.persist_closure(&ClosureRecord::self_relation("a")).unwrap();
        store.persist_closure(&ClosureRecord::self_relation("a")).unwrap();

        assert_eq!(store.find_ancestors("a").unwrap().len(), 2);
    }

    #[test]
    fn test_get_items_spans_chunks() {
        let mut store = seeded();
        let ids: Vec<String> = (0..(MAX_IN_PARAMS + 20)).map(|i| format!("i{}", i)).collect();
        for id in &ids {
            store.persist_item(&item(id, 0)).unwrap();
        }
        store.flush().unwrap();

        assert_eq!(store.get_items(&ids).unwrap().len(), ids.len());
    }

    #[test]
    fn test_shift_at_root_level_skips_hidden_root_and_children() {
        let mut store = seeded();
        for (id, pos) in [("a", 0), ("b", 1), ("c", 0)] {
            store.persist_item(&item(id, pos)).unwrap();
            store.persist_closure(&ClosureRecord::self_relation(id)).unwrap();
        }
        store.persist_closure(&ClosureRecord::new("a", "c", 1)).unwrap();

        let shifted = store.shift_sibling_positions("n", None, 0, "none").unwrap();
        store.flush().unwrap();

        assert_eq!(shifted, 2);
        assert_eq!(store.get_item("a").unwrap().unwrap().position, 1);
        assert_eq!(store.get_item("b").unwrap().unwrap().position, 2);
        assert_eq!(store.get_item("c").unwrap().unwrap().position, 0);
        assert_eq!(store.get_item("hidden").unwrap().unwrap().position, 0);
    }
}
