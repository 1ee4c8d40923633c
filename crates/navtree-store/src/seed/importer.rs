//! Seed importer orchestration
//!
//! Writes each taxonomy tree as nested-set rows. Importing a tree whose root
//! code already exists replaces that whole tree.

use crate::errors::{from_rusqlite, Result};
use crate::seed::{compute_seed_digest, parse_seed_file};
use navtree_core::errors::ExError;
use navtree_core::taxonomy::TaxonTree;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::HashMap;
use std::path::Path;

/// Outcome of a seed import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub digest: String,
    /// Root codes in file order
    pub roots: Vec<String>,
    pub taxon_count: usize,
}

/// Import a seed file into the database
///
/// This is the main entry point for seed import. It:
/// 1. Parses and validates the seed YAML
/// 2. Computes the seed digest
/// 3. Replaces every tree of the seed within one transaction
/// 4. Records the digest in `seed_imports`
pub fn import_seed(path: &Path, conn: &mut Connection) -> Result<ImportReport> {
    let seed = parse_seed_file(path)?;
    let digest = compute_seed_digest(&seed);

    let tx = conn.transaction().map_err(from_rusqlite)?;

    let mut taxon_count = 0;
    let mut roots = Vec::with_capacity(seed.taxonomies.len());
    for tree in &seed.taxonomies {
        taxon_count += write_tree(&tx, tree)?;
        roots.push(tree.code.clone());
    }

    let now = chrono::Utc::now().timestamp();
    for root in &roots {
        tx.execute(
            "INSERT OR REPLACE INTO seed_imports (digest, root_code, imported_at) VALUES (?1, ?2, ?3)",
            params![digest, root, now],
        )
        .map_err(from_rusqlite)?;
    }

    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(
        digest = %digest,
        taxon_count,
        "taxonomy seed imported"
    );
    Ok(ImportReport {
        digest,
        roots,
        taxon_count,
    })
}

/// Import (or replace) a single taxonomy tree
///
/// Returns the number of taxons written.
pub fn import_taxonomy(conn: &mut Connection, tree: &TaxonTree) -> Result<usize> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    let written = write_tree(&tx, tree)?;
    tx.commit().map_err(from_rusqlite)?;
    Ok(written)
}

fn write_tree(tx: &Transaction<'_>, tree: &TaxonTree) -> Result<usize> {
    let nodes = tree.to_nested_set().map_err(ExError::from)?;

    let existing_root: Option<i64> = tx
        .query_row(
            "SELECT id FROM taxons WHERE code = ?1 AND parent_id IS NULL",
            [&tree.code],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    if let Some(root_id) = existing_root {
        let removed = tx
            .execute(
                "DELETE FROM taxons WHERE tree_root = ?1 OR id = ?1",
                [root_id],
            )
            .map_err(from_rusqlite)?;
        tracing::debug!(taxon_code = %tree.code, removed, "replacing taxonomy");
    }

    // Local nested-set id -> row id
    let mut row_ids: HashMap<u64, i64> = HashMap::with_capacity(nodes.len());
    let mut tree_root: Option<i64> = None;

    for node in &nodes {
        let parent = node.parent_id.and_then(|p| row_ids.get(&p).copied());
        tx.execute(
            "INSERT INTO taxons (code, name, parent_id, tree_root, tree_left, tree_right,
                                 tree_level, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                node.code,
                node.name,
                parent,
                tree_root,
                node.left as i64,
                node.right as i64,
                node.level,
                node.position,
            ],
        )
        .map_err(from_rusqlite)?;

        let row_id = tx.last_insert_rowid();
        if tree_root.is_none() {
            tx.execute(
                "UPDATE taxons SET tree_root = ?1 WHERE id = ?1",
                [row_id],
            )
            .map_err(from_rusqlite)?;
            tree_root = Some(row_id);
        }
        row_ids.insert(node.id, row_id);
    }

    Ok(nodes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::migrations::apply_migrations;

    fn migrated() -> Connection {
        let mut conn = db::open_in_memory().unwrap();
        db::configure(&conn).unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM taxons", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_import_writes_nested_set() {
        let mut conn = migrated();
        let tree = TaxonTree::new("catalog", "Catalog")
            .with_child(TaxonTree::new("shoes", "Shoes"));

        assert_eq!(import_taxonomy(&mut conn, &tree).unwrap(), 2);

        let (left, right, level): (i64, i64, i64) = conn
            .query_row(
                "SELECT tree_left, tree_right, tree_level FROM taxons WHERE code = 'shoes'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((left, right, level), (2, 3, 1));
    }

    #[test]
    fn test_reimport_replaces_tree() {
        let mut conn = migrated();
        let first = TaxonTree::new("catalog", "Catalog")
            .with_child(TaxonTree::new("shoes", "Shoes"))
            .with_child(TaxonTree::new("hats", "Hats"));
        let second =
            TaxonTree::new("catalog", "Catalog").with_child(TaxonTree::new("shoes", "Shoes"));

        import_taxonomy(&mut conn, &first).unwrap();
        import_taxonomy(&mut conn, &second).unwrap();

        assert_eq!(count(&conn), 2);
    }
}
