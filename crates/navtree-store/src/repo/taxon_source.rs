use navtree_core::errors::Result;
use navtree_core::taxonomy::{TaxonNode, TaxonSource};
use rusqlite::{params, Connection, OptionalExtension};

use super::rows::{taxon_from_row, TAXON_COLUMNS};
use crate::errors::store_error;

/// Taxonomy reads on the `taxons` table
///
/// Borrows its own connection so it can be used while a [`SqliteStore`]
/// holds a write transaction on another one.
///
/// [`SqliteStore`]: super::SqliteStore
pub struct SqliteTaxonSource<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTaxonSource<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TaxonSource for SqliteTaxonSource<'_> {
    fn find_by_code(&self, code: &str) -> Result<Option<TaxonNode>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM taxons WHERE code = ?1", TAXON_COLUMNS),
                [code],
                taxon_from_row,
            )
            .optional()
            .map_err(store_error("find_taxon_by_code"))
    }

    fn find_descendants(
        &self,
        root: &TaxonNode,
        max_level: Option<u32>,
    ) -> Result<Vec<TaxonNode>> {
        let op = "find_taxon_descendants";
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM taxons
                 WHERE tree_root = (SELECT tree_root FROM taxons WHERE id = ?1)
                   AND tree_left >= ?2
                   AND tree_right <= ?3
                   AND (?4 IS NULL OR tree_level <= ?4)
                 ORDER BY tree_left",
                TAXON_COLUMNS
            ))
            .map_err(store_error(op))?;

        let nodes = stmt
            .query_map(
                params![root.id as i64, root.left as i64, root.right as i64, max_level],
                taxon_from_row,
            )
            .map_err(store_error(op))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_error(op))?;

        tracing::debug!(
            taxon_code = %root.code,
            count = nodes.len(),
            "taxon range fetched"
        );
        Ok(nodes)
    }
}
