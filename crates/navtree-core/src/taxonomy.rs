//! External taxonomy source addressed by a nested-set encoding
//!
//! Every node carries `left`/`right` bounds and a `level`. All descendants of
//! a node X are the nodes with `X.left <= left && right <= X.right`, so one
//! range query ordered by `left` returns a whole subtree with parents before
//! children.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{NavTreeError, Result};

/// One node of the source taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonNode {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub parent_id: Option<u64>,
    pub left: u64,
    pub right: u64,
    pub level: u32,
    /// Index among siblings
    pub position: u32,
}

/// Accessor for the taxonomy the bulk builder reads from
pub trait TaxonSource {
    fn find_by_code(&self, code: &str) -> Result<Option<TaxonNode>>;

    /// `root` and all of its descendants in pre-order (ascending `left`)
    ///
    /// Nodes deeper than `max_level` (absolute level) are left out.
    fn find_descendants(&self, root: &TaxonNode, max_level: Option<u32>)
        -> Result<Vec<TaxonNode>>;
}

/// Nested taxonomy definition, as written in seed files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonTree {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<TaxonTree>,
}

impl TaxonTree {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: TaxonTree) -> Self {
        self.children.push(child);
        self
    }

    /// Flatten into nested-set nodes in pre-order
    ///
    /// Ids are assigned sequentially from 1 in visiting order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` on an empty or duplicated taxon code.
    pub fn to_nested_set(&self) -> Result<Vec<TaxonNode>> {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        let mut counter = 0;
        flatten(self, None, 0, 0, &mut counter, &mut seen, &mut nodes)?;
        Ok(nodes)
    }
}

fn flatten(
    tree: &TaxonTree,
    parent_id: Option<u64>,
    level: u32,
    position: u32,
    counter: &mut u64,
    seen: &mut HashSet<String>,
    out: &mut Vec<TaxonNode>,
) -> Result<()> {
    if tree.code.trim().is_empty() {
        return Err(NavTreeError::InvalidCode {
            code: tree.code.clone(),
            reason: "Taxon code cannot be empty".to_string(),
        });
    }
    if !seen.insert(tree.code.clone()) {
        return Err(NavTreeError::InvalidCode {
            code: tree.code.clone(),
            reason: "Duplicate taxon code".to_string(),
        });
    }

    *counter += 1;
    let index = out.len();
    let id = index as u64 + 1;
    out.push(TaxonNode {
        id,
        code: tree.code.clone(),
        name: tree.name.clone(),
        parent_id,
        left: *counter,
        right: 0,
        level,
        position,
    });

    for (i, child) in tree.children.iter().enumerate() {
        flatten(child, Some(id), level + 1, i as u32, counter, seen, out)?;
    }

    *counter += 1;
    out[index].right = *counter;
    Ok(())
}

/// In-memory nested-set taxonomy
#[derive(Debug, Clone, Default)]
pub struct NestedSetTaxonomy {
    nodes: Vec<TaxonNode>,
}

impl NestedSetTaxonomy {
    /// # Errors
    ///
    /// Returns `InvalidCode` on an empty or duplicated taxon code.
    pub fn from_tree(tree: &TaxonTree) -> Result<Self> {
        Ok(Self {
            nodes: tree.to_nested_set()?,
        })
    }

    pub fn nodes(&self) -> &[TaxonNode] {
        &self.nodes
    }
}

impl TaxonSource for NestedSetTaxonomy {
    fn find_by_code(&self, code: &str) -> Result<Option<TaxonNode>> {
        Ok(self.nodes.iter().find(|n| n.code == code).cloned())
    }

    fn find_descendants(
        &self,
        root: &TaxonNode,
        max_level: Option<u32>,
    ) -> Result<Vec<TaxonNode>> {
        let mut found: Vec<TaxonNode> = self
            .nodes
            .iter()
            .filter(|n| n.left >= root.left && n.right <= root.right)
            .filter(|n| max_level.map_or(true, |max| n.level <= max))
            .cloned()
            .collect();
        found.sort_by_key(|n| n.left);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TaxonTree {
        TaxonTree::new("root", "Root")
            .with_child(TaxonTree::new("a", "A").with_child(TaxonTree::new("b", "B")))
            .with_child(TaxonTree::new("c", "C"))
    }

    #[test]
    fn test_nested_set_bounds() {
        let nodes = sample().to_nested_set().unwrap();
        let bounds: Vec<(&str, u64, u64, u32)> = nodes
            .iter()
            .map(|n| (n.code.as_str(), n.left, n.right, n.level))
            .collect();

        assert_eq!(
            bounds,
            vec![
                ("root", 1, 8, 0),
                ("a", 2, 5, 1),
                ("b", 3, 4, 2),
                ("c", 6, 7, 1),
            ]
        );
        assert_eq!(nodes[2].parent_id, Some(nodes[1].id));
        assert_eq!(nodes[3].position, 1);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let tree = TaxonTree::new("root", "Root").with_child(TaxonTree::new("root", "Again"));
        assert!(matches!(
            tree.to_nested_set(),
            Err(NavTreeError::InvalidCode { .. })
        ));
    }

    #[test]
    fn test_descendants_in_preorder_with_level_cap() {
        let taxonomy = NestedSetTaxonomy::from_tree(&sample()).unwrap();
        let a = taxonomy.find_by_code("a").unwrap().unwrap();

        let all: Vec<String> = taxonomy
            .find_descendants(&a, None)
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        assert_eq!(all, vec!["a", "b"]);

        let root = taxonomy.find_by_code("root").unwrap().unwrap();
        let capped: Vec<String> = taxonomy
            .find_descendants(&root, Some(1))
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        assert_eq!(capped, vec!["root", "a", "c"]);
    }
}
