use serde::{Deserialize, Serialize};

/// A single (ancestor, descendant, depth) relationship
///
/// Depth 0 is the self-relationship (ancestor == descendant), depth 1 a
/// direct parent-child edge, depth N a transitive link N hops away. Tree
/// shape lives exclusively in these records; items carry no parent pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub ancestor_id: String,
    pub descendant_id: String,
    pub depth: u32,
}

impl ClosureRecord {
    pub fn new(ancestor_id: impl Into<String>, descendant_id: impl Into<String>, depth: u32) -> Self {
        Self {
            ancestor_id: ancestor_id.into(),
            descendant_id: descendant_id.into(),
            depth,
        }
    }

    /// The depth-0 record marking an item's existence in the closure table
    pub fn self_relation(item_id: impl Into<String>) -> Self {
        let id = item_id.into();
        Self {
            ancestor_id: id.clone(),
            descendant_id: id,
            depth: 0,
        }
    }

    pub fn is_self(&self) -> bool {
        self.depth == 0 && self.ancestor_id == self.descendant_id
    }

    /// Direct parent-child edge
    pub fn is_edge(&self) -> bool {
        self.depth == 1
    }

    /// Whether this record mentions the item on either side
    pub fn references(&self, item_id: &str) -> bool {
        self.ancestor_id == item_id || self.descendant_id == item_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_relation() {
        let rec = ClosureRecord::self_relation("a");
        assert!(rec.is_self());
        assert!(!rec.is_edge());
        assert_eq!(rec.depth, 0);
    }

    #[test]
    fn test_edge_and_references() {
        let rec = ClosureRecord::new("a", "b", 1);
        assert!(rec.is_edge());
        assert!(!rec.is_self());
        assert!(rec.references("a"));
        assert!(rec.references("b"));
        assert!(!rec.references("c"));
    }
}
