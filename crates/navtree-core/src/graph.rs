//! Graph reconstruction from closure records
//!
//! The shape of a tree is fully recoverable from its depth-1 records; deeper
//! records only speed up ancestor queries and are ignored here.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::errors::Result;
use crate::model::Item;
use crate::ops::ClosureStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// Index of a node inside its [`NavigationGraph`]
pub type NodeIdx = usize;

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub item: Item,
    parents: Vec<NodeIdx>,
    children: Vec<NodeIdx>,
}

/// Arena of items linked by their depth-1 closure records
#[derive(Debug, Clone, Default)]
pub struct NavigationGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeIdx>,
    roots: Vec<NodeIdx>,
    depths: Vec<OnceCell<u32>>,
}

impl NavigationGraph {
    /// Nodes without a recorded parent, ordered by position then id
    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    pub fn node(&self, idx: NodeIdx) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn find(&self, item_id: &str) -> Option<NodeIdx> {
        self.index.get(item_id).copied()
    }

    /// Children ordered by position then id
    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.nodes[idx].children
    }

    pub fn parents(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.nodes[idx].parents
    }

    /// Structural depth: 0 for a root, else the deepest parent plus one
    ///
    /// Parents already on the walked path are ignored, so corrupt records
    /// that link a node back to itself still yield a finite depth.
    pub fn depth(&self, idx: NodeIdx) -> u32 {
        self.depth_on_path(idx, &mut Vec::new())
    }

    fn depth_on_path(&self, idx: NodeIdx, path: &mut Vec<NodeIdx>) -> u32 {
        if let Some(&depth) = self.depths[idx].get() {
            return depth;
        }
        path.push(idx);
        let mut depth = 0;
        for &parent in &self.nodes[idx].parents {
            if !path.contains(&parent) {
                depth = depth.max(self.depth_on_path(parent, path).saturating_add(1));
            }
        }
        path.pop();
        *self.depths[idx].get_or_init(|| depth)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent/child id pairs, one per linked edge
    pub fn edges(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.children
                    .iter()
                    .map(|&c| (node.item.id.clone(), self.nodes[c].item.id.clone()))
            })
            .collect()
    }

    fn sort_by_position(&self, indices: &mut [NodeIdx]) {
        indices.sort_by(|&a, &b| {
            let (a, b) = (&self.nodes[a].item, &self.nodes[b].item);
            a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id))
        });
    }
}

/// Rebuild the node graph of a navigation
///
/// Records whose items cannot be loaded (removed concurrently) are skipped.
///
/// # Errors
/// * `Persistence` - If the store fails
pub fn build_graph<S: ClosureStore>(store: &S, navigation_id: &str) -> Result<NavigationGraph> {
    log_op_start!("build_graph", navigation_id = %navigation_id);
    let start = Instant::now();

    let graph = build_graph_impl(store, navigation_id).map_err(|e| {
        log_op_error!(
            "build_graph",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "build_graph",
        duration_ms = start.elapsed().as_millis() as u64,
        item_count = graph.len()
    );
    Ok(graph)
}

fn build_graph_impl<S: ClosureStore>(store: &S, navigation_id: &str) -> Result<NavigationGraph> {
    let records = store.find_by_navigation(navigation_id)?;

    let mut seen = HashSet::new();
    let descendant_ids: Vec<String> = records
        .iter()
        .filter(|r| seen.insert(r.descendant_id.as_str()))
        .map(|r| r.descendant_id.clone())
        .collect();

    let mut graph = NavigationGraph::default();
    for item in store.get_items(&descendant_ids)? {
        if graph.index.contains_key(&item.id) {
            continue;
        }
        graph.index.insert(item.id.clone(), graph.nodes.len());
        graph.nodes.push(GraphNode {
            item,
            parents: Vec::new(),
            children: Vec::new(),
        });
    }

    let mut linked = HashSet::new();
    for record in records.iter().filter(|r| r.is_edge()) {
        let (Some(&parent), Some(&child)) = (
            graph.index.get(&record.ancestor_id),
            graph.index.get(&record.descendant_id),
        ) else {
            tracing::debug!(
                ancestor_id = %record.ancestor_id,
                descendant_id = %record.descendant_id,
                "skipping unresolved closure record"
            );
            continue;
        };
        if linked.insert((parent, child)) {
            graph.nodes[parent].children.push(child);
            graph.nodes[child].parents.push(parent);
        }
    }

    for idx in 0..graph.nodes.len() {
        let mut children = std::mem::take(&mut graph.nodes[idx].children);
        graph.sort_by_position(&mut children);
        graph.nodes[idx].children = children;
    }

    let mut roots: Vec<NodeIdx> = (0..graph.nodes.len())
        .filter(|&i| graph.nodes[i].parents.is_empty())
        .collect();
    graph.sort_by_position(&mut roots);
    graph.roots = roots;
    graph.depths = vec![OnceCell::new(); graph.nodes.len()];

    Ok(graph)
}
