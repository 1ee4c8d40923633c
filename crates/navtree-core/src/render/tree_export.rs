use serde::Serialize;

use crate::errors::Result;
use crate::graph::{build_graph, NavigationGraph, NodeIdx};
use crate::model::ItemKind;
use crate::ops::ClosureStore;

/// Serializable snapshot of one item and its subtree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedNode {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ItemKind,
    pub enabled: bool,
    pub position: u32,
    pub depth: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportedNode>,
}

/// Whole item tree of a navigation, disabled items included
///
/// # Errors
/// * `Persistence` - If the store fails
pub fn export_tree<S: ClosureStore>(store: &S, navigation_id: &str) -> Result<Vec<ExportedNode>> {
    let graph = build_graph(store, navigation_id)?;
    Ok(graph
        .roots()
        .iter()
        .map(|&root| export_node(&graph, root, &mut Vec::new()))
        .collect())
}

/// Children already on `path` are left out so a looping record set stays finite
fn export_node(graph: &NavigationGraph, idx: NodeIdx, path: &mut Vec<NodeIdx>) -> ExportedNode {
    path.push(idx);
    let mut children = Vec::new();
    for &child in graph.children(idx) {
        if !path.contains(&child) {
            children.push(export_node(graph, child, path));
        }
    }
    path.pop();

    let item = &graph.node(idx).item;
    ExportedNode {
        id: item.id.clone(),
        label: item.label.clone(),
        kind: item.kind.clone(),
        enabled: item.enabled,
        position: item.position,
        depth: graph.depth(idx),
        children,
    }
}
