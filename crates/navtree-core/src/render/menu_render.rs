//! Markdown rendering of navigation menus
//!
//! Renders one nested list line per visible item:
//!
//! ```text
//! - Home
//!   - [Docs](/docs)
//! - Shop
//! ```

use std::fmt::Write;
use std::sync::Arc;

use super::cache::RenderCache;
use crate::errors::{NavTreeError, Result};
use crate::graph::{build_graph, NavigationGraph, NodeIdx};
use crate::model::{Item, ItemKind, Navigation};
use crate::ops::ClosureStore;

/// Render the menu of a navigation as a Markdown list
///
/// A disabled navigation, or one hidden in `channel`, renders empty.
/// Disabled or channel-hidden items hide their whole subtree. Items at a
/// depth of `max_depth` or deeper are not rendered.
///
/// # Errors
/// * `NavigationNotFound` - If no navigation has the code
/// * `Persistence` - If the store fails
pub fn render_menu<S: ClosureStore>(
    store: &S,
    navigation_code: &str,
    channel: Option<&str>,
) -> Result<String> {
    let navigation = store
        .get_navigation_by_code(navigation_code)?
        .ok_or_else(|| NavTreeError::NavigationNotFound {
            navigation: navigation_code.to_string(),
        })?;

    if !navigation.enabled || !navigation.is_visible_in(channel) {
        return Ok(String::new());
    }

    let graph = build_graph(store, &navigation.id)?;
    let mut out = String::new();
    let mut path = Vec::new();
    for &root in graph.roots() {
        render_node(&graph, &navigation, root, channel, &mut path, &mut out);
    }
    Ok(out)
}

/// `path` holds the nodes above `idx`; a child already on it is not revisited
fn render_node(
    graph: &NavigationGraph,
    navigation: &Navigation,
    idx: NodeIdx,
    channel: Option<&str>,
    path: &mut Vec<NodeIdx>,
    out: &mut String,
) {
    let depth = path.len() as u32;
    if navigation.max_depth.is_some_and(|max| depth >= max) {
        return;
    }
    let item = &graph.node(idx).item;
    if !item.enabled || !item.is_visible_in(channel) {
        return;
    }

    let indent = "  ".repeat(path.len());
    let _ = writeln!(out, "{}- {}", indent, markup(item));

    path.push(idx);
    for &child in graph.children(idx) {
        if !path.contains(&child) {
            render_node(graph, navigation, child, channel, path, out);
        }
    }
    path.pop();
}

fn markup(item: &Item) -> String {
    match &item.kind {
        ItemKind::Link { url } if !url.is_empty() => format!("[{}]({})", item.label, url),
        _ => item.label.clone(),
    }
}

/// Render-through cache in front of [`render_menu`]
#[derive(Debug, Clone)]
pub struct MenuRenderer {
    cache: Arc<RenderCache>,
}

impl MenuRenderer {
    pub fn new(cache: Arc<RenderCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    /// Cached rendering, computed and stored on a miss
    ///
    /// # Errors
    /// Same as [`render_menu`]; failures are not cached.
    pub fn render<S: ClosureStore>(
        &self,
        store: &S,
        navigation_code: &str,
        channel: Option<&str>,
    ) -> Result<String> {
        if let Some(hit) = self.cache.get(navigation_code, channel) {
            tracing::debug!(navigation_code, "render cache hit");
            return Ok(hit);
        }

        let rendered = render_menu(store, navigation_code, channel)?;
        self.cache
            .insert(navigation_code, channel, rendered.clone());
        Ok(rendered)
    }
}
