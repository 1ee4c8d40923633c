use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::item_kind::ItemKind;

/// A node in a navigation tree
///
/// Items deliberately have no parent pointer: their position in the tree is
/// derived from closure records only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (UUID v7)
    pub id: String,

    /// Owning navigation
    pub navigation_id: String,

    pub kind: ItemKind,

    pub label: String,

    pub enabled: bool,

    /// Sibling ordering hint
    pub position: u32,

    /// Visibility partitions; empty means visible everywhere
    pub channels: BTreeSet<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: String, navigation_id: String, kind: ItemKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            navigation_id,
            kind,
            label: String::new(),
            enabled: true,
            position: 0,
            channels: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// Whether the item shows up when rendering for `channel`
    ///
    /// `None` renders without a channel filter.
    pub fn is_visible_in(&self, channel: Option<&str>) -> bool {
        match channel {
            Some(c) => self.channels.is_empty() || self.channels.contains(c),
            None => true,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
