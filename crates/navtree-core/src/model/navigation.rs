use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State of a navigation undergoing a bulk rebuild
///
/// `None` on the navigation means idle. The state is advisory: it marks a
/// build in progress for collaborators (cache invalidation) but does not lock
/// the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Building,
    Completed,
    Failed,
}

impl BuildState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildState::Building => "building",
            BuildState::Completed => "completed",
            BuildState::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "building" => Some(BuildState::Building),
            "completed" => Some(BuildState::Completed),
            "failed" => Some(BuildState::Failed),
            _ => None,
        }
    }
}

/// A named tree container
///
/// Every navigation owns a hidden root item that is created disabled
/// together with the navigation and never rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub id: String,

    /// Unique, human-chosen code (used as the render cache key)
    pub code: String,

    pub enabled: bool,

    /// Optional limit on rendered levels
    pub max_depth: Option<u32>,

    pub root_item_id: String,

    /// Visibility partitions; empty means visible everywhere
    pub channels: BTreeSet<String>,

    pub state: Option<BuildState>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Navigation {
    pub fn new(id: String, code: String, root_item_id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            code,
            enabled: true,
            max_depth: None,
            root_item_id,
            channels: BTreeSet::new(),
            state: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_building(&self) -> bool {
        self.state == Some(BuildState::Building)
    }

    pub fn is_visible_in(&self, channel: Option<&str>) -> bool {
        match channel {
            Some(c) => self.channels.is_empty() || self.channels.contains(c),
            None => true,
        }
    }

    pub fn set_state(&mut self, state: Option<BuildState>) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_navigation_is_idle() {
        let nav = Navigation::new("n1".to_string(), "main".to_string(), "root".to_string());
        assert!(nav.enabled);
        assert!(nav.state.is_none());
        assert!(!nav.is_building());
    }

    #[test]
    fn test_build_state_round_trips_through_str() {
        for state in [BuildState::Building, BuildState::Completed, BuildState::Failed] {
            assert_eq!(BuildState::parse(state.as_str()), Some(state));
        }
        assert_eq!(BuildState::parse("idle"), None);
    }

    #[test]
    fn test_channel_visibility() {
        let mut nav = Navigation::new("n1".to_string(), "main".to_string(), "root".to_string());
        assert!(nav.is_visible_in(Some("web")));

        nav.channels.insert("shop".to_string());
        assert!(nav.is_visible_in(Some("shop")));
        assert!(!nav.is_visible_in(Some("web")));
        assert!(nav.is_visible_in(None));
    }
}
