use std::time::Duration;

use moka::sync::Cache;

/// Cache key: navigation code plus optional channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderKey {
    navigation_code: String,
    channel: Option<String>,
}

/// Rendered menus keyed by navigation code and channel
#[derive(Debug, Clone)]
pub struct RenderCache {
    cache: Cache<RenderKey, String>,
}

impl RenderCache {
    pub fn new(max_entries: u64, ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries.max(1))
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();
        Self { cache }
    }

    pub fn get(&self, navigation_code: &str, channel: Option<&str>) -> Option<String> {
        self.cache.get(&key(navigation_code, channel))
    }

    pub fn insert(&self, navigation_code: &str, channel: Option<&str>, rendered: String) {
        self.cache.insert(key(navigation_code, channel), rendered);
    }

    /// Drop every cached rendering of the navigation, whatever the channel
    pub fn invalidate_navigation(&self, navigation_code: &str) {
        let stale: Vec<RenderKey> = self
            .cache
            .iter()
            .filter(|(k, _)| k.navigation_code == navigation_code)
            .map(|(k, _)| (*k).clone())
            .collect();

        for k in &stale {
            self.cache.invalidate(k);
        }

        tracing::debug!(
            navigation_code,
            invalidated = stale.len(),
            "render cache invalidated"
        );
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

fn key(navigation_code: &str, channel: Option<&str>) -> RenderKey {
    RenderKey {
        navigation_code: navigation_code.to_string(),
        channel: channel.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_channel_specific() {
        let cache = RenderCache::new(8, 60);
        cache.insert("main", Some("web"), "web".to_string());
        cache.insert("main", None, "any".to_string());

        assert_eq!(cache.get("main", Some("web")).as_deref(), Some("web"));
        assert_eq!(cache.get("main", None).as_deref(), Some("any"));
        assert!(cache.get("main", Some("app")).is_none());
    }

    #[test]
    fn test_invalidate_navigation_drops_all_channels() {
        let cache = RenderCache::new(8, 60);
        cache.insert("main", Some("web"), "web".to_string());
        cache.insert("main", Some("app"), "app".to_string());

        cache.invalidate_navigation("main");

        assert!(cache.get("main", Some("web")).is_none());
        assert!(cache.get("main", Some("app")).is_none());
    }
}
