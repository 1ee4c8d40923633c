//! Navigation change hooks
//!
//! Tree mutations report "navigation content changed" through
//! [`NavigationChangeHook`]. What happens next (cache invalidation, search
//! reindexing) is up to the collaborator that implements the hook.

use std::sync::{Arc, Mutex};

use crate::model::Navigation;
use crate::render::cache::RenderCache;

/// Receiver of navigation change notifications
///
/// Called after every structural mutation with the navigation as currently
/// persisted, so implementations can inspect its build state.
pub trait NavigationChangeHook {
    fn on_navigation_changed(&self, navigation: &Navigation);
}

/// Hook that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangeHook;

impl NavigationChangeHook for NoopChangeHook {
    fn on_navigation_changed(&self, _navigation: &Navigation) {}
}

/// Hook that remembers the codes it was notified about
///
/// ```
/// use navtree_core::hooks::{NavigationChangeHook, RecordingChangeHook};
/// use navtree_core::model::Navigation;
///
/// let hook = RecordingChangeHook::default();
/// let nav = Navigation::new("n1".into(), "main".into(), "root".into());
/// hook.on_navigation_changed(&nav);
/// assert_eq!(hook.codes(), vec!["main".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingChangeHook {
    codes: Arc<Mutex<Vec<String>>>,
}

impl RecordingChangeHook {
    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.clear();
        }
    }
}

impl NavigationChangeHook for RecordingChangeHook {
    fn on_navigation_changed(&self, navigation: &Navigation) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.push(navigation.code.clone());
        }
    }
}

/// Drops rendered menus of a navigation when its content changes
///
/// Notifications arriving while the navigation is `Building` are skipped;
/// the bulk builder notifies once more at its terminal state.
#[derive(Debug, Clone)]
pub struct CacheInvalidationHook {
    cache: Arc<RenderCache>,
}

impl CacheInvalidationHook {
    pub fn new(cache: Arc<RenderCache>) -> Self {
        Self { cache }
    }
}

impl NavigationChangeHook for CacheInvalidationHook {
    fn on_navigation_changed(&self, navigation: &Navigation) {
        if navigation.is_building() {
            tracing::debug!(
                navigation_code = %navigation.code,
                "skipping cache invalidation while building"
            );
            return;
        }
        self.cache.invalidate_navigation(&navigation.code);
    }
}
