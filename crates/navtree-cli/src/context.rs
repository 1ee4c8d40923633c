//! Per-invocation state shared by the commands

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use navtree_core::hooks::CacheInvalidationHook;
use navtree_core::model::ItemKindRegistry;
use navtree_core::render::{MenuRenderer, RenderCache};
use navtree_core::{ClosureStore, NavTreeConfig, NavTreeError, Navigation};
use navtree_store::SqliteStore;

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// State of one CLI invocation
///
/// The render cache lives only as long as this process. Every command
/// starts cold, so `render` always reads the store; the hook and the
/// renderer share the cache only within the one run. Keeping renders warm
/// across calls is up to library users holding a long-lived `MenuRenderer`.
pub struct Context {
    pub config: NavTreeConfig,
    pub db_path: PathBuf,
    cache: Arc<RenderCache>,
}

impl Context {
    pub fn load(config_path: &Path, db: Option<PathBuf>) -> CliResult<Self> {
        let config = NavTreeConfig::load(config_path)?;
        let db_path = db.unwrap_or_else(|| config.database_path.clone());
        let cache = Arc::new(config.render_cache());
        Ok(Self {
            config,
            db_path,
            cache,
        })
    }

    pub fn open_store(&self) -> CliResult<SqliteStore> {
        Ok(SqliteStore::open(&self.db_path)?)
    }

    /// Second connection for taxonomy reads during a build
    pub fn open_connection(&self) -> CliResult<rusqlite::Connection> {
        Ok(navtree_store::db::open_migrated(&self.db_path)?)
    }

    pub fn registry(&self) -> CliResult<ItemKindRegistry> {
        Ok(self.config.item_registry()?)
    }

    pub fn hook(&self) -> CacheInvalidationHook {
        CacheInvalidationHook::new(Arc::clone(&self.cache))
    }

    pub fn renderer(&self) -> MenuRenderer {
        MenuRenderer::new(Arc::clone(&self.cache))
    }
}

pub fn navigation_by_code(store: &SqliteStore, code: &str) -> CliResult<Navigation> {
    store.get_navigation_by_code(code)?.ok_or_else(|| {
        NavTreeError::NavigationNotFound {
            navigation: code.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_cache_is_scoped_to_one_context() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("navtree.toml");
        let db = Some(dir.path().join("nav.db"));

        let ctx = Context::load(&config_path, db.clone()).unwrap();
        ctx.renderer()
            .cache()
            .insert("main", None, "- Home\n".to_string());
        assert_eq!(
            ctx.renderer().cache().get("main", None).as_deref(),
            Some("- Home\n")
        );

        let next_run = Context::load(&config_path, db).unwrap();
        assert_eq!(next_run.renderer().cache().get("main", None), None);
    }
}
