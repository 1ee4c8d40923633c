//! Runtime configuration
//!
//! Loaded from TOML; every section is optional:
//!
//! ```toml
//! database_path = ".navtree/store.db"
//! logging = "production"
//! item_types = ["text", "link", "taxon"]
//!
//! [render_cache]
//! max_entries = 256
//! ttl_seconds = 300
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{NavTreeError, Result};
use crate::logging_facility::Profile;
use crate::model::{ItemKind, ItemKindRegistry};
use crate::render::RenderCache;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavTreeConfig {
    pub database_path: PathBuf,
    pub logging: Profile,
    /// Item type names registered at startup
    pub item_types: Vec<String>,
    pub render_cache: RenderCacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderCacheConfig {
    pub max_entries: u64,
    pub ttl_seconds: u64,
}

impl Default for NavTreeConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".navtree/store.db"),
            logging: Profile::default(),
            item_types: vec![
                ItemKind::TEXT.to_string(),
                ItemKind::LINK.to_string(),
                ItemKind::TAXON.to_string(),
            ],
            render_cache: RenderCacheConfig::default(),
        }
    }
}

impl Default for RenderCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl_seconds: 300,
        }
    }
}

impl NavTreeConfig {
    /// # Errors
    ///
    /// Returns `Config` if the text is not valid TOML or has unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| NavTreeError::Config {
            message: e.to_string(),
        })
    }

    /// Read the file at `path`, or the defaults if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| NavTreeError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// Returns `UnknownItemType` for a name no factory exists for.
    pub fn item_registry(&self) -> Result<ItemKindRegistry> {
        ItemKindRegistry::from_type_names(self.item_types.as_slice())
    }

    pub fn render_cache(&self) -> RenderCache {
        RenderCache::new(
            self.render_cache.max_entries,
            self.render_cache.ttl_seconds,
        )
    }
}
