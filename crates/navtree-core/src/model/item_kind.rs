use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::item::Item;
use crate::errors::{NavTreeError, Result};

/// Closed set of item variants
///
/// The closure engine never looks at the kind; it only matters to factories
/// and to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Plain label without a target
    Text,
    /// Label pointing at a URL
    Link { url: String },
    /// Item materialized from a taxonomy node
    Taxon { taxon_code: String },
}

impl ItemKind {
    pub const TEXT: &'static str = "text";
    pub const LINK: &'static str = "link";
    pub const TAXON: &'static str = "taxon";

    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::Text => Self::TEXT,
            ItemKind::Link { .. } => Self::LINK,
            ItemKind::Taxon { .. } => Self::TAXON,
        }
    }

    /// Empty template for a registered type name
    pub fn template(type_name: &str) -> Option<Self> {
        match type_name {
            Self::TEXT => Some(ItemKind::Text),
            Self::LINK => Some(ItemKind::Link { url: String::new() }),
            Self::TAXON => Some(ItemKind::Taxon {
                taxon_code: String::new(),
            }),
            _ => None,
        }
    }
}

/// Creates fresh, unpersisted items
///
/// Identities are client-generated, so an item is usable in closure records
/// as soon as it is created.
pub trait ItemFactory: Send + Sync {
    fn type_name(&self) -> &str;

    fn create_new(&self, navigation_id: &str) -> Item;
}

/// Factory stamping items with a fixed kind template
#[derive(Debug, Clone)]
pub struct KindItemFactory {
    template: ItemKind,
}

impl KindItemFactory {
    pub fn new(template: ItemKind) -> Self {
        Self { template }
    }
}

impl ItemFactory for KindItemFactory {
    fn type_name(&self) -> &str {
        self.template.type_name()
    }

    fn create_new(&self, navigation_id: &str) -> Item {
        Item::new(
            Uuid::now_v7().to_string(),
            navigation_id.to_string(),
            self.template.clone(),
        )
    }
}

/// Registry of item factories keyed by type name
///
/// Populated once at startup, usually from the `item_types` configuration
/// list.
#[derive(Default)]
pub struct ItemKindRegistry {
    factories: BTreeMap<String, Box<dyn ItemFactory>>,
}

impl ItemKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in [ItemKind::TEXT, ItemKind::LINK, ItemKind::TAXON] {
            if let Some(template) = ItemKind::template(kind) {
                registry.register(Box::new(KindItemFactory::new(template)));
            }
        }
        registry
    }

    /// Build a registry restricted to the given type names
    ///
    /// # Errors
    ///
    /// Returns `UnknownItemType` for a name that has no built-in kind.
    pub fn from_type_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            let template =
                ItemKind::template(name).ok_or_else(|| NavTreeError::UnknownItemType {
                    type_name: name.to_string(),
                })?;
            registry.register(Box::new(KindItemFactory::new(template)));
        }
        Ok(registry)
    }

    /// Register (or replace) the factory for its type name
    pub fn register(&mut self, factory: Box<dyn ItemFactory>) {
        self.factories
            .insert(factory.type_name().to_string(), factory);
    }

    /// Look up a factory
    ///
    /// # Errors
    ///
    /// Returns `UnknownItemType` if nothing is registered under `type_name`.
    pub fn factory(&self, type_name: &str) -> Result<&dyn ItemFactory> {
        self.factories
            .get(type_name)
            .map(|f| f.as_ref())
            .ok_or_else(|| NavTreeError::UnknownItemType {
                type_name: type_name.to_string(),
            })
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
