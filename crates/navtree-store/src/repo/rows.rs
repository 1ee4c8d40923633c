//! Row <-> model mapping shared by the repositories

use chrono::{DateTime, TimeZone, Utc};
use navtree_core::errors::NavTreeError;
use navtree_core::model::{BuildState, ClosureRecord, Item, Navigation};
use navtree_core::taxonomy::TaxonNode;
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) const ITEM_COLUMNS: &str =
    "id, navigation_id, kind, label, enabled, position, channels, created_at, updated_at";

pub(crate) const NAVIGATION_COLUMNS: &str =
    "id, code, enabled, max_depth, root_item_id, channels, state, created_at, updated_at";

pub(crate) const CLOSURE_COLUMNS: &str = "ancestor_id, descendant_id, depth";

pub(crate) const TAXON_COLUMNS: &str =
    "id, code, name, parent_id, tree_left, tree_right, tree_level, position";

pub(crate) fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let kind: String = row.get(2)?;
    let channels: String = row.get(6)?;
    Ok(Item {
        id: row.get(0)?,
        navigation_id: row.get(1)?,
        kind: from_json(2, &kind)?,
        label: row.get(3)?,
        enabled: row.get(4)?,
        position: row.get(5)?,
        channels: from_json(6, &channels)?,
        created_at: timestamp(7, row.get(7)?)?,
        updated_at: timestamp(8, row.get(8)?)?,
    })
}

pub(crate) fn navigation_from_row(row: &Row<'_>) -> rusqlite::Result<Navigation> {
    let channels: String = row.get(5)?;
    let state: Option<String> = row.get(6)?;
    let state = match state {
        None => None,
        Some(s) => Some(BuildState::parse(&s).ok_or_else(|| {
            conversion_error(
                6,
                NavTreeError::Internal {
                    message: format!("Unknown build state '{}'", s),
                },
            )
        })?),
    };

    Ok(Navigation {
        id: row.get(0)?,
        code: row.get(1)?,
        enabled: row.get(2)?,
        max_depth: row.get(3)?,
        root_item_id: row.get(4)?,
        channels: from_json(5, &channels)?,
        state,
        created_at: timestamp(7, row.get(7)?)?,
        updated_at: timestamp(8, row.get(8)?)?,
    })
}

pub(crate) fn closure_from_row(row: &Row<'_>) -> rusqlite::Result<ClosureRecord> {
    Ok(ClosureRecord {
        ancestor_id: row.get(0)?,
        descendant_id: row.get(1)?,
        depth: row.get(2)?,
    })
}

pub(crate) fn taxon_from_row(row: &Row<'_>) -> rusqlite::Result<TaxonNode> {
    let parent_id: Option<i64> = row.get(3)?;
    Ok(TaxonNode {
        id: row.get::<_, i64>(0)? as u64,
        code: row.get(1)?,
        name: row.get(2)?,
        parent_id: parent_id.map(|p| p as u64),
        left: row.get::<_, i64>(4)? as u64,
        right: row.get::<_, i64>(5)? as u64,
        level: row.get(6)?,
        position: row.get(7)?,
    })
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, NavTreeError> {
    serde_json::to_string(value).map_err(|e| NavTreeError::Serialization {
        message: e.to_string(),
    })
}

fn from_json<T: DeserializeOwned>(idx: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text).map_err(|e| conversion_error(idx, e))
}

fn timestamp(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
