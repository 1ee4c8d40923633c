//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_NAVIGATION_ID: &str = "navigation_id";
pub const FIELD_NAVIGATION_CODE: &str = "navigation_code";
pub const FIELD_ITEM_ID: &str = "item_id";
pub const FIELD_PARENT_ID: &str = "parent_id";
pub const FIELD_TAXON_CODE: &str = "taxon_code";

// Collection sizes
pub const FIELD_CLOSURE_COUNT: &str = "closure_count";
pub const FIELD_ITEM_COUNT: &str = "item_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
/// Entity the error is about, empty when none
pub const FIELD_ERR_ENTITY: &str = "err_entity";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
