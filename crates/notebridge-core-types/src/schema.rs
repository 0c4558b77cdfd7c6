//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_PROJECT_ID: &str = "project_id";
pub const FIELD_NOTEBOOK_ID: &str = "notebook_id";
pub const FIELD_BLOCK_ID: &str = "block_id";
pub const FIELD_BLOCK_TYPE: &str = "block_type";

// Collection sizes
pub const FIELD_NOTEBOOK_COUNT: &str = "notebook_count";
pub const FIELD_BLOCK_COUNT: &str = "block_count";
pub const FIELD_CELL_COUNT: &str = "cell_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
/// A block was exported through a degraded path
pub const EVENT_FALLBACK: &str = "fallback";
