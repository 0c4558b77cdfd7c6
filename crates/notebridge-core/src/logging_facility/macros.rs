//! Operation logging macros
//!
//! Each macro takes the operation name first and accepts trailing
//! `tracing` fields after the required ones.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use notebridge_core::log_op_start;
/// log_op_start!("export_jupyter");
/// log_op_start!("export_jupyter", project_id = "p1", notebook_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use notebridge_core::log_op_end;
/// log_op_end!("split_file", duration_ms = 3);
/// log_op_end!("split_file", duration_ms = 3, block_count = 12);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log a failed operation
///
/// `$err` is anything convertible into `ExError`; its kind and stable code
/// are recorded.
///
/// # Example
///
/// ```
/// # use notebridge_core::{log_op_error, errors::NotebridgeError};
/// let err = NotebridgeError::MissingContent { filename: "a.py".to_string() };
/// log_op_error!("detect_format", err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($($field)*)?
        )
    }};
}

/// Log a block that was exported through a degraded path
///
/// Emitted at `warn`; the surrounding operation still succeeds.
///
/// # Example
///
/// ```
/// # use notebridge_core::log_block_fallback;
/// # use notebridge_core::model::{Block, BlockType};
/// let block = Block::new("b1", BlockType::InputSlider, "", "g1", "000000");
/// log_block_fallback!("export_jupyter", block, "no value", "emitting placeholder");
/// ```
#[macro_export]
macro_rules! log_block_fallback {
    ($op:expr, $block:expr, $err:expr, $msg:literal) => {
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_FALLBACK,
            block_id = %$block.id,
            block_type = %$block.block_type,
            error = %$err,
            $msg
        )
    };
}
