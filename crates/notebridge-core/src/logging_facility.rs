//! Structured logging for conversions and snapshot operations
//!
//! Every public operation brackets its work with `log_op_start!` and
//! `log_op_end!` (or `log_op_error!`), keyed by the constants in
//! [`crate::schema`]. Blocks that export through a placeholder or raw
//! content are reported with `log_block_fallback!` at `warn`.
//!
//! Libraries never install a subscriber themselves; the embedding
//! application calls [`init`] once:
//!
//! ```rust
//! use notebridge_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```
//!
//! Tests install [`TestCapture`] through [`init_test_capture`] instead.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
