//! Core types shared across Notebridge crates
//!
//! This crate provides the canonical schema constants used by the
//! structured logging facility in `notebridge-core` and by the IO
//! boundary in `notebridge-store`:
//!
//! - **Field keys**: component, op, event, duration and entity identifiers
//! - **Event names**: start, end, end_error

pub mod schema;
