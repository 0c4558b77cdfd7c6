//! Notebridge Store - filesystem boundary
//!
//! Provides:
//! - Atomic (temp file + rename) writes
//! - Reading and writing canonical `.deepnote` and Jupyter `.ipynb` files
//! - The snapshot directory convention: naming, discovery of the latest
//!   snapshot, and writing split source/snapshot pairs
//! - Configuration file loading

pub mod atomic;
pub mod config;
pub mod errors;
pub mod files;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
