//! Notebridge Core - notebook interchange and snapshot engine
//!
//! This crate converts canonical `.deepnote` project files to and from
//! external notebook dialects, including:
//! - The Project/Notebook/Block data model with open extension maps
//! - Format detection for `.ipynb`, `.deepnote`, `.qmd` and `.py` files
//! - Fixed-width sorting keys that order blocks lexicographically
//! - The Block↔Cell mapper with metadata propagation (Jupyter, percent,
//!   marimo and Quarto)
//! - Snapshot split/merge keyed by content hashes
//!
//! Everything here is pure; reading and writing files lives in
//! `notebridge-store`.

pub mod codegen;
pub mod config;
pub mod convert;
pub mod errors;
pub mod format;
pub mod ids;
pub mod logging_facility;
pub mod model;
pub mod snapshot;
pub mod sorting;

pub use notebridge_core_types::schema;

// Re-export commonly used types
pub use codegen::{BlockSourceGenerator, DefaultSourceGenerator};
pub use config::ConvertConfig;
pub use convert::{
    export_jupyter, import_jupyter, parse_jupyter_str, ExportOptions, ExportedNotebook,
    ExportedScript, ImportOptions, NamedNotebook,
};
pub use errors::{ExError, ExErrorKind, NotebridgeError, Result};
pub use format::{detect_format, NotebookFormat};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use model::{Block, BlockType, DeepnoteFile, JupyterCell, JupyterNotebook, Notebook, Project};
pub use snapshot::{
    content_hash, has_outputs, merge_snapshot, slugify_project_name, split_file, MergeOptions,
    MergeOutcome, SplitFile, StalePolicy,
};
pub use sorting::sorting_key_for;
