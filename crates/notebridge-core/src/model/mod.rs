//! Shared Project/Notebook/Block/Cell schema
//!
//! Every record is modelled as known fields plus an open extension map, so
//! keys written by other producers survive a parse/serialize round trip.

pub mod block;
pub mod cell;
pub mod file;
pub mod metadata;
pub mod notebook;
pub mod project;

pub use block::{Block, BlockType};
pub use cell::{CellSource, CellType, JupyterCell, JupyterNotebook};
pub use file::{DeepnoteFile, FileMetadata, FILE_VERSION};
pub use metadata::Metadata;
pub use notebook::{ExecutionMode, Notebook};
pub use project::Project;
