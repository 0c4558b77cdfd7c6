//! Source and markdown generation for non-trivial block types.
//!
//! Jupyter and the script dialects only know code and markdown. Blocks such
//! as SQL queries or input widgets are exported as equivalent Python, and
//! rich text blocks as plain markdown. The mapper treats every failure here
//! as local to one block.

pub mod markdown;
pub mod python;

use crate::errors::{NotebridgeError, Result};
use crate::model::Block;

/// Generates external text for blocks that are not plain code or markdown
pub trait BlockSourceGenerator {
    /// Runnable Python equivalent of an executable block
    ///
    /// # Errors
    ///
    /// Returns `NotebridgeError::SourceGeneration` when the block lacks the
    /// metadata needed to produce source.
    fn source_code_for(&self, block: &Block) -> Result<String>;

    /// Display text for a presentational block
    ///
    /// # Errors
    ///
    /// Returns `NotebridgeError::SourceGeneration` when the block cannot be
    /// rendered; callers fall back to the raw content.
    fn markdown_for(&self, block: &Block) -> Result<String>;
}

/// Built-in generator covering every known block type
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSourceGenerator;

impl BlockSourceGenerator for DefaultSourceGenerator {
    fn source_code_for(&self, block: &Block) -> Result<String> {
        python::python_source(block)
    }

    fn markdown_for(&self, block: &Block) -> Result<String> {
        markdown::markdown_text(block)
    }
}

/// Build a generation error for `block`
pub(crate) fn generation_error(block: &Block, reason: impl Into<String>) -> NotebridgeError {
    NotebridgeError::SourceGeneration {
        block_id: block.id.clone(),
        block_type: block.block_type.to_string(),
        reason: reason.into(),
    }
}

/// Inert placeholder emitted when source generation fails
pub fn placeholder_source(block: &Block, reason: &str) -> String {
    format!(
        "# [notebridge] source unavailable for {} block {}: {}\n",
        block.block_type,
        block.id,
        reason.replace('\n', " ")
    )
}
