//! Markdown equivalents of presentational block types.

use crate::errors::Result;
use crate::model::{Block, BlockType};

use super::generation_error;

/// Generate markdown for a presentational block
///
/// # Errors
///
/// Returns `NotebridgeError::SourceGeneration` for executable types and for
/// images without a source URL.
pub fn markdown_text(block: &Block) -> Result<String> {
    let content = block.content.as_str();
    match &block.block_type {
        BlockType::Markdown | BlockType::TextCellP | BlockType::Other(_) => Ok(content.to_string()),
        BlockType::TextCellH1 => Ok(format!("# {}", content)),
        BlockType::TextCellH2 => Ok(format!("## {}", content)),
        BlockType::TextCellH3 => Ok(format!("### {}", content)),
        BlockType::TextCellBullet => Ok(format!("- {}", content)),
        BlockType::TextCellTodo => {
            let mark = if block.metadata.get_bool("checked").unwrap_or(false) {
                "x"
            } else {
                " "
            };
            Ok(format!("- [{}] {}", mark, content))
        }
        BlockType::TextCellCallout => Ok(content
            .lines()
            .map(|line| format!("> {}", line).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        BlockType::Separator => Ok("---".to_string()),
        BlockType::Image => {
            let src = block
                .metadata
                .get_str("deepnote_img_src")
                .filter(|s| !s.is_empty())
                .ok_or_else(|| generation_error(block, "image has no source URL"))?;
            let alt = block.metadata.get_str("deepnote_img_alt").unwrap_or_default();
            Ok(format!("![{}]({})", alt, src))
        }
        other => Err(generation_error(
            block,
            format!("{} blocks have no markdown form", other),
        )),
    }
}
