//! Error handling for notebridge-store
//!
//! Wraps notebridge-core ExError with store-specific helpers

use notebridge_core::errors::{ExError, ExErrorKind, NotebridgeError};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error for a specific file
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    io_error(operation, err).with_path(path.display().to_string())
}

fn core_error(operation: &str, path: &Path, err: NotebridgeError) -> ExError {
    ExError::from(err)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
}

/// Create a parse failure for a file whose content is malformed
pub fn parse_failure(operation: &str, path: &Path, err: NotebridgeError) -> ExError {
    core_error(operation, path, err)
}

/// Create a serialization failure for a value bound for `path`
pub fn serialization_failure(operation: &str, path: &Path, err: NotebridgeError) -> ExError {
    core_error(operation, path, err)
}

/// Create an error for a path that cannot name a notebook
pub fn invalid_path(operation: &str, path: &Path, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_keeps_kind_and_adds_context() {
        let err = parse_failure(
            "read_jupyter_file",
            Path::new("/data/a.ipynb"),
            NotebridgeError::parse("jupyter", "eof"),
        );
        assert_eq!(err.kind(), ExErrorKind::ParseFailure);
        assert_eq!(err.op(), Some("read_jupyter_file"));
        assert_eq!(err.path(), Some("/data/a.ipynb"));
    }

    #[test]
    fn test_io_error_at() {
        let err = io_error_at(
            "read_deepnote_file",
            Path::new("missing.deepnote"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.code(), "ERR_IO");
        assert_eq!(err.path(), Some("missing.deepnote"));
    }
}
