use thiserror::Error;

/// Result type alias using NotebridgeError
pub type Result<T> = std::result::Result<T, NotebridgeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Format detection
    UnsupportedFormat,
    MissingContent,

    // Conversion
    /// Per-block source generation failed (recovered by the mapper)
    SourceGenerationFailure,
    /// Sorting key index exceeds the fixed-width key space
    IndexOutOfRange,
    /// Input document is malformed
    ParseFailure,

    // Snapshot
    /// Snapshot content hash disagrees with current block content
    StaleSnapshot,

    // Structural/Validation
    InvalidInput,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnsupportedFormat => "ERR_UNSUPPORTED_FORMAT",
            ExErrorKind::MissingContent => "ERR_MISSING_CONTENT",
            ExErrorKind::SourceGenerationFailure => "ERR_SOURCE_GENERATION_FAILURE",
            ExErrorKind::IndexOutOfRange => "ERR_INDEX_OUT_OF_RANGE",
            ExErrorKind::ParseFailure => "ERR_PARSE_FAILURE",
            ExErrorKind::StaleSnapshot => "ERR_STALE_SNAPSHOT",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// operation and entity context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    path: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (project, notebook or block id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for conversion and snapshot operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotebridgeError {
    // ===== Format Detection =====
    /// No dialect matches the file extension or content
    #[error("Unsupported notebook format: {filename}")]
    UnsupportedFormat { filename: String },

    /// Content sniffing is required but no content was supplied
    #[error("Content is required to detect the format of {filename}")]
    MissingContent { filename: String },

    // ===== Conversion =====
    /// A block could not be turned into runnable source
    #[error("Cannot generate source for block {block_id} ({block_type}): {reason}")]
    SourceGeneration {
        block_id: String,
        block_type: String,
        reason: String,
    },

    /// Sorting key index outside the representable range
    #[error("Sorting key index {index} exceeds maximum {max}")]
    IndexOutOfRange { index: u64, max: u64 },

    /// Malformed input document
    #[error("Failed to parse {format} document: {message}")]
    Parse { format: String, message: String },

    // ===== Snapshot =====
    /// Snapshot outputs were recorded for different block content
    #[error("Snapshot is stale for block {block_id}: recorded {recorded}, current {current}")]
    StaleSnapshot {
        block_id: String,
        recorded: String,
        current: String,
    },

    // ===== Generic Errors =====
    /// Serialization error (JSON/YAML/TOML encoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl NotebridgeError {
    /// Build a parse failure for the named dialect
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        NotebridgeError::Parse {
            format: format.into(),
            message: message.into(),
        }
    }
}

/// Conversion from NotebridgeError to ExError
impl From<NotebridgeError> for ExError {
    fn from(err: NotebridgeError) -> Self {
        match err {
            NotebridgeError::UnsupportedFormat { filename } => {
                ExError::new(ExErrorKind::UnsupportedFormat)
                    .with_op("detect_format")
                    .with_path(filename)
                    .with_message("No notebook dialect matches this file")
            }

            NotebridgeError::MissingContent { filename } => {
                ExError::new(ExErrorKind::MissingContent)
                    .with_op("detect_format")
                    .with_path(filename)
                    .with_message("Content sniffing requires file content")
            }

            NotebridgeError::SourceGeneration {
                block_id,
                block_type,
                reason,
            } => ExError::new(ExErrorKind::SourceGenerationFailure)
                .with_entity_id(block_id)
                .with_message(format!("{}: {}", block_type, reason)),

            NotebridgeError::IndexOutOfRange { index, max } => {
                ExError::new(ExErrorKind::IndexOutOfRange)
                    .with_op("sorting_key_for")
                    .with_message(format!("Index {} exceeds maximum {}", index, max))
            }

            NotebridgeError::Parse { format, message } => ExError::new(ExErrorKind::ParseFailure)
                .with_message(format!("{}: {}", format, message)),

            NotebridgeError::StaleSnapshot {
                block_id,
                recorded,
                current,
            } => ExError::new(ExErrorKind::StaleSnapshot)
                .with_op("merge_snapshot")
                .with_entity_id(block_id)
                .with_message(format!("recorded {}, current {}", recorded, current)),

            NotebridgeError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to NotebridgeError
impl From<serde_json::Error> for NotebridgeError {
    fn from(err: serde_json::Error) -> Self {
        NotebridgeError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_yaml::Error to NotebridgeError
impl From<serde_yaml::Error> for NotebridgeError {
    fn from(err: serde_yaml::Error) -> Self {
        NotebridgeError::Serialization {
            message: err.to_string(),
        }
    }
}
