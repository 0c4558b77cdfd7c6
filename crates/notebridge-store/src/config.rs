//! Configuration file loading

use notebridge_core::ConvertConfig;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::errors::{io_error_at, parse_failure, Result};

/// Conventional configuration file name
pub const CONFIG_FILE_NAME: &str = "notebridge.toml";

/// Load configuration from a TOML file
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// - `ERR_IO` if the file exists but cannot be read
/// - `ERR_PARSE_FAILURE` if the TOML is malformed
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ConvertConfig::default());
        }
        Err(e) => return Err(io_error_at("load_config", path, e)),
    };

    ConvertConfig::from_toml_str(&content).map_err(|e| parse_failure("load_config", path, e))
}
