//! TOML settings file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load and deserialize a TOML file.
///
/// A missing file is not an error: it deserializes as an empty document so
/// every optional field falls back to its default.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read and
/// [`ConfigError::InvalidSyntax`] if it cannot be parsed into `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return parse("", path);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse(&content, path)
}

fn parse<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
        path: path.display().to_string(),
        message: e.message().to_string(),
    })
}
