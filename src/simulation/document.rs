use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::error::ConfigurationError;


/// Reads and parses a JSON document (configuration or stackup).
pub fn load_json_document<P: AsRef<Path>>(path: P) -> Result<Value, ConfigurationError> {
    let path = path.as_ref();
    debug!("Loading document {}.", path.display());

    let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::ReadDocument {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| ConfigurationError::ParseDocument {
        path: path.to_path_buf(),
        source,
    })
}
