//! Multi-format configuration loading
//!
//! Config documents may be written as JSON, TOML or YAML. The format is not
//! declared; each parser is tried in that order and the first success wins.

use crate::error::{CoreError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Parse a configuration document of unknown format
pub fn parse_config<T: DeserializeOwned>(content: &str) -> Result<T> {
    let json_err = match serde_json::from_str::<T>(content) {
        Ok(config) => return Ok(config),
        Err(e) => e,
    };

    let toml_err = match toml::from_str::<T>(content) {
        Ok(config) => return Ok(config),
        Err(e) => e,
    };

    let yaml_err = match serde_yaml::from_str::<T>(content) {
        Ok(config) => return Ok(config),
        Err(e) => e,
    };

    Err(CoreError::Parse(format!(
        "not valid JSON ({}), TOML ({}) or YAML ({})",
        json_err,
        toml_err,
        yaml_err
    )))
}

/// Read and parse a configuration file
pub fn read_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(CoreError::Config("Config path is empty".to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
        .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
}
