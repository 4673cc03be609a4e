//! Run configuration and derived path layout.
//!
//! Settings come from an optional YAML/JSON config file layered under
//! command-line flags:
//! - `ConfigFile`: partial, serde-friendly settings.
//! - `RunConfig` / `SourceConfig`: resolved settings.
//! - `RunLayout`: computed input/output paths for a run.

mod config;
mod layout;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use config::{ConfigFile, RunConfig, SourceConfig, DEFAULT_OUTPUT_SUFFIX};
pub use layout::RunLayout;

/// Error type for loading and resolving run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Only `.yaml`, `.yml` and `.json` config files are understood.
    #[error("Unsupported config format `{0}`; expected yaml, yml or json")]
    UnsupportedFormat(String),

    #[error("Missing required setting `{0}`")]
    Missing(&'static str),
}

/// Load a config file, picking the parser from its extension.
///
/// Relative paths inside the file are resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
    if !matches!(ext.as_str(), "yaml" | "yml" | "json") {
        return Err(ConfigError::UnsupportedFormat(ext));
    }

    let body = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    let parsed: ConfigFile = if ext == "json" {
        serde_json::from_str(&body)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?
    } else {
        serde_yaml::from_str(&body)
            .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })?
    };

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parsed.relative_to(base))
}
