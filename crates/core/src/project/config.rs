use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::corpus::DEFAULT_EXTENSIONS;
use crate::project::ConfigError;

/// Suffix appended to the target file name when no explicit output is set.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "commented";

/// Run settings as they appear in a YAML/JSON config file or on the command
/// line. Every field is optional so sources can be layered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_suffix: Option<String>,
}

impl ConfigFile {
    /// Fields set in `overrides` win over fields set in `self`.
    pub fn overlay(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            source_dir: overrides.source_dir.or(self.source_dir),
            target: overrides.target.or(self.target),
            extensions: overrides.extensions.filter(|e| !e.is_empty()).or(self.extensions),
            output: overrides.output.or(self.output),
            output_suffix: overrides.output_suffix.or(self.output_suffix),
        }
    }

    /// Resolve relative paths against `base` (typically the config file's directory).
    pub fn relative_to(mut self, base: &Path) -> ConfigFile {
        let rebase = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.source_dir = self.source_dir.map(rebase);
        self.target = self.target.map(rebase);
        self.output = self.output.map(rebase);
        self
    }

    /// Produce a `SourceConfig`, requiring a source directory.
    pub fn into_source_config(self) -> Result<SourceConfig, ConfigError> {
        let source_dir = self.source_dir.ok_or(ConfigError::Missing("source_dir"))?;
        let extensions = match self.extensions {
            Some(exts) if !exts.is_empty() => exts,
            _ => DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };
        Ok(SourceConfig { source_dir, extensions })
    }

    /// Produce a complete `RunConfig`, requiring both a source directory and a target.
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let target = self.target.clone().ok_or(ConfigError::Missing("target"))?;
        let output = self.output.clone();
        let output_suffix =
            self.output_suffix.clone().unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
        let sources = self.into_source_config()?;
        Ok(RunConfig { sources, target, output, output_suffix })
    }
}

/// Where the device tree corpus lives and which files to read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source_dir: PathBuf,
    pub extensions: Vec<String>,
}

/// Fully resolved settings for one annotate/check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub sources: SourceConfig,
    /// INF file to cross-reference.
    pub target: PathBuf,
    /// Explicit output path; derived from `target` when absent.
    pub output: Option<PathBuf>,
    pub output_suffix: String,
}
