use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use smmu_xref_core::extract::SkippedMatch;
use smmu_xref_core::matcher::ClassifiedRecord;
use smmu_xref_core::project::{load_config_file, ConfigFile};

use crate::canonicalize_or_current;

/// Input settings as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    pub source_dir: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl InputOptions {
    fn as_overrides(&self) -> Result<ConfigFile> {
        let absolute = |p: &Option<PathBuf>| -> Result<Option<PathBuf>> {
            p.as_deref().map(canonicalize_or_current).transpose()
        };
        Ok(ConfigFile {
            source_dir: absolute(&self.source_dir)?,
            target: absolute(&self.target)?,
            extensions: if self.extensions.is_empty() {
                None
            } else {
                Some(self.extensions.clone())
            },
            output: absolute(&self.output)?,
            output_suffix: None,
        })
    }
}

/// Layer command-line flags over the optional config file (flags win).
pub fn resolve_config(options: &InputOptions) -> Result<ConfigFile> {
    let base = match &options.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load run config {}", path.display()))?,
        None => ConfigFile::default(),
    };
    Ok(base.overlay(options.as_overrides()?))
}

/// Print one line per classified record.
pub fn print_classified(classified: &[ClassifiedRecord]) {
    for entry in classified {
        println!(
            "  {:<4} {}  {}  - {}",
            entry.status.tag(),
            entry.record.location,
            entry.record.key,
            entry.status.describe()
        );
    }
}

/// Print skipped device tree references, if any.
pub fn print_skipped(skipped: &[SkippedMatch]) {
    if skipped.is_empty() {
        return;
    }
    println!("Skipped references ({}):", skipped.len());
    for skip in skipped {
        println!("  - {} `{}`: {}", skip.location, skip.text, skip.reason);
    }
}

/// Serialize `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T, what: &str) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {what} to JSON"))?;
    println!("{serialized}");
    Ok(())
}

/// Helper to print whether a path exists.
pub fn print_path_status(label: &str, path: &Path) {
    println!("  - {label}: {} ({})", if path.exists() { "OK" } else { "MISSING" }, path.display());
}
