use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod commands;
pub mod logging;

/// Canonicalize a path if possible, falling back to joining it onto the
/// current working directory (e.g., an output file that does not exist yet).
pub fn canonicalize_or_current(path: &Path) -> Result<PathBuf> {
    if path == Path::new(".") {
        return env::current_dir().context("Failed to get current directory");
    }
    match path.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => {
            let cwd = env::current_dir().context("Failed to get current directory")?;
            Ok(cwd.join(path))
        }
    }
}
