//! Discovery and loading of the device tree source corpus.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use encoding_rs::UTF_8;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["dtsi"];

/// A loaded source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the corpus root, `/`-separated.
    pub display_path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(display_path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { display_path: display_path.into(), text: text.into() }
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn path_to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions.iter().any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Recursively collect files under `root` whose extension is in `extensions`.
///
/// Files are returned in a stable, name-sorted walk order. A missing root or
/// an unreadable file is an error.
pub fn discover_sources(root: &Path, extensions: &[String]) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        bail!("Source directory does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk source directory {}", root.display()))?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }

        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let bytes = fs::read(entry.path())
            .with_context(|| format!("Failed to read source file {}", entry.path().display()))?;
        let text = decode_text(entry.path(), &bytes);

        debug!(path = %entry.path().display(), bytes = bytes.len(), "loaded source file");
        files.push(SourceFile::new(path_to_slash(rel), text));
    }

    Ok(files)
}

/// Decode file contents, honoring a UTF-8, UTF-16LE or UTF-16BE byte-order
/// mark and falling back to UTF-8. The mark itself is dropped.
///
/// Malformed sequences become U+FFFD and are reported with a warning.
pub fn decode_text(path: &Path, bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        warn!(
            path = %path.display(),
            encoding = encoding.name(),
            "file contains malformed sequences; replaced with U+FFFD"
        );
    }
    debug!(path = %path.display(), encoding = encoding.name(), "decoded file");
    text.into_owned()
}

/// Read the target INF file.
///
/// Driver INFs are often UTF-16LE with a BOM; see [`decode_text`].
pub fn read_target(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read target file {}", path.display()))?;
    Ok(decode_text(path, &bytes))
}
