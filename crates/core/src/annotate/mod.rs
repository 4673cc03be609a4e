//! Rewriting of the INF text with match annotations.
//!
//! Stream definitions in the INF are comment lines indented by 32 spaces and
//! starting with `; 0xFF, `. The 30 characters from there on are a canonical
//! key; the annotator looks that key up in the match partition and appends a
//! `;;;;;;;; Element ...` comment describing what the device tree says about it.
//!
//! Annotations are upserted: anything from an existing `;;;;;;;; Element`
//! marker to the end of the line is dropped before the fresh comment is
//! appended, so annotating an annotated file yields the same text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matcher::MatchResult;
use crate::model::{SourceLocation, SourceRecord, ID_PREFIX_WIDTH, KEY_SENTINEL, KEY_WIDTH};

/// Indentation that marks an annotatable stream definition line.
pub const ANNOTATABLE_INDENT: &str = "                                ";

/// Identity of an annotation; everything from here to end of line belongs to us.
pub const COMMENT_MARKER: &str = " ;;;;;;;; Element";

/// What the device tree corpus says about one INF stream definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineStatus {
    /// Exact id + mask found.
    Found { locations: Vec<SourceLocation> },
    /// Exact id + mask found, and another DT entry uses the same id with a
    /// different mask.
    FoundWithMaskConflict { locations: Vec<SourceLocation>, mismatched: Vec<SourceLocation> },
    /// Only the id was found.
    MaskMismatch { locations: Vec<SourceLocation> },
    NotFound,
}

impl LineStatus {
    /// Render the annotation comment, including its leading space.
    pub fn comment(&self) -> String {
        match self {
            LineStatus::Found { locations } => found_clause(locations),
            LineStatus::FoundWithMaskConflict { locations, mismatched } => {
                format!("{}{}", found_clause(locations), mask_clause(mismatched))
            }
            LineStatus::MaskMismatch { locations } => mask_clause(locations),
            LineStatus::NotFound => format!("{COMMENT_MARKER} not found in DT"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineStatus::Found { .. } => "INF element found",
            LineStatus::FoundWithMaskConflict { .. } => {
                "INF element found, also present with a different mask"
            }
            LineStatus::MaskMismatch { .. } => "INF element found but with different mask",
            LineStatus::NotFound => "INF element not found",
        }
    }
}

fn join(locations: &[SourceLocation]) -> String {
    locations.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn found_clause(locations: &[SourceLocation]) -> String {
    format!("{COMMENT_MARKER} found in DT: {}", join(locations))
}

fn mask_clause(locations: &[SourceLocation]) -> String {
    format!("{COMMENT_MARKER} found in DT with different mask: {}", join(locations))
}

/// One rewritten INF line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAnnotation {
    /// 0-based index into the `\n`-normalized INF text.
    pub line_index: usize,
    pub key: String,
    pub status: LineStatus,
}

/// Result of annotating a target text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedText {
    pub text: String,
    pub lines: Vec<LineAnnotation>,
}

/// Return the 30-character key carried by an annotatable line, if any.
pub fn line_key(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(ANNOTATABLE_INDENT)?;
    if !rest.starts_with(KEY_SENTINEL) {
        return None;
    }
    rest.get(..KEY_WIDTH)
}

/// Decide a line's status from the match partition.
pub fn line_status(key: &str, result: &MatchResult) -> LineStatus {
    let id_prefix = key.get(..ID_PREFIX_WIDTH).unwrap_or(key);

    let locations = locations_where(&result.matched, |r| r.key.eq_ignore_case(key));
    let mismatched =
        locations_where(&result.unmatched, |r| r.key.id_prefix_eq_ignore_case(id_prefix));

    match (locations.is_empty(), mismatched.is_empty()) {
        (false, true) => LineStatus::Found { locations },
        (false, false) => LineStatus::FoundWithMaskConflict { locations, mismatched },
        (true, false) => LineStatus::MaskMismatch { locations: mismatched },
        (true, true) => LineStatus::NotFound,
    }
}

fn locations_where(
    records: &[SourceRecord],
    pred: impl Fn(&SourceRecord) -> bool,
) -> Vec<SourceLocation> {
    records.iter().filter(|r| pred(r)).map(|r| r.location.clone()).collect()
}

/// Replace any existing annotation on `line` with `comment`.
pub fn upsert_annotation(line: &str, comment: &str) -> String {
    let base = match line.find(COMMENT_MARKER) {
        Some(idx) => &line[..idx],
        None => line,
    };
    format!("{base}{comment}")
}

/// Annotate every stream definition line in `text`.
///
/// `\r\n` line endings are normalized to `\n`; other lines pass through as-is.
pub fn annotate_text(text: &str, result: &MatchResult) -> AnnotatedText {
    let normalized = text.replace("\r\n", "\n");
    let mut out_lines = Vec::new();
    let mut annotations = Vec::new();

    for (line_index, line) in normalized.split('\n').enumerate() {
        let Some(key) = line_key(line) else {
            out_lines.push(line.to_string());
            continue;
        };

        let status = line_status(key, result);
        out_lines.push(upsert_annotation(line, &status.comment()));
        annotations.push(LineAnnotation { line_index, key: key.to_string(), status });
    }

    debug!(annotated = annotations.len(), lines = out_lines.len(), "annotated target text");
    AnnotatedText { text: out_lines.join("\n"), lines: annotations }
}
