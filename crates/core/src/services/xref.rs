use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::annotate::{annotate_text, AnnotatedText, LineStatus};
use crate::corpus::{discover_sources, read_target, SourceFile};
use crate::extract::{extract_corpus, ExtractOutcome};
use crate::matcher::{match_records, MatchOutcome, MatchStatus};
use crate::project::{RunConfig, RunLayout};

/// Output of the three in-memory stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XrefStages {
    pub extraction: ExtractOutcome,
    pub matching: MatchOutcome,
    pub annotated: AnnotatedText,
}

/// Run extraction, matching and annotation over already-loaded inputs.
pub fn run_stages(files: &[SourceFile], target_text: &str) -> XrefStages {
    let extraction = extract_corpus(files);
    let matching = match_records(&extraction.records, target_text);
    let annotated = annotate_text(target_text, &matching.result);
    XrefStages { extraction, matching, annotated }
}

/// Serializable per-run bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub source_dir: String,
    pub target: String,
    pub output: String,
    pub source_files: usize,
    pub records: usize,
    pub skipped: usize,
    pub full_matches: usize,
    pub mask_mismatches: usize,
    pub missing: usize,
    pub lines_annotated: usize,
    pub lines_found: usize,
    pub lines_found_with_conflict: usize,
    pub lines_mask_mismatch: usize,
    pub lines_not_found: usize,
    pub target_sha256: String,
    pub output_sha256: String,
    pub started_at: String,
    pub finished_at: String,
}

/// Everything a frontend needs to report on and persist a run.
#[derive(Debug, Clone)]
pub struct XrefRun {
    pub layout: RunLayout,
    pub stages: XrefStages,
    pub summary: RunSummary,
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Coordinator that loads inputs for a `RunConfig` and runs every stage.
///
/// It does not write the annotated output; that is left to the caller.
pub struct XrefRunner<'a> {
    pub config: &'a RunConfig,
}

impl<'a> XrefRunner<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<XrefRun> {
        let started_at = Utc::now().to_rfc3339();
        let layout = RunLayout::new(self.config);

        info!(dir = %layout.source_dir.display(), "reading device tree files");
        let files = discover_sources(&layout.source_dir, &self.config.sources.extensions)?;

        info!(path = %layout.target_path.display(), "reading driver INF file");
        let target_text = read_target(&layout.target_path)?;

        info!(files = files.len(), "building SMMU stream definitions");
        let stages = run_stages(&files, &target_text);
        info!(
            records = stages.extraction.records.len(),
            matched = stages.matching.result.matched.len(),
            unmatched = stages.matching.result.unmatched.len(),
            "compared stream definitions"
        );

        let lines = &stages.annotated.lines;
        let count_lines =
            |pred: fn(&LineStatus) -> bool| lines.iter().filter(|l| pred(&l.status)).count();

        let summary = RunSummary {
            source_dir: layout.source_dir.display().to_string(),
            target: layout.target_path.display().to_string(),
            output: layout.output_path.display().to_string(),
            source_files: files.len(),
            records: stages.extraction.records.len(),
            skipped: stages.extraction.skipped.len(),
            full_matches: stages.matching.count(MatchStatus::Full),
            mask_mismatches: stages.matching.count(MatchStatus::MaskMismatch),
            missing: stages.matching.count(MatchStatus::Missing),
            lines_annotated: lines.len(),
            lines_found: count_lines(|s| matches!(s, LineStatus::Found { .. })),
            lines_found_with_conflict: count_lines(|s| {
                matches!(s, LineStatus::FoundWithMaskConflict { .. })
            }),
            lines_mask_mismatch: count_lines(|s| matches!(s, LineStatus::MaskMismatch { .. })),
            lines_not_found: count_lines(|s| matches!(s, LineStatus::NotFound)),
            target_sha256: sha256_hex(target_text.as_bytes()),
            output_sha256: sha256_hex(stages.annotated.text.as_bytes()),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        };

        Ok(XrefRun { layout, stages, summary })
    }
}
