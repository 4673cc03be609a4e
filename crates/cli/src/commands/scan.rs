use anyhow::Result;
use serde::Serialize;
use smmu_xref_core::corpus::discover_sources;
use smmu_xref_core::extract::{extract_corpus, ExtractOutcome};
use tracing::info;

use crate::commands::util::{print_json, print_skipped, resolve_config, InputOptions};

#[derive(Serialize)]
pub struct ScanReport<'a> {
    pub source_dir: String,
    pub extensions: &'a [String],
    pub source_files: Vec<&'a str>,
    #[serde(flatten)]
    pub outcome: &'a ExtractOutcome,
}

/// List every SMMU reference found in the device tree corpus.
pub fn scan_command(options: &InputOptions, json: bool) -> Result<ExtractOutcome> {
    let sources = resolve_config(options)?.into_source_config()?;

    info!(dir = %sources.source_dir.display(), "reading device tree files");
    let files = discover_sources(&sources.source_dir, &sources.extensions)?;
    let outcome = extract_corpus(&files);

    if json {
        let report = ScanReport {
            source_dir: sources.source_dir.display().to_string(),
            extensions: &sources.extensions,
            source_files: files.iter().map(|f| f.display_path.as_str()).collect(),
            outcome: &outcome,
        };
        print_json(&report, "scan report")?;
        return Ok(outcome);
    }

    println!("Scanned {} file(s) under {}", files.len(), sources.source_dir.display());
    println!("SMMU stream references ({}):", outcome.records.len());
    if outcome.records.is_empty() {
        println!("  (none)");
    }
    for record in &outcome.records {
        println!("  - {}  {}", record.location, record.key);
    }
    print_skipped(&outcome.skipped);

    Ok(outcome)
}
