use std::fs;

use anyhow::{Context, Result};
use smmu_xref_core::annotate::LineStatus;
use smmu_xref_core::services::xref::{RunSummary, XrefRunner};
use tracing::info;

use crate::commands::util::{
    print_classified, print_json, print_path_status, print_skipped, resolve_config, InputOptions,
};

/// Run the full cross-reference and write the annotated INF copy.
pub fn annotate_command(options: &InputOptions, json: bool) -> Result<RunSummary> {
    let config = resolve_config(options)?.into_run_config()?;
    let run = XrefRunner::new(&config).run()?;

    info!(path = %run.layout.output_path.display(), "writing annotated INF file");
    fs::write(&run.layout.output_path, &run.stages.annotated.text).with_context(|| {
        format!("Failed to write annotated INF file: {}", run.layout.output_path.display())
    })?;

    if json {
        print_json(&run.summary, "run summary")?;
        return Ok(run.summary);
    }

    println!("SMMU stream definitions ({}):", run.stages.matching.classified.len());
    print_classified(&run.stages.matching.classified);
    print_skipped(&run.stages.extraction.skipped);
    println!();

    println!("INF stream lines ({}):", run.stages.annotated.lines.len());
    for line in &run.stages.annotated.lines {
        if matches!(line.status, LineStatus::Found { .. }) {
            continue;
        }
        println!("  - line {}: {}: {}", line.line_index, line.status.label(), line.key);
    }
    println!();

    let summary = &run.summary;
    println!("Annotated INF written:");
    print_path_status("Target", &run.layout.target_path);
    print_path_status("Output", &run.layout.output_path);
    println!("  Source files: {}", summary.source_files);
    println!(
        "  Records: {} (matched {}, different mask {}, not found {}, skipped {})",
        summary.records,
        summary.full_matches,
        summary.mask_mismatches,
        summary.missing,
        summary.skipped
    );
    println!(
        "  INF lines: {} (found {}, found + different mask {}, different mask {}, not found {})",
        summary.lines_annotated,
        summary.lines_found,
        summary.lines_found_with_conflict,
        summary.lines_mask_mismatch,
        summary.lines_not_found
    );

    Ok(run.summary)
}
