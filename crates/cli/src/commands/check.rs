use anyhow::Result;
use smmu_xref_core::matcher::{MatchOutcome, MatchStatus};
use smmu_xref_core::services::xref::XrefRunner;

use crate::commands::util::{
    print_classified, print_json, print_skipped, resolve_config, InputOptions,
};

/// Compare device tree stream definitions against the INF without writing anything.
pub fn check_command(options: &InputOptions, json: bool) -> Result<MatchOutcome> {
    let config = resolve_config(options)?.into_run_config()?;
    let run = XrefRunner::new(&config).run()?;
    let outcome = run.stages.matching;

    if json {
        print_json(&outcome.classified, "match results")?;
        return Ok(outcome);
    }

    println!("SMMU stream definitions ({}):", outcome.classified.len());
    print_classified(&outcome.classified);
    print_skipped(&run.stages.extraction.skipped);
    println!();
    println!(
        "Matched: {}  Different mask: {}  Not found: {}",
        outcome.count(MatchStatus::Full),
        outcome.count(MatchStatus::MaskMismatch),
        outcome.count(MatchStatus::Missing)
    );

    Ok(outcome)
}
