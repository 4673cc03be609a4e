use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use smmu_xref::commands::{annotate_command, check_command, scan_command, InputOptions};
use smmu_xref::logging::{init_logging, LogConfig};

/// Cross-reference SMMU stream definitions between device tree sources and a driver INF.
///
/// This CLI is a thin wrapper around `smmu-xref-core`. All substantive logic
/// lives in the library so it can be tested thoroughly and reused.
#[derive(Parser, Debug)]
#[command(
    name = "smmu-xref",
    version,
    about = "Cross-reference SMMU stream IDs between device trees and a driver INF",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Root of the device tree source tree (scanned recursively).
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// File extension to scan; repeat for several. Defaults to `dtsi`.
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Optional YAML/JSON run config. Command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate a copy of the INF with device tree match comments.
    ///
    /// Every stream line (`; 0xFF, 0x.., 0x.., 0x.., 0x..`) gets a trailing
    /// `;;;;;;;; Element ...` comment. Re-running on the output refreshes the
    /// comments instead of stacking them.
    Annotate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Driver INF file to cross-reference.
        #[arg(long)]
        target: Option<PathBuf>,

        /// Output path. Defaults to `<target>.commented`.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare device tree stream definitions against the INF without writing.
    Check {
        #[command(flatten)]
        sources: SourceArgs,

        /// Driver INF file to cross-reference.
        #[arg(long)]
        target: Option<PathBuf>,
    },

    /// List SMMU stream references found in the device tree sources.
    Scan {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

fn input_options(
    sources: SourceArgs,
    target: Option<PathBuf>,
    output: Option<PathBuf>,
) -> (InputOptions, bool) {
    let options = InputOptions {
        source_dir: sources.source_dir,
        target,
        extensions: sources.extensions,
        output,
        config: sources.config,
    };
    (options, sources.json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::default()
        .with_level_filter(cli.verbosity.tracing_level_filter())
        .with_env_filter(!cli.verbosity.is_present());
    init_logging(&log_config).map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    match cli.command {
        Command::Annotate { sources, target, output } => {
            let (options, json) = input_options(sources, target, output);
            annotate_command(&options, json)?;
        }
        Command::Check { sources, target } => {
            let (options, json) = input_options(sources, target, None);
            check_command(&options, json)?;
        }
        Command::Scan { sources } => {
            let (options, json) = input_options(sources, None, None);
            scan_command(&options, json)?;
        }
    }

    Ok(())
}
