//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Stage progress is logged at `info`, per-file detail at `debug`, and
//! skipped device tree references at `warn`. Logs go to stderr so stdout
//! stays reserved for reports and `--json` output.

use std::io::{self, IsTerminal};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter` when set.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_ansi: io::stderr().is_terminal(),
            with_target: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, enable: bool) -> Self {
        self.use_env_filter = enable;
        self
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    tracing_subscriber::registry().with(build_env_filter(config)).with(layer).try_init()
}

/// Build an `EnvFilter` from the configured level, respecting `RUST_LOG`.
pub fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || {
        // External crates stay at warn.
        let level = config.level_filter.to_string().to_lowercase();
        EnvFilter::new(format!("warn,smmu_xref={level},smmu_xref_core={level}"))
    };

    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}
