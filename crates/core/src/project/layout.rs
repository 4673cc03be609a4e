use std::path::PathBuf;

use crate::project::RunConfig;

/// Paths involved in a run, derived from a `RunConfig`.
///
/// This does *not* touch the filesystem. The CLI is responsible for reading
/// inputs and writing the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    /// Root of the device tree corpus.
    pub source_dir: PathBuf,
    /// INF file being annotated.
    pub target_path: PathBuf,
    /// Where the annotated copy is written.
    pub output_path: PathBuf,
}

impl RunLayout {
    pub fn new(config: &RunConfig) -> Self {
        let output_path = match &config.output {
            Some(path) => path.clone(),
            None => suffixed_path(&config.target, &config.output_suffix),
        };
        Self {
            source_dir: config.sources.source_dir.clone(),
            target_path: config.target.clone(),
            output_path,
        }
    }
}

/// `dir/file.inf` + `commented` -> `dir/file.inf.commented`.
fn suffixed_path(target: &std::path::Path, suffix: &str) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".");
    name.push(suffix.trim_start_matches('.'));
    PathBuf::from(name)
}
