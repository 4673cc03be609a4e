//! smmu-xref-core
//!
//! Core library for cross-referencing SMMU stream ID/mask pairs declared in
//! device tree sources against the stream table of a Windows SMMU driver INF.
//!
//! The pipeline has three stages, each a plain function over text:
//! - `extract`: pull `&<name>_smmu <id> <mask>` references into canonical keys.
//! - `matcher`: classify each key against the INF text.
//! - `annotate`: rewrite INF stream lines with idempotent status comments.
//!
//! File discovery, configuration and the run coordinator live alongside so
//! frontends stay thin.

pub mod model;
pub mod extract;
pub mod matcher;
pub mod annotate;
pub mod corpus;
pub mod project;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
