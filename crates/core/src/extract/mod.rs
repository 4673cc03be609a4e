//! Extraction of SMMU stream/mask pairs from device tree sources.
//!
//! Device tree includes reference SMMU streams as `&<name>_smmu <id> <mask>`
//! where both tokens are decimal or `0x`-prefixed hex literals. Each match is
//! normalized to a `CanonicalKey` and tagged with its `file:line:col`.
//! A match whose tokens fail to parse is skipped; extraction carries on with
//! the next match.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::corpus::SourceFile;
use crate::model::{SourceLocation, SourceRecord, StreamPair};

static SMMU_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&\w*_smmu (\w*) (\w*)").expect("Invalid SMMU reference regex")
});

/// Failure to turn a token into a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("empty numeric token")]
    Empty,
    #[error("`{0}` is not a decimal or 0x-prefixed hex literal")]
    InvalidDigits(String),
    #[error("`{0}` does not fit in 32 bits")]
    Overflow(String),
}

/// A pattern occurrence that was dropped because a token did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMatch {
    pub location: SourceLocation,
    /// The matched text, e.g. `&dsp_smmu 0x10 abc`.
    pub text: String,
    pub reason: String,
}

/// Records plus the matches that were skipped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOutcome {
    pub records: Vec<SourceRecord>,
    pub skipped: Vec<SkippedMatch>,
}

impl ExtractOutcome {
    fn merge(&mut self, other: ExtractOutcome) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
    }
}

/// Parse a decimal or `0x`/`0X`-prefixed hexadecimal literal.
pub fn parse_numeric_token(token: &str) -> Result<u32, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let (digits, radix) = match token.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("0x") => (&token[2..], 16),
        _ => (token, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(TokenError::InvalidDigits(token.to_string()));
    }

    u32::from_str_radix(digits, radix).map_err(|_| TokenError::Overflow(token.to_string()))
}

/// Parse an id/mask token pair, truncating each value to its low 16 bits.
pub fn parse_stream_pair(id_token: &str, mask_token: &str) -> Result<StreamPair, TokenError> {
    let stream_id = parse_numeric_token(id_token)?;
    let mask = parse_numeric_token(mask_token)?;
    if stream_id > u32::from(u16::MAX) || mask > u32::from(u16::MAX) {
        debug!(id_token, mask_token, "truncating stream pair to 16 bits");
    }
    Ok(StreamPair::new(stream_id as u16, mask as u16))
}

/// Convert a byte offset into a 0-based (line, column) pair.
///
/// The result is the same as computing it on the text after `\r\n` has been
/// rewritten to `\n`: lines are counted by `\n`, and the column is the
/// number of characters between the start of the line and `offset`.
pub fn offset_to_line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before[line_start..].chars().count();
    (line, column)
}

/// Extract every SMMU reference from a single source file.
pub fn extract_records(file: &str, text: &str) -> ExtractOutcome {
    let mut outcome = ExtractOutcome::default();

    for caps in SMMU_REFERENCE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (line, column) = offset_to_line_col(text, whole.start());
        let location = SourceLocation::new(file, line, column);

        let id_token = caps.get(1).map_or("", |m| m.as_str());
        let mask_token = caps.get(2).map_or("", |m| m.as_str());

        match parse_stream_pair(id_token, mask_token) {
            Ok(pair) => {
                outcome.records.push(SourceRecord::new(location, pair.canonical_key()));
            }
            Err(err) => {
                warn!(location = %location, text = whole.as_str(), error = %err, "skipping SMMU reference");
                outcome.skipped.push(SkippedMatch {
                    location,
                    text: whole.as_str().to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(file, records = outcome.records.len(), skipped = outcome.skipped.len(), "extracted");
    outcome
}

/// Extract from every file in the corpus, preserving corpus order.
pub fn extract_corpus(files: &[SourceFile]) -> ExtractOutcome {
    let mut outcome = ExtractOutcome::default();
    for file in files {
        outcome.merge(extract_records(&file.display_path, &file.text));
    }
    outcome
}
