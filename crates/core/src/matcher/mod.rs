//! Classification of extracted records against the INF text.
//!
//! Each record is looked up in the target text three ways (full key, id-only
//! prefix, nothing) but the result is partitioned in two: full matches go to
//! `matched`, everything else to `unmatched`.

use serde::{Deserialize, Serialize};

use crate::model::SourceRecord;

/// How a record's key was found in the target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Stream id and mask both present.
    Full,
    /// Stream id present with a different mask.
    MaskMismatch,
    /// Neither present.
    Missing,
}

impl MatchStatus {
    /// Short operator-facing tag.
    pub fn tag(self) -> &'static str {
        match self {
            MatchStatus::Full => "ACK",
            MatchStatus::MaskMismatch => "MACK",
            MatchStatus::Missing => "NACK",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            MatchStatus::Full => {
                "SMMU stream definition (ID + mask) found in both the INF and a device tree file"
            }
            MatchStatus::MaskMismatch => {
                "SMMU stream ID found in both the INF and a device tree file, but the mask differs"
            }
            MatchStatus::Missing => "SMMU stream definition (ID + mask) not found in the INF",
        }
    }
}

/// Binary partition of records after matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<SourceRecord>,
    /// Mask mismatches and misses together.
    pub unmatched: Vec<SourceRecord>,
}

impl MatchResult {
    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A record together with its three-way status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub record: SourceRecord,
    pub status: MatchStatus,
}

/// Output of `match_records`: the partition plus per-record detail, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub classified: Vec<ClassifiedRecord>,
}

impl MatchOutcome {
    pub fn count(&self, status: MatchStatus) -> usize {
        self.classified.iter().filter(|c| c.status == status).count()
    }
}

/// ASCII case-insensitive substring search.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.as_bytes();
    haystack.as_bytes().windows(needle.len()).any(|window| window.eq_ignore_ascii_case(needle))
}

/// Classify a single record against the target text.
pub fn classify(record: &SourceRecord, target_text: &str) -> MatchStatus {
    if contains_ignore_case(target_text, record.key.as_str()) {
        MatchStatus::Full
    } else if contains_ignore_case(target_text, record.key.id_prefix()) {
        MatchStatus::MaskMismatch
    } else {
        MatchStatus::Missing
    }
}

/// Classify every record and partition them into matched / unmatched.
pub fn match_records(records: &[SourceRecord], target_text: &str) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for record in records {
        let status = classify(record, target_text);
        match status {
            MatchStatus::Full => outcome.result.matched.push(record.clone()),
            MatchStatus::MaskMismatch | MatchStatus::Missing => {
                outcome.result.unmatched.push(record.clone())
            }
        }
        outcome.classified.push(ClassifiedRecord { record: record.clone(), status });
    }

    outcome
}
