//! Core data model: stream/mask pairs, canonical keys, and source records.
//!
//! A `SourceRecord` is produced once by the extractor and never mutated; the
//! matcher and annotator only borrow it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel byte that opens every canonical key.
pub const KEY_SENTINEL: &str = "; 0xFF, ";

/// Width of the sentinel plus identifier bytes, i.e. the part of a key that
/// ignores the mask.
pub const ID_PREFIX_WIDTH: usize = 18;

/// Total width of a canonical key.
pub const KEY_WIDTH: usize = 30;

/// A 16-bit stream identifier paired with its 16-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamPair {
    pub stream_id: u16,
    pub mask: u16,
}

impl StreamPair {
    pub fn new(stream_id: u16, mask: u16) -> Self {
        Self { stream_id, mask }
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::from_pair(*self)
    }
}

/// Text that is not a canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid canonical key `{0}`; expected `; 0xFF, 0xII, 0xII, 0xMM, 0xMM` in uppercase hex")]
pub struct InvalidKey(pub String);

/// Normalized byte-pair hex rendering of a `StreamPair`.
///
/// Always `; 0xFF, 0xII, 0xII, 0xMM, 0xMM` with uppercase hex digits, so two
/// records with the same pair compare equal as plain text. Deserialization
/// only accepts text in exactly that form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn from_pair(pair: StreamPair) -> Self {
        let [id_hi, id_lo] = pair.stream_id.to_be_bytes();
        let [mask_hi, mask_lo] = pair.mask.to_be_bytes();
        Self(format!("{KEY_SENTINEL}0x{id_hi:02X}, 0x{id_lo:02X}, 0x{mask_hi:02X}, 0x{mask_lo:02X}"))
    }

    /// Parse key text, rejecting anything `from_pair` would not produce.
    pub fn parse(text: &str) -> Result<Self, InvalidKey> {
        let invalid = || InvalidKey(text.to_string());
        let bytes = text
            .strip_prefix(KEY_SENTINEL)
            .ok_or_else(invalid)?
            .split(", ")
            .map(|part| {
                part.strip_prefix("0x").and_then(|hex| u8::from_str_radix(hex, 16).ok())
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(invalid)?;
        let [id_hi, id_lo, mask_hi, mask_lo] = bytes[..] else {
            return Err(invalid());
        };

        let key = Self::from_pair(StreamPair::new(
            u16::from_be_bytes([id_hi, id_lo]),
            u16::from_be_bytes([mask_hi, mask_lo]),
        ));
        if key.0 != text {
            return Err(invalid());
        }
        Ok(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sentinel and identifier bytes only (first 18 characters).
    pub fn id_prefix(&self) -> &str {
        &self.0[..ID_PREFIX_WIDTH]
    }

    /// ASCII case-insensitive comparison against raw key text.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// True when `prefix` matches this key's identifier part, ignoring case.
    pub fn id_prefix_eq_ignore_case(&self, prefix: &str) -> bool {
        self.id_prefix().eq_ignore_ascii_case(prefix)
    }
}

impl TryFrom<String> for CanonicalKey {
    type Error = InvalidKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where in the device tree corpus a pattern was found.
///
/// `line` and `column` are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self { file: file.into(), line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One `&<name>_smmu <id> <mask>` occurrence, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub location: SourceLocation,
    pub key: CanonicalKey,
}

impl SourceRecord {
    pub fn new(location: SourceLocation, key: CanonicalKey) -> Self {
        Self { location, key }
    }
}

