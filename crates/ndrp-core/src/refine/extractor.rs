use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::classifier::{classify_detailed, ConfidenceTier};
use super::normalize::collapse_whitespace;
use crate::config::NoiseConfig;
use crate::entry::Mode;

pub const META_OFFSET: &str = "offset";
pub const META_CONFIDENCE: &str = "confidence";
pub const META_NOISE_REASON: &str = "noise_reason";

/// Acquisition hint marking an assistant-authored record.
pub const HINT_ROLE: &str = "role";
/// Acquisition hint carrying the entry context (persona, system prompt, ...).
pub const HINT_CONTEXT: &str = "context";

/// One unprocessed input unit as handed over by text acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub offset: usize,
    pub bytes: Vec<u8>,
    pub hints: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(offset: usize, text: impl Into<String>) -> Self {
        Self::from_bytes(offset, text.into().into_bytes())
    }

    #[must_use]
    pub const fn from_bytes(offset: usize, bytes: Vec<u8>) -> Self {
        Self {
            offset,
            bytes,
            hints: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseReason {
    InvalidUtf8,
    TooShort,
    NoSemanticContent,
}

impl NoiseReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUtf8 => "invalid_utf8",
            Self::TooShort => "too_short",
            Self::NoSemanticContent => "no_semantic_content",
        }
    }
}

impl fmt::Display for NoiseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub offset: usize,
    pub raw_text: String,
    pub mode: Mode,
    pub intent: Option<String>,
    pub is_noise: bool,
    pub metadata: BTreeMap<String, String>,
}

impl CandidateRecord {
    pub fn noise_reason(&self) -> Option<&str> {
        self.metadata.get(META_NOISE_REASON).map(String::as_str)
    }

    pub fn hint(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Lazily turns raw records into candidates, one per input, in input order.
pub fn extract<'a, I>(records: I, config: &'a NoiseConfig) -> impl Iterator<Item = CandidateRecord> + 'a
where
    I: IntoIterator<Item = RawRecord>,
    I::IntoIter: 'a,
{
    records
        .into_iter()
        .map(move |record| extract_one(&record, config))
}

pub fn extract_one(record: &RawRecord, config: &NoiseConfig) -> CandidateRecord {
    let mut metadata = record.hints.clone();
    metadata.insert(META_OFFSET.to_string(), record.offset.to_string());

    let (raw_text, noise) = match std::str::from_utf8(&record.bytes) {
        Ok(text) => (text.to_string(), detect_noise(text, config)),
        Err(_) => (
            String::from_utf8_lossy(&record.bytes).into_owned(),
            Some(NoiseReason::InvalidUtf8),
        ),
    };

    if let Some(reason) = noise {
        metadata.insert(META_NOISE_REASON.to_string(), reason.to_string());
        metadata.insert(
            META_CONFIDENCE.to_string(),
            ConfidenceTier::Fallback.to_string(),
        );
        return CandidateRecord {
            offset: record.offset,
            raw_text,
            mode: Mode::Unknown,
            intent: None,
            is_noise: true,
            metadata,
        };
    }

    let classification = classify_detailed(&raw_text);
    metadata.insert(
        META_CONFIDENCE.to_string(),
        classification.confidence.to_string(),
    );

    CandidateRecord {
        offset: record.offset,
        raw_text,
        mode: classification.mode,
        intent: Some(classification.intent).filter(|i| !i.is_empty()),
        is_noise: false,
        metadata,
    }
}

fn detect_noise(text: &str, config: &NoiseConfig) -> Option<NoiseReason> {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() < config.min_chars {
        return Some(NoiseReason::TooShort);
    }
    if !collapsed.chars().any(char::is_alphanumeric) {
        return Some(NoiseReason::NoSemanticContent);
    }
    None
}
