use thiserror::Error;

use super::extractor::{CandidateRecord, HINT_CONTEXT, HINT_ROLE};
use super::normalize::normalize_text;
use crate::config::ProfileThresholds;
use crate::entry::{Entry, Role, Structure};
use crate::profile::TextProfile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StandardizeError {
    #[error("noise candidate at offset {offset} reached the standardizer")]
    NoiseDetected { offset: usize },
    #[error("content is empty after normalization (offset {offset})")]
    ContentEmpty { offset: usize },
}

pub type StandardizeResult<T> = Result<T, StandardizeError>;

/// Maps a non-noise candidate onto a complete entry.
pub fn standardize(
    candidate: &CandidateRecord,
    thresholds: &ProfileThresholds,
) -> StandardizeResult<Entry> {
    if candidate.is_noise {
        return Err(StandardizeError::NoiseDetected {
            offset: candidate.offset,
        });
    }

    let content = normalize_text(&candidate.raw_text);
    if content.is_empty() {
        return Err(StandardizeError::ContentEmpty {
            offset: candidate.offset,
        });
    }

    let role = match candidate.hint(HINT_ROLE) {
        Some(hint) if hint.trim().eq_ignore_ascii_case("assistant") => Role::Assistant,
        _ => Role::User,
    };

    let context = candidate
        .hint(HINT_CONTEXT)
        .map(normalize_text)
        .unwrap_or_default();

    let profile = TextProfile::of(&content);

    Ok(Entry {
        role,
        intent: candidate.intent.clone().unwrap_or_default(),
        mode: candidate.mode,
        context,
        structure: Structure::Coherent,
        density: profile.density(thresholds),
        entropy: profile.entropy(thresholds),
        meaning_preserved: true,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseConfig;
    use crate::entry::{Level, Mode};
    use crate::refine::extractor::{extract_one, RawRecord};

    fn candidate(text: &str) -> CandidateRecord {
        extract_one(&RawRecord::new(1, text), &NoiseConfig::default())
    }

    #[test]
    fn test_binary_search_scenario() {
        let entry = standardize(
            &candidate("please explain how binary search works"),
            &ProfileThresholds::default(),
        )
        .unwrap();

        assert_eq!(entry.role, Role::User);
        assert_eq!(entry.content, "please explain how binary search works");
        assert_eq!(entry.intent, "explain");
        assert_eq!(entry.mode, Mode::Instruction);
        assert_eq!(entry.context, "");
        assert_eq!(entry.structure, Structure::Coherent);
        assert_eq!(entry.density, Level::Medium);
        assert_eq!(entry.entropy, Level::High);
        assert!(entry.meaning_preserved);
    }

    #[test]
    fn test_rejects_noise() {
        let result = standardize(&candidate("???"), &ProfileThresholds::default());
        assert_eq!(result, Err(StandardizeError::NoiseDetected { offset: 1 }));
    }

    #[test]
    fn test_empty_content() {
        let mut c = candidate("placeholder text");
        c.raw_text = "\u{200B} \u{FEFF}".into();

        let result = standardize(&c, &ProfileThresholds::default());
        assert_eq!(result, Err(StandardizeError::ContentEmpty { offset: 1 }));
    }

    #[test]
    fn test_normalizes_content() {
        let entry = standardize(
            &candidate("  \u{201C}Thanks\u{201D},   that   helped  "),
            &ProfileThresholds::default(),
        )
        .unwrap();

        assert_eq!(entry.content, "\"Thanks\", that helped");
        assert_eq!(entry.mode, Mode::Conversation);
        assert_eq!(entry.intent, "thank");
    }

    #[test]
    fn test_role_and_context_hints() {
        let record = RawRecord::new(2, "Sure, I can help with that")
            .with_hint(HINT_ROLE, "Assistant")
            .with_hint(HINT_CONTEXT, "  support   persona ");
        let c = extract_one(&record, &NoiseConfig::default());

        let entry = standardize(&c, &ProfileThresholds::default()).unwrap();

        assert_eq!(entry.role, Role::Assistant);
        assert_eq!(entry.context, "support persona");
    }

    #[test]
    fn test_unknown_mode_has_empty_intent() {
        let entry = standardize(
            &candidate("The weather report came in late"),
            &ProfileThresholds::default(),
        )
        .unwrap();

        assert_eq!(entry.mode, Mode::Unknown);
        assert_eq!(entry.intent, "");
    }

    #[test]
    fn test_every_field_serialized() {
        let entry = standardize(
            &candidate("Write a haiku about autumn leaves"),
            &ProfileThresholds::default(),
        )
        .unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), Entry::FIELDS.len());
        for field in Entry::FIELDS {
            assert!(object.contains_key(field), "missing {field}");
        }
    }
}
