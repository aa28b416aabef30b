use std::path::Path;

use anyhow::{Context, Result};
use ndrp_core::refine::{HINT_CONTEXT, HINT_ROLE};
use ndrp_core::RawRecord;

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub speaker_tags: bool,
    pub context: Option<String>,
}

const SPEAKER_TAGS: [(&str, &str); 2] = [("user:", "user"), ("assistant:", "assistant")];

pub fn read_raw_records(path: &Path, options: &ReadOptions) -> Result<Vec<RawRecord>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let records = split_records(&bytes, options);
    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        records = records.len(),
        "read raw records"
    );
    Ok(records)
}

/// Splits raw bytes into one record per line, offsets counted from 1.
///
/// Lines are kept as bytes so a bad encoding stays confined to its record.
pub fn split_records(bytes: &[u8], options: &ReadOptions) -> Vec<RawRecord> {
    let mut lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let (role, body) = if options.speaker_tags {
                strip_speaker_tag(line)
            } else {
                (None, line)
            };

            let mut record = RawRecord::from_bytes(i + 1, body.to_vec());
            if let Some(role) = role {
                record = record.with_hint(HINT_ROLE, role);
            }
            if let Some(context) = &options.context {
                record = record.with_hint(HINT_CONTEXT, context.clone());
            }
            record
        })
        .collect()
}

fn strip_speaker_tag(line: &[u8]) -> (Option<&'static str>, &[u8]) {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let rest = &line[start..];

    for (tag, role) in SPEAKER_TAGS {
        if rest.len() >= tag.len() && rest[..tag.len()].eq_ignore_ascii_case(tag.as_bytes()) {
            return (Some(role), &rest[tag.len()..]);
        }
    }
    (None, line)
}
