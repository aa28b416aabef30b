use rayon::prelude::*;
use serde_json::Value;

use super::checks::{self, Finding};
use super::redact::Redactor;
use super::report::{
    hygiene_score, rating, severity_counts, IssueKind, Tally, ValidationIssue, ValidationReport,
    Verdict,
};
use super::schema::EntrySchema;
use crate::config::ValidatorConfig;
use crate::entry::Entry;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Produce redacted copies and run the semantic checks against them.
    pub redact: bool,
}

impl ValidateOptions {
    #[must_use]
    pub const fn redacting() -> Self {
        Self { redact: true }
    }
}

struct RecordResult {
    issues: Vec<ValidationIssue>,
    structural_ok: bool,
    semantic_ok: bool,
    redactions: usize,
    copy: Option<Value>,
}

/// Checks entry-like records against an [`EntrySchema`] and scores the batch.
///
/// Input is never mutated; redaction works on copies that only appear in
/// the report.
pub struct Validator {
    schema: EntrySchema,
    config: ValidatorConfig,
    redactor: Redactor,
}

impl Validator {
    pub fn new(schema: EntrySchema, config: ValidatorConfig) -> Result<Self> {
        let redactor = Redactor::new(&config.redaction)?;
        Ok(Self {
            schema,
            config,
            redactor,
        })
    }

    pub fn from_config(config: ValidatorConfig) -> Result<Self> {
        Self::new(EntrySchema::ndrp_v1(), config)
    }

    pub const fn schema(&self) -> &EntrySchema {
        &self.schema
    }

    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, records: &[Value], options: &ValidateOptions) -> ValidationReport {
        let results = records
            .par_iter()
            .enumerate()
            .map(|(index, record)| self.check_record(index, None, Ok(record), options))
            .collect();
        self.assemble(results, options)
    }

    pub fn validate_entries(
        &self,
        entries: &[Entry],
        options: &ValidateOptions,
    ) -> Result<ValidationReport> {
        let values = entries
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(self.validate(&values, options))
    }

    /// Validates one JSON document per line. Blank lines are skipped; a line
    /// that does not parse is a structural violation for that record.
    pub fn validate_jsonl(&self, text: &str, options: &ValidateOptions) -> ValidationReport {
        self.validate_jsonl_bytes(text.as_bytes(), options)
    }

    /// Like [`Validator::validate_jsonl`], decoding each line separately so
    /// invalid UTF-8 stays confined to the record it appears in.
    pub fn validate_jsonl_bytes(&self, bytes: &[u8], options: &ValidateOptions) -> ValidationReport {
        let parsed: Vec<(usize, std::result::Result<Value, String>)> = bytes
            .split(|b| *b == b'\n')
            .enumerate()
            .map(|(i, line)| (i + 1, line.strip_suffix(b"\r").unwrap_or(line)))
            .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
            .map(|(number, line)| (number, parse_line(line)))
            .collect();

        let results = parsed
            .par_iter()
            .enumerate()
            .map(|(index, (line, record))| {
                let record = record.as_ref().map_err(String::as_str);
                self.check_record(index, Some(*line), record, options)
            })
            .collect();
        self.assemble(results, options)
    }

    fn check_record(
        &self,
        index: usize,
        line: Option<usize>,
        record: std::result::Result<&Value, &str>,
        options: &ValidateOptions,
    ) -> RecordResult {
        let to_issue = |f: Finding| ValidationIssue {
            entry_index: index,
            line,
            severity: f.kind.severity(),
            field: f.field,
            kind: f.kind,
            message: f.message,
        };

        let record = match record {
            Ok(value) => value,
            Err(error) => {
                return RecordResult {
                    issues: vec![to_issue(Finding {
                        field: "root".into(),
                        kind: IssueKind::StructuralViolation,
                        message: error.to_string(),
                    })],
                    structural_ok: false,
                    semantic_ok: false,
                    redactions: 0,
                    copy: None,
                };
            }
        };

        let mut findings = checks::structural(record, &self.schema);
        let structural_ok = findings
            .iter()
            .all(|f| f.kind != IssueKind::StructuralViolation);

        let mut redactions = 0;
        let copy = options.redact.then(|| {
            let (copy, hits) = self.redactor.redact_record(record);
            for hit in hits {
                redactions += hit.count;
                findings.push(Finding {
                    field: hit.field.to_string(),
                    kind: IssueKind::Redaction,
                    message: format!("{} match(es) of '{}' redacted", hit.count, hit.pattern),
                });
            }
            copy
        });

        let target = copy.as_ref().unwrap_or(record);
        let semantic_ok = target.as_object().is_some_and(|object| {
            let advisories = checks::semantic(object, &self.config.profile);
            let clean = advisories.is_empty();
            findings.extend(advisories);
            clean
        });

        if !structural_ok {
            tracing::debug!(index, ?line, "record failed structural checks");
        }

        RecordResult {
            issues: findings.into_iter().map(to_issue).collect(),
            structural_ok,
            semantic_ok,
            redactions,
            copy,
        }
    }

    fn assemble(&self, results: Vec<RecordResult>, options: &ValidateOptions) -> ValidationReport {
        let mut tally = Tally {
            total: results.len(),
            ..Tally::default()
        };
        let mut issues = Vec::new();
        let mut redaction_count = 0;
        let mut copies = Vec::new();

        for result in results {
            tally.structural_ok += usize::from(result.structural_ok);
            tally.semantic_ok += usize::from(result.semantic_ok);
            tally.redacted += usize::from(result.redactions > 0);
            redaction_count += result.redactions;
            issues.extend(result.issues);
            copies.extend(result.copy);
        }

        let counts = severity_counts(&issues);
        let hygiene_score = hygiene_score(&tally, &self.config.weights);
        let invalid_records = tally.total - tally.structural_ok;
        let verdict = if invalid_records == 0 && hygiene_score >= self.config.min_hygiene_score {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        tracing::info!(
            total = tally.total,
            invalid = invalid_records,
            hygiene_score,
            %verdict,
            "validation complete"
        );

        ValidationReport {
            total_records: tally.total,
            valid_records: tally.structural_ok,
            invalid_records,
            issues,
            structural_pass_rate: tally.structural_rate(),
            semantic_pass_rate: tally.semantic_rate(),
            redaction_rate: tally.redaction_rate(),
            redaction_count,
            hygiene_score,
            weights: self.config.weights.clone(),
            rating: rating(hygiene_score, &counts),
            verdict,
            severity_counts: counts,
            redacted_entries: options.redact.then_some(copies),
        }
    }
}

fn parse_line(line: &[u8]) -> std::result::Result<Value, String> {
    let text = std::str::from_utf8(line).map_err(|e| format!("invalid UTF-8: {e}"))?;
    serde_json::from_str(text).map_err(|e| format!("malformed JSON: {e}"))
}
