use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ScoringWeights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    StructuralViolation,
    SemanticAdvisory,
    UnknownField,
    Redaction,
}

impl IssueKind {
    pub const fn severity(self) -> Severity {
        match self {
            Self::StructuralViolation => Severity::Critical,
            Self::SemanticAdvisory => Severity::Medium,
            Self::Redaction => Severity::Low,
            Self::UnknownField => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Self; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Info,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Clean,
    NeedsAttention,
    Unsafe,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::NeedsAttention => write!(f, "needs_attention"),
            Self::Unsafe => write!(f, "unsafe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub entry_index: usize,
    /// 1-based source line when the record came from JSONL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub field: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub issues: Vec<ValidationIssue>,
    pub structural_pass_rate: f64,
    pub semantic_pass_rate: f64,
    pub redaction_rate: f64,
    pub redaction_count: usize,
    pub hygiene_score: f64,
    /// Component weights that produced `hygiene_score`.
    pub weights: ScoringWeights,
    pub rating: Rating,
    pub verdict: Verdict,
    pub severity_counts: BTreeMap<Severity, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redacted_entries: Option<Vec<Value>>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn issues_for(&self, entry_index: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.entry_index == entry_index)
    }
}

pub const MAX_SCORE: f64 = 100.0;
pub const CLEAN_THRESHOLD: f64 = 90.0;
pub const NEEDS_ATTENTION_THRESHOLD: f64 = 60.0;

/// Per-record outcome counts that feed the hygiene score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub total: usize,
    pub structural_ok: usize,
    pub semantic_ok: usize,
    pub redacted: usize,
}

impl Tally {
    fn rate(&self, count: usize, empty: f64) -> f64 {
        if self.total == 0 {
            empty
        } else {
            count as f64 / self.total as f64
        }
    }

    pub fn structural_rate(&self) -> f64 {
        self.rate(self.structural_ok, 1.0)
    }

    pub fn semantic_rate(&self) -> f64 {
        self.rate(self.semantic_ok, 1.0)
    }

    pub fn redaction_rate(&self) -> f64 {
        self.rate(self.redacted, 0.0)
    }
}

/// Weighted blend of the three component rates, scaled to 0..=100 and
/// rounded to one decimal.
pub(crate) fn hygiene_score(tally: &Tally, weights: &ScoringWeights) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return MAX_SCORE;
    }
    let blended = weights.structural * tally.structural_rate()
        + weights.semantic * tally.semantic_rate()
        + weights.redaction * (1.0 - tally.redaction_rate());
    let score = (MAX_SCORE * blended / total).clamp(0.0, MAX_SCORE);
    (score * 10.0).round() / 10.0
}

pub(crate) fn rating(score: f64, severity_counts: &BTreeMap<Severity, usize>) -> Rating {
    let critical = severity_counts.get(&Severity::Critical).copied().unwrap_or(0);
    if score >= CLEAN_THRESHOLD && critical == 0 {
        Rating::Clean
    } else if score >= NEEDS_ATTENTION_THRESHOLD {
        Rating::NeedsAttention
    } else {
        Rating::Unsafe
    }
}

pub(crate) fn severity_counts(issues: &[ValidationIssue]) -> BTreeMap<Severity, usize> {
    let mut counts: BTreeMap<Severity, usize> = Severity::ALL.iter().map(|s| (*s, 0)).collect();
    for issue in issues {
        *counts.entry(issue.severity).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueKind) -> ValidationIssue {
        ValidationIssue {
            entry_index: 0,
            line: None,
            field: "content".into(),
            kind,
            severity: kind.severity(),
            message: String::new(),
        }
    }

    #[test]
    fn test_empty_tally_scores_full() {
        let score = hygiene_score(&Tally::default(), &ScoringWeights::default());
        assert!((score - MAX_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weighted_blend() {
        let tally = Tally {
            total: 4,
            structural_ok: 4,
            semantic_ok: 2,
            redacted: 1,
        };
        // 100 * (0.5 * 1.0 + 0.3 * 0.5 + 0.2 * 0.75)
        let score = hygiene_score(&tally, &ScoringWeights::default());
        assert!((score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_are_normalized() {
        let tally = Tally {
            total: 2,
            structural_ok: 1,
            semantic_ok: 2,
            redacted: 0,
        };
        let weights = ScoringWeights {
            structural: 2.0,
            semantic: 1.0,
            redaction: 1.0,
        };
        // 100 * (2 * 0.5 + 1 + 1) / 4
        assert!((hygiene_score(&tally, &weights) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts_are_zero_filled() {
        let counts = severity_counts(&[issue(IssueKind::SemanticAdvisory)]);

        assert_eq!(counts.len(), Severity::ALL.len());
        assert_eq!(counts[&Severity::Medium], 1);
        assert_eq!(counts[&Severity::Critical], 0);
    }

    #[test]
    fn test_rating_tiers() {
        let clean = severity_counts(&[]);
        let critical = severity_counts(&[issue(IssueKind::StructuralViolation)]);

        assert_eq!(rating(95.0, &clean), Rating::Clean);
        assert_eq!(rating(95.0, &critical), Rating::NeedsAttention);
        assert_eq!(rating(60.0, &clean), Rating::NeedsAttention);
        assert_eq!(rating(59.9, &clean), Rating::Unsafe);
    }

    #[test]
    fn test_report_serializes_snake_case() {
        let value = serde_json::to_value(issue(IssueKind::StructuralViolation)).unwrap();
        assert_eq!(value["kind"], "structural_violation");
        assert_eq!(value["severity"], "critical");
        assert!(value.get("line").is_none());
    }
}
