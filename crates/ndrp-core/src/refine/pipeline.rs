use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::enhancer::Enhancer;
use super::extractor::{extract, extract_one, CandidateRecord, RawRecord};
use super::standardizer::{standardize, StandardizeError};
use crate::config::RefineConfig;
use crate::entry::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Standardization,
    Enhancement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWarning {
    pub offset: usize,
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_in: usize,
    pub noise_dropped: usize,
    pub standardization_failures: usize,
    pub enhancement_warnings: usize,
    pub entries_out: usize,
    pub warnings: Vec<BatchWarning>,
}

impl BatchReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn dropped(&self) -> usize {
        self.noise_dropped + self.standardization_failures
    }

    /// Folds one record's outcome into the counters, handing back the entry
    /// to emit, if any.
    fn record(&mut self, outcome: RecordOutcome) -> Option<Entry> {
        self.total_in += 1;
        match outcome {
            RecordOutcome::Noise => {
                self.noise_dropped += 1;
                None
            }
            RecordOutcome::Failed { offset, error } => {
                self.standardization_failures += 1;
                self.warnings.push(BatchWarning {
                    offset,
                    stage: Stage::Standardization,
                    message: error.to_string(),
                });
                None
            }
            RecordOutcome::Refined { entry, warning } => {
                if let Some(w) = warning {
                    self.enhancement_warnings += 1;
                    self.warnings.push(w);
                }
                self.entries_out += 1;
                Some(entry)
            }
        }
    }
}

enum RecordOutcome {
    Noise,
    Failed {
        offset: usize,
        error: StandardizeError,
    },
    Refined {
        entry: Entry,
        warning: Option<BatchWarning>,
    },
}

pub struct RefineOutput {
    pub entries: Vec<Entry>,
    pub report: BatchReport,
}

/// Extraction, standardization and enhancement over a batch of raw records.
pub struct Pipeline {
    config: RefineConfig,
    enhancer: Enhancer,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: RefineConfig) -> Self {
        Self {
            config,
            enhancer: Enhancer::new(),
        }
    }

    #[must_use]
    pub fn with_enhancer(mut self, enhancer: Enhancer) -> Self {
        self.enhancer = enhancer;
        self
    }

    pub const fn config(&self) -> &RefineConfig {
        &self.config
    }

    pub fn run<I>(&self, records: I) -> RefineOutput
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut report = BatchReport::new();
        let mut entries = Vec::new();

        for candidate in extract(records, &self.config.noise) {
            if let Some(entry) = report.record(self.process(candidate)) {
                entries.push(entry);
            }
        }

        finish(entries, report)
    }

    /// Same result as [`Pipeline::run`], with records processed on the rayon
    /// pool. Outcomes are collected in input order before being folded.
    pub fn run_parallel(&self, records: &[RawRecord]) -> RefineOutput {
        let outcomes: Vec<RecordOutcome> = records
            .par_iter()
            .map(|record| self.process(extract_one(record, &self.config.noise)))
            .collect();

        let mut report = BatchReport::new();
        let entries = outcomes
            .into_iter()
            .filter_map(|outcome| report.record(outcome))
            .collect();

        finish(entries, report)
    }

    fn process(&self, candidate: CandidateRecord) -> RecordOutcome {
        if candidate.is_noise {
            tracing::debug!(
                offset = candidate.offset,
                reason = candidate.noise_reason().unwrap_or_default(),
                "dropping noise record"
            );
            return RecordOutcome::Noise;
        }

        let entry = match standardize(&candidate, &self.config.profile) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(offset = candidate.offset, %error, "standardization failed");
                return RecordOutcome::Failed {
                    offset: candidate.offset,
                    error,
                };
            }
        };

        match self.enhancer.enhance(&entry) {
            Ok(enhanced) => RecordOutcome::Refined {
                entry: enhanced,
                warning: None,
            },
            Err(error) => {
                tracing::warn!(
                    offset = candidate.offset,
                    %error,
                    "enhancement failed, keeping standardized entry"
                );
                RecordOutcome::Refined {
                    entry,
                    warning: Some(BatchWarning {
                        offset: candidate.offset,
                        stage: Stage::Enhancement,
                        message: error.to_string(),
                    }),
                }
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RefineConfig::default())
    }
}

fn finish(entries: Vec<Entry>, report: BatchReport) -> RefineOutput {
    tracing::info!(
        total_in = report.total_in,
        noise_dropped = report.noise_dropped,
        standardization_failures = report.standardization_failures,
        enhancement_warnings = report.enhancement_warnings,
        entries_out = report.entries_out,
        "refinement batch complete"
    );
    RefineOutput { entries, report }
}
