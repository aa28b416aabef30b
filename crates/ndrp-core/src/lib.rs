#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod entry;
pub mod error;
pub mod profile;
pub mod refine;
pub mod validate;

pub use config::{
    Config, NoiseConfig, ProfileThresholds, RedactionConfig, RedactionPattern, RefineConfig,
    ScoringWeights, ValidatorConfig,
};
pub use entry::{Density, Entropy, Entry, Level, Mode, Role, Structure};
pub use error::{Error, Result};
pub use profile::TextProfile;
pub use refine::{
    classify, classify_detailed, extract, from_fn, standardize, BatchReport, BatchWarning,
    CandidateRecord, Classification, ConfidenceTier, EnhanceError, EnhancementStep, Enhancer,
    Pipeline, RawRecord, RefineOutput, Stage, StandardizeError,
};
pub use validate::{
    EntrySchema, FieldKind, FieldSpec, IssueKind, Rating, Redactor, Severity, ValidateOptions,
    ValidationIssue, ValidationReport, Validator, Verdict,
};
