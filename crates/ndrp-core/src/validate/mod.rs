mod checks;
mod redact;
mod report;
mod schema;
mod validator;

pub use redact::{RedactionHit, Redactor, REDACTED_FIELDS};
pub use report::{IssueKind, Rating, Severity, ValidationIssue, ValidationReport, Verdict};
pub use schema::{EntrySchema, FieldKind, FieldSpec};
pub use validator::{ValidateOptions, Validator};
