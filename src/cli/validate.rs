use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use console::style;
use ndrp_core::{
    EntrySchema, IssueKind, Severity, ValidateOptions, ValidationReport, Validator, Verdict,
};
use serde::Serialize;

use super::{load_config, ValidateArgs};
use crate::integrity;

/// Machine-readable report written by `--report`.
#[derive(Serialize)]
struct ReportEnvelope<'a> {
    source: String,
    sha256: String,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    report: &'a ValidationReport,
}

pub fn run(args: &ValidateArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("file not found: {}", args.input.display());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(min) = args.min_score {
        if !(0.0..=100.0).contains(&min) {
            bail!("--min-score must be within 0..=100, got {min}");
        }
        config.min_hygiene_score = min;
    }

    let schema = match &args.schema {
        Some(path) => EntrySchema::load(path)
            .with_context(|| format!("failed to load schema {}", path.display()))?,
        None => EntrySchema::ndrp_v1(),
    };
    let validator = Validator::new(schema, config.validator())?;

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let options = ValidateOptions {
        redact: args.redact || args.redacted_output.is_some(),
    };

    eprintln!("Validating dataset: {}", args.input.display());
    let report = validator.validate_jsonl_bytes(&bytes, &options);
    print_report(&report);

    if let Some(path) = &args.report {
        write_envelope(path, &args.input, validator.schema(), &report)?;
    }
    if let Some(path) = &args.redacted_output {
        write_redacted(path, &report)?;
    }

    if report.verdict == Verdict::Fail {
        bail!(
            "validation failed: {} structurally invalid, hygiene score {:.1} (minimum {:.1})",
            report.invalid_records,
            report.hygiene_score,
            validator.config().min_hygiene_score
        );
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in &report.issues {
        let location = issue
            .line
            .map_or_else(|| format!("entry {}", issue.entry_index), |l| format!("line {l}"));
        let marker = match issue.kind {
            IssueKind::StructuralViolation => style("✗").red().bold(),
            IssueKind::SemanticAdvisory => style("!").yellow(),
            IssueKind::Redaction => style("#").cyan(),
            IssueKind::UnknownField => style("?").dim(),
        };
        eprintln!(
            "  {marker} {location}: at `{}`: {}",
            issue.field, issue.message
        );
    }

    eprintln!();
    eprintln!("Valid entries:   {}", report.valid_records);
    eprintln!("Invalid entries: {}", report.invalid_records);
    if report.redaction_count > 0 {
        eprintln!("Redactions:      {}", report.redaction_count);
    }
    let warnings = report.severity_counts.get(&Severity::Medium).copied().unwrap_or(0);
    if warnings > 0 {
        eprintln!("Advisories:      {warnings}");
    }
    eprintln!(
        "Hygiene score:   {:.1} ({})",
        report.hygiene_score, report.rating
    );

    let verdict = match report.verdict {
        Verdict::Pass => style("pass").green().bold(),
        Verdict::Fail => style("fail").red().bold(),
    };
    eprintln!("Verdict: {verdict}");
}

fn write_envelope(
    path: &Path,
    input: &Path,
    schema: &EntrySchema,
    report: &ValidationReport,
) -> Result<()> {
    let envelope = ReportEnvelope {
        source: input.display().to_string(),
        sha256: integrity::sha256_file(input)?,
        generated_at: Utc::now().to_rfc3339(),
        schema: schema.id.as_deref(),
        report,
    };
    let json = serde_json::to_string_pretty(&envelope)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    tracing::debug!(path = %path.display(), sha256 = %envelope.sha256, "wrote validation report");
    Ok(())
}

fn write_redacted(path: &Path, report: &ValidationReport) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0usize;
    for copy in report.redacted_entries.iter().flatten() {
        writeln!(writer, "{copy}")?;
        written += 1;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = written, "wrote redacted copies");
    Ok(())
}
