use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{bail, Context, Result};
use console::style;
use ndrp_core::{BatchReport, Pipeline};

use super::{load_config, RefineArgs};
use crate::input::{read_raw_records, ReadOptions};

pub fn run(args: &RefineArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("file not found: {}", args.input.display());
    }

    let config = load_config(args.config.as_deref())?;
    let options = ReadOptions {
        speaker_tags: args.speaker_tags,
        context: args.context.clone(),
    };
    let records = read_raw_records(&args.input, &options)?;

    let pipeline = Pipeline::new(config.refine());
    let output = if args.parallel {
        pipeline.run_parallel(&records)
    } else {
        pipeline.run(records)
    };

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    for entry in &output.entries {
        writeln!(writer, "{}", entry.to_json_line()?)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::debug!(
        path = %args.output.display(),
        entries = output.entries.len(),
        parallel = args.parallel,
        "wrote refined entries"
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&output.report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    print_summary(&output.report);
    eprintln!("  Output: {}", args.output.display());

    Ok(())
}

fn print_summary(report: &BatchReport) {
    for warning in &report.warnings {
        eprintln!(
            "  {} line {} ({:?}): {}",
            style("!").yellow(),
            warning.offset,
            warning.stage,
            warning.message
        );
    }

    eprintln!(
        "{} Refined {} records: {} dropped ({} noise, {} failed), {} enhancement warnings, {} entries out",
        style("✓").green(),
        report.total_in,
        report.dropped(),
        report.noise_dropped,
        report.standardization_failures,
        report.enhancement_warnings,
        style(report.entries_out).bold()
    );
}
