pub mod refine;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ndrp_core::Config;

#[derive(Parser)]
#[command(
    name = "ndrp",
    about = "Refine raw text into NDRP fine-tuning entries and validate entry datasets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refine raw text (one record per line) into JSONL entries
    Refine(RefineArgs),
    /// Check a JSONL dataset against the entry schema and score its hygiene
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct RefineArgs {
    /// Raw text file, one record per line
    pub input: PathBuf,
    /// Destination JSONL file
    pub output: PathBuf,
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Context attached to every entry (persona or system prompt)
    #[arg(long)]
    pub context: Option<String>,
    /// Treat leading "User:" / "Assistant:" prefixes as role markers
    #[arg(long)]
    pub speaker_tags: bool,
    /// Process records on all cores
    #[arg(long)]
    pub parallel: bool,
    /// Write the batch report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// JSONL file of entries
    pub input: PathBuf,
    /// Write the validation report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Redact sensitive substrings in report copies
    #[arg(long)]
    pub redact: bool,
    /// Write redacted copies as JSONL (implies --redact)
    #[arg(long)]
    pub redacted_output: Option<PathBuf>,
    /// JSON schema to validate against instead of the built-in NDRP-1.0 shape
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Minimum hygiene score for a passing verdict (0-100)
    #[arg(long)]
    pub min_score: Option<f64>,
}

/// Loads the configuration file, if any, then applies `NDRP_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p).with_context(|| format!("failed to load config {}", p.display()))?,
        None => Config::default(),
    };
    config
        .with_env_overrides()
        .context("invalid configuration override")
}
