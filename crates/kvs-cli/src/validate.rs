//! # Validate Subcommand
//!
//! Validates one record document against a schema document and writes the
//! cleaned record. Rejected pairs are reported through the configured
//! sink and can additionally be written to a file with `--rejected`.
//!
//! Exit codes: 0 when the record is written, 1 when the record is rejected
//! (`--strict`) or when any pair is rejected under `--fail-on-reject`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use kvs_core::Value;
use kvs_schema::{
    load_record, load_schema, validate_record, write_document, BatchError, JsonLinesReporter,
    RejectPolicy, Rejected, Reporter, TracingReporter, Violation,
};

use crate::config::{CoerceArg, Config, ReportFormat};

/// Arguments for the `kvs validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document (JSON or YAML).
    #[arg(long, short = 's')]
    pub schema: PathBuf,

    /// Record document to validate.
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Coerce stringified values into their declared types. A bare `--coerce`
    /// coerces at the top level only; pick a mode with `--coerce=<MODE>`.
    #[arg(
        long,
        value_enum,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "top-level"
    )]
    pub coerce: Option<CoerceArg>,

    /// Maximum schema nesting followed during evaluation.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Reject the whole record if any pair fails.
    #[arg(long)]
    pub strict: bool,

    /// Diagnostic sink for rejected pairs.
    #[arg(long, value_enum)]
    pub report: Option<ReportFormat>,

    /// Write the cleaned record here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write rejected pairs to this file.
    #[arg(long)]
    pub rejected: Option<PathBuf>,

    /// Exit with status 1 if any pair was rejected.
    #[arg(long)]
    pub fail_on_reject: bool,
}

impl ValidateArgs {
    /// Merge flags over `config`.
    pub fn settings(&self, config: &Config) -> Config {
        let mut settings = config.clone();
        if let Some(coerce) = self.coerce {
            settings.coercion = coerce.into();
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if self.strict {
            settings.reject_policy = RejectPolicy::RejectRecord;
        }
        if let Some(report) = self.report {
            settings.report = report;
        }
        settings
    }
}

/// A rejected pair as written by `--rejected`.
#[derive(Debug, Serialize)]
struct RejectedEntry<'a> {
    key: &'a str,
    value: &'a Value,
    error: String,
    violations: Vec<Violation>,
}

impl<'a> From<&'a Rejected> for RejectedEntry<'a> {
    fn from(rejected: &'a Rejected) -> Self {
        Self {
            key: &rejected.pair.key,
            value: &rejected.pair.value,
            error: rejected.error.to_string(),
            violations: rejected.error.violations().into_inner(),
        }
    }
}

fn write_rejected(path: &Path, rejected: &[Rejected]) -> Result<()> {
    let entries: Vec<RejectedEntry<'_>> = rejected.iter().map(RejectedEntry::from).collect();
    write_document(path, &entries).context("failed to write rejected pairs")
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &Config) -> Result<u8> {
    let settings = args.settings(config);
    let schema = load_schema(&args.schema).context("failed to load schema")?;
    let record = load_record(&args.record).context("failed to load record")?;

    tracing::info!(
        schema = %args.schema.display(),
        record = %args.record.display(),
        pairs = record.data.len(),
        coercion = ?settings.coercion,
        "validating record"
    );

    let mut reporter: Box<dyn Reporter> = match settings.report {
        ReportFormat::Tracing => Box::new(TracingReporter::new()),
        ReportFormat::Json => Box::new(JsonLinesReporter::new(std::io::stderr())),
    };

    let outcome = validate_record(
        &record,
        &schema,
        &settings.eval_options(),
        settings.reject_policy,
        reporter.as_mut(),
    );

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(BatchError::RecordRejected { doc_id, total, rejected }) => {
            if let Some(path) = &args.rejected {
                write_rejected(path, &rejected)?;
            }
            eprintln!(
                "REJECTED: record '{doc_id}': {} of {total} pair(s) failed validation",
                rejected.len()
            );
            return Ok(1);
        }
    };

    if let Some(path) = &args.rejected {
        write_rejected(path, &outcome.rejected)?;
    }

    match &args.output {
        Some(path) => write_document(path, &outcome.record).context("failed to write record")?,
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &outcome.record)?;
            writeln!(stdout)?;
        }
    }

    eprintln!(
        "Record '{}': {}/{} pair(s) accepted",
        outcome.record.doc_id,
        outcome.record.data.len(),
        record.data.len()
    );

    if args.fail_on_reject && !outcome.is_clean() {
        Ok(1)
    } else {
        Ok(0)
    }
}
