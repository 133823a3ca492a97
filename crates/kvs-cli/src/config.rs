//! # Configuration
//!
//! Validation settings read from an optional config file (`--config`),
//! JSON or YAML by extension. Explicit command-line flags override values
//! from the file; anything unset in both falls back to the defaults below.
//!
//! ```yaml
//! coercion: top-level     # off | top-level | recursive
//! max_depth: 128
//! reject_policy: drop-pair  # drop-pair | reject-record
//! report: tracing         # tracing | json
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use kvs_schema::{load_document, CoercionMode, EvalOptions, RejectPolicy, DEFAULT_MAX_DEPTH};

/// Where diagnostics for rejected pairs go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Warnings through the log subscriber.
    #[default]
    Tracing,
    /// One JSON object per rejected pair on stderr.
    Json,
}

/// Coercion setting as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoerceArg {
    Off,
    TopLevel,
    Recursive,
}

impl From<CoerceArg> for CoercionMode {
    fn from(arg: CoerceArg) -> Self {
        match arg {
            CoerceArg::Off => CoercionMode::Off,
            CoerceArg::TopLevel => CoercionMode::TopLevel,
            CoerceArg::Recursive => CoercionMode::Recursive,
        }
    }
}

/// Effective validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub coercion: CoercionMode,
    pub max_depth: usize,
    pub reject_policy: RejectPolicy,
    pub report: ReportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coercion: CoercionMode::Off,
            max_depth: DEFAULT_MAX_DEPTH,
            reject_policy: RejectPolicy::DropPair,
            report: ReportFormat::Tracing,
        }
    }
}

impl Config {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Config = load_document(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Read `path` if given, else use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions::default()
            .with_coercion(self.coercion)
            .with_max_depth(self.max_depth)
    }
}
