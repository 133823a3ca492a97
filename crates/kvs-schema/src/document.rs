//! # Document Loading
//!
//! Reads schema and record documents from disk. The format is chosen by
//! file extension: `.yaml` / `.yml` are YAML, everything else is JSON.

use std::path::Path;

use kvs_core::Record;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::schema::{Schema, SchemaError};

/// Error loading or writing a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read, parsed, or written.
    #[error("document load error for '{path}': {reason}")]
    Load { path: String, reason: String },

    /// The file parsed but is not a valid schema.
    #[error("schema error for '{path}': {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },
}

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

fn read(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|e| DocumentError::Load {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })
}

/// Load and deserialize any document.
///
/// # Errors
///
/// Returns `DocumentError::Load` if the file cannot be read or parsed.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let content = read(path)?;
    let parsed = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}")),
        DocumentFormat::Json => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    };
    parsed.map_err(|reason| DocumentError::Load {
        path: path.display().to_string(),
        reason,
    })
}

/// Load a schema document.
///
/// # Errors
///
/// Returns `DocumentError::Load` if the file cannot be read and
/// `DocumentError::Schema` if its content is not a valid schema.
pub fn load_schema(path: &Path) -> Result<Schema, DocumentError> {
    let content = read(path)?;
    let parsed = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => Schema::from_yaml_str(&content),
        DocumentFormat::Json => Schema::from_json_str(&content),
    };
    parsed.map_err(|source| DocumentError::Schema {
        path: path.display().to_string(),
        source,
    })
}

/// Load a record document.
///
/// # Errors
///
/// Returns `DocumentError::Load` if the file cannot be read or is not a record.
pub fn load_record(path: &Path) -> Result<Record, DocumentError> {
    load_document(path)
}

/// Serialize `value` to `path` (pretty JSON, or YAML by extension).
///
/// # Errors
///
/// Returns `DocumentError::Load` if encoding or writing fails.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), DocumentError> {
    let fail = |reason: String| DocumentError::Load {
        path: path.display().to_string(),
        reason,
    };
    let mut content = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(|e| fail(format!("cannot encode YAML: {e}")))?,
        DocumentFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| fail(format!("cannot encode JSON: {e}")))?
        }
    };
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(path, content).map_err(|e| fail(format!("cannot write file: {e}")))
}
