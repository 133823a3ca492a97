//! # Key/Value Pairs and Record Documents
//!
//! A [`Record`] is the unit a batch driver validates: an identifier, a
//! source-collection label, and a flat list of [`KeyVal`] pairs.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "docid": "1234",
//!   "mls": "rets-properties-test",
//!   "data": [ { "key": "ListPrice", "value": "100000" } ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::KvsError;
use crate::value::Value;

/// A single key/value pair. A missing `value` reads as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyVal {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl KeyVal {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A record document carrying a batch of pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Document identifier.
    #[serde(rename = "docid")]
    pub doc_id: String,
    /// Label of the collection the record was sourced from.
    #[serde(rename = "mls")]
    pub source: String,
    #[serde(default)]
    pub data: Vec<KeyVal>,
}

impl Record {
    pub fn new(doc_id: impl Into<String>, source: impl Into<String>, data: Vec<KeyVal>) -> Self {
        Self {
            doc_id: doc_id.into(),
            source: source.into(),
            data,
        }
    }

    /// Parse a record from wire-format (JSON) text.
    ///
    /// # Errors
    ///
    /// Returns `KvsError::Parse` if the text is malformed or lacks the
    /// record fields.
    pub fn from_json_str(text: &str) -> Result<Self, KvsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// A copy of this record with `data` replaced.
    pub fn with_data(&self, data: Vec<KeyVal>) -> Self {
        Self {
            doc_id: self.doc_id.clone(),
            source: self.source.clone(),
            data,
        }
    }
}
