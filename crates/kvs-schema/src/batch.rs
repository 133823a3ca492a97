//! # Record Batch Driver
//!
//! Runs the field orchestrator over every pair of a [`Record`] and decides
//! what a rejection means for the record as a whole.

use kvs_core::Record;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::eval::EvalOptions;
use crate::field::{FieldValidator, Rejected};
use crate::report::Reporter;
use crate::schema::Schema;

/// What a rejected pair means for its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectPolicy {
    /// Drop failing pairs and keep the rest of the record.
    #[default]
    DropPair,
    /// Fail the whole record if any pair fails.
    RejectRecord,
}

/// A validated record and the pairs removed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// The input record with `data` replaced by the accepted pairs.
    pub record: Record,
    pub rejected: Vec<Rejected>,
}

impl BatchOutcome {
    /// True when no pair was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Record-level failure under [`RejectPolicy::RejectRecord`].
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("record '{doc_id}' rejected: {} of {total} pair(s) failed validation", .rejected.len())]
    RecordRejected {
        doc_id: String,
        total: usize,
        rejected: Vec<Rejected>,
    },
}

/// Validate every pair of `record` against `schema`.
///
/// Every failing pair is handed to `reporter` before the policy is applied.
///
/// # Errors
///
/// Returns `BatchError::RecordRejected` under `RejectPolicy::RejectRecord`
/// when at least one pair fails.
pub fn validate_record<R: Reporter + ?Sized>(
    record: &Record,
    schema: &Schema,
    options: &EvalOptions,
    policy: RejectPolicy,
    reporter: &mut R,
) -> Result<BatchOutcome, BatchError> {
    let partition = FieldValidator::new(schema)
        .with_options(*options)
        .validate_all(&record.data, reporter);

    tracing::info!(
        doc_id = %record.doc_id,
        source = %record.source,
        accepted = partition.accepted.len(),
        rejected = partition.rejected.len(),
        "validated record"
    );

    if policy == RejectPolicy::RejectRecord && !partition.rejected.is_empty() {
        return Err(BatchError::RecordRejected {
            doc_id: record.doc_id.clone(),
            total: record.data.len(),
            rejected: partition.rejected,
        });
    }

    Ok(BatchOutcome {
        record: record.with_data(partition.accepted),
        rejected: partition.rejected,
    })
}
