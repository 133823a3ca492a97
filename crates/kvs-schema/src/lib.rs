//! # kvs-schema — Schema-Directed Key/Value Validation
//!
//! Validates flat collections of key/value pairs against a recursive,
//! declarative schema, optionally coercing stringified primitives into
//! their declared types. Failing pairs are reported and dropped; the rest
//! of the batch is unaffected.
//!
//! ## Pipeline
//!
//! ```text
//! caller ─▶ field (per pair) ─▶ eval (recursive) ─▶ matcher / coerce
//!                │                                        │
//!                └──── report (on failure) ◀── error ─────┘
//! ```
//!
//! - [`schema`] — the owned schema tree and schema-document parsing.
//! - [`matcher`] — classifies a value's tag against an accepted type set.
//! - [`coerce`] — ordered best-effort string coercion.
//! - [`eval`] — the recursive evaluator.
//! - [`field`] — per-pair orchestration against a root schema.
//! - [`report`] — the diagnostic sink contract and stock sinks.
//! - [`batch`] — record-level driver with reject policies.
//! - [`document`] — JSON/YAML document loading.
//!
//! ## Crate Policy
//!
//! - Depends only on `kvs-core` internally.
//! - Evaluation is a pure function of (schema, value, options); the
//!   reporter is the only side effect and is always passed explicitly.
//! - Aggregate errors keep their index/key structure so every failure can
//!   be traced to an instance path.

pub mod batch;
pub mod coerce;
pub mod document;
pub mod error;
pub mod eval;
pub mod field;
pub mod matcher;
pub mod report;
pub mod schema;

pub use batch::{validate_record, BatchError, BatchOutcome, RejectPolicy};
pub use document::{load_document, load_record, load_schema, write_document, DocumentError, DocumentFormat};
pub use error::{
    CoercionCause, ElementFailure, EvalError, PropertyFailure, ValidationViolations, Violation,
};
pub use eval::{evaluate, evaluate_with, CoercionMode, EvalOptions, DEFAULT_MAX_DEPTH};
pub use field::{validate_pair, Diagnostic, FieldValidator, Partition, Rejected};
pub use report::{
    report_fn, CollectingReporter, JsonLinesReporter, ReportError, Reporter,
    TracingReporter,
};
pub use schema::{Schema, SchemaError, TypeName, TypeSet};
