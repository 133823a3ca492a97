//! # Evaluation Errors
//!
//! `EvalError` is the result of a failed schema evaluation. Aggregates keep
//! their structure: a sequence failure lists every failing element by
//! index, and a mapping failure lists every failing property by key, so the
//! full instance path to each leaf failure can be recovered with
//! [`EvalError::violations`].

use std::fmt;

use kvs_core::TypeTag;
use serde::Serialize;
use thiserror::Error;

use crate::schema::{TypeName, TypeSet};

/// Error produced by evaluating a value against a schema node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The value's tag is not in the node's accepted set.
    #[error("type mismatch: value has type {observed}, expected one of {accepted}")]
    TypeMismatch {
        observed: TypeTag,
        accepted: TypeSet,
    },

    /// A string failed to coerce into every accepted candidate.
    #[error("{mismatch}; coercion of {input:?} failed: {}", join_causes(.causes))]
    CoercionFailure {
        /// The type mismatch that triggered coercion.
        mismatch: Box<EvalError>,
        /// The string that was being coerced.
        input: String,
        /// One cause per candidate, in candidate order.
        causes: Vec<CoercionCause>,
    },

    /// The node declares `items` but the value is not a sequence.
    #[error("value of type {observed} cannot be evaluated as an array")]
    NotASequence { observed: TypeTag },

    /// The node declares `properties` but the value is not a mapping.
    #[error("value of type {observed} cannot be evaluated as an object")]
    NotAMapping { observed: TypeTag },

    /// One or more sequence elements failed.
    #[error("{} of {len} array element(s) failed validation", .failures.len())]
    SequenceElementFailure {
        /// Number of elements in the sequence.
        len: usize,
        failures: Vec<ElementFailure>,
    },

    /// One or more declared mapping properties failed.
    #[error("{} object property(ies) failed validation: {}", .failures.len(), join_keys(.failures))]
    MappingPropertyFailure { failures: Vec<PropertyFailure> },

    /// Schema nesting went past the configured evaluation depth.
    #[error("schema nesting exceeds the maximum evaluation depth of {limit}")]
    DepthExceeded { limit: usize },
}

/// Why one coercion candidate failed.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionCause {
    pub candidate: TypeName,
    pub reason: String,
}

impl fmt::Display for CoercionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "to {}: {}", self.candidate, self.reason)
    }
}

/// A failing sequence element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFailure {
    pub index: usize,
    pub error: EvalError,
}

/// A failing mapping property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFailure {
    pub key: String,
    pub error: EvalError,
}

fn join_causes(causes: &[CoercionCause]) -> String {
    causes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_keys(failures: &[PropertyFailure]) -> String {
    failures
        .iter()
        .map(|f| f.key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl EvalError {
    /// Flatten this error into leaf violations addressed by JSON Pointer.
    ///
    /// Paths are relative to the value that was evaluated.
    pub fn violations(&self) -> ValidationViolations {
        let mut violations = Vec::new();
        self.collect_violations(String::new(), String::new(), &mut violations);
        ValidationViolations { violations }
    }

    fn collect_violations(&self, instance_path: String, schema_path: String, out: &mut Vec<Violation>) {
        match self {
            EvalError::SequenceElementFailure { failures, .. } => {
                for failure in failures {
                    failure.error.collect_violations(
                        format!("{instance_path}/{}", failure.index),
                        format!("{schema_path}/items"),
                        out,
                    );
                }
            }
            EvalError::MappingPropertyFailure { failures } => {
                for failure in failures {
                    let key = escape_pointer(&failure.key);
                    failure.error.collect_violations(
                        format!("{instance_path}/{key}"),
                        format!("{schema_path}/properties/{key}"),
                        out,
                    );
                }
            }
            EvalError::TypeMismatch { .. } | EvalError::CoercionFailure { .. } => out.push(Violation {
                instance_path,
                schema_path: format!("{schema_path}/type"),
                message: self.to_string(),
            }),
            EvalError::NotASequence { .. } => out.push(Violation {
                instance_path,
                schema_path: format!("{schema_path}/items"),
                message: self.to_string(),
            }),
            EvalError::NotAMapping { .. } => out.push(Violation {
                instance_path,
                schema_path: format!("{schema_path}/properties"),
                message: self.to_string(),
            }),
            EvalError::DepthExceeded { .. } => out.push(Violation {
                instance_path,
                schema_path,
                message: self.to_string(),
            }),
        }
    }
}

/// RFC 6901 token escaping.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// A single leaf violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating value.
    pub instance_path: String,
    /// JSON Pointer path within the schema that rejected it.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of leaf violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
