//! # Field Orchestrator
//!
//! Validates key/value pairs against a root schema. The root's
//! `properties` map is the lookup table: a key without an entry is accepted
//! unchanged without evaluation; a key with an entry is evaluated against
//! that sub-schema.
//!
//! On failure the reporter receives the key, the *original* value, and the
//! error, and the pair is left out of the accepted output.

use kvs_core::{KeyVal, Value};

use crate::error::EvalError;
use crate::eval::{evaluate_with, CoercionMode, EvalOptions};
use crate::report::Reporter;
use crate::schema::Schema;

/// A validation failure handed to a [`Reporter`].
#[derive(Debug, Clone, Copy)]
pub struct Diagnostic<'a> {
    pub key: &'a str,
    /// The value as it was before evaluation.
    pub value: &'a Value,
    pub error: &'a EvalError,
}

impl Diagnostic<'_> {
    pub fn to_owned_event(&self) -> Rejected {
        Rejected {
            pair: KeyVal::new(self.key, self.value.clone()),
            error: self.error.clone(),
        }
    }
}

/// A pair that failed validation, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub pair: KeyVal,
    pub error: EvalError,
}

/// Result of validating a batch of pairs. Both lists keep input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub accepted: Vec<KeyVal>,
    pub rejected: Vec<Rejected>,
}

/// Validates pairs against a borrowed root schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator<'s> {
    schema: &'s Schema,
    options: EvalOptions,
}

impl<'s> FieldValidator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            options: EvalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Validate one pair.
    ///
    /// # Errors
    ///
    /// Returns the evaluation error after it has been handed to `reporter`.
    pub fn validate<R: Reporter + ?Sized>(&self, pair: &KeyVal, reporter: &mut R) -> Result<KeyVal, EvalError> {
        let Some(sub) = self.schema.property(&pair.key) else {
            tracing::debug!(key = %pair.key, "no schema mapping for key, accepting as-is");
            return Ok(pair.clone());
        };

        match evaluate_with(sub, &pair.value, &self.options) {
            Ok(value) => Ok(KeyVal {
                key: pair.key.clone(),
                value,
            }),
            Err(error) => {
                let diagnostic = Diagnostic {
                    key: &pair.key,
                    value: &pair.value,
                    error: &error,
                };
                if let Err(sink_error) = reporter.report(&diagnostic) {
                    tracing::error!(key = %pair.key, error = %sink_error, "diagnostic sink failed");
                }
                Err(error)
            }
        }
    }

    /// Validate every pair, partitioning into accepted and rejected.
    pub fn validate_all<R: Reporter + ?Sized>(&self, pairs: &[KeyVal], reporter: &mut R) -> Partition {
        let mut partition = Partition {
            accepted: Vec::with_capacity(pairs.len()),
            rejected: Vec::new(),
        };
        for pair in pairs {
            match self.validate(pair, reporter) {
                Ok(accepted) => partition.accepted.push(accepted),
                Err(error) => partition.rejected.push(Rejected {
                    pair: pair.clone(),
                    error,
                }),
            }
        }
        partition
    }
}

/// Validate one pair against `schema`, coercing at the top level if `coerce`.
///
/// # Errors
///
/// Returns the evaluation error after it has been handed to `reporter`.
pub fn validate_pair<R: Reporter + ?Sized>(
    pair: &KeyVal,
    schema: &Schema,
    coerce: bool,
    reporter: &mut R,
) -> Result<KeyVal, EvalError> {
    let options = EvalOptions::default().with_coercion(CoercionMode::from_flag(coerce));
    FieldValidator::new(schema).with_options(options).validate(pair, reporter)
}
