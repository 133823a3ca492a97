//! # Coercion Engine
//!
//! Best-effort conversion of a string into one of a node's accepted types.
//! Candidates are tried in declaration order and the first success wins:
//!
//! | candidate | succeeds when                                          |
//! |-----------|--------------------------------------------------------|
//! | `null`    | always (the string content is ignored)                 |
//! | `boolean` | the string is exactly `true` or `false`                |
//! | `integer` | the string is a signed decimal `i64`                   |
//! | `number`  | integer grammar first, then finite floating point      |
//! | `array`   | the string is a JSON sequence literal                  |
//! | `object`  | the string is a JSON mapping literal                   |
//!
//! Any other candidate (including `string`) fails immediately.

use kvs_core::{TypeTag, Value};

use crate::error::CoercionCause;
use crate::schema::{TypeName, TypeSet};

/// Coerce `input` into the first candidate of `types` that accepts it.
///
/// # Errors
///
/// Returns one [`CoercionCause`] per candidate, in candidate order, when
/// every candidate fails.
pub fn coerce_string(input: &str, types: &TypeSet) -> Result<Value, Vec<CoercionCause>> {
    let mut causes = Vec::with_capacity(types.len());
    for candidate in types.iter() {
        match coerce_to(input, candidate) {
            Ok(value) => {
                tracing::debug!(input, candidate = %candidate, "coerced string value");
                return Ok(value);
            }
            Err(reason) => causes.push(CoercionCause {
                candidate: candidate.clone(),
                reason,
            }),
        }
    }
    Err(causes)
}

/// Attempt a single candidate.
pub fn coerce_to(input: &str, candidate: &TypeName) -> Result<Value, String> {
    let tag = match candidate {
        TypeName::Known(tag) => *tag,
        TypeName::Unknown(name) => return Err(format!("cannot coerce to unknown type '{name}'")),
    };
    match tag {
        TypeTag::Null => Ok(Value::Null),
        TypeTag::Boolean => match input {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err("only the literals \"true\" and \"false\" are accepted".to_string()),
        },
        TypeTag::Integer => parse_integer(input),
        TypeTag::Number => parse_integer(input).or_else(|int_err| {
            parse_float(input).map_err(|float_err| format!("{int_err}; {float_err}"))
        }),
        TypeTag::Array | TypeTag::Object => {
            Value::parse_json_as(input, tag).map_err(|e| format!("not a JSON {tag} literal: {e}"))
        }
        TypeTag::String => Err("string is not a coercion target".to_string()),
    }
}

fn parse_integer(input: &str) -> Result<Value, String> {
    input
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|e| format!("not an integer: {e}"))
}

fn parse_float(input: &str) -> Result<Value, String> {
    match input.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Value::Number(n)),
        Ok(_) => Err("not a finite number".to_string()),
        Err(e) => Err(format!("not a float: {e}")),
    }
}
