//! # Type Matcher
//!
//! Checks a value's runtime [`TypeTag`] against a node's accepted
//! [`TypeSet`]. This is a membership test on the value's current tag; it
//! never coerces.
//!
//! ## Numeric policy
//!
//! `number` accepts both integer- and floating-point-tagged values.
//! `integer` accepts only integer-tagged values, so `1.0` read from a
//! document does not satisfy `integer`.

use kvs_core::{TypeTag, Value};

use crate::error::EvalError;
use crate::schema::{TypeName, TypeSet};

/// True if a value tagged `tag` satisfies accepted type `name`.
pub fn tag_satisfies(tag: TypeTag, name: &TypeName) -> bool {
    match name {
        TypeName::Known(TypeTag::Number) => matches!(tag, TypeTag::Number | TypeTag::Integer),
        TypeName::Known(accepted) => *accepted == tag,
        TypeName::Unknown(_) => false,
    }
}

/// True if any accepted type admits `tag`.
pub fn accepts(types: &TypeSet, tag: TypeTag) -> bool {
    types.iter().any(|name| tag_satisfies(tag, name))
}

/// Check `value` against `types`.
///
/// # Errors
///
/// Returns `EvalError::TypeMismatch` carrying the observed tag and the full
/// accepted set when no accepted type admits the value.
pub fn check_type(value: &Value, types: &TypeSet) -> Result<TypeTag, EvalError> {
    let observed = value.tag();
    if accepts(types, observed) {
        Ok(observed)
    } else {
        Err(EvalError::TypeMismatch {
            observed,
            accepted: types.clone(),
        })
    }
}
