//! # Evaluator
//!
//! Schema-directed recursive evaluation. For one node and one value the
//! steps run in a fixed order:
//!
//! 1. **type** — match the value's tag; on a string-vs-non-string mismatch
//!    with coercion enabled, coerce instead of failing.
//! 2. **items** — require a sequence and evaluate every element.
//! 3. **properties** — require a mapping and evaluate every declared key;
//!    undeclared keys pass through unchanged.
//!
//! Sequences and mappings are all-or-nothing: any failing element or
//! declared property fails the whole node with an aggregate of every
//! failure, and no partially-valid container is ever returned.
//!
//! The input value is never mutated; a new value is built only when a step
//! rewrites something.

use std::borrow::Cow;

use kvs_core::{Map, Value};
use serde::{Deserialize, Serialize};

use crate::coerce::coerce_string;
use crate::error::{ElementFailure, EvalError, PropertyFailure};
use crate::matcher::check_type;
use crate::schema::Schema;

/// Default limit on schema nesting followed during one evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Where string coercion is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoercionMode {
    /// Never coerce.
    #[default]
    Off,
    /// Coerce only at the node being evaluated, not inside its elements or
    /// properties.
    TopLevel,
    /// Coerce at every node.
    Recursive,
}

impl CoercionMode {
    /// Map the boolean coercion flag: `true` coerces at the top level only.
    pub fn from_flag(coerce: bool) -> Self {
        if coerce {
            CoercionMode::TopLevel
        } else {
            CoercionMode::Off
        }
    }

    pub fn is_enabled(self) -> bool {
        !matches!(self, CoercionMode::Off)
    }

    /// Mode applied to element and property recursion.
    fn nested(self) -> Self {
        match self {
            CoercionMode::Recursive => CoercionMode::Recursive,
            CoercionMode::Off | CoercionMode::TopLevel => CoercionMode::Off,
        }
    }
}

/// Options for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    pub coercion: CoercionMode,
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            coercion: CoercionMode::Off,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvalOptions {
    pub fn with_coercion(mut self, coercion: CoercionMode) -> Self {
        self.coercion = coercion;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Evaluate `value` against `schema`, coercing at the top level if `coerce`.
///
/// # Errors
///
/// Returns the structured [`EvalError`] describing every failure found.
pub fn evaluate(schema: &Schema, value: &Value, coerce: bool) -> Result<Value, EvalError> {
    let options = EvalOptions::default().with_coercion(CoercionMode::from_flag(coerce));
    evaluate_with(schema, value, &options)
}

/// Evaluate `value` against `schema` with explicit options.
///
/// # Errors
///
/// Returns the structured [`EvalError`] describing every failure found, or
/// `EvalError::DepthExceeded` when nesting passes `options.max_depth`.
pub fn evaluate_with(schema: &Schema, value: &Value, options: &EvalOptions) -> Result<Value, EvalError> {
    eval_node(schema, value, options.coercion, 0, options.max_depth)
}

fn eval_node(
    schema: &Schema,
    value: &Value,
    coercion: CoercionMode,
    depth: usize,
    max_depth: usize,
) -> Result<Value, EvalError> {
    if depth > max_depth {
        return Err(EvalError::DepthExceeded { limit: max_depth });
    }

    let mut current = Cow::Borrowed(value);

    if let Some(types) = &schema.types {
        if let Err(mismatch) = check_type(value, types) {
            let input = match value {
                Value::String(s) if coercion.is_enabled() => s,
                _ => return Err(mismatch),
            };
            match coerce_string(input, types) {
                Ok(coerced) => current = Cow::Owned(coerced),
                Err(causes) => {
                    return Err(EvalError::CoercionFailure {
                        mismatch: Box::new(mismatch),
                        input: input.clone(),
                        causes,
                    })
                }
            }
        }
    }

    let nested = coercion.nested();

    if let Some(items) = &schema.items {
        let elements = match current.as_ref() {
            Value::Array(elements) => elements,
            other => return Err(EvalError::NotASequence { observed: other.tag() }),
        };
        let mut accepted = Vec::with_capacity(elements.len());
        let mut failures = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            match eval_node(items, element, nested, depth + 1, max_depth) {
                Ok(v) => accepted.push(v),
                Err(error) => failures.push(ElementFailure { index, error }),
            }
        }
        if !failures.is_empty() {
            return Err(EvalError::SequenceElementFailure {
                len: elements.len(),
                failures,
            });
        }
        current = Cow::Owned(Value::Array(accepted));
    }

    if let Some(properties) = &schema.properties {
        let fields = match current.as_ref() {
            Value::Object(fields) => fields,
            other => return Err(EvalError::NotAMapping { observed: other.tag() }),
        };
        let mut accepted = Map::new();
        let mut failures = Vec::new();
        for (key, field) in fields {
            let Some(sub) = properties.get(key) else {
                accepted.insert(key.clone(), field.clone());
                continue;
            };
            match eval_node(sub, field, nested, depth + 1, max_depth) {
                Ok(v) => {
                    accepted.insert(key.clone(), v);
                }
                Err(error) => failures.push(PropertyFailure {
                    key: key.clone(),
                    error,
                }),
            }
        }
        if !failures.is_empty() {
            return Err(EvalError::MappingPropertyFailure { failures });
        }
        current = Cow::Owned(Value::Object(accepted));
    }

    Ok(current.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvs_core::TypeTag;
    use proptest::prelude::*;
    use serde_json::json;

    fn schema(doc: serde_json::Value) -> Schema {
        Schema::from_json_value(doc).unwrap()
    }

    fn value(doc: serde_json::Value) -> Value {
        Value::from(doc)
    }

    #[test]
    fn test_scalar_match_is_unchanged() {
        let s = schema(json!({"type": "integer"}));
        assert_eq!(evaluate(&s, &value(json!(100000)), false).unwrap(), value(json!(100000)));
        assert_eq!(evaluate(&s, &value(json!(100000)), true).unwrap(), value(json!(100000)));
    }

    #[test]
    fn test_coercion_disabled_propagates_mismatch() {
        let s = schema(json!({"type": "integer"}));
        let err = evaluate(&s, &value(json!("100000")), false).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { observed: TypeTag::String, .. }));
    }

    #[test]
    fn test_coercion_enabled_rewrites_string() {
        let s = schema(json!({"type": "integer"}));
        assert_eq!(evaluate(&s, &value(json!("100000")), true).unwrap(), Value::Integer(100_000));
    }

    #[test]
    fn test_non_string_mismatch_never_coerces() {
        let s = schema(json!({"type": "string"}));
        let err = evaluate(&s, &value(json!(0)), true).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { observed: TypeTag::Integer, .. }));

        let s = schema(json!({"type": "integer"}));
        let err = evaluate(&s, &value(json!(100000.10)), true).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { observed: TypeTag::Number, .. }));
    }

    #[test]
    fn test_failed_coercion_joins_mismatch_and_causes() {
        let s = schema(json!({"type": "boolean"}));
        let err = evaluate(&s, &value(json!("Nah")), true).unwrap_err();
        match err {
            EvalError::CoercionFailure { mismatch, input, causes } => {
                assert!(matches!(*mismatch, EvalError::TypeMismatch { .. }));
                assert_eq!(input, "Nah");
                assert_eq!(causes.len(), 1);
            }
            other => panic!("expected CoercionFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_number_order_yields_float() {
        let s = schema(json!({"type": ["integer", "number"]}));
        assert_eq!(
            evaluate(&s, &value(json!("100000.10")), true).unwrap(),
            Value::Number(100_000.10)
        );
    }

    #[test]
    fn test_array_of_strings_accepted() {
        let s = schema(json!({"type": "array", "items": {"type": "string"}}));
        let v = value(json!(["microwave", "oven", "fridge"]));
        assert_eq!(evaluate(&s, &v, false).unwrap(), v);
    }

    #[test]
    fn test_array_is_all_or_nothing() {
        let s = schema(json!({"type": "array", "items": {"type": "string"}}));
        let err = evaluate(&s, &value(json!(["a", 10, "c", false])), false).unwrap_err();
        match err {
            EvalError::SequenceElementFailure { len, failures } => {
                assert_eq!(len, 4);
                let indexes: Vec<usize> = failures.iter().map(|f| f.index).collect();
                assert_eq!(indexes, vec![1, 3]);
            }
            other => panic!("expected SequenceElementFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_items_require_sequence() {
        let s = schema(json!({"items": {"type": "string"}}));
        let err = evaluate(&s, &value(json!("[\"a\"]")), true).unwrap_err();
        assert_eq!(err, EvalError::NotASequence { observed: TypeTag::String });
    }

    #[test]
    fn test_stringified_array_coerced_then_items_checked() {
        let s = schema(json!({"type": "array", "items": {"type": "string"}}));
        assert_eq!(
            evaluate(&s, &value(json!("[\"a\", \"b\", \"c\"]")), true).unwrap(),
            value(json!(["a", "b", "c"]))
        );
        let err = evaluate(&s, &value(json!("[\"a\", 1]")), true).unwrap_err();
        assert!(matches!(err, EvalError::SequenceElementFailure { .. }));
    }

    #[test]
    fn test_unspecified_items_accept_anything() {
        let s = schema(json!({"type": "array"}));
        let v = value(json!(["we", 1, "are", false, ["allowed"]]));
        assert_eq!(evaluate(&s, &v, false).unwrap(), v);
    }

    #[test]
    fn test_object_properties() {
        let s = schema(json!({
            "type": "object",
            "properties": { "someKey": { "type": "string" } }
        }));
        let v = value(json!({"someKey": "someVal", "extra": 1}));
        assert_eq!(evaluate(&s, &v, false).unwrap(), v);
    }

    #[test]
    fn test_object_is_all_or_nothing_and_lists_every_key() {
        let s = schema(json!({
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "integer" },
                "c": { "type": "boolean" }
            }
        }));
        let err = evaluate(&s, &value(json!({"a": 1, "b": 2, "c": "x"})), false).unwrap_err();
        match err {
            EvalError::MappingPropertyFailure { failures } => {
                let keys: Vec<&str> = failures.iter().map(|f| f.key.as_str()).collect();
                assert_eq!(keys, vec!["a", "c"]);
            }
            other => panic!("expected MappingPropertyFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_properties_require_mapping() {
        let s = schema(json!({"type": "object", "properties": {"someKey": {"type": "string"}}}));
        let err = evaluate(&s, &value(json!(["I", "should", "be", "an", "obj"])), false).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { observed: TypeTag::Array, .. }));

        let s = schema(json!({"properties": {"someKey": {"type": "string"}}}));
        let err = evaluate(&s, &value(json!(["x"])), false).unwrap_err();
        assert_eq!(err, EvalError::NotAMapping { observed: TypeTag::Array });
    }

    #[test]
    fn test_top_level_coercion_is_not_propagated() {
        let s = schema(json!({
            "type": "object",
            "properties": { "TimezoneStdOffset": { "type": "integer" } }
        }));
        let v = value(json!({"TimezoneStdOffset": "-8"}));
        assert!(evaluate(&s, &v, true).is_err());

        let s = schema(json!({"type": "array", "items": {"type": "integer"}}));
        assert!(evaluate(&s, &value(json!(["1", "2"])), true).is_err());
    }

    #[test]
    fn test_recursive_coercion_reaches_nested_nodes() {
        let s = schema(json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "TimezoneStdOffset": { "type": "integer" },
                    "ObservesDLS": { "type": "boolean" }
                }
            }
        }));
        let v = value(json!([{"TimezoneStdOffset": "-8", "ObservesDLS": "true", "Name": "x"}]));
        let options = EvalOptions::default().with_coercion(CoercionMode::Recursive);
        assert_eq!(
            evaluate_with(&s, &v, &options).unwrap(),
            value(json!([{"TimezoneStdOffset": -8, "ObservesDLS": true, "Name": "x"}]))
        );
    }

    #[test]
    fn test_depth_limit() {
        let s = schema(json!({"items": {"items": {"items": {"type": "integer"}}}}));
        let v = value(json!([[[1]]]));
        assert!(evaluate_with(&s, &v, &EvalOptions::default().with_max_depth(3)).is_ok());

        let err = evaluate_with(&s, &v, &EvalOptions::default().with_max_depth(2)).unwrap_err();
        let leaf = &err.violations().into_inner()[0];
        assert_eq!(leaf.instance_path, "/0/0/0");
        assert!(leaf.message.contains("maximum evaluation depth of 2"));
    }

    #[test]
    fn test_nested_failure_path() {
        let s = schema(json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "Timezone": {
                        "type": "object",
                        "properties": { "ObservesDLS": { "type": "boolean" } }
                    }
                }
            }
        }));
        let v = value(json!([
            {"Timezone": {"ObservesDLS": true}},
            {"Timezone": "im a string now"}
        ]));
        let err = evaluate(&s, &v, false).unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].instance_path, "/1/Timezone");
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e6f64..1.0e6f64).prop_map(Value::Number),
            "[a-z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..5).prop_map(Value::Object),
            ]
        })
    }

    proptest! {
        /// A node that declares nothing returns every value unchanged.
        #[test]
        fn wildcard_node_is_identity(v in arb_value(), coerce in any::<bool>()) {
            prop_assert_eq!(evaluate(&Schema::any(), &v, coerce).unwrap(), v);
        }

        /// Values that already satisfy their type are returned unchanged
        /// whatever the coercion flag.
        #[test]
        fn valid_values_are_fixed_points(v in arb_value(), coerce in any::<bool>()) {
            let s = Schema::of_type(v.tag());
            let once = evaluate(&s, &v, coerce).unwrap();
            prop_assert_eq!(&once, &v);
            prop_assert_eq!(evaluate(&s, &once, coerce).unwrap(), once);
        }

        /// Unmapped keys pass through regardless of coercion.
        #[test]
        fn unmapped_keys_pass_through(v in arb_value(), coerce in any::<bool>()) {
            let s = Schema::any().with_property("declared", Schema::of_type(TypeTag::Null));
            let mut fields = Map::new();
            fields.insert("undeclared".to_string(), v.clone());
            let out = evaluate(&s, &Value::Object(fields), coerce).unwrap();
            prop_assert_eq!(out.as_object().unwrap().get("undeclared"), Some(&v));
        }
    }
}
