//! # Schema Data Model
//!
//! A schema document is a recursive object with three optional members:
//!
//! - `type` — one type name, or an ordered sequence of type names.
//! - `items` — the schema every element of a sequence value must satisfy.
//! - `properties` — named schemas for the values of a mapping.
//!
//! Absent members are wildcards: a node with no `items` accepts any
//! elements, and a mapping key with no entry in `properties` passes through
//! unchanged. No other schema keywords are interpreted; unknown members are
//! ignored.
//!
//! The tree is owned and acyclic. The root document's `properties` map is
//! the lookup table for the keys of a record's pairs.

use std::collections::BTreeMap;
use std::fmt;

use kvs_core::TypeTag;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised while reading a schema document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The document was well-formed text but not a valid schema, e.g. a
    /// `type` member that is neither a name nor a sequence of names.
    #[error("malformed schema: {reason}")]
    Malformed { reason: String },

    /// The document text could not be parsed at all.
    #[error("schema document is not well-formed: {reason}")]
    Syntax { reason: String },
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Data => SchemaError::Malformed {
                reason: e.to_string(),
            },
            _ => SchemaError::Syntax {
                reason: e.to_string(),
            },
        }
    }
}

/// A type name as written in a schema document.
///
/// Names outside the fixed set are kept rather than rejected: they never
/// match a value and always fail coercion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    Known(TypeTag),
    Unknown(String),
}

impl TypeName {
    pub fn parse(name: &str) -> Self {
        match TypeTag::from_name(name) {
            Some(tag) => TypeName::Known(tag),
            None => TypeName::Unknown(name.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TypeName::Known(tag) => tag.as_str(),
            TypeName::Unknown(name) => name,
        }
    }

    pub fn tag(&self) -> Option<TypeTag> {
        match self {
            TypeName::Known(tag) => Some(*tag),
            TypeName::Unknown(_) => None,
        }
    }
}

impl From<TypeTag> for TypeName {
    fn from(tag: TypeTag) -> Self {
        TypeName::Known(tag)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, non-empty set of accepted type names.
///
/// Declaration order is significant: coercion tries candidates in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(Vec<TypeName>);

impl TypeSet {
    /// Build a type set from names in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Malformed` if `names` is empty.
    pub fn new(names: Vec<TypeName>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Malformed {
                reason: "type list must name at least one type".to_string(),
            });
        }
        Ok(Self(names))
    }

    pub fn single(tag: TypeTag) -> Self {
        Self(vec![TypeName::Known(tag)])
    }

    /// Build from known tags. Returns `None` for an empty slice.
    pub fn of(tags: &[TypeTag]) -> Option<Self> {
        Self::new(tags.iter().copied().map(TypeName::Known).collect()).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeName> {
        self.0.iter()
    }

    pub fn names(&self) -> &[TypeName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0.iter().any(|name| name.tag() == Some(tag))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for TypeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let [only] = self.0.as_slice() {
            return serializer.serialize_str(only.as_str());
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for name in &self.0 {
            seq.serialize_element(name.as_str())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for TypeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TypeSetVisitor)
    }
}

struct TypeSetVisitor;

impl<'de> Visitor<'de> for TypeSetVisitor {
    type Value = TypeSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a type name or a sequence of type names")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TypeSet, E> {
        Ok(TypeSet(vec![TypeName::parse(v)]))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TypeSet, A::Error> {
        let mut names = Vec::new();
        while let Some(name) = seq.next_element::<String>()? {
            names.push(TypeName::parse(&name));
        }
        TypeSet::new(names).map_err(de::Error::custom)
    }
}

/// An absent `type` member is `None`; an explicit `null` is malformed.
fn present_types<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TypeSet>, D::Error> {
    TypeSet::deserialize(deserializer).map(Some)
}

/// A node of the schema tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Accepted types, in declaration order.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present_types",
        skip_serializing_if = "Option::is_none"
    )]
    pub types: Option<TypeSet>,

    /// Schema for every element of a sequence value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Schemas for named values of a mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
}

impl Schema {
    /// A node that accepts any value unchanged.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of_type(tag: TypeTag) -> Self {
        Self {
            types: Some(TypeSet::single(tag)),
            ..Self::default()
        }
    }

    pub fn with_types(mut self, types: TypeSet) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_items(mut self, items: Schema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), schema);
        self
    }

    /// The sub-schema governing mapping key `key`, if any.
    pub fn property(&self, key: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }

    /// True when the node declares nothing and so accepts every value.
    pub fn is_wildcard(&self) -> bool {
        self.types.is_none() && self.items.is_none() && self.properties.is_none()
    }

    /// Nesting depth of the tree rooted at this node (a leaf is 1).
    pub fn depth(&self) -> usize {
        let items = self.items.as_ref().map_or(0, |s| s.depth());
        let props = self
            .properties
            .iter()
            .flat_map(|p| p.values())
            .map(Schema::depth)
            .max()
            .unwrap_or(0);
        1 + items.max(props)
    }

    /// Parse a schema document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Syntax` for malformed JSON and
    /// `SchemaError::Malformed` for JSON that is not a valid schema.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a schema document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Syntax` for malformed YAML and
    /// `SchemaError::Malformed` for YAML that is not a valid schema.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let document: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| SchemaError::Syntax {
            reason: e.to_string(),
        })?;
        serde_yaml::from_value(document).map_err(|e| SchemaError::Malformed {
            reason: e.to_string(),
        })
    }

    /// Interpret an already-parsed JSON value as a schema document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Malformed` if the value is not a valid schema.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_type_name() {
        let schema = Schema::from_json_str(r#"{"type": "integer"}"#).unwrap();
        assert_eq!(schema.types, Some(TypeSet::single(TypeTag::Integer)));
        assert!(schema.items.is_none());
        assert!(schema.properties.is_none());
    }

    #[test]
    fn test_type_sequence_keeps_declared_order() {
        let schema = Schema::from_json_str(r#"{"type": ["number", "null", "integer"]}"#).unwrap();
        let names: Vec<&str> = schema.types.as_ref().unwrap().iter().map(TypeName::as_str).collect();
        assert_eq!(names, vec!["number", "null", "integer"]);
    }

    #[test]
    fn test_unknown_type_name_is_kept() {
        let schema = Schema::from_json_str(r#"{"type": ["decimal", "string"]}"#).unwrap();
        let types = schema.types.unwrap();
        assert_eq!(types.names()[0], TypeName::Unknown("decimal".to_string()));
        assert_eq!(types.names()[1], TypeName::Known(TypeTag::String));
    }

    #[test]
    fn test_type_neither_name_nor_sequence_is_malformed() {
        let err = Schema::from_json_str(r#"{"type": 5}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");
        assert!(err.to_string().contains("type name"));

        let err = Schema::from_json_str(r#"{"type": ["string", 5]}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");

        let err = Schema::from_json_str(r#"{"type": {"name": "string"}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn test_empty_type_sequence_is_malformed() {
        let err = Schema::from_json_str(r#"{"type": []}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
        assert!(err.to_string().contains("at least one type"));
    }

    #[test]
    fn test_invalid_json_is_syntax_error() {
        let err = Schema::from_json_str(r#"{"type": "#).unwrap_err();
        assert!(matches!(err, SchemaError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_nested_document() {
        let schema = Schema::from_json_value(json!({
            "properties": {
                "Geo": {
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
                }
            }
        }))
        .unwrap();

        let geo = schema.property("Geo").unwrap();
        let element = geo.items.as_ref().unwrap();
        let tz = element.property("Timezone").unwrap();
        assert_eq!(
            tz.property("ObservesDLS").unwrap().types,
            Some(TypeSet::single(TypeTag::Boolean))
        );
        assert_eq!(schema.depth(), 5);
    }

    #[test]
    fn test_unknown_members_ignored() {
        let schema = Schema::from_json_str(r#"{"$schema": "x", "type": "string", "enum": ["a"]}"#).unwrap();
        assert_eq!(schema, Schema::of_type(TypeTag::String));
    }

    #[test]
    fn test_absent_type_member_is_wildcard() {
        let schema = Schema::from_json_str(r#"{"items": {}}"#).unwrap();
        assert!(schema.types.is_none());
        assert!(Schema::from_json_str("{}").unwrap().is_wildcard());
    }

    #[test]
    fn test_null_type_member_is_malformed() {
        let err = Schema::from_json_str(r#"{"type": null}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");

        let err = Schema::from_json_str(r#"{"properties": {"ListPrice": {"type": null}}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");

        let err = Schema::from_json_value(json!({"properties": {"ListPrice": {"type": null}}})).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");

        let err = Schema::from_yaml_str("properties:\n  ListPrice:\n    type: ~\n").unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn test_yaml_errors_split_syntax_from_shape() {
        let err = Schema::from_yaml_str("properties: [unclosed\n").unwrap_err();
        assert!(matches!(err, SchemaError::Syntax { .. }), "got {err:?}");

        let err = Schema::from_yaml_str("type: 5\n").unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");

        let err = Schema::from_yaml_str("type: []\n").unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn test_yaml_document() {
        let schema = Schema::from_yaml_str(
            "properties:\n  ListPrice:\n    type: [integer, number]\n",
        )
        .unwrap();
        let types = schema.property("ListPrice").unwrap().types.as_ref().unwrap();
        assert_eq!(types.len(), 2);
        assert!(types.contains(TypeTag::Number));
    }

    #[test]
    fn test_serialize_compacts_single_type() {
        let schema = Schema::any()
            .with_property("a", Schema::of_type(TypeTag::String))
            .with_property(
                "b",
                Schema::any().with_types(TypeSet::of(&[TypeTag::Integer, TypeTag::Null]).unwrap()),
            );
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            json!({
                "properties": {
                    "a": { "type": "string" },
                    "b": { "type": ["integer", "null"] }
                }
            })
        );
    }

    #[test]
    fn test_type_set_display() {
        let types = TypeSet::of(&[TypeTag::Integer, TypeTag::Number]).unwrap();
        assert_eq!(types.to_string(), "[integer, number]");
    }
}
