//! # Runtime Type Tags
//!
//! The fixed classification every [`Value`](crate::Value) maps onto. Type
//! names in schema documents resolve to these tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Runtime type of a value, named as in schema documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Null,
    Boolean,
    /// Integral numeric representation.
    Integer,
    /// Non-integral (floating-point) numeric representation.
    Number,
    String,
    Array,
    Object,
}

/// Number of type tags. Adding a tag must update this constant.
pub const TYPE_TAG_COUNT: usize = 7;

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; TYPE_TAG_COUNT] = [
        TypeTag::Null,
        TypeTag::Boolean,
        TypeTag::Integer,
        TypeTag::Number,
        TypeTag::String,
        TypeTag::Array,
        TypeTag::Object,
    ];

    /// The schema-document name of this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Integer => "integer",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    /// Resolve a schema-document type name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown type name '{s}'"))
    }
}
