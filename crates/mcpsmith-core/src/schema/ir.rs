//! The internal schema representation.
//!
//! A [`Schema`] is a strict, tree-shaped lowering of an OpenAPI schema:
//! references are already gone, nullability is folded into the type list,
//! and type-specific validation lives in dedicated sub-records that are only
//! present when the matching base type is. `Schema::default()` is the empty
//! schema ("anything goes"), which is distinct from an absent schema.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

/// Base type tags a schema node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl BaseType {
    /// Returns the JSON Schema name of the type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Parse a JSON Schema type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// String-specific validation. `min_length == 0` means absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringValidation {
    pub min_length: u64,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

/// Numeric validation. The exclusivity flags modify the bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberValidation {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
}

/// Array-specific validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayValidation {
    pub items: Option<Box<Schema>>,
    pub min_items: u64,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

/// Object-specific validation.
///
/// `disallow_additional_properties` and `additional_properties` are mutually
/// exclusive; both unset means the JSON Schema default of allowing anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectValidation {
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub min_properties: u64,
    pub max_properties: Option<u64>,
    pub additional_properties: Option<Box<Schema>>,
    pub disallow_additional_properties: bool,
}

/// A normalized schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Base type tags, in source order; empty means "any"
    pub types: Vec<BaseType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub default: Option<Value>,
    pub example: Option<Value>,
    pub enum_values: Vec<Value>,
    pub read_only: bool,
    pub write_only: bool,
    pub string: Option<StringValidation>,
    pub number: Option<NumberValidation>,
    pub array: Option<ArrayValidation>,
    pub object: Option<ObjectValidation>,
    pub one_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub all_of: Vec<Schema>,
    pub not: Option<Box<Schema>>,
}

impl Schema {
    /// Whether the given base type is present
    pub fn has_type(&self, base: BaseType) -> bool {
        self.types.contains(&base)
    }

    /// Whether any composition keyword is present
    pub fn has_composition(&self) -> bool {
        !self.one_of.is_empty()
            || !self.any_of.is_empty()
            || !self.all_of.is_empty()
            || self.not.is_some()
    }

    /// Whether this is the empty schema (`{}` in the source)
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
