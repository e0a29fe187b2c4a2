//! JSON Schema (Draft-07) output model
//!
//! Converted fragments are merged into each other key by key, so the schema is a
//! single struct of optional keywords rather than one variant per type. Keywords
//! this crate never produces itself are kept verbatim in [`JsonSchema::extra`].

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// The meta-schema URI written on every root document
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `Some(Value::Null)` is an explicit `"default": null`
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,

    /// `Some(Value::Null)` is an explicit `"const": null`
    #[serde(
        rename = "const",
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub const_value: Option<Value>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaOrBool>>,

    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaOrBool>>,

    // String constraints
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    // Numeric constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    // Array constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    #[serde(rename = "additionalItems", skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<SchemaOrBool>,

    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    // Object constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaOrBool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<SchemaOrBool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<IndexMap<String, SchemaOrBool>>,

    /// Any other keyword, kept as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The `type` keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(InstanceType),
    Multiple(Vec<InstanceType>),
}

impl From<InstanceType> for SchemaType {
    fn from(ty: InstanceType) -> Self {
        SchemaType::Single(ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    String,
    Integer,
}

/// The `items` keyword: one schema for every item, or one schema per position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Tuple(Vec<SchemaOrBool>),
    Single(Box<SchemaOrBool>),
}

/// A subschema position. Draft-07 accepts `true` and `false` wherever a schema
/// is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrBool {
    Bool(bool),
    Schema(Box<JsonSchema>),
}

impl SchemaOrBool {
    pub fn as_schema(&self) -> Option<&JsonSchema> {
        match self {
            SchemaOrBool::Schema(schema) => Some(schema),
            SchemaOrBool::Bool(_) => None,
        }
    }
}

impl From<JsonSchema> for SchemaOrBool {
    fn from(schema: JsonSchema) -> Self {
        SchemaOrBool::Schema(Box::new(schema))
    }
}

macro_rules! merge_fields {
    ($self:ident, $other:ident, $($field:ident),* $(,)?) => {
        $(
            if $other.$field.is_some() {
                $self.$field = $other.$field;
            }
        )*
    };
}

impl JsonSchema {
    pub fn of_type(ty: InstanceType) -> Self {
        Self {
            type_: Some(ty.into()),
            ..Default::default()
        }
    }

    pub fn reference(uri: impl Into<String>) -> Self {
        Self {
            reference: Some(uri.into()),
            ..Default::default()
        }
    }

    pub fn constant(value: Value) -> Self {
        Self {
            const_value: Some(value),
            ..Default::default()
        }
    }

    /// Merge `other` onto `self`. Every keyword present in `other` replaces the
    /// one in `self`; keywords are never merged recursively.
    pub fn merge(&mut self, other: JsonSchema) {
        merge_fields!(
            self,
            other,
            schema,
            reference,
            type_,
            format,
            title,
            description,
            default,
            const_value,
            enum_values,
            any_of,
            all_of,
            min_length,
            max_length,
            pattern,
            minimum,
            maximum,
            multiple_of,
            items,
            additional_items,
            min_items,
            max_items,
            properties,
            required,
            additional_properties,
            definitions,
        );
        self.extra.extend(other.extra);
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Distinguishes an explicit `null` from an absent key.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
