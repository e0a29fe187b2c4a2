//! Refinement steps attached to schema nodes

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::Literal;

/// One step of a node's refinement chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Exact length (string length or item count)
    Length(usize),
    MinLength(usize),
    MaxLength(usize),
    /// Regular expression source
    Regex(String),
    /// Exact value
    Value(Requirement),
    MinValue(Requirement),
    MaxValue(Requirement),
    MultipleOf(Requirement),
    Integer,
    Email,
    IsoDate,
    IsoTimestamp,
    Ipv4,
    Ipv6,
    Uuid,
    /// Human readable description (metadata, not a constraint)
    Description(String),
    /// Raw JSON Schema keywords (metadata, not a constraint)
    JsonSchemaMetadata(IndexMap<String, serde_json::Value>),
    /// A validation with no structural meaning, identified by name
    Custom(String),
}

impl Validation {
    pub fn kind(&self) -> ValidationKind {
        match self {
            Validation::Length(_) => ValidationKind::Length,
            Validation::MinLength(_) => ValidationKind::MinLength,
            Validation::MaxLength(_) => ValidationKind::MaxLength,
            Validation::Regex(_) => ValidationKind::Regex,
            Validation::Value(_) => ValidationKind::Value,
            Validation::MinValue(_) => ValidationKind::MinValue,
            Validation::MaxValue(_) => ValidationKind::MaxValue,
            Validation::MultipleOf(_) => ValidationKind::MultipleOf,
            Validation::Integer => ValidationKind::Integer,
            Validation::Email => ValidationKind::Email,
            Validation::IsoDate => ValidationKind::IsoDate,
            Validation::IsoTimestamp => ValidationKind::IsoTimestamp,
            Validation::Ipv4 => ValidationKind::Ipv4,
            Validation::Ipv6 => ValidationKind::Ipv6,
            Validation::Uuid => ValidationKind::Uuid,
            Validation::Description(_) => ValidationKind::Description,
            Validation::JsonSchemaMetadata(_) => ValidationKind::JsonSchemaMetadata,
            Validation::Custom(name) => ValidationKind::Custom(name.clone()),
        }
    }
}

/// Requirement value of a `value` / `min_value` / `max_value` step.
///
/// Which variant is acceptable depends on the kind of the node owning the step;
/// the converter checks it.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    Literal(Literal),
    Date(DateTime<Utc>),
}

impl From<Literal> for Requirement {
    fn from(literal: Literal) -> Self {
        Requirement::Literal(literal)
    }
}

impl From<DateTime<Utc>> for Requirement {
    fn from(date: DateTime<Utc>) -> Self {
        Requirement::Date(date)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Literal(literal) => literal.fmt(f),
            Requirement::Date(date) => f.write_str(&date.to_rfc3339()),
        }
    }
}

/// Kind discriminant of a refinement step
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    Length,
    MinLength,
    MaxLength,
    Regex,
    Value,
    MinValue,
    MaxValue,
    MultipleOf,
    Integer,
    Email,
    IsoDate,
    IsoTimestamp,
    Ipv4,
    Ipv6,
    Uuid,
    Description,
    JsonSchemaMetadata,
    Custom(String),
}

impl ValidationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Length => "length",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Regex => "regex",
            Self::Value => "value",
            Self::MinValue => "min_value",
            Self::MaxValue => "max_value",
            Self::MultipleOf => "multiple_of",
            Self::Integer => "integer",
            Self::Email => "email",
            Self::IsoDate => "iso_date",
            Self::IsoTimestamp => "iso_timestamp",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uuid => "uuid",
            Self::Description => "description",
            Self::JsonSchemaMetadata => "json_schema_metadata",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ValidationKind {
    fn from(name: &str) -> Self {
        match name {
            "length" => Self::Length,
            "min_length" => Self::MinLength,
            "max_length" => Self::MaxLength,
            "regex" => Self::Regex,
            "value" => Self::Value,
            "min_value" => Self::MinValue,
            "max_value" => Self::MaxValue,
            "multiple_of" => Self::MultipleOf,
            "integer" => Self::Integer,
            "email" => Self::Email,
            "iso_date" => Self::IsoDate,
            "iso_timestamp" => Self::IsoTimestamp,
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            "uuid" => Self::Uuid,
            "description" => Self::Description,
            "json_schema_metadata" => Self::JsonSchemaMetadata,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
