//! Conversion options
//!
//! Source kinds without a canonical JSON Schema encoding (dates, big integers,
//! `undefined`) are only converted once a strategy is chosen for them.

use std::{fmt, str::FromStr, sync::Arc};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use sgraph_schema::{SchemaKind, SchemaNode, Validation, ValidationKind};

use crate::{ConversionContext, ConversionError, JsonSchema};

/// Replaces the built-in converter of one node kind.
///
/// The context gives access to recursive conversion of child nodes. Refinements
/// and features of the node are still applied to the returned shape.
pub type SchemaConverter = Arc<
    dyn Fn(&SchemaNode, &mut ConversionContext<'_>) -> Result<JsonSchema, ConversionError>
        + Send
        + Sync,
>;

/// Converts one refinement step into a fragment merged onto the node's shape.
pub type ValidationConverter =
    Arc<dyn Fn(&Validation, &Config) -> Result<JsonSchema, ConversionError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStrategy {
    /// `{"type": "integer", "format": "unix-time"}`, epoch milliseconds
    Integer,
    /// `{"type": "string", "format": "date-time"}`
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BigIntStrategy {
    /// `{"type": "integer", "format": "int64"}`
    Integer,
    /// `{"type": "string"}`
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedStrategy {
    /// `{}`
    Any,
    /// `{"type": "null"}`
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {option} `{value}`, expected one of: {}", .expected.join(", "))]
pub struct ParseStrategyError {
    option: &'static str,
    value: String,
    expected: &'static [&'static str],
}

macro_rules! strategy_names {
    ($ty:ident, $option:literal, $($variant:ident => $name:literal),+) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseStrategyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ParseStrategyError {
                        option: $option,
                        value: s.to_string(),
                        expected: &[$($name),+],
                    }),
                }
            }
        }
    };
}

strategy_names!(DateStrategy, "date strategy", Integer => "integer", String => "string");
strategy_names!(BigIntStrategy, "bigint strategy", Integer => "integer", String => "string");
strategy_names!(UndefinedStrategy, "undefined strategy", Any => "any", Null => "null");

/// Options for a single conversion call
#[derive(Clone, Default)]
pub struct Config {
    /// Close objects without an explicit rest with `additionalProperties: false`
    pub strict_object_types: bool,
    pub date_strategy: Option<DateStrategy>,
    pub bigint_strategy: Option<BigIntStrategy>,
    pub undefined_strategy: Option<UndefinedStrategy>,
    /// Skip refinement steps that have no converter instead of failing
    pub ignore_unknown_validation: bool,
    pub schema_overrides: AHashMap<SchemaKind, SchemaConverter>,
    pub validation_overrides: AHashMap<(SchemaKind, ValidationKind), ValidationConverter>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_object_types(mut self, strict: bool) -> Self {
        self.strict_object_types = strict;
        self
    }

    pub fn with_date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date_strategy = Some(strategy);
        self
    }

    pub fn with_bigint_strategy(mut self, strategy: BigIntStrategy) -> Self {
        self.bigint_strategy = Some(strategy);
        self
    }

    pub fn with_undefined_strategy(mut self, strategy: UndefinedStrategy) -> Self {
        self.undefined_strategy = Some(strategy);
        self
    }

    pub fn with_ignore_unknown_validation(mut self, ignore: bool) -> Self {
        self.ignore_unknown_validation = ignore;
        self
    }

    /// Replace the converter of a node kind, foreign kinds included.
    pub fn with_schema_override<F>(mut self, kind: SchemaKind, converter: F) -> Self
    where
        F: Fn(&SchemaNode, &mut ConversionContext<'_>) -> Result<JsonSchema, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        self.schema_overrides.insert(kind, Arc::new(converter));
        self
    }

    /// Replace (or add) the converter of a refinement step on a node kind.
    pub fn with_validation_override<F>(
        mut self,
        schema: SchemaKind,
        validation: ValidationKind,
        converter: F,
    ) -> Self
    where
        F: Fn(&Validation, &Config) -> Result<JsonSchema, ConversionError> + Send + Sync + 'static,
    {
        self.validation_overrides
            .insert((schema, validation), Arc::new(converter));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("strict_object_types", &self.strict_object_types)
            .field("date_strategy", &self.date_strategy)
            .field("bigint_strategy", &self.bigint_strategy)
            .field("undefined_strategy", &self.undefined_strategy)
            .field("ignore_unknown_validation", &self.ignore_unknown_validation)
            .field(
                "schema_overrides",
                &self.schema_overrides.keys().collect::<Vec<_>>(),
            )
            .field(
                "validation_overrides",
                &self.validation_overrides.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
