//! Refinement chain to JSON Schema keywords
//!
//! Each step of a node's pipe is converted to a fragment and merged onto the
//! node's shape in pipe order. A step is looked up, in order, in the caller
//! overrides, the built-in table keyed by the owning node kind, and the
//! kind-independent metadata steps.

use serde_json::{Number, Value};
use sgraph_schema::{Literal, Requirement, SchemaKind, Validation};
use tracing::trace;

use crate::{
    Config, ConversionError, DateStrategy, InstanceType, JsonSchema, features::parse_features,
    literal::float_to_json,
};

/// Fold a refinement chain into a single fragment.
pub fn convert_pipe(
    kind: &SchemaKind,
    pipe: &[Validation],
    config: &Config,
) -> Result<JsonSchema, ConversionError> {
    let mut out = JsonSchema::default();
    for validation in pipe {
        if let Some(fragment) = convert_validation(kind, validation, config)? {
            out.merge(fragment);
        }
    }
    Ok(out)
}

/// Convert one step. `Ok(None)` means the step was unknown and ignored.
fn convert_validation(
    kind: &SchemaKind,
    validation: &Validation,
    config: &Config,
) -> Result<Option<JsonSchema>, ConversionError> {
    let validation_kind = validation.kind();
    trace!(schema = %kind, validation = %validation_kind, "converting validation");

    if let Some(custom) = config
        .validation_overrides
        .get(&(kind.clone(), validation_kind.clone()))
    {
        return custom(validation, config).map(Some);
    }
    if let Some(converted) = builtin(kind, validation, config) {
        return converted.map(Some);
    }
    if let Some(converted) = metadata(validation) {
        return converted.map(Some);
    }
    if config.ignore_unknown_validation {
        return Ok(None);
    }
    Err(ConversionError::UnsupportedValidation {
        validation: validation_kind,
        schema: kind.clone(),
    })
}

fn builtin(
    kind: &SchemaKind,
    validation: &Validation,
    config: &Config,
) -> Option<Result<JsonSchema, ConversionError>> {
    match kind {
        SchemaKind::Array => array_validation(validation).map(Ok),
        SchemaKind::String => string_validation(validation),
        SchemaKind::Number => number_validation(validation),
        SchemaKind::Boolean => boolean_validation(validation),
        SchemaKind::Date => date_validation(validation, config),
        _ => None,
    }
}

fn array_validation(validation: &Validation) -> Option<JsonSchema> {
    let schema = match validation {
        Validation::Length(n) => JsonSchema {
            min_items: Some(*n as u64),
            max_items: Some(*n as u64),
            ..Default::default()
        },
        Validation::MinLength(n) => JsonSchema {
            min_items: Some(*n as u64),
            ..Default::default()
        },
        Validation::MaxLength(n) => JsonSchema {
            max_items: Some(*n as u64),
            ..Default::default()
        },
        _ => return None,
    };
    Some(schema)
}

fn string_validation(validation: &Validation) -> Option<Result<JsonSchema, ConversionError>> {
    let format = |name: &str| JsonSchema {
        format: Some(name.to_string()),
        ..Default::default()
    };
    let schema = match validation {
        Validation::Value(requirement) => {
            return Some(match requirement {
                Requirement::Literal(Literal::String(s)) => {
                    Ok(JsonSchema::constant(Value::String(s.clone())))
                }
                other => Err(ConversionError::InvalidRequirement(format!(
                    "Non-string value used for `value` validation: {other}"
                ))),
            });
        }
        Validation::Length(n) => JsonSchema {
            min_length: Some(*n as u64),
            max_length: Some(*n as u64),
            ..Default::default()
        },
        Validation::MinLength(n) => JsonSchema {
            min_length: Some(*n as u64),
            ..Default::default()
        },
        Validation::MaxLength(n) => JsonSchema {
            max_length: Some(*n as u64),
            ..Default::default()
        },
        Validation::Regex(source) => JsonSchema {
            pattern: Some(source.clone()),
            ..Default::default()
        },
        Validation::Email => format("email"),
        Validation::IsoDate => format("date"),
        Validation::IsoTimestamp => format("date-time"),
        Validation::Ipv4 => format("ipv4"),
        Validation::Ipv6 => format("ipv6"),
        Validation::Uuid => format("uuid"),
        _ => return None,
    };
    Some(Ok(schema))
}

fn number_validation(validation: &Validation) -> Option<Result<JsonSchema, ConversionError>> {
    let converted = match validation {
        Validation::Value(r) => number_requirement("value", r).map(|n| JsonSchema {
            const_value: Some(Value::Number(n)),
            ..Default::default()
        }),
        Validation::MinValue(r) => number_requirement("min_value", r).map(|n| JsonSchema {
            minimum: Some(n),
            ..Default::default()
        }),
        Validation::MaxValue(r) => number_requirement("max_value", r).map(|n| JsonSchema {
            maximum: Some(n),
            ..Default::default()
        }),
        Validation::MultipleOf(r) => number_requirement("multiple_of", r).map(|n| JsonSchema {
            multiple_of: Some(n),
            ..Default::default()
        }),
        Validation::Integer => Ok(JsonSchema::of_type(InstanceType::Integer)),
        _ => return None,
    };
    Some(converted)
}

fn number_requirement(name: &str, requirement: &Requirement) -> Result<Number, ConversionError> {
    let invalid = || {
        ConversionError::InvalidRequirement(format!(
            "Non-number value used for `{name}` validation: {requirement}"
        ))
    };
    match requirement {
        Requirement::Literal(Literal::Integer(i)) => Ok((*i).into()),
        Requirement::Literal(Literal::Float(x)) => float_to_json(*x).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn boolean_validation(validation: &Validation) -> Option<Result<JsonSchema, ConversionError>> {
    match validation {
        Validation::Value(Requirement::Literal(Literal::Bool(b))) => {
            Some(Ok(JsonSchema::constant(Value::Bool(*b))))
        }
        Validation::Value(other) => Some(Err(ConversionError::InvalidRequirement(format!(
            "Non-boolean value used for `value` validation: {other}"
        )))),
        _ => None,
    }
}

fn date_validation(
    validation: &Validation,
    config: &Config,
) -> Option<Result<JsonSchema, ConversionError>> {
    let converted = match validation {
        Validation::Value(r) => date_requirement("value", r, config).map(|ms| JsonSchema {
            const_value: Some(Value::Number(ms.into())),
            ..Default::default()
        }),
        Validation::MinValue(r) => date_requirement("min_value", r, config).map(|ms| JsonSchema {
            minimum: Some(ms.into()),
            ..Default::default()
        }),
        Validation::MaxValue(r) => date_requirement("max_value", r, config).map(|ms| JsonSchema {
            maximum: Some(ms.into()),
            ..Default::default()
        }),
        _ => return None,
    };
    Some(converted)
}

/// Date bound as epoch milliseconds. Only meaningful with the integer strategy.
fn date_requirement(
    name: &str,
    requirement: &Requirement,
    config: &Config,
) -> Result<i64, ConversionError> {
    if config.date_strategy != Some(DateStrategy::Integer) {
        return Err(ConversionError::InvalidRequirement(format!(
            "`{name}` validation is only available with the 'integer' date strategy"
        )));
    }
    match requirement {
        Requirement::Date(date) => Ok(date.timestamp_millis()),
        Requirement::Literal(_) => Err(ConversionError::InvalidRequirement(format!(
            "Non-date value used for `{name}` validation"
        ))),
    }
}

fn metadata(validation: &Validation) -> Option<Result<JsonSchema, ConversionError>> {
    match validation {
        Validation::Description(text) => Some(Ok(JsonSchema {
            description: Some(text.clone()),
            ..Default::default()
        })),
        Validation::JsonSchemaMetadata(raw) => Some(parse_features(raw)),
        _ => None,
    }
}
