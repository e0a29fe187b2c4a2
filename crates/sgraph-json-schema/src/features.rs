use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{ConversionError, JsonSchema};

/// Parse raw JSON Schema keywords into a fragment.
pub(crate) fn parse_features(
    raw: &IndexMap<String, Value>,
) -> Result<JsonSchema, ConversionError> {
    let object: Map<String, Value> = raw.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    serde_json::from_value(Value::Object(object))
        .map_err(|e| ConversionError::InvalidFeatures(e.to_string()))
}

/// Merge a node's raw keywords onto its converted shape. Colliding keywords are
/// overwritten.
pub(crate) fn apply_features(
    schema: &mut JsonSchema,
    features: Option<&IndexMap<String, Value>>,
) -> Result<(), ConversionError> {
    if let Some(raw) = features {
        schema.merge(parse_features(raw)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstanceType;
    use serde_json::json;

    fn raw(value: Value) -> IndexMap<String, Value> {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_features_overwrite_converted_keys() {
        let mut schema = JsonSchema::of_type(InstanceType::Number);
        apply_features(
            &mut schema,
            Some(&raw(json!({ "type": "integer", "examples": [1, 2] }))),
        )
        .unwrap();
        assert_eq!(
            schema.to_value().unwrap(),
            json!({ "type": "integer", "examples": [1, 2] })
        );
    }

    #[test]
    fn test_no_features_is_noop() {
        let mut schema = JsonSchema::of_type(InstanceType::String);
        apply_features(&mut schema, None).unwrap();
        assert_eq!(schema, JsonSchema::of_type(InstanceType::String));
    }

    #[test]
    fn test_boolean_subschemas_in_features() {
        let mut schema = JsonSchema {
            type_: Some(InstanceType::Object.into()),
            properties: Some(
                [("x".to_string(), JsonSchema::of_type(InstanceType::String).into())]
                    .into_iter()
                    .collect(),
            ),
            ..Default::default()
        };
        apply_features(
            &mut schema,
            Some(&raw(json!({
                "properties": { "x": false },
                "additionalProperties": true
            }))),
        )
        .unwrap();
        assert_eq!(
            schema.to_value().unwrap(),
            json!({
                "type": "object",
                "properties": { "x": false },
                "additionalProperties": true
            })
        );
    }

    #[test]
    fn test_ill_typed_keyword_fails() {
        let err = parse_features(&raw(json!({ "minLength": "three" }))).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFeatures(_)));
    }
}
