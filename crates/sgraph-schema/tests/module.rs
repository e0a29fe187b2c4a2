use num_bigint::BigInt;
use serde_json::json;
use sgraph_schema::{
    Literal, ModuleError, Requirement, SchemaKind, SchemaModule, SchemaNodeContent, Validation,
};

#[test]
fn every_builtin_kind_loads() {
    let module = SchemaModule::from_value(&json!({
        "Shapes": {
            "kind": "variant",
            "key": "type",
            "options": [
                {
                    "kind": "object",
                    "entries": { "type": { "kind": "literal", "literal": "circle" } }
                },
                {
                    "kind": "object",
                    "entries": { "type": { "kind": "literal", "literal": "square" } }
                }
            ]
        },
        "Scores": {
            "kind": "record",
            "key": { "kind": "string" },
            "value": { "kind": "nullable", "wrapped": { "kind": "number" }, "default": 0 }
        },
        "Color": { "kind": "picklist", "options": ["red", "green", 3] },
        "Level": { "kind": "enum", "enum": { "Low": 0, "High": 1 } },
        "Both": { "kind": "intersect", "options": [{ "kind": "any" }, { "kind": "null" }] },
        "Rest": {
            "kind": "tuple_with_rest",
            "items": [{ "kind": "boolean" }],
            "rest": { "kind": "string" }
        },
        "Huge": { "kind": "literal", "literal": { "$bigint": "123456789012345678901234567890" } },
        "Blob": { "kind": "blob", "children": [{ "kind": "undefined" }] }
    }))
    .unwrap();
    let graph = module.graph();
    let content = |name: &str| &graph.node(module.node(name).unwrap()).unwrap().content;

    let SchemaNodeContent::Variant(variant) = content("Shapes") else {
        panic!("Expected variant");
    };
    assert_eq!(variant.key, "type");
    assert_eq!(variant.options.len(), 2);

    let SchemaNodeContent::Record(record) = content("Scores") else {
        panic!("Expected record");
    };
    let SchemaNodeContent::Nullable(value) = &graph.node(record.value).unwrap().content else {
        panic!("Expected nullable");
    };
    assert_eq!(value.default, Some(json!(0)));

    assert_eq!(
        content("Color"),
        &SchemaNodeContent::Picklist(vec![
            Literal::String("red".into()),
            Literal::String("green".into()),
            Literal::Integer(3),
        ])
    );

    let SchemaNodeContent::Enum(members) = content("Level") else {
        panic!("Expected enum");
    };
    let names: Vec<_> = members.keys().map(String::as_str).collect();
    assert_eq!(names, ["Low", "High"]);

    assert_eq!(
        graph.node(module.node("Both").unwrap()).unwrap().kind(),
        SchemaKind::Intersect
    );

    let SchemaNodeContent::Tuple(tuple) = content("Rest") else {
        panic!("Expected tuple");
    };
    let rest = tuple.rest.unwrap();
    assert_eq!(graph.node(rest).unwrap().content, SchemaNodeContent::String);

    let expected: BigInt = "123456789012345678901234567890".parse().unwrap();
    assert_eq!(
        content("Huge"),
        &SchemaNodeContent::Literal(Literal::BigInt(expected))
    );

    let SchemaNodeContent::Foreign(foreign) = content("Blob") else {
        panic!("Expected foreign schema");
    };
    assert_eq!(foreign.kind, "blob");
    assert_eq!(foreign.children.len(), 1);
}

#[test]
fn pipe_metadata_is_kept_in_order() {
    let module = SchemaModule::from_json_str(
        r#"{
            "Name": {
                "kind": "string",
                "pipe": [
                    { "type": "min_length", "requirement": 1 },
                    { "type": "description", "description": "Display name" },
                    { "type": "json_schema_metadata", "metadata": { "title": "Name" } }
                ],
                "features": { "examples": ["Ada"] }
            }
        }"#,
    )
    .unwrap();
    let node = module.graph().node(module.node("Name").unwrap()).unwrap();

    assert_eq!(node.pipe[0], Validation::MinLength(1));
    assert_eq!(node.pipe[1], Validation::Description("Display name".into()));
    let Validation::JsonSchemaMetadata(metadata) = &node.pipe[2] else {
        panic!("Expected metadata");
    };
    assert_eq!(metadata["title"], json!("Name"));
    assert_eq!(node.features.as_ref().unwrap()["examples"], json!(["Ada"]));
}

#[test]
fn numeric_requirements_keep_integer_literals() {
    let module = SchemaModule::from_value(&json!({
        "Even": {
            "kind": "number",
            "pipe": [
                { "type": "multiple_of", "requirement": 2 },
                { "type": "max_value", "requirement": 0.5 }
            ]
        }
    }))
    .unwrap();
    let node = module.graph().node(module.node("Even").unwrap()).unwrap();
    assert_eq!(
        node.pipe,
        [
            Validation::MultipleOf(Requirement::Literal(Literal::Integer(2))),
            Validation::MaxValue(Requirement::Literal(Literal::Float(0.5))),
        ]
    );
}

#[test]
fn with_rest_kind_requires_rest() {
    let err = SchemaModule::from_value(&json!({
        "Open": { "kind": "object_with_rest", "entries": {} }
    }))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing field `rest` in `object_with_rest` schema at Open"
    );
}

#[test]
fn lazy_getter_must_name_a_schema() {
    let err = SchemaModule::from_value(&json!({
        "schemas": { "A": { "kind": "number" } },
        "B": { "kind": "lazy", "getter": "schemas" }
    }))
    .unwrap_err();
    assert!(matches!(err, ModuleError::NotASchema(path) if path == "schemas"));
}

#[test]
fn invalid_date_requirement() {
    let err = SchemaModule::from_value(&json!({
        "When": {
            "kind": "date",
            "pipe": [{ "type": "min_value", "requirement": { "$date": "next tuesday" } }]
        }
    }))
    .unwrap_err();
    assert!(matches!(err, ModuleError::InvalidDate(_)));
}

#[test]
fn top_level_must_be_an_object() {
    let err = SchemaModule::from_json_str("[1, 2]").unwrap_err();
    assert!(matches!(err, ModuleError::NotAnObject));
}
