use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::{Value, json};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn sgraph() -> Command {
    Command::cargo_bin("sgraph").unwrap()
}

fn run_ok(args: &[&str]) -> String {
    let output = sgraph().arg("to-json-schema").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn run_err(args: &[&str]) -> String {
    let output = sgraph().arg("to-json-schema").args(args).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    String::from_utf8(output.stderr).unwrap()
}

#[test]
fn converts_every_top_level_export_to_definitions() {
    let path = fixture("list.json");
    let stdout = run_ok(&[path.to_str().unwrap()]);
    let value: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(
        value,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {
                "List": {
                    "description": "A tree of labelled items",
                    "properties": {
                        "children": {
                            "items": { "$ref": "#/definitions/ListItem" },
                            "type": "array"
                        }
                    },
                    "required": ["children"],
                    "type": "object"
                },
                "ListItem": {
                    "properties": {
                        "children": { "items": { "$ref": "#/definitions/List" }, "type": "array" },
                        "label": { "minLength": 1, "type": "string" }
                    },
                    "required": ["label", "children"],
                    "type": "object"
                }
            }
        })
    );
}

#[test]
fn output_keys_are_sorted_and_newline_terminated() {
    let path = fixture("list.json");
    let stdout = run_ok(&[path.to_str().unwrap()]);

    assert!(stdout.ends_with("}\n"));
    let position = |needle: &str| stdout.find(needle).unwrap();
    assert!(position("\"$schema\"") < position("\"definitions\""));
    assert!(position("\"List\"") < position("\"ListItem\""));
    assert!(position("\"description\"") < position("\"properties\""));
    assert!(position("\"items\"") < position("\"type\""));
}

#[test]
fn named_main_type_becomes_root_reference() {
    let path = fixture("list.json");
    let stdout = run_ok(&[path.to_str().unwrap(), "--type", "List"]);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["$ref"], json!("#/definitions/List"));
    assert!(value["definitions"].get("ListItem").is_some());
}

#[test]
fn namespace_definitions_and_inline_main() {
    let path = fixture("namespaces.json");
    let stdout = run_ok(&[path.to_str().unwrap(), "-d", "schemas", "-t", "Pair"]);
    let value: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(
        value,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "array",
            "items": [
                { "$ref": "#/definitions/NumberSchema" },
                { "$ref": "#/definitions/StringSchema" }
            ],
            "minItems": 2,
            "maxItems": 2,
            "definitions": {
                "NumberSchema": { "type": "number" },
                "StringSchema": { "format": "uuid", "type": "string" }
            }
        })
    );
}

#[test]
fn single_schema_definition_path_uses_last_segment() {
    let path = fixture("namespaces.json");
    let stdout = run_ok(&[path.to_str().unwrap(), "-d", "schemas.NumberSchema"]);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["definitions"],
        json!({ "NumberSchema": { "type": "number" } })
    );
}

#[test]
fn strategies_from_flags() {
    let path = fixture("dates.json");
    let stdout = run_ok(&[
        path.to_str().unwrap(),
        "--date-strategy",
        "integer",
        "--bigint-strategy",
        "string",
        "--undefined-strategy",
        "null",
    ]);
    let value: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(
        value,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "properties": {
                "createdAt": {
                    "format": "unix-time",
                    "minimum": 1711324800000_i64,
                    "type": "integer"
                },
                "id": { "type": "string" },
                "note": { "type": "null" }
            },
            "required": ["createdAt", "id"],
            "type": "object"
        })
    );
}

#[test]
fn missing_strategy_is_reported() {
    let path = fixture("dates.json");
    let stderr = run_err(&[path.to_str().unwrap()]);
    assert_eq!(
        stderr.trim_end(),
        "Error: The `date_strategy` option must be set to handle `date` schemas"
    );
}

#[test]
fn unknown_validation_fails_unless_ignored() {
    let path = fixture("custom_validation.json");
    let stderr = run_err(&[path.to_str().unwrap()]);
    assert_eq!(
        stderr.trim_end(),
        "Error: Unsupported validation `check` for schema `string`"
    );

    let stdout = run_ok(&[path.to_str().unwrap(), "--ignore-unknown-validation"]);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "format": "email",
            "type": "string"
        })
    );
}

#[test]
fn strict_object_types_flag() {
    let path = fixture("dates.json");
    let stdout = run_ok(&[
        path.to_str().unwrap(),
        "--strict-object-types",
        "--date-strategy",
        "integer",
        "--bigint-strategy",
        "integer",
        "--undefined-strategy",
        "any",
    ]);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["additionalProperties"], json!(false));
    assert_eq!(
        value["properties"]["id"],
        json!({ "format": "int64", "type": "integer" })
    );
    assert_eq!(value["properties"]["note"], json!({}));
    assert_eq!(
        value["properties"]["createdAt"],
        json!({ "format": "unix-time", "minimum": 1711324800000_i64, "type": "integer" })
    );
}

#[test]
fn missing_main_type() {
    let path = fixture("list.json");
    let file = path.to_str().unwrap();
    let stderr = run_err(&[file, "-t", "Tree"]);
    assert_eq!(
        stderr.trim_end(),
        format!("Error: Main type 'Tree' could not be found in {file}")
    );
}

#[test]
fn missing_definitions_path() {
    let path = fixture("namespaces.json");
    let file = path.to_str().unwrap();
    let stderr = run_err(&[file, "-d", "types"]);
    assert_eq!(
        stderr.trim_end(),
        format!("Error: Definitions path 'types' could not be found in {file}")
    );
}

#[test]
fn writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("schema.json");
    let path = fixture("custom_validation.json");

    let stdout = run_ok(&[
        path.to_str().unwrap(),
        "--ignore-unknown-validation",
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(stdout.is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.ends_with('}'));
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["format"], json!("email"));
}

#[test]
fn reads_module_from_stdin() {
    let output = sgraph()
        .args(["to-json-schema", "-"])
        .write_stdin(r#"{ "default": { "kind": "literal", "literal": "foo" } }"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["const"], json!("foo"));
}

#[test]
fn module_without_schemas_prints_bare_document() {
    let output = sgraph()
        .args(["to-json-schema", "-"])
        .write_stdin(r#"{ "version": 3, "schemas": {} }"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        json!({ "$schema": "http://json-schema.org/draft-07/schema#" })
    );
}

#[test]
fn invalid_module_is_reported() {
    let output = sgraph()
        .args(["to-json-schema", "-"])
        .write_stdin("[1, 2]")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: Invalid schema module -"));
}
