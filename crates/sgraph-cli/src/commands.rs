pub mod to_json_schema;
