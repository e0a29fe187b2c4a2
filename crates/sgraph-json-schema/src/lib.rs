//! Validation schema graph to JSON Schema conversion
//!
//! This crate converts an [`sgraph_schema::SchemaGraph`] to a JSON Schema
//! (Draft-07) document. Named nodes become `definitions` entries referenced with
//! `$ref`, which is also how recursive graphs are converted.

mod config;
mod convert;
mod definitions;
mod error;
mod features;
pub mod json_schema;
mod literal;
mod to_json_schema;
mod validations;

pub use config::{
    BigIntStrategy, Config, DateStrategy, ParseStrategyError, SchemaConverter, UndefinedStrategy,
    ValidationConverter,
};
pub use convert::ConversionContext;
pub use definitions::{DefinitionResolver, ref_uri};
pub use error::ConversionError;
pub use json_schema::{DRAFT_07, InstanceType, Items, JsonSchema, SchemaOrBool, SchemaType};
pub use literal::json_literal;
pub use to_json_schema::to_json_schema;
pub use validations::convert_pipe;
