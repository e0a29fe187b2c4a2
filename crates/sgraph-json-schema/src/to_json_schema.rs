//! Whole-document conversion

use indexmap::IndexMap;
use sgraph_schema::{SchemaGraph, SchemaNodeId};
use tracing::debug;

use crate::{Config, ConversionContext, ConversionError, DRAFT_07, JsonSchema};

/// Convert a schema graph to a JSON Schema (Draft-07) document.
///
/// Every node in `definitions` is converted and stored under its name, and
/// every use of such a node becomes a `$ref`. If `main` is one of the named
/// nodes the document root is a `$ref` to it, otherwise the converted `main`
/// shape is the root. At least one of `main` and `definitions` is required; an
/// empty definitions map counts.
pub fn to_json_schema(
    graph: &SchemaGraph,
    main: Option<SchemaNodeId>,
    definitions: Option<&IndexMap<String, SchemaNodeId>>,
    config: &Config,
) -> Result<JsonSchema, ConversionError> {
    if main.is_none() && definitions.is_none() {
        return Err(ConversionError::NoSchemaProvided);
    }

    let mut ctx = ConversionContext::new(graph, config);
    if let Some(named) = definitions {
        for (name, id) in named {
            ctx.register(name.clone(), *id);
        }
        for id in named.values() {
            ctx.convert(*id)?;
        }
    }

    // Named nodes convert to their `$ref`
    let mut root = match main {
        Some(id) => ctx.convert(id)?,
        None => JsonSchema::default(),
    };

    let definitions = ctx.into_definitions();
    debug!(definitions = definitions.len(), "converted schema graph");
    root.schema = Some(DRAFT_07.to_string());
    // An empty map leaves any `definitions` from the main node's features alone
    if !definitions.is_empty() {
        root.definitions = Some(
            definitions
                .into_iter()
                .map(|(name, schema)| (name, schema.into()))
                .collect(),
        );
    }
    Ok(root)
}
