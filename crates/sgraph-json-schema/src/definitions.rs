//! Named definitions and `$ref` resolution

use ahash::AHashMap;
use indexmap::IndexMap;
use sgraph_schema::SchemaNodeId;

use crate::JsonSchema;

/// `$ref` URI of a definition name
pub fn ref_uri(name: &str) -> String {
    format!("#/definitions/{name}")
}

/// Maps node handles to their definition names and collects converted
/// definitions in the order they finish converting.
#[derive(Debug, Clone, Default)]
pub struct DefinitionResolver {
    names: AHashMap<SchemaNodeId, String>,
    definitions: IndexMap<String, JsonSchema>,
}

impl DefinitionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a node. Registering a second name for the same node replaces the first.
    pub fn register(&mut self, name: impl Into<String>, id: SchemaNodeId) {
        self.names.insert(id, name.into());
    }

    pub fn resolve(&self, id: SchemaNodeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn define(&mut self, name: String, schema: JsonSchema) {
        self.definitions.insert(name, schema);
    }

    pub fn into_definitions(self) -> IndexMap<String, JsonSchema> {
        self.definitions
    }
}
