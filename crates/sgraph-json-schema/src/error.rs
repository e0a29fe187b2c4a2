use sgraph_schema::{SchemaKind, ValidationKind};

/// Errors that can occur during schema graph to JSON Schema conversion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Node kind with no converter (built-in or override)
    #[error("Unsupported schema: {0}")]
    UnsupportedSchema(SchemaKind),

    /// Refinement step with no converter for the owning node kind
    #[error("Unsupported validation `{validation}` for schema `{schema}`")]
    UnsupportedValidation {
        validation: ValidationKind,
        schema: SchemaKind,
    },

    /// Value that has no JSON literal representation
    #[error("Unsupported literal value type: {0}")]
    UnsupportedLiteral(String),

    /// Record key that is not the string kind
    #[error("Unsupported record key type: {0}")]
    UnsupportedKeyType(SchemaKind),

    /// Lazy node pointing at a node that was not given a name
    #[error("Type inside lazy schema must be provided in the definitions")]
    MissingDefinition,

    #[error("The `{option}` option must be set to handle `{kind}` schemas")]
    MissingStrategy {
        option: &'static str,
        kind: SchemaKind,
    },

    /// Requirement value of the wrong shape for its validation
    #[error("{0}")]
    InvalidRequirement(String),

    #[error("No main schema or definitions provided.")]
    NoSchemaProvided,

    #[error("Invalid schema node reference: {0}")]
    InvalidNodeReference(usize),

    /// Cycle through nodes that have no definition name to break it
    #[error("Circular reference detected: {0}")]
    CircularReference(String),

    /// Raw keywords that do not fit the JSON Schema keyword they name
    #[error("Invalid JSON Schema features: {0}")]
    InvalidFeatures(String),
}
