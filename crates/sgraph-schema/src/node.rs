//! Schema node types

use std::fmt;

use indexmap::IndexMap;

use crate::{Literal, Validation};

/// Handle of a node inside a [`SchemaGraph`](crate::SchemaGraph).
///
/// Handles are assigned when a node is created and are the node's identity:
/// two structurally equal nodes with different handles are different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaNodeId(pub usize);

impl fmt::Display for SchemaNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the schema graph
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub content: SchemaNodeContent,
    /// Refinement chain, oldest step first.
    pub pipe: Vec<Validation>,
    /// Raw JSON Schema keywords merged onto the converted node last.
    pub features: Option<IndexMap<String, serde_json::Value>>,
}

impl SchemaNode {
    pub fn new(content: SchemaNodeContent) -> Self {
        Self {
            content,
            pipe: Vec::new(),
            features: None,
        }
    }

    pub fn kind(&self) -> SchemaKind {
        self.content.kind()
    }
}

impl From<SchemaNodeContent> for SchemaNode {
    fn from(content: SchemaNodeContent) -> Self {
        Self::new(content)
    }
}

/// Content of a schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNodeContent {
    Any,
    Null,
    Literal(Literal),
    Number,
    String,
    Boolean,
    /// Arbitrary precision integer
    BigInt,
    Date,
    /// The absent value
    Undefined,
    /// The bottom type. Only meaningful as the `rest` of a tuple or object.
    Never,

    Nullable(WrappedSchema),
    Nullish(WrappedSchema),
    Optional(WrappedSchema),

    /// Fixed list of literal options
    Picklist(Vec<Literal>),
    /// Named members, converted by value in declaration order
    Enum(IndexMap<String, Literal>),

    Union(Vec<SchemaNodeId>),
    Variant(VariantSchema),
    Intersect(Vec<SchemaNodeId>),

    Array(SchemaNodeId),
    Tuple(TupleSchema),
    Object(ObjectSchema),
    Record(RecordSchema),

    /// Deferred reference to another node. The target is never converted
    /// structurally through this edge.
    Lazy(SchemaNodeId),

    /// A node kind this crate does not model
    Foreign(ForeignSchema),
}

impl SchemaNodeContent {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Any => SchemaKind::Any,
            Self::Null => SchemaKind::Null,
            Self::Literal(_) => SchemaKind::Literal,
            Self::Number => SchemaKind::Number,
            Self::String => SchemaKind::String,
            Self::Boolean => SchemaKind::Boolean,
            Self::BigInt => SchemaKind::BigInt,
            Self::Date => SchemaKind::Date,
            Self::Undefined => SchemaKind::Undefined,
            Self::Never => SchemaKind::Never,
            Self::Nullable(_) => SchemaKind::Nullable,
            Self::Nullish(_) => SchemaKind::Nullish,
            Self::Optional(_) => SchemaKind::Optional,
            Self::Picklist(_) => SchemaKind::Picklist,
            Self::Enum(_) => SchemaKind::Enum,
            Self::Union(_) => SchemaKind::Union,
            Self::Variant(_) => SchemaKind::Variant,
            Self::Intersect(_) => SchemaKind::Intersect,
            Self::Array(_) => SchemaKind::Array,
            Self::Tuple(_) => SchemaKind::Tuple,
            Self::Object(_) => SchemaKind::Object,
            Self::Record(_) => SchemaKind::Record,
            Self::Lazy(_) => SchemaKind::Lazy,
            Self::Foreign(f) => SchemaKind::Foreign(f.kind.clone()),
        }
    }
}

/// Wrapper schema (nullable, nullish, optional)
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedSchema {
    pub wrapped: SchemaNodeId,
    pub default: Option<serde_json::Value>,
}

impl WrappedSchema {
    pub fn new(wrapped: SchemaNodeId) -> Self {
        Self {
            wrapped,
            default: None,
        }
    }
}

/// Discriminated union
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSchema {
    /// Discriminant property, present in every option
    pub key: String,
    pub options: Vec<SchemaNodeId>,
}

/// Tuple schema
///
/// `rest: None` leaves trailing items unconstrained; a [`SchemaNodeContent::Never`]
/// rest closes the tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleSchema {
    pub items: Vec<SchemaNodeId>,
    pub rest: Option<SchemaNodeId>,
}

/// Object schema
///
/// `rest: None` is an open object, a [`SchemaNodeContent::Never`] rest is a
/// closed object and any other rest types the unknown entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub entries: IndexMap<String, SchemaNodeId>,
    pub rest: Option<SchemaNodeId>,
}

/// Record (map) schema
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub key: SchemaNodeId,
    pub value: SchemaNodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignSchema {
    pub kind: String,
    pub children: Vec<SchemaNodeId>,
}

/// Kind discriminant of a schema node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Any,
    Null,
    Literal,
    Number,
    String,
    Boolean,
    BigInt,
    Date,
    Undefined,
    Never,
    Nullable,
    Nullish,
    Optional,
    Picklist,
    Enum,
    Union,
    Variant,
    Intersect,
    Array,
    Tuple,
    Object,
    Record,
    Lazy,
    Foreign(String),
}

impl SchemaKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::Literal => "literal",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::BigInt => "bigint",
            Self::Date => "date",
            Self::Undefined => "undefined",
            Self::Never => "never",
            Self::Nullable => "nullable",
            Self::Nullish => "nullish",
            Self::Optional => "optional",
            Self::Picklist => "picklist",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Variant => "variant",
            Self::Intersect => "intersect",
            Self::Array => "array",
            Self::Tuple => "tuple",
            Self::Object => "object",
            Self::Record => "record",
            Self::Lazy => "lazy",
            Self::Foreign(kind) => kind,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
