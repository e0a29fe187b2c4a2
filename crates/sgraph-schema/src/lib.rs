//! Validation schema graph
//!
//! This crate provides the input side of sgraph: an arena of schema nodes
//! ([`SchemaGraph`]) describing primitive types, composite types and their
//! refinement chains, plus a loader for JSON *schema modules* ([`SchemaModule`]).
//!
//! Nodes refer to each other through [`SchemaNodeId`] handles. A handle is the
//! identity of a node: the same handle may be shared by several parents and by a
//! caller's named definitions, and self-reference is expressed with
//! [`SchemaNodeContent::Lazy`].

mod graph;
mod literal;
pub mod module;
mod node;
mod validation;

pub use graph::SchemaGraph;
pub use literal::Literal;
pub use module::{Export, ModuleError, Namespace, SchemaModule};
pub use node::{
    ForeignSchema, ObjectSchema, RecordSchema, SchemaKind, SchemaNode, SchemaNodeContent,
    SchemaNodeId, TupleSchema, VariantSchema, WrappedSchema,
};
pub use validation::{Requirement, Validation, ValidationKind};
