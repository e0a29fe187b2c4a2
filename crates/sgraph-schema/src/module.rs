//! Schema module loading
//!
//! A schema module is a JSON object whose entries are *exports*. An entry with a
//! `kind` string is a schema node, an entry without one is a nested namespace.
//! Exports are addressed with dotted paths such as `schemas.NumberSchema`.
//!
//! Wherever a node is expected, `{"ref": "<path>"}` stands for the exported node
//! itself, so every reference to an export shares that export's handle:
//!
//! ```json
//! {
//!   "ListItem": {
//!     "kind": "object",
//!     "entries": {
//!       "children": { "kind": "array", "item": { "kind": "lazy", "getter": "List" } }
//!     }
//!   },
//!   "List": {
//!     "kind": "object",
//!     "entries": { "children": { "kind": "array", "item": { "ref": "ListItem" } } }
//!   }
//! }
//! ```

use ahash::AHashSet;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    ForeignSchema, Literal, ObjectSchema, RecordSchema, Requirement, SchemaGraph, SchemaNode,
    SchemaNodeContent, SchemaNodeId, TupleSchema, Validation, VariantSchema, WrappedSchema,
};

/// Errors that can occur while loading a schema module
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema module must be a JSON object")]
    NotAnObject,

    #[error("Missing field `{field}` in `{kind}` schema at {location}")]
    MissingField {
        kind: String,
        field: &'static str,
        location: String,
    },

    #[error("Invalid field `{field}` at {location}: expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
        location: String,
    },

    #[error("Unknown export `{0}`")]
    UnknownExport(String),

    #[error("Export `{0}` is a namespace, not a schema")]
    NotASchema(String),

    #[error("Circular alias at export `{0}`")]
    CircularAlias(String),

    #[error("Invalid date `{0}`: expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),
}

/// An exported value of a schema module
#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    Node(SchemaNodeId),
    Namespace(Namespace),
}

/// A set of named exports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    entries: IndexMap<String, Export>,
}

impl Namespace {
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Direct node exports, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, SchemaNodeId)> {
        self.iter().filter_map(|(name, export)| match export {
            Export::Node(id) => Some((name, *id)),
            Export::Namespace(_) => None,
        })
    }

    /// Look up a dotted path.
    pub fn lookup(&self, path: &str) -> Option<&Export> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            match current {
                Export::Namespace(ns) => current = ns.get(segment)?,
                Export::Node(_) => return None,
            }
        }
        Some(current)
    }
}

/// A loaded schema module: the graph plus its exports.
#[derive(Debug, Clone)]
pub struct SchemaModule {
    graph: SchemaGraph,
    exports: Namespace,
}

impl SchemaModule {
    pub fn from_json_str(source: &str) -> Result<Self, ModuleError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ModuleError> {
        let root = value.as_object().ok_or(ModuleError::NotAnObject)?;
        let mut loader = Loader::default();
        let scanned = loader.scan(root);
        let exports = loader.link(&scanned, &scanned, "")?;
        loader.lower_exports(&scanned)?;

        debug!(
            nodes = loader.graph.len(),
            exports = exports.entries.len(),
            "loaded schema module"
        );
        Ok(Self {
            graph: loader.graph,
            exports,
        })
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn exports(&self) -> &Namespace {
        &self.exports
    }

    /// Look up an export by dotted path.
    pub fn lookup(&self, path: &str) -> Option<&Export> {
        self.exports.lookup(path)
    }

    /// Look up a node export by dotted path.
    pub fn node(&self, path: &str) -> Option<SchemaNodeId> {
        match self.lookup(path)? {
            Export::Node(id) => Some(*id),
            Export::Namespace(_) => None,
        }
    }
}

/// Module entries before references are resolved
enum Scanned<'v> {
    Node(SchemaNodeId, &'v Map<String, Value>),
    Alias(&'v str),
    Namespace(IndexMap<String, Scanned<'v>>),
}

type ScannedEntries<'v> = IndexMap<String, Scanned<'v>>;

#[derive(Default)]
struct Loader {
    graph: SchemaGraph,
    /// Export currently being lowered, for error messages
    location: String,
}

impl Loader {
    /// Reserve a handle for every node export so references can point forward.
    fn scan<'v>(&mut self, object: &'v Map<String, Value>) -> ScannedEntries<'v> {
        let mut entries = IndexMap::new();
        for (name, value) in object {
            let Some(obj) = value.as_object() else {
                // Non-object exports (constants, helpers) are not schemas
                continue;
            };
            let scanned = if obj.contains_key("kind") {
                Scanned::Node(self.graph.reserve_node(), obj)
            } else if let Some(target) = alias_target(obj) {
                Scanned::Alias(target)
            } else {
                Scanned::Namespace(self.scan(obj))
            };
            entries.insert(name.clone(), scanned);
        }
        entries
    }

    fn link(
        &self,
        root: &ScannedEntries<'_>,
        entries: &ScannedEntries<'_>,
        prefix: &str,
    ) -> Result<Namespace, ModuleError> {
        let mut namespace = Namespace::default();
        for (name, scanned) in entries {
            let path = join_path(prefix, name);
            let export = match scanned {
                Scanned::Node(id, _) => Export::Node(*id),
                Scanned::Alias(target) => {
                    Export::Node(resolve(root, target, &mut AHashSet::from_iter([path.clone()]))?)
                }
                Scanned::Namespace(inner) => Export::Namespace(self.link(root, inner, &path)?),
            };
            namespace.entries.insert(name.clone(), export);
        }
        Ok(namespace)
    }

    fn lower_exports(&mut self, root: &ScannedEntries<'_>) -> Result<(), ModuleError> {
        self.lower_entries(root, root, "")
    }

    fn lower_entries(
        &mut self,
        root: &ScannedEntries<'_>,
        entries: &ScannedEntries<'_>,
        prefix: &str,
    ) -> Result<(), ModuleError> {
        for (name, scanned) in entries {
            let path = join_path(prefix, name);
            match scanned {
                Scanned::Node(id, obj) => {
                    self.location = path;
                    let node = self.build_node(root, obj)?;
                    self.graph.set_node(*id, node);
                }
                Scanned::Namespace(inner) => self.lower_entries(root, inner, &path)?,
                Scanned::Alias(_) => {}
            }
        }
        Ok(())
    }

    /// Lower an inline node or resolve a `ref`.
    fn lower(
        &mut self,
        root: &ScannedEntries<'_>,
        value: &Value,
    ) -> Result<SchemaNodeId, ModuleError> {
        let obj = value
            .as_object()
            .ok_or_else(|| self.invalid("node", "a schema object"))?;
        if let Some(target) = alias_target(obj) {
            return resolve(root, target, &mut AHashSet::new());
        }
        let node = self.build_node(root, obj)?;
        Ok(self.graph.insert(node))
    }

    fn lower_list(
        &mut self,
        root: &ScannedEntries<'_>,
        obj: &Map<String, Value>,
        kind: &str,
        field: &'static str,
    ) -> Result<Vec<SchemaNodeId>, ModuleError> {
        let items = self
            .field(obj, kind, field)?
            .as_array()
            .ok_or_else(|| self.invalid(field, "an array of schemas"))?;
        items.iter().map(|item| self.lower(root, item)).collect()
    }

    fn build_node(
        &mut self,
        root: &ScannedEntries<'_>,
        obj: &Map<String, Value>,
    ) -> Result<SchemaNode, ModuleError> {
        let kind = obj
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid("kind", "a string"))?;

        let content = match kind {
            "any" => SchemaNodeContent::Any,
            "null" => SchemaNodeContent::Null,
            "number" => SchemaNodeContent::Number,
            "string" => SchemaNodeContent::String,
            "boolean" => SchemaNodeContent::Boolean,
            "bigint" => SchemaNodeContent::BigInt,
            "date" => SchemaNodeContent::Date,
            "undefined" => SchemaNodeContent::Undefined,
            "never" => SchemaNodeContent::Never,
            "literal" => {
                let literal = self.field(obj, kind, "literal")?;
                SchemaNodeContent::Literal(self.literal(literal)?)
            }
            "nullable" => SchemaNodeContent::Nullable(self.wrapped(root, obj, kind)?),
            "nullish" => SchemaNodeContent::Nullish(self.wrapped(root, obj, kind)?),
            "optional" => SchemaNodeContent::Optional(self.wrapped(root, obj, kind)?),
            "picklist" => {
                let options = self
                    .field(obj, kind, "options")?
                    .as_array()
                    .ok_or_else(|| self.invalid("options", "an array of literals"))?;
                SchemaNodeContent::Picklist(
                    options
                        .iter()
                        .map(|option| self.literal(option))
                        .collect::<Result<_, _>>()?,
                )
            }
            "enum" => {
                let members = self
                    .field(obj, kind, "enum")?
                    .as_object()
                    .ok_or_else(|| self.invalid("enum", "an object of literals"))?;
                let mut out = IndexMap::new();
                for (name, value) in members {
                    out.insert(name.clone(), self.literal(value)?);
                }
                SchemaNodeContent::Enum(out)
            }
            "union" => SchemaNodeContent::Union(self.lower_list(root, obj, kind, "options")?),
            "intersect" => {
                SchemaNodeContent::Intersect(self.lower_list(root, obj, kind, "options")?)
            }
            "variant" => {
                let key = self
                    .field(obj, kind, "key")?
                    .as_str()
                    .ok_or_else(|| self.invalid("key", "a string"))?
                    .to_string();
                let options = self.lower_list(root, obj, kind, "options")?;
                SchemaNodeContent::Variant(VariantSchema { key, options })
            }
            "array" => {
                let item = self.field(obj, kind, "item")?;
                SchemaNodeContent::Array(self.lower(root, item)?)
            }
            "tuple" | "tuple_with_rest" | "strict_tuple" => {
                let items = self.lower_list(root, obj, kind, "items")?;
                let rest = self.rest(root, obj, kind)?;
                SchemaNodeContent::Tuple(TupleSchema { items, rest })
            }
            "object" | "object_with_rest" | "strict_object" => {
                let entries = self
                    .field(obj, kind, "entries")?
                    .as_object()
                    .ok_or_else(|| self.invalid("entries", "an object of schemas"))?;
                let mut out = IndexMap::new();
                for (name, value) in entries {
                    out.insert(name.clone(), self.lower(root, value)?);
                }
                let rest = self.rest(root, obj, kind)?;
                SchemaNodeContent::Object(ObjectSchema { entries: out, rest })
            }
            "record" => {
                let key = self.field(obj, kind, "key")?;
                let key = self.lower(root, key)?;
                let value = self.field(obj, kind, "value")?;
                let value = self.lower(root, value)?;
                SchemaNodeContent::Record(RecordSchema { key, value })
            }
            "lazy" => {
                let getter = self
                    .field(obj, kind, "getter")?
                    .as_str()
                    .ok_or_else(|| self.invalid("getter", "an export path"))?;
                SchemaNodeContent::Lazy(resolve(root, getter, &mut AHashSet::new())?)
            }
            other => {
                let children = match obj.get("children") {
                    Some(_) => self.lower_list(root, obj, kind, "children")?,
                    None => Vec::new(),
                };
                SchemaNodeContent::Foreign(ForeignSchema {
                    kind: other.to_string(),
                    children,
                })
            }
        };

        let pipe = match obj.get("pipe") {
            Some(Value::Array(steps)) => steps
                .iter()
                .map(|step| self.validation(step))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(self.invalid("pipe", "an array of validations")),
            None => Vec::new(),
        };

        let features = match obj.get("features") {
            Some(Value::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<IndexMap<_, _>>(),
            ),
            Some(_) => return Err(self.invalid("features", "an object")),
            None => None,
        };

        Ok(SchemaNode {
            content,
            pipe,
            features,
        })
    }

    fn wrapped(
        &mut self,
        root: &ScannedEntries<'_>,
        obj: &Map<String, Value>,
        kind: &str,
    ) -> Result<WrappedSchema, ModuleError> {
        let wrapped = self.field(obj, kind, "wrapped")?;
        Ok(WrappedSchema {
            wrapped: self.lower(root, wrapped)?,
            default: obj.get("default").cloned(),
        })
    }

    /// `strict_*` kinds are closed with a never rest.
    fn rest(
        &mut self,
        root: &ScannedEntries<'_>,
        obj: &Map<String, Value>,
        kind: &str,
    ) -> Result<Option<SchemaNodeId>, ModuleError> {
        if kind.starts_with("strict_") {
            return Ok(Some(self.graph.create_node(SchemaNodeContent::Never)));
        }
        match obj.get("rest") {
            Some(rest) => Ok(Some(self.lower(root, rest)?)),
            None if kind.ends_with("_with_rest") => Err(ModuleError::MissingField {
                kind: kind.to_string(),
                field: "rest",
                location: self.location.clone(),
            }),
            None => Ok(None),
        }
    }

    fn literal(&self, value: &Value) -> Result<Literal, ModuleError> {
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Literal::Integer(i),
                None => Literal::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Ok(Literal::String(s.clone())),
            Value::Object(marker) => {
                if marker.contains_key("$nan") {
                    Ok(Literal::Float(f64::NAN))
                } else if let Some(sign) = marker.get("$infinity") {
                    let negative = sign.as_f64().is_some_and(|s| s < 0.0);
                    Ok(Literal::Float(if negative {
                        f64::NEG_INFINITY
                    } else {
                        f64::INFINITY
                    }))
                } else if let Some(desc) = marker.get("$symbol") {
                    Ok(Literal::Symbol(desc.as_str().map(str::to_string)))
                } else if let Some(digits) = marker.get("$bigint") {
                    digits
                        .as_str()
                        .and_then(|s| s.parse::<BigInt>().ok())
                        .map(Literal::BigInt)
                        .ok_or_else(|| self.invalid("$bigint", "a decimal integer string"))
                } else if marker.contains_key("$undefined") {
                    Ok(Literal::Undefined)
                } else {
                    Err(self.invalid("literal", "a JSON primitive or literal marker"))
                }
            }
            Value::Array(_) => Err(self.invalid("literal", "a JSON primitive or literal marker")),
        }
    }

    fn requirement(&self, value: &Value) -> Result<Requirement, ModuleError> {
        if let Some(date) = value.as_object().and_then(|obj| obj.get("$date")) {
            let text = date
                .as_str()
                .ok_or_else(|| self.invalid("$date", "a date string"))?;
            return parse_date(text).map(Requirement::Date);
        }
        self.literal(value).map(Requirement::Literal)
    }

    fn validation(&self, step: &Value) -> Result<Validation, ModuleError> {
        let obj = step
            .as_object()
            .ok_or_else(|| self.invalid("pipe", "an array of validation objects"))?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid("type", "a validation name"))?;

        let requirement = || self.field(obj, kind, "requirement");
        let size = || -> Result<usize, ModuleError> {
            requirement()?
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| self.invalid("requirement", "a non-negative integer"))
        };

        Ok(match kind {
            "length" => Validation::Length(size()?),
            "min_length" => Validation::MinLength(size()?),
            "max_length" => Validation::MaxLength(size()?),
            "regex" => Validation::Regex(
                requirement()?
                    .as_str()
                    .ok_or_else(|| self.invalid("requirement", "a pattern string"))?
                    .to_string(),
            ),
            "value" => Validation::Value(self.requirement(requirement()?)?),
            "min_value" => Validation::MinValue(self.requirement(requirement()?)?),
            "max_value" => Validation::MaxValue(self.requirement(requirement()?)?),
            "multiple_of" => Validation::MultipleOf(self.requirement(requirement()?)?),
            "integer" => Validation::Integer,
            "email" => Validation::Email,
            "iso_date" => Validation::IsoDate,
            "iso_timestamp" => Validation::IsoTimestamp,
            "ipv4" => Validation::Ipv4,
            "ipv6" => Validation::Ipv6,
            "uuid" => Validation::Uuid,
            "description" => Validation::Description(
                self.field(obj, kind, "description")?
                    .as_str()
                    .ok_or_else(|| self.invalid("description", "a string"))?
                    .to_string(),
            ),
            "json_schema_metadata" => {
                let metadata = self
                    .field(obj, kind, "metadata")?
                    .as_object()
                    .ok_or_else(|| self.invalid("metadata", "an object"))?;
                Validation::JsonSchemaMetadata(
                    metadata.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                )
            }
            other => Validation::Custom(other.to_string()),
        })
    }

    fn field<'v>(
        &self,
        obj: &'v Map<String, Value>,
        kind: &str,
        field: &'static str,
    ) -> Result<&'v Value, ModuleError> {
        obj.get(field).ok_or_else(|| ModuleError::MissingField {
            kind: kind.to_string(),
            field,
            location: self.location.clone(),
        })
    }

    fn invalid(&self, field: &str, expected: &'static str) -> ModuleError {
        ModuleError::InvalidField {
            field: field.to_string(),
            expected,
            location: self.location.clone(),
        }
    }
}

/// `{"ref": "<path>"}` with no other keys
fn alias_target(obj: &Map<String, Value>) -> Option<&str> {
    if obj.len() == 1 {
        obj.get("ref").and_then(Value::as_str)
    } else {
        None
    }
}

fn resolve(
    root: &ScannedEntries<'_>,
    path: &str,
    seen: &mut AHashSet<String>,
) -> Result<SchemaNodeId, ModuleError> {
    let mut segments = path.split('.');
    let mut current = segments
        .next()
        .and_then(|first| root.get(first))
        .ok_or_else(|| ModuleError::UnknownExport(path.to_string()))?;
    for segment in segments {
        current = match current {
            Scanned::Namespace(inner) => inner
                .get(segment)
                .ok_or_else(|| ModuleError::UnknownExport(path.to_string()))?,
            _ => return Err(ModuleError::UnknownExport(path.to_string())),
        };
    }
    match current {
        Scanned::Node(id, _) => Ok(*id),
        Scanned::Alias(target) => {
            if !seen.insert(path.to_string()) {
                return Err(ModuleError::CircularAlias(path.to_string()));
            }
            resolve(root, target, seen)
        }
        Scanned::Namespace(_) => Err(ModuleError::NotASchema(path.to_string())),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn parse_date(text: &str) -> Result<DateTime<Utc>, ModuleError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| ModuleError::InvalidDate(text.to_string()))
}
