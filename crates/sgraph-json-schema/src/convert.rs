//! Conversion of schema graph nodes to JSON Schema
//!
//! Every node is converted in three steps: the kind converter (an override from
//! [`Config`] or the built-in one) produces the base shape, the refinement chain
//! is merged onto it, and the node's raw features are merged last.
//!
//! Named nodes are converted once. Their shape is stored under their definition
//! name and every use site, the first one included, gets a `$ref`.

use indexmap::IndexMap;
use sgraph_schema::{
    ObjectSchema, RecordSchema, SchemaGraph, SchemaKind, SchemaNode, SchemaNodeContent,
    SchemaNodeId, TupleSchema, WrappedSchema,
};
use tracing::{debug, trace};

use crate::{
    BigIntStrategy,
    Config,
    ConversionError,
    DateStrategy,
    InstanceType,
    Items,
    JsonSchema,
    SchemaOrBool,
    UndefinedStrategy,
    definitions::{DefinitionResolver, ref_uri},
    features::apply_features,
    literal::json_literal,
    validations::convert_pipe,
};

/// Walker state of one conversion call
pub struct ConversionContext<'a> {
    graph: &'a SchemaGraph,
    config: &'a Config,
    resolver: DefinitionResolver,
    /// Nodes on the current conversion path
    visiting: Vec<SchemaNodeId>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(graph: &'a SchemaGraph, config: &'a Config) -> Self {
        Self {
            graph,
            config,
            resolver: DefinitionResolver::new(),
            visiting: Vec::new(),
        }
    }

    pub fn graph(&self) -> &'a SchemaGraph {
        self.graph
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Give a node a definition name.
    pub fn register(&mut self, name: impl Into<String>, id: SchemaNodeId) {
        self.resolver.register(name, id);
    }

    /// `$ref` to a named node, without converting it.
    pub fn definition_ref(&self, id: SchemaNodeId) -> Option<JsonSchema> {
        self.resolver
            .resolve(id)
            .map(|name| JsonSchema::reference(ref_uri(name)))
    }

    pub(crate) fn into_definitions(self) -> IndexMap<String, JsonSchema> {
        self.resolver.into_definitions()
    }

    fn get_node(&self, id: SchemaNodeId) -> Result<&'a SchemaNode, ConversionError> {
        self.graph
            .node(id)
            .ok_or(ConversionError::InvalidNodeReference(id.0))
    }

    /// Convert a node, returning a `$ref` for named nodes.
    pub fn convert(&mut self, id: SchemaNodeId) -> Result<JsonSchema, ConversionError> {
        let node = self.get_node(id)?;
        let name = self.resolver.resolve(id).map(str::to_string);

        if let Some(name) = &name {
            // Already stored, or being converted further up this path
            if self.resolver.is_defined(name) || self.visiting.contains(&id) {
                return Ok(JsonSchema::reference(ref_uri(name)));
            }
        }
        if self.visiting.contains(&id) {
            return Err(ConversionError::CircularReference(format!(
                "Node {id} creates a cycle"
            )));
        }

        trace!(node = %id, kind = %node.kind(), "converting node");
        self.visiting.push(id);
        let result = self.convert_node(node);
        self.visiting.pop();
        let converted = result?;

        match name {
            Some(name) => {
                debug!(%name, node = %id, "stored definition");
                let reference = JsonSchema::reference(ref_uri(&name));
                self.resolver.define(name, converted);
                Ok(reference)
            }
            None => Ok(converted),
        }
    }

    fn convert_node(&mut self, node: &SchemaNode) -> Result<JsonSchema, ConversionError> {
        let kind = node.kind();
        let config = self.config;

        let mut schema = match config.schema_overrides.get(&kind) {
            Some(custom) => custom(node, self)?,
            None => self.convert_content(&node.content)?,
        };
        schema.merge(convert_pipe(&kind, &node.pipe, config)?);
        apply_features(&mut schema, node.features.as_ref())?;
        Ok(schema)
    }

    /// Built-in conversion of a node's content, without its refinements or features.
    ///
    /// Overrides can call this to decorate the built-in shape.
    pub fn convert_content(
        &mut self,
        content: &SchemaNodeContent,
    ) -> Result<JsonSchema, ConversionError> {
        match content {
            SchemaNodeContent::Any => Ok(JsonSchema::default()),
            SchemaNodeContent::Null => Ok(JsonSchema::constant(serde_json::Value::Null)),
            SchemaNodeContent::Literal(literal) => Ok(JsonSchema::constant(json_literal(literal)?)),
            SchemaNodeContent::Number => Ok(JsonSchema::of_type(InstanceType::Number)),
            SchemaNodeContent::String => Ok(JsonSchema::of_type(InstanceType::String)),
            SchemaNodeContent::Boolean => Ok(JsonSchema::of_type(InstanceType::Boolean)),

            SchemaNodeContent::BigInt => convert_bigint(self.config),
            SchemaNodeContent::Date => convert_date(self.config),
            SchemaNodeContent::Undefined => convert_undefined(self.config),

            SchemaNodeContent::Nullable(w) | SchemaNodeContent::Nullish(w) => {
                convert_nullable(self, w)
            }
            SchemaNodeContent::Optional(w) => convert_optional(self, w),

            SchemaNodeContent::Picklist(options) => Ok(JsonSchema {
                enum_values: Some(options.iter().map(json_literal).collect::<Result<_, _>>()?),
                ..Default::default()
            }),
            SchemaNodeContent::Enum(members) => Ok(JsonSchema {
                enum_values: Some(members.values().map(json_literal).collect::<Result<_, _>>()?),
                ..Default::default()
            }),

            SchemaNodeContent::Union(options) => Ok(JsonSchema {
                any_of: Some(self.convert_all(options)?),
                ..Default::default()
            }),
            // The discriminant key is not special-cased
            SchemaNodeContent::Variant(variant) => Ok(JsonSchema {
                any_of: Some(self.convert_all(&variant.options)?),
                ..Default::default()
            }),
            SchemaNodeContent::Intersect(options) => Ok(JsonSchema {
                all_of: Some(self.convert_all(options)?),
                ..Default::default()
            }),

            SchemaNodeContent::Array(item) => Ok(JsonSchema {
                type_: Some(InstanceType::Array.into()),
                items: Some(Items::Single(Box::new(self.convert(*item)?.into()))),
                ..Default::default()
            }),
            SchemaNodeContent::Tuple(t) => convert_tuple(self, t),
            SchemaNodeContent::Object(o) => convert_object(self, o),
            SchemaNodeContent::Record(r) => convert_record(self, r),

            SchemaNodeContent::Lazy(target) => self
                .definition_ref(*target)
                .ok_or(ConversionError::MissingDefinition),

            SchemaNodeContent::Never | SchemaNodeContent::Foreign(_) => {
                Err(ConversionError::UnsupportedSchema(content.kind()))
            }
        }
    }

    /// Convert each node in order.
    pub fn convert_all(
        &mut self,
        ids: &[SchemaNodeId],
    ) -> Result<Vec<SchemaOrBool>, ConversionError> {
        ids.iter()
            .map(|id| self.convert(*id).map(SchemaOrBool::from))
            .collect()
    }

    fn is_kind(&self, id: SchemaNodeId, kind: SchemaKind) -> Result<bool, ConversionError> {
        Ok(self.get_node(id)?.kind() == kind)
    }
}

fn convert_bigint(config: &Config) -> Result<JsonSchema, ConversionError> {
    match config.bigint_strategy {
        Some(BigIntStrategy::Integer) => Ok(JsonSchema {
            format: Some("int64".to_string()),
            ..JsonSchema::of_type(InstanceType::Integer)
        }),
        Some(BigIntStrategy::String) => Ok(JsonSchema::of_type(InstanceType::String)),
        None => Err(ConversionError::MissingStrategy {
            option: "bigint_strategy",
            kind: SchemaKind::BigInt,
        }),
    }
}

fn convert_date(config: &Config) -> Result<JsonSchema, ConversionError> {
    let (ty, format) = match config.date_strategy {
        Some(DateStrategy::Integer) => (InstanceType::Integer, "unix-time"),
        Some(DateStrategy::String) => (InstanceType::String, "date-time"),
        None => {
            return Err(ConversionError::MissingStrategy {
                option: "date_strategy",
                kind: SchemaKind::Date,
            });
        }
    };
    Ok(JsonSchema {
        format: Some(format.to_string()),
        ..JsonSchema::of_type(ty)
    })
}

fn convert_undefined(config: &Config) -> Result<JsonSchema, ConversionError> {
    match config.undefined_strategy {
        Some(UndefinedStrategy::Any) => Ok(JsonSchema::default()),
        Some(UndefinedStrategy::Null) => Ok(JsonSchema::of_type(InstanceType::Null)),
        None => Err(ConversionError::MissingStrategy {
            option: "undefined_strategy",
            kind: SchemaKind::Undefined,
        }),
    }
}

fn convert_nullable(
    ctx: &mut ConversionContext,
    wrapped: &WrappedSchema,
) -> Result<JsonSchema, ConversionError> {
    let inner = ctx.convert(wrapped.wrapped)?;
    Ok(JsonSchema {
        any_of: Some(vec![
            JsonSchema::constant(serde_json::Value::Null).into(),
            inner.into(),
        ]),
        default: wrapped.default.clone(),
        ..Default::default()
    })
}

fn convert_optional(
    ctx: &mut ConversionContext,
    wrapped: &WrappedSchema,
) -> Result<JsonSchema, ConversionError> {
    let mut schema = ctx.convert(wrapped.wrapped)?;
    if wrapped.default.is_some() {
        schema.default = wrapped.default.clone();
    }
    Ok(schema)
}

fn convert_tuple(
    ctx: &mut ConversionContext,
    tuple: &TupleSchema,
) -> Result<JsonSchema, ConversionError> {
    let len = tuple.items.len() as u64;
    let mut items = ctx.convert_all(&tuple.items)?;
    let mut schema = JsonSchema {
        type_: Some(InstanceType::Array.into()),
        min_items: Some(len),
        ..Default::default()
    };

    match tuple.rest {
        Some(rest) if ctx.is_kind(rest, SchemaKind::Never)? => {
            schema.max_items = Some(len);
        }
        Some(rest) => {
            let rest = SchemaOrBool::from(ctx.convert(rest)?);
            // A uniform 1-tuple is a plain array of at least one item
            if items.len() == 1 && items[0] == rest {
                schema.items = items.pop().map(|item| Items::Single(Box::new(item)));
                return Ok(schema);
            }
            schema.additional_items = Some(rest);
        }
        None => {}
    }
    schema.items = Some(Items::Tuple(items));
    Ok(schema)
}

fn convert_object(
    ctx: &mut ConversionContext,
    object: &ObjectSchema,
) -> Result<JsonSchema, ConversionError> {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for (name, id) in &object.entries {
        let optional =
            ctx.is_kind(*id, SchemaKind::Optional)? || ctx.is_kind(*id, SchemaKind::Nullish)?;
        if !optional {
            required.push(name.clone());
        }
        properties.insert(name.clone(), ctx.convert(*id)?.into());
    }

    let additional_properties = match object.rest {
        Some(rest) if ctx.is_kind(rest, SchemaKind::Never)? => Some(SchemaOrBool::Bool(false)),
        Some(rest) => Some(ctx.convert(rest)?.into()),
        None if ctx.config().strict_object_types => Some(SchemaOrBool::Bool(false)),
        None => None,
    };

    Ok(JsonSchema {
        type_: Some(InstanceType::Object.into()),
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        additional_properties,
        ..Default::default()
    })
}

fn convert_record(
    ctx: &mut ConversionContext,
    record: &RecordSchema,
) -> Result<JsonSchema, ConversionError> {
    let key_kind = ctx.get_node(record.key)?.kind();
    if key_kind != SchemaKind::String {
        return Err(ConversionError::UnsupportedKeyType(key_kind));
    }
    Ok(JsonSchema {
        type_: Some(InstanceType::Object.into()),
        additional_properties: Some(ctx.convert(record.value)?.into()),
        ..Default::default()
    })
}
