//! Schema graph arena

use indexmap::IndexMap;

use crate::{SchemaNode, SchemaNodeContent, SchemaNodeId, Validation};

/// Arena of schema nodes.
///
/// Nodes are never removed, so every handle returned by this graph stays valid
/// for its lifetime. Recursive shapes are built by reserving a handle first and
/// filling it in once the children referring to it exist.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema node with the given content.
    pub fn create_node(&mut self, content: SchemaNodeContent) -> SchemaNodeId {
        self.insert(SchemaNode::new(content))
    }

    /// Create a schema node with content and a refinement chain.
    pub fn create_node_with_pipe(
        &mut self,
        content: SchemaNodeContent,
        pipe: Vec<Validation>,
    ) -> SchemaNodeId {
        self.insert(SchemaNode {
            content,
            pipe,
            features: None,
        })
    }

    pub fn insert(&mut self, node: SchemaNode) -> SchemaNodeId {
        let id = SchemaNodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Reserve a node slot, returning its ID.
    ///
    /// The node is initialized with `Any` content and should be finalized
    /// with [`set_node`](Self::set_node) or [`set_content`](Self::set_content).
    pub fn reserve_node(&mut self) -> SchemaNodeId {
        self.create_node(SchemaNodeContent::Any)
    }

    /// Replace a node. Panics if `id` does not belong to this graph.
    pub fn set_node(&mut self, id: SchemaNodeId, node: SchemaNode) {
        self.nodes[id.0] = node;
    }

    /// Replace a node's content, keeping its pipe and features.
    /// Panics if `id` does not belong to this graph.
    pub fn set_content(&mut self, id: SchemaNodeId, content: SchemaNodeContent) {
        self.nodes[id.0].content = content;
    }

    /// Append a refinement step. Panics if `id` does not belong to this graph.
    pub fn push_validation(&mut self, id: SchemaNodeId, validation: Validation) {
        self.nodes[id.0].pipe.push(validation);
    }

    /// Attach raw JSON Schema keywords to a node, replacing previous ones.
    /// Panics if `id` does not belong to this graph.
    pub fn set_features(
        &mut self,
        id: SchemaNodeId,
        features: IndexMap<String, serde_json::Value>,
    ) {
        self.nodes[id.0].features = Some(features);
    }

    pub fn node(&self, id: SchemaNodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchemaNodeId, &SchemaNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (SchemaNodeId(i), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectSchema, SchemaKind};

    #[test]
    fn test_reserved_node_can_refer_to_itself() {
        let mut graph = SchemaGraph::new();
        let list = graph.reserve_node();
        let lazy = graph.create_node(SchemaNodeContent::Lazy(list));
        let children = graph.create_node(SchemaNodeContent::Array(lazy));
        graph.set_content(
            list,
            SchemaNodeContent::Object(ObjectSchema {
                entries: [("children".to_string(), children)].into_iter().collect(),
                rest: None,
            }),
        );

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.node(list).unwrap().kind(), SchemaKind::Object);
        assert_eq!(
            graph.node(lazy).unwrap().content,
            SchemaNodeContent::Lazy(list)
        );
    }

    #[test]
    fn test_set_content_keeps_pipe() {
        let mut graph = SchemaGraph::new();
        let id = graph.reserve_node();
        graph.push_validation(id, Validation::MinLength(2));
        graph.set_content(id, SchemaNodeContent::String);

        let node = graph.node(id).unwrap();
        assert_eq!(node.content, SchemaNodeContent::String);
        assert_eq!(node.pipe, vec![Validation::MinLength(2)]);
    }

    #[test]
    fn test_unknown_handle_is_none() {
        let graph = SchemaGraph::new();
        assert!(graph.node(SchemaNodeId(0)).is_none());
        assert!(graph.is_empty());
    }
}
