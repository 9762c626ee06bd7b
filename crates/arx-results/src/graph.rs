//! Resolved dependency graph
//!
//! The output of graph resolution as seen by artifact selection: nodes are
//! selected component variants, edges carry the overrides declared by the
//! dependency they came from. Nodes are kept in the order graph resolution
//! reached them, consumers before their dependencies.

use crate::error::GraphError;
use arx_artifact::{ComponentId, ResolveError};
use arx_select::{ComponentMetadata, EdgeOverrides, GraphVariant, LocalFileDependencyMetadata};
use std::fmt;
use std::sync::Arc;

/// Index of a node in its [`ResolvedGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Outcome of resolving one node
#[derive(Debug, Clone)]
pub enum NodeState {
    /// Variant chosen for the node
    Resolved(Arc<GraphVariant>),
    /// Component could not be resolved
    Unavailable(String),
}

/// One selected component variant
#[derive(Debug, Clone)]
pub struct GraphNode {
    component: Arc<ComponentMetadata>,
    state: NodeState,
    local_files: Vec<LocalFileDependencyMetadata>,
}

impl GraphNode {
    /// Node for `variant` of `component`
    #[must_use]
    pub fn new(component: Arc<ComponentMetadata>, variant: Arc<GraphVariant>) -> Self {
        Self {
            component,
            state: NodeState::Resolved(variant),
            local_files: Vec::new(),
        }
    }

    /// Node for a component that failed to resolve
    #[must_use]
    pub fn unavailable(component: Arc<ComponentMetadata>, reason: impl Into<String>) -> Self {
        Self {
            component,
            state: NodeState::Unavailable(reason.into()),
            local_files: Vec::new(),
        }
    }

    /// Add a local file dependency declared by this node
    #[must_use]
    pub fn with_local_files(mut self, dependency: LocalFileDependencyMetadata) -> Self {
        self.local_files.push(dependency);
        self
    }

    /// Component metadata
    #[inline]
    #[must_use]
    pub fn component(&self) -> &Arc<ComponentMetadata> {
        &self.component
    }

    /// Component identity
    #[inline]
    #[must_use]
    pub fn component_id(&self) -> &ComponentId {
        &self.component.id
    }

    /// Resolution outcome
    #[inline]
    #[must_use]
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Chosen variant, if the node resolved
    #[must_use]
    pub fn variant(&self) -> Option<&Arc<GraphVariant>> {
        match &self.state {
            NodeState::Resolved(variant) => Some(variant),
            NodeState::Unavailable(_) => None,
        }
    }

    /// Local file dependencies declared by this node
    #[inline]
    #[must_use]
    pub fn local_files(&self) -> &[LocalFileDependencyMetadata] {
        &self.local_files
    }
}

/// Dependency from one node to another
#[derive(Debug, Clone)]
pub struct GraphEdge {
    /// Consumer
    pub from: NodeId,
    /// Dependency
    pub to: NodeId,
    /// Selection overrides declared on the dependency
    pub overrides: EdgeOverrides,
}

/// Callbacks of a graph traversal
///
/// Nodes are visited in graph order; after each node, its incoming edges.
pub trait DependencyGraphVisitor {
    /// Called once before any node
    fn start(&mut self, _root: &GraphNode) {}

    /// Visit one node
    fn visit_node(&mut self, _id: NodeId, _node: &GraphNode) {}

    /// Visit the edges pointing at `node`, in insertion order
    fn visit_edges(&mut self, _id: NodeId, _node: &GraphNode, _incoming: &[&GraphEdge]) {}

    /// Called once after every node
    fn finish(&mut self, _root: &GraphNode) {}
}

/// Graph produced by dependency resolution
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    failures: Vec<ResolveError>,
}

impl ResolvedGraph {
    /// Graph containing only `root`
    #[must_use]
    pub fn new(root: GraphNode) -> Self {
        Self {
            nodes: vec![root],
            edges: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Root node id
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add a node, returning its id
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Add an edge between two existing nodes
    ///
    /// # Errors
    /// Returns error if either node is unknown
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        overrides: EdgeOverrides,
    ) -> Result<(), GraphError> {
        for id in [from, to] {
            if id.0 >= self.nodes.len() {
                return Err(GraphError::UnknownNode(id));
            }
        }
        self.edges.push(GraphEdge { from, to, overrides });
        Ok(())
    }

    /// Record a failure of graph resolution itself
    pub fn add_failure(&mut self, message: impl Into<String>) {
        self.failures.push(ResolveError::Graph(message.into()));
    }

    /// Every node, in graph order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Node by id
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    /// Edges pointing at `id`
    #[must_use]
    pub fn incoming(&self, id: NodeId) -> Vec<&GraphEdge> {
        self.edges.iter().filter(|edge| edge.to == id).collect()
    }

    /// Graph resolution failures
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }

    /// Walk the graph
    pub fn traverse(&self, visitor: &mut dyn DependencyGraphVisitor) {
        let root = &self.nodes[0];
        visitor.start(root);
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            visitor.visit_node(id, node);
            visitor.visit_edges(id, node, &self.incoming(id));
        }
        visitor.finish(root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arx_artifact::{AttributeContainer, VariantId};
    use arx_select::VariantInstanceId;
    use pretty_assertions::assert_eq;

    fn node(path: &str, instance: u64) -> GraphNode {
        let id = ComponentId::project(":", path);
        let variant = GraphVariant::new(
            VariantInstanceId(instance),
            VariantId::new(id.clone(), "runtime"),
            AttributeContainer::new(),
        );
        GraphNode::new(Arc::new(ComponentMetadata::new(id)), Arc::new(variant))
    }

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl DependencyGraphVisitor for Trace {
        fn start(&mut self, root: &GraphNode) {
            self.0.push(format!("start {}", root.component_id()));
        }

        fn visit_node(&mut self, id: NodeId, _node: &GraphNode) {
            self.0.push(format!("visit {id}"));
        }

        fn visit_edges(&mut self, id: NodeId, _node: &GraphNode, incoming: &[&GraphEdge]) {
            for edge in incoming {
                self.0.push(format!("edge {} -> {id}", edge.from));
            }
        }

        fn finish(&mut self, _root: &GraphNode) {
            self.0.push("finish".to_string());
        }
    }

    #[test]
    fn traversal_visits_nodes_then_incoming_edges() {
        let mut graph = ResolvedGraph::new(node(":app", 0));
        let lib = graph.add_node(node(":lib", 1));
        graph.add_edge(graph.root(), lib, EdgeOverrides::none()).unwrap();

        let mut trace = Trace::default();
        graph.traverse(&mut trace);
        assert_eq!(
            trace.0,
            vec![
                "start project :app",
                "visit node 0",
                "visit node 1",
                "edge node 0 -> node 1",
                "finish"
            ]
        );
    }

    #[test]
    fn edges_to_unknown_nodes_are_rejected() {
        let mut graph = ResolvedGraph::new(node(":app", 0));
        let err = graph.add_edge(graph.root(), NodeId(3), EdgeOverrides::none()).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode(NodeId(3)));
    }

    #[test]
    fn unavailable_nodes_have_no_variant() {
        let component = Arc::new(ComponentMetadata::new(ComponentId::module("org", "gone", "1.0")));
        let node = GraphNode::unavailable(component, "not found");
        assert!(node.variant().is_none());
        assert!(matches!(node.state(), NodeState::Unavailable(reason) if reason == "not found"));
    }
}
