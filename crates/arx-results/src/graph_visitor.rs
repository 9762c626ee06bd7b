//! Collects the artifact sets of a graph traversal
//!
//! Every artifact-contributing graph element gets an id, assigned in visit
//! order starting at 0. The id indexes the collected sets and is only
//! meaningful within one resolution.

use crate::graph::{DependencyGraphVisitor, GraphEdge, GraphNode, NodeId, NodeState};
use crate::visited::DefaultVisitedArtifactResults;
use arx_select::{
    ArtifactSet, FileDependencyArtifactSet, UnavailableArtifactSet, VariantArtifactResolver,
    VariantArtifactSetCache, VariantInstanceId, VariantResolvingArtifactSet,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Graph visitor building one [`ArtifactSet`] per artifact-contributing element
///
/// Implicit edges to the same variant share an id and a set. Edges with
/// overrides always get a fresh id and a set of their own.
pub struct ResolvedArtifactsGraphVisitor<'a> {
    resolver: Arc<dyn VariantArtifactResolver>,
    cache: &'a VariantArtifactSetCache,
    artifact_sets: Vec<Arc<dyn ArtifactSet>>,
    implicit_ids: HashMap<VariantInstanceId, usize>,
}

impl<'a> ResolvedArtifactsGraphVisitor<'a> {
    /// Create visitor resolving artifacts with `resolver`
    #[must_use]
    pub fn new(
        resolver: Arc<dyn VariantArtifactResolver>,
        cache: &'a VariantArtifactSetCache,
    ) -> Self {
        Self {
            resolver,
            cache,
            artifact_sets: Vec::new(),
            implicit_ids: HashMap::new(),
        }
    }

    /// Number of ids assigned so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifact_sets.len()
    }

    /// Whether no id was assigned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifact_sets.is_empty()
    }

    /// Collected sets, indexed by id
    #[must_use]
    pub fn into_results(self) -> DefaultVisitedArtifactResults {
        DefaultVisitedArtifactResults::new(self.artifact_sets)
    }

    fn next_id(&mut self, set: Arc<dyn ArtifactSet>) -> usize {
        let id = self.artifact_sets.len();
        self.artifact_sets.push(set);
        id
    }

    fn implicit_set(
        &mut self,
        node: &GraphNode,
        variant_instance: VariantInstanceId,
        create: impl FnOnce() -> VariantResolvingArtifactSet,
    ) -> usize {
        if let Some(id) = self.implicit_ids.get(&variant_instance) {
            return *id;
        }
        let set = self.cache.get_or_create(node.component(), variant_instance, create);
        let id = self.next_id(set);
        self.implicit_ids.insert(variant_instance, id);
        tracing::debug!(
            id,
            component = %node.component_id(),
            variant = %variant_instance,
            "assigned implicit artifact set"
        );
        id
    }
}

impl std::fmt::Debug for ResolvedArtifactsGraphVisitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedArtifactsGraphVisitor")
            .field("artifact_sets", &self.artifact_sets.len())
            .field("implicit", &self.implicit_ids.len())
            .finish_non_exhaustive()
    }
}

impl DependencyGraphVisitor for ResolvedArtifactsGraphVisitor<'_> {
    fn visit_node(&mut self, id: NodeId, node: &GraphNode) {
        for dependency in node.local_files() {
            let set_id = self.next_id(Arc::new(FileDependencyArtifactSet::new(dependency.clone())));
            tracing::debug!(
                id = set_id,
                node = %id,
                files = %dependency.files().display_name(),
                "assigned local file artifact set"
            );
        }
    }

    fn visit_edges(&mut self, id: NodeId, node: &GraphNode, incoming: &[&GraphEdge]) {
        if incoming.is_empty() {
            return;
        }
        let variant = match node.state() {
            NodeState::Resolved(variant) => variant,
            NodeState::Unavailable(reason) => {
                let set = UnavailableArtifactSet::new(node.component_id().clone(), reason.clone());
                let set_id = self.next_id(Arc::new(set));
                tracing::debug!(
                    id = set_id,
                    node = %id,
                    component = %node.component_id(),
                    "assigned unavailable artifact set"
                );
                return;
            }
        };

        let resolver = Arc::clone(&self.resolver);
        for edge in incoming {
            let create = || {
                VariantResolvingArtifactSet::new(
                    Arc::clone(&resolver),
                    Arc::clone(node.component()),
                    Arc::clone(variant),
                    edge.overrides.clone(),
                )
            };
            if edge.overrides.is_implicit() {
                self.implicit_set(node, variant.instance_id, create);
            } else {
                let set_id = self.next_id(Arc::new(create()));
                tracing::debug!(
                    id = set_id,
                    from = %edge.from,
                    to = %id,
                    "assigned adhoc artifact set"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResolvedGraph;
    use arx_artifact::{ArtifactName, AttributeContainer, ComponentId, VariantId};
    use arx_select::{
        ComponentArtifactMetadata, ComponentArtifactResolver, ComponentMetadata,
        DefaultVariantArtifactResolver, EdgeOverrides, FixedFileCollection, GraphVariant,
        LocalFileDependencyMetadata,
    };
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug)]
    struct Repository;

    impl ComponentArtifactResolver for Repository {
        fn resolve_artifact(&self, artifact: &ComponentArtifactMetadata) -> io::Result<PathBuf> {
            Ok(PathBuf::from("/repo").join(artifact.name().file_name()))
        }
    }

    fn node(path: &str, instance: u64) -> GraphNode {
        let id = ComponentId::project(":", path);
        let variant = GraphVariant::new(
            VariantInstanceId(instance),
            VariantId::new(id.clone(), "runtime"),
            AttributeContainer::new(),
        )
        .with_artifacts(vec![ComponentArtifactMetadata::new(
            id.clone(),
            ArtifactName::new("lib", "jar"),
        )]);
        let component = ComponentMetadata::new(id).with_variant(variant);
        let variant = Arc::clone(&component.variants[0]);
        GraphNode::new(Arc::new(component), variant)
    }

    fn visit(graph: &ResolvedGraph, cache: &VariantArtifactSetCache) -> usize {
        let resolver = Arc::new(DefaultVariantArtifactResolver::new(Arc::new(Repository)));
        let mut visitor = ResolvedArtifactsGraphVisitor::new(resolver, cache);
        graph.traverse(&mut visitor);
        visitor.len()
    }

    #[test]
    fn implicit_edges_share_one_id() {
        let mut graph = ResolvedGraph::new(node(":app", 0));
        let a = graph.add_node(node(":a", 1));
        let lib = graph.add_node(node(":lib", 2));
        graph.add_edge(graph.root(), a, EdgeOverrides::none()).unwrap();
        graph.add_edge(graph.root(), lib, EdgeOverrides::none()).unwrap();
        graph.add_edge(a, lib, EdgeOverrides::none()).unwrap();

        let cache = VariantArtifactSetCache::new();
        assert_eq!(visit(&graph, &cache), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn adhoc_edges_get_fresh_ids() {
        let mut graph = ResolvedGraph::new(node(":app", 0));
        let lib = graph.add_node(node(":lib", 1));
        let overrides = EdgeOverrides {
            attributes: AttributeContainer::new().with("usage", "api"),
            ..EdgeOverrides::none()
        };
        graph.add_edge(graph.root(), lib, overrides.clone()).unwrap();
        graph.add_edge(graph.root(), lib, overrides).unwrap();
        graph.add_edge(graph.root(), lib, EdgeOverrides::none()).unwrap();

        let cache = VariantArtifactSetCache::new();
        assert_eq!(visit(&graph, &cache), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn local_files_and_unavailable_nodes_contribute_sets() {
        let files = LocalFileDependencyMetadata::new(
            Some(ComponentId::project(":", ":app")),
            Arc::new(FixedFileCollection::new("libs", vec![PathBuf::from("/libs/a.jar")])),
        );
        let mut graph = ResolvedGraph::new(node(":app", 0).with_local_files(files));
        let gone = graph.add_node(GraphNode::unavailable(
            Arc::new(ComponentMetadata::new(ComponentId::module("org", "gone", "1.0"))),
            "not found",
        ));
        graph.add_edge(graph.root(), gone, EdgeOverrides::none()).unwrap();

        let cache = VariantArtifactSetCache::new();
        let resolver = Arc::new(DefaultVariantArtifactResolver::new(Arc::new(Repository)));
        let mut visitor = ResolvedArtifactsGraphVisitor::new(resolver, &cache);
        graph.traverse(&mut visitor);
        let results = visitor.into_results();
        assert_eq!(results.len(), 2);
        assert!(results.artifact_set(1).is_some_and(|set| set.is_unavailable()));
    }

    #[test]
    fn root_without_incoming_edges_contributes_nothing() {
        let graph = ResolvedGraph::new(node(":app", 0));
        assert_eq!(visit(&graph, &VariantArtifactSetCache::new()), 0);
    }
}
