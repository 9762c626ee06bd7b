//! Resolution engine
//!
//! Owns everything that outlives a single resolution: configuration,
//! selection services, the artifact resolver, the implicit artifact set
//! cache and the finalization executor.

use crate::artifact_set::{DefaultVisitedArtifactSet, VisitedGraphResults};
use crate::config::ResolutionConfig;
use crate::error::EngineError;
use crate::graph::ResolvedGraph;
use crate::graph_visitor::ResolvedArtifactsGraphVisitor;
use arx_artifact::AttributeContainer;
use arx_resolve::OperationExecutor;
use arx_select::{
    ArtifactSelectionServices, ArtifactSelectionSpec, ComponentArtifactResolver,
    DefaultVariantArtifactResolver, TransformRegistry, VariantArtifactResolver,
    VariantArtifactSetCache,
};
use std::sync::Arc;

/// Turns resolved graphs into selectable artifact sets
#[derive(Debug, Clone)]
pub struct ArtifactResolutionEngine {
    config: ResolutionConfig,
    services: ArtifactSelectionServices,
    resolver: Arc<dyn VariantArtifactResolver>,
    cache: Arc<VariantArtifactSetCache>,
    executor: Arc<OperationExecutor>,
}

impl ArtifactResolutionEngine {
    /// Create engine resolving component artifacts through `artifacts`
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the worker pool
    /// cannot be created
    pub fn new(
        config: ResolutionConfig,
        transforms: TransformRegistry,
        artifacts: Arc<dyn ComponentArtifactResolver>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let executor = OperationExecutor::with_threads(config.worker_threads)?;
        let services = ArtifactSelectionServices::new(transforms)
            .with_max_chain_length(config.max_transform_chain_length);

        tracing::info!(
            worker_threads = config.worker_threads,
            executor = ?executor,
            sort_order = ?config.sort_order,
            "artifact resolution engine ready"
        );

        Ok(Self {
            config,
            services,
            resolver: Arc::new(DefaultVariantArtifactResolver::new(artifacts)),
            cache: Arc::new(VariantArtifactSetCache::new()),
            executor: Arc::new(executor),
        })
    }

    /// Replace selection services
    ///
    /// The configured `max_transform_chain_length` applies to the replacement.
    #[must_use]
    pub fn with_services(mut self, services: ArtifactSelectionServices) -> Self {
        self.services = services.with_max_chain_length(self.config.max_transform_chain_length);
        self
    }

    /// Share an implicit artifact set cache with other engines of the build tree
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<VariantArtifactSetCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Selection services
    #[inline]
    #[must_use]
    pub fn services(&self) -> &ArtifactSelectionServices {
        &self.services
    }

    /// Implicit artifact set cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<VariantArtifactSetCache> {
        &self.cache
    }

    /// Selection request for `attributes` using the configured sort order
    #[must_use]
    pub fn selection_spec(&self, attributes: AttributeContainer) -> ArtifactSelectionSpec {
        ArtifactSelectionSpec::new(attributes).with_sort_order(self.config.sort_order)
    }

    /// Collect the artifact sets of `graph`
    pub fn resolve(&self, graph: &ResolvedGraph) -> DefaultVisitedArtifactSet {
        let mut visitor =
            ResolvedArtifactsGraphVisitor::new(Arc::clone(&self.resolver), &self.cache);
        graph.traverse(&mut visitor);
        let artifact_results = visitor.into_results();

        tracing::info!(
            nodes = graph.nodes().len(),
            artifact_sets = artifact_results.len(),
            graph_failures = graph.failures().len(),
            "resolved graph artifacts"
        );

        DefaultVisitedArtifactSet::new(
            VisitedGraphResults::new(graph.failures().to_vec()),
            artifact_results,
            self.services.clone(),
            Arc::clone(&self.executor),
        )
        .with_lenient(self.config.lenient)
        .with_continue_on_selection_failure(self.config.continue_on_selection_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use arx_select::ComponentArtifactMetadata;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug)]
    struct Repository;

    impl ComponentArtifactResolver for Repository {
        fn resolve_artifact(&self, artifact: &ComponentArtifactMetadata) -> io::Result<PathBuf> {
            Ok(PathBuf::from("/repo").join(artifact.name().file_name()))
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ResolutionConfig::new().with_max_transform_chain_length(0);
        let err =
            ArtifactResolutionEngine::new(config, TransformRegistry::new(), Arc::new(Repository))
                .unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn selection_spec_uses_configured_order() {
        let config = ResolutionConfig::new()
            .with_worker_threads(1)
            .with_sort_order(arx_select::SortOrder::DependencyFirst);
        let engine =
            ArtifactResolutionEngine::new(config, TransformRegistry::new(), Arc::new(Repository))
                .unwrap();
        let spec = engine.selection_spec(AttributeContainer::new());
        assert!(spec.sort_order.is_reversed());
        assert!(engine.cache().is_empty());
    }
}
