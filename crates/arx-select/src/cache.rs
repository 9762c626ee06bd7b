//! Build-tree scoped cache of implicit artifact sets
//!
//! Edges that do not change selection share one
//! [`VariantResolvingArtifactSet`] per graph variant instance. Only project
//! components are cached: module components may be resolved against
//! different repositories by different resolutions, so their instance ids
//! are not stable keys.

use crate::artifact_set::VariantResolvingArtifactSet;
use crate::metadata::{ComponentMetadata, VariantInstanceId};
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent map from variant instance to its implicit artifact set
#[derive(Debug, Default)]
pub struct VariantArtifactSetCache {
    sets: DashMap<VariantInstanceId, Arc<VariantResolvingArtifactSet>>,
}

impl VariantArtifactSetCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached set for `instance_id`, created with `create` when missing
    ///
    /// Module components bypass the cache and always get a fresh set.
    pub fn get_or_create<F>(
        &self,
        component: &ComponentMetadata,
        instance_id: VariantInstanceId,
        create: F,
    ) -> Arc<VariantResolvingArtifactSet>
    where
        F: FnOnce() -> VariantResolvingArtifactSet,
    {
        if !component.id.is_project() {
            return Arc::new(create());
        }
        if let Some(cached) = self.sets.get(&instance_id) {
            tracing::trace!(
                component = %component.id,
                variant = %instance_id,
                "implicit artifact set cache hit"
            );
            return Arc::clone(cached.value());
        }
        Arc::clone(
            self.sets
                .entry(instance_id)
                .or_insert_with(|| Arc::new(create()))
                .value(),
        )
    }

    /// Number of cached sets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether nothing is cached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Drop every cached set
    pub fn clear(&self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ComponentArtifactMetadata, EdgeOverrides, GraphVariant};
    use crate::resolver::{ComponentArtifactResolver, DefaultVariantArtifactResolver};
    use arx_artifact::{AttributeContainer, ComponentId, VariantId};
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug)]
    struct NoFiles;

    impl ComponentArtifactResolver for NoFiles {
        fn resolve_artifact(&self, _artifact: &ComponentArtifactMetadata) -> io::Result<PathBuf> {
            Err(io::Error::new(io::ErrorKind::NotFound, "none"))
        }
    }

    fn component(id: ComponentId) -> Arc<ComponentMetadata> {
        let variant = GraphVariant::new(
            VariantInstanceId(7),
            VariantId::new(id.clone(), "runtime"),
            AttributeContainer::new(),
        );
        Arc::new(ComponentMetadata::new(id).with_variant(variant))
    }

    fn create(component: &Arc<ComponentMetadata>) -> VariantResolvingArtifactSet {
        VariantResolvingArtifactSet::new(
            Arc::new(DefaultVariantArtifactResolver::new(Arc::new(NoFiles))),
            Arc::clone(component),
            Arc::clone(&component.variants[0]),
            EdgeOverrides::none(),
        )
    }

    #[test]
    fn project_sets_are_shared() {
        let cache = VariantArtifactSetCache::new();
        let project = component(ComponentId::project(":", ":lib"));

        let first = cache.get_or_create(&project, VariantInstanceId(7), || create(&project));
        let second = cache.get_or_create(&project, VariantInstanceId(7), || create(&project));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn module_sets_are_never_cached() {
        let cache = VariantArtifactSetCache::new();
        let module = component(ComponentId::module("org", "lib", "1.0"));

        let first = cache.get_or_create(&module, VariantInstanceId(7), || create(&module));
        let second = cache.get_or_create(&module, VariantInstanceId(7), || create(&module));
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_lookups_share_one_set() {
        let cache = VariantArtifactSetCache::new();
        let project = component(ComponentId::project(":", ":lib"));

        let sets: Vec<Arc<VariantResolvingArtifactSet>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        cache.get_or_create(&project, VariantInstanceId(7), || create(&project))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(sets.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        cache.clear();
        assert!(cache.is_empty());
    }
}
