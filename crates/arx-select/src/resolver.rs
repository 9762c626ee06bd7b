//! Turning artifact metadata into resolvable artifacts

use crate::metadata::{ComponentArtifactMetadata, ComponentMetadata};
use arx_artifact::{ArtifactId, AttributeContainer, ResolvableArtifact, ResolveError};
use arx_resolve::{ResolvedArtifactSet, VariantDescriptor};
use dashmap::DashMap;
use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Materializes the file of a component artifact, e.g. by downloading it
pub trait ComponentArtifactResolver: Send + Sync + Debug {
    /// Location of the artifact file; may block on I/O
    ///
    /// # Errors
    /// Returns the I/O failure hit while materializing the file
    fn resolve_artifact(&self, artifact: &ComponentArtifactMetadata) -> io::Result<PathBuf>;
}

/// Builds resolved artifact sets for variants of a component
pub trait VariantArtifactResolver: Send + Sync + Debug {
    /// Resolvable handle for one artifact
    fn resolve_artifact(
        &self,
        component: &ComponentMetadata,
        artifact: &ComponentArtifactMetadata,
    ) -> ResolvableArtifact;

    /// Artifacts of a variant
    fn resolve_variant(
        &self,
        component: &ComponentMetadata,
        variant: &Arc<VariantDescriptor>,
        artifacts: &[ComponentArtifactMetadata],
    ) -> ResolvedArtifactSet {
        ResolvedArtifactSet::artifacts(
            variant,
            artifacts
                .iter()
                .map(|artifact| self.resolve_artifact(component, artifact)),
        )
    }

    /// Explicitly requested artifacts, outside any declared variant
    fn resolve_adhoc_variant(
        &self,
        component: &ComponentMetadata,
        artifacts: &[ComponentArtifactMetadata],
    ) -> ResolvedArtifactSet {
        let variant = Arc::new(
            VariantDescriptor::new(format!("{} artifacts", component.id), AttributeContainer::new())
                .with_component(component.id.clone()),
        );
        self.resolve_variant(component, &variant, artifacts)
    }
}

/// Variant artifact resolver sharing one handle per artifact identity
///
/// Every selection reaching the same artifact gets the same
/// [`ResolvableArtifact`], so its file is materialized at most once.
/// Project artifacts are produced by tasks of this build and are marked
/// synchronous; module artifacts need scheduled work.
#[derive(Debug)]
pub struct DefaultVariantArtifactResolver {
    resolver: Arc<dyn ComponentArtifactResolver>,
    artifacts: DashMap<ArtifactId, ResolvableArtifact>,
}

impl DefaultVariantArtifactResolver {
    /// Create resolver delegating file materialization to `resolver`
    #[must_use]
    pub fn new(resolver: Arc<dyn ComponentArtifactResolver>) -> Self {
        Self {
            resolver,
            artifacts: DashMap::new(),
        }
    }

    /// Number of artifact handles created so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether no handle was created yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl VariantArtifactResolver for DefaultVariantArtifactResolver {
    fn resolve_artifact(
        &self,
        component: &ComponentMetadata,
        artifact: &ComponentArtifactMetadata,
    ) -> ResolvableArtifact {
        let id = artifact.id();
        self.artifacts
            .entry(id.clone())
            .or_insert_with(|| {
                let resolver = Arc::clone(&self.resolver);
                let metadata = artifact.clone();
                let failed_id = id.clone();
                ResolvableArtifact::lazy(
                    id,
                    component.id.is_project(),
                    artifact.build_dependencies().to_vec(),
                    move || {
                        resolver
                            .resolve_artifact(&metadata)
                            .map_err(|source| ResolveError::artifact(failed_id, source))
                    },
                )
            })
            .clone()
    }
}
