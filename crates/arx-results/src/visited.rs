//! Artifact sets collected by one graph traversal

use arx_resolve::ResolvedArtifactSet;
use arx_select::{ArtifactSelectionServices, ArtifactSelectionSpec, ArtifactSet};
use std::sync::Arc;

/// Per-id artifact sets of a traversal, selectable for any request
pub trait VisitedArtifactResults: Send + Sync {
    /// Select every set for `spec`
    ///
    /// With `lenient`, sets of components that failed to resolve select
    /// nothing instead of a failure.
    fn select(
        &self,
        services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
        lenient: bool,
    ) -> SelectedArtifactResults;
}

/// Artifact sets indexed by the id assigned during traversal
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitedArtifactResults {
    artifact_sets: Vec<Arc<dyn ArtifactSet>>,
}

impl DefaultVisitedArtifactResults {
    /// Create results; the position of each set is its id
    #[inline]
    #[must_use]
    pub fn new(artifact_sets: Vec<Arc<dyn ArtifactSet>>) -> Self {
        Self { artifact_sets }
    }

    /// Number of ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifact_sets.len()
    }

    /// Whether the traversal contributed nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifact_sets.is_empty()
    }

    /// Set with `id`
    #[must_use]
    pub fn artifact_set(&self, id: usize) -> Option<&Arc<dyn ArtifactSet>> {
        self.artifact_sets.get(id)
    }
}

impl VisitedArtifactResults for DefaultVisitedArtifactResults {
    fn select(
        &self,
        services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
        lenient: bool,
    ) -> SelectedArtifactResults {
        let by_id: Vec<ResolvedArtifactSet> = self
            .artifact_sets
            .iter()
            .enumerate()
            .map(|(id, set)| {
                if lenient && set.is_unavailable() {
                    return ResolvedArtifactSet::EMPTY;
                }
                let selected = set.select(services, spec);
                if let Some(failure) = selected.failure() {
                    tracing::debug!(id, error = %failure, "artifact selection failed");
                }
                selected
            })
            .collect();

        let all = if spec.sort_order.is_reversed() {
            ResolvedArtifactSet::composite(by_id.iter().rev().cloned())
        } else {
            ResolvedArtifactSet::composite(by_id.iter().cloned())
        };
        SelectedArtifactResults { all, by_id }
    }
}

/// Selected artifacts of every id, plus their ordered composition
#[derive(Debug, Clone, Default)]
pub struct SelectedArtifactResults {
    all: ResolvedArtifactSet,
    by_id: Vec<ResolvedArtifactSet>,
}

impl SelectedArtifactResults {
    /// Every selected artifact, in the requested sort order
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &ResolvedArtifactSet {
        &self.all
    }

    /// Artifacts selected for one id
    #[inline]
    #[must_use]
    pub fn artifacts_with_id(&self, id: usize) -> Option<&ResolvedArtifactSet> {
        self.by_id.get(id)
    }

    /// Number of ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether there are no ids
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
