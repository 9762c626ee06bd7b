//! Outer consumption API
//!
//! [`VisitedArtifactSet`] is what a resolution hands to its consumers. Each
//! consumer selects the artifacts it wants and visits them through a
//! [`SelectedArtifactSet`], or asks for files directly.

use crate::error::ResolveException;
use crate::visited::{
    DefaultVisitedArtifactResults, SelectedArtifactResults, VisitedArtifactResults,
};
use arx_artifact::{ArtifactId, ResolvableArtifact, ResolveError, TaskDependencyResolveContext};
use arx_resolve::{
    ArtifactSource, ArtifactVisitor, OperationExecutor, ParallelResolveArtifactSet,
    VariantDescriptor, VisitType,
};
use arx_select::{ArtifactSelectionServices, ArtifactSelectionSpec};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Failures of graph resolution itself
#[derive(Debug, Clone, Default)]
pub struct VisitedGraphResults {
    failures: Vec<ResolveError>,
}

impl VisitedGraphResults {
    /// Create graph results
    #[inline]
    #[must_use]
    pub fn new(failures: Vec<ResolveError>) -> Self {
        Self { failures }
    }

    /// Whether graph resolution failed anywhere
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Graph failures in the order they were recorded
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }
}

/// Result of a resolution, selectable for any consumer request
pub trait VisitedArtifactSet {
    /// Select the artifacts matching `spec`
    fn select(&self, spec: &ArtifactSelectionSpec) -> SelectedArtifactSet;
}

/// Default [`VisitedArtifactSet`] over the sets of one graph traversal
#[derive(Debug, Clone)]
pub struct DefaultVisitedArtifactSet {
    graph_results: Arc<VisitedGraphResults>,
    artifact_results: Arc<DefaultVisitedArtifactResults>,
    services: ArtifactSelectionServices,
    executor: Arc<OperationExecutor>,
    lenient: bool,
    continue_on_selection_failure: bool,
}

impl DefaultVisitedArtifactSet {
    /// Create visited set
    #[must_use]
    pub fn new(
        graph_results: VisitedGraphResults,
        artifact_results: DefaultVisitedArtifactResults,
        services: ArtifactSelectionServices,
        executor: Arc<OperationExecutor>,
    ) -> Self {
        Self {
            graph_results: Arc::new(graph_results),
            artifact_results: Arc::new(artifact_results),
            services,
            executor,
            lenient: false,
            continue_on_selection_failure: false,
        }
    }

    /// Substitute nothing for components that failed to resolve
    #[inline]
    #[must_use]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Default used by [`SelectedArtifactSet::files`] and [`SelectedArtifactSet::artifacts`]
    #[inline]
    #[must_use]
    pub fn with_continue_on_selection_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_selection_failure = continue_on_failure;
        self
    }

    /// Graph failures
    #[inline]
    #[must_use]
    pub fn graph_results(&self) -> &VisitedGraphResults {
        &self.graph_results
    }

    /// Per-id artifact sets
    #[inline]
    #[must_use]
    pub fn artifact_results(&self) -> &DefaultVisitedArtifactResults {
        &self.artifact_results
    }
}

impl VisitedArtifactSet for DefaultVisitedArtifactSet {
    fn select(&self, spec: &ArtifactSelectionSpec) -> SelectedArtifactSet {
        let results = self.artifact_results.select(&self.services, spec, self.lenient);
        SelectedArtifactSet {
            description: format!("artifacts matching {}", spec.request_attributes),
            graph_results: Arc::clone(&self.graph_results),
            results,
            executor: Arc::clone(&self.executor),
            continue_on_selection_failure: self.continue_on_selection_failure,
        }
    }
}

/// Artifacts selected for one consumer
#[derive(Debug, Clone)]
pub struct SelectedArtifactSet {
    description: String,
    graph_results: Arc<VisitedGraphResults>,
    results: SelectedArtifactResults,
    executor: Arc<OperationExecutor>,
    continue_on_selection_failure: bool,
}

impl SelectedArtifactSet {
    /// Selected sets, per id and composed
    #[inline]
    #[must_use]
    pub fn results(&self) -> &SelectedArtifactResults {
        &self.results
    }

    /// Report producing tasks, plus graph and selection failures
    pub fn visit_dependencies(&self, context: &mut dyn TaskDependencyResolveContext) {
        for failure in self.graph_results.failures() {
            context.visit_failure(failure);
        }
        self.results.artifacts().visit_dependencies(context);
    }

    /// Visit every selected artifact in order
    ///
    /// Graph failures are reported first. Without `continue_on_selection_failure`
    /// visiting stops after the first group of failures, before any file is
    /// resolved.
    pub fn visit_artifacts(
        &self,
        visitor: &mut dyn ArtifactVisitor,
        continue_on_selection_failure: bool,
    ) {
        if self.graph_results.has_failures() {
            for failure in self.graph_results.failures() {
                visitor.visit_failure(failure);
            }
            if !continue_on_selection_failure {
                tracing::debug!(
                    failures = self.graph_results.failures().len(),
                    "stopping after graph failures"
                );
                return;
            }
        }

        if !continue_on_selection_failure {
            let mut selection_failures = Vec::new();
            self.results
                .artifacts()
                .visit_failures(&mut |failure| selection_failures.push(failure.clone()));
            if !selection_failures.is_empty() {
                tracing::debug!(
                    failures = selection_failures.len(),
                    "stopping after selection failures"
                );
                for failure in &selection_failures {
                    visitor.visit_failure(failure);
                }
                return;
            }
        }

        ParallelResolveArtifactSet::wrap(self.results.artifacts(), &self.executor).visit(visitor);
    }

    /// Visit the file of every selected artifact in order
    pub fn visit_files(
        &self,
        visitor: &mut dyn ResolvedFileVisitor,
        continue_on_selection_failure: bool,
    ) {
        self.visit_artifacts(&mut FileArtifactVisitor(visitor), continue_on_selection_failure);
    }

    /// Report every selected artifact that needs scheduled resolution
    pub fn visit_external_artifacts(&self, visitor: &mut dyn FnMut(&ResolvableArtifact)) {
        self.results.artifacts().visit_external_artifacts(visitor);
    }

    /// Files of every selected artifact, without duplicates
    ///
    /// # Errors
    /// Returns every failure met while visiting, as one error
    pub fn files(&self) -> Result<Vec<PathBuf>, ResolveException> {
        let mut collector = FileCollector::default();
        self.visit_files(&mut collector, self.continue_on_selection_failure);
        self.finish(collector.files, collector.failures)
    }

    /// Every selected artifact with its file, without duplicates
    ///
    /// # Errors
    /// Returns every failure met while visiting, as one error
    pub fn artifacts(&self) -> Result<Vec<ResolvedArtifactResult>, ResolveException> {
        let mut collector = ArtifactCollector::default();
        self.visit_artifacts(&mut collector, self.continue_on_selection_failure);
        self.finish(collector.artifacts, collector.failures)
    }

    fn finish<T>(
        &self,
        values: Vec<T>,
        failures: Vec<ResolveError>,
    ) -> Result<Vec<T>, ResolveException> {
        if failures.is_empty() {
            return Ok(values);
        }
        tracing::warn!(
            context = %self.description,
            failures = failures.len(),
            "artifact resolution failed"
        );
        Err(ResolveException::new(self.description.clone(), failures))
    }
}

/// Receiver of resolved files
pub trait ResolvedFileVisitor {
    /// Whether the files of `source` are wanted
    fn prepare_for_visit(&mut self, _source: &ArtifactSource) -> VisitType {
        VisitType::Visit
    }

    /// Receive one file
    fn visit_file(&mut self, file: &Path);

    /// Receive one failure
    fn visit_failure(&mut self, failure: &ResolveError);

    /// Called after all files of a leaf were delivered
    fn end_visit_collection(&mut self, _source: &ArtifactSource) {}
}

struct FileArtifactVisitor<'v>(&'v mut dyn ResolvedFileVisitor);

impl ArtifactVisitor for FileArtifactVisitor<'_> {
    fn prepare_for_visit(&mut self, source: &ArtifactSource) -> VisitType {
        self.0.prepare_for_visit(source)
    }

    fn visit_artifact(&mut self, _variant: &VariantDescriptor, artifact: &ResolvableArtifact) {
        match artifact.file() {
            Ok(file) => self.0.visit_file(file),
            Err(failure) => self.0.visit_failure(&failure),
        }
    }

    fn visit_failure(&mut self, failure: &ResolveError) {
        self.0.visit_failure(failure);
    }

    fn end_visit_collection(&mut self, source: &ArtifactSource) {
        self.0.end_visit_collection(source);
    }
}

/// One resolved artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifactResult {
    /// Artifact identity
    pub id: ArtifactId,
    /// Resolved file
    pub file: PathBuf,
    /// Variant the artifact was selected from
    pub variant: VariantDescriptor,
}

#[derive(Default)]
struct FileCollector {
    seen: HashSet<PathBuf>,
    files: Vec<PathBuf>,
    failures: Vec<ResolveError>,
}

impl ResolvedFileVisitor for FileCollector {
    fn visit_file(&mut self, file: &Path) {
        if self.seen.insert(file.to_path_buf()) {
            self.files.push(file.to_path_buf());
        }
    }

    fn visit_failure(&mut self, failure: &ResolveError) {
        self.failures.push(failure.clone());
    }
}

#[derive(Default)]
struct ArtifactCollector {
    seen: HashSet<ArtifactId>,
    artifacts: Vec<ResolvedArtifactResult>,
    failures: Vec<ResolveError>,
}

impl ArtifactVisitor for ArtifactCollector {
    fn visit_artifact(&mut self, variant: &VariantDescriptor, artifact: &ResolvableArtifact) {
        if !self.seen.insert(artifact.id().clone()) {
            return;
        }
        match artifact.file() {
            Ok(file) => self.artifacts.push(ResolvedArtifactResult {
                id: artifact.id().clone(),
                file: file.to_path_buf(),
                variant: variant.clone(),
            }),
            Err(failure) => self.failures.push(failure),
        }
    }

    fn visit_failure(&mut self, failure: &ResolveError) {
        self.failures.push(failure.clone());
    }
}
