//! Local file dependencies
//!
//! The files of a local file dependency are usually produced by tasks that
//! have not run when selection happens, so selection returns a deferred set
//! that lists the files, and matches each of them, when first visited.

use crate::artifact_set::ArtifactSet;
use crate::file_collection::FileCollection;
use crate::services::ArtifactSelectionServices;
use crate::spec::ArtifactSelectionSpec;
use crate::variant::{ResolvedVariant, ResolvedVariantSet};
use arx_artifact::{
    ArtifactId, AttributeContainer, ComponentId, ResolvableArtifact, ResolveError,
    TaskDependencyResolveContext,
};
use arx_resolve::{ArtifactSource, DeferredArtifactSet, ResolvedArtifactSet, VariantDescriptor};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;

/// A file collection declared as a dependency
#[derive(Debug, Clone)]
pub struct LocalFileDependencyMetadata {
    component: Option<ComponentId>,
    files: Arc<dyn FileCollection>,
}

impl LocalFileDependencyMetadata {
    /// Create dependency on `files`, declared by `component` when known
    #[inline]
    #[must_use]
    pub fn new(component: Option<ComponentId>, files: Arc<dyn FileCollection>) -> Self {
        Self { component, files }
    }

    /// Declaring component
    #[inline]
    #[must_use]
    pub fn component(&self) -> Option<&ComponentId> {
        self.component.as_ref()
    }

    /// The files
    #[inline]
    #[must_use]
    pub fn files(&self) -> &Arc<dyn FileCollection> {
        &self.files
    }
}

/// Artifact set of a local file dependency
#[derive(Debug, Clone)]
pub struct FileDependencyArtifactSet {
    dependency: LocalFileDependencyMetadata,
}

impl FileDependencyArtifactSet {
    /// Create set for `dependency`
    #[inline]
    #[must_use]
    pub fn new(dependency: LocalFileDependencyMetadata) -> Self {
        Self { dependency }
    }
}

impl ArtifactSet for FileDependencyArtifactSet {
    fn select(
        &self,
        services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
    ) -> ResolvedArtifactSet {
        if !spec.component_filter.accepts(self.dependency.component()) {
            return ResolvedArtifactSet::EMPTY;
        }
        ResolvedArtifactSet::deferred(Arc::new(LocalFileDependencyBackedArtifactSet::new(
            self.dependency.clone(),
            services.clone(),
            spec.request_attributes.clone(),
        )))
    }
}

/// Deferred selection over the files of a local file dependency
///
/// Each file becomes a singleton variant carrying the attributes of its
/// artifact type and goes through variant selection on its own. Files that
/// match nothing are left out.
#[derive(Debug)]
pub struct LocalFileDependencyBackedArtifactSet {
    dependency: LocalFileDependencyMetadata,
    services: ArtifactSelectionServices,
    request_attributes: AttributeContainer,
    selected: OnceCell<ResolvedArtifactSet>,
}

impl LocalFileDependencyBackedArtifactSet {
    /// Create deferred selection
    #[must_use]
    pub fn new(
        dependency: LocalFileDependencyMetadata,
        services: ArtifactSelectionServices,
        request_attributes: AttributeContainer,
    ) -> Self {
        Self {
            dependency,
            services,
            request_attributes,
            selected: OnceCell::new(),
        }
    }

    fn select_files(&self) -> ResolvedArtifactSet {
        let collection = &self.dependency.files;
        match collection.files() {
            Ok(files) => {
                tracing::trace!(
                    collection = %collection.display_name(),
                    files = files.len(),
                    "selecting local files"
                );
                files.iter().map(|file| self.select_file(file)).collect()
            }
            Err(source) => {
                tracing::debug!(
                    collection = %collection.display_name(),
                    error = %source,
                    "could not list local files"
                );
                let failure = ResolveError::file_collection(collection.display_name(), source);
                ResolvedArtifactSet::failed(failure)
            }
        }
    }

    fn select_file(&self, file: &Path) -> ResolvedArtifactSet {
        let component = self.dependency.component.clone();
        let attributes = self.services.artifact_type_registry.map_attributes_for(file);
        let mut descriptor = VariantDescriptor::new(file.display().to_string(), attributes);
        if let Some(component) = &component {
            descriptor = descriptor.with_component(component.clone());
        }
        let descriptor = Arc::new(descriptor);
        let artifact = ResolvableArtifact::resolved(
            ArtifactId::file(component, file),
            file,
            self.dependency.files.build_dependencies().to_vec(),
        );
        let variant = ResolvedVariant::new(
            Arc::clone(&descriptor),
            None,
            ResolvedArtifactSet::single(descriptor, artifact),
        );
        let candidates = ResolvedVariantSet::new(
            file.display().to_string(),
            Arc::clone(&self.services.consumer_schema),
            vec![variant],
        );
        self.services.variant_selector.select(
            &candidates,
            &self.request_attributes,
            true,
            self.services.transformed_variant_factory.as_ref(),
        )
    }
}

impl DeferredArtifactSet for LocalFileDependencyBackedArtifactSet {
    fn source(&self) -> ArtifactSource {
        ArtifactSource::LocalFiles(self.dependency.files.display_name().to_string())
    }

    fn resolve(&self) -> ResolvedArtifactSet {
        self.selected.get_or_init(|| self.select_files()).clone()
    }

    fn visit_dependencies(&self, context: &mut dyn TaskDependencyResolveContext) {
        for task in self.dependency.files.build_dependencies() {
            context.add(task);
        }
    }
}
