//! Component and variant metadata produced by graph resolution
//!
//! These are read-only inputs; nothing here resolves files.

use arx_artifact::{
    ArtifactId, ArtifactName, AttributeContainer, AttributesSchema, Capability, ComponentId, TaskId,
    VariantId,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Artifact declared by a component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentArtifactMetadata {
    component: ComponentId,
    name: ArtifactName,
    build_dependencies: Vec<TaskId>,
}

impl ComponentArtifactMetadata {
    /// Create artifact metadata
    #[inline]
    #[must_use]
    pub fn new(component: ComponentId, name: ArtifactName) -> Self {
        Self {
            component,
            name,
            build_dependencies: Vec::new(),
        }
    }

    /// Set the tasks producing this artifact
    #[inline]
    #[must_use]
    pub fn with_build_dependencies(mut self, tasks: Vec<TaskId>) -> Self {
        self.build_dependencies = tasks;
        self
    }

    /// Owning component
    #[inline]
    #[must_use]
    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    /// Declared name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &ArtifactName {
        &self.name
    }

    /// Producing tasks
    #[inline]
    #[must_use]
    pub fn build_dependencies(&self) -> &[TaskId] {
        &self.build_dependencies
    }

    /// Artifact identity
    #[must_use]
    pub fn id(&self) -> ArtifactId {
        ArtifactId::component(self.component.clone(), self.name.clone())
    }
}

/// Secondary variant exposing a subset of a graph variant's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantArtifactsMetadata {
    /// Variant name
    pub name: String,
    /// Attributes added to the owning graph variant's attributes
    pub attributes: AttributeContainer,
    /// Artifacts of this variant
    pub artifacts: Vec<ComponentArtifactMetadata>,
}

/// Build-tree unique identity of one graph variant instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantInstanceId(pub u64);

impl Display for VariantInstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonic [`VariantInstanceId`]s
#[derive(Debug, Default)]
pub struct VariantInstanceIdFactory {
    next: AtomicU64,
}

impl VariantInstanceIdFactory {
    /// Create factory starting at zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused id
    #[inline]
    pub fn next_id(&self) -> VariantInstanceId {
        VariantInstanceId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Variant selected for a node during graph resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphVariant {
    /// Instance id, key of the implicit artifact set cache
    pub instance_id: VariantInstanceId,
    /// Variant identity
    pub id: VariantId,
    /// Variant attributes
    pub attributes: AttributeContainer,
    /// Provided capabilities
    pub capabilities: Vec<Capability>,
    /// Artifacts of the variant itself
    pub artifacts: Vec<ComponentArtifactMetadata>,
    /// Secondary variants for artifact selection; the variant itself when empty
    pub artifact_variants: Vec<VariantArtifactsMetadata>,
}

impl GraphVariant {
    /// Create graph variant without artifacts
    #[must_use]
    pub fn new(
        instance_id: VariantInstanceId,
        id: VariantId,
        attributes: AttributeContainer,
    ) -> Self {
        Self {
            instance_id,
            id,
            attributes,
            capabilities: Vec::new(),
            artifacts: Vec::new(),
            artifact_variants: Vec::new(),
        }
    }

    /// Set capabilities
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set own artifacts
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Vec<ComponentArtifactMetadata>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Add a secondary variant
    #[must_use]
    pub fn with_artifact_variant(mut self, variant: VariantArtifactsMetadata) -> Self {
        self.artifact_variants.push(variant);
        self
    }

    /// Whether the variant provides every requested capability
    #[must_use]
    pub fn provides_all(&self, requested: &[Capability]) -> bool {
        requested
            .iter()
            .all(|wanted| self.capabilities.iter().any(|provided| provided.matches(wanted)))
    }
}

/// Resolved component with its variants and declared artifacts
#[derive(Debug, Clone)]
pub struct ComponentMetadata {
    /// Component identity
    pub id: ComponentId,
    /// Producer attribute schema
    pub schema: Arc<AttributesSchema>,
    /// Every variant of the component, used for reselection
    pub variants: Vec<Arc<GraphVariant>>,
    /// Every artifact declared by the component, looked up by explicit artifact requests
    pub artifacts: Vec<ComponentArtifactMetadata>,
}

impl ComponentMetadata {
    /// Create component without variants
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            schema: Arc::new(AttributesSchema::new()),
            variants: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Set schema
    #[must_use]
    pub fn with_schema(mut self, schema: AttributesSchema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    /// Add a variant
    #[must_use]
    pub fn with_variant(mut self, variant: GraphVariant) -> Self {
        for artifact in &variant.artifacts {
            if !self.artifacts.contains(artifact) {
                self.artifacts.push(artifact.clone());
            }
        }
        self.variants.push(Arc::new(variant));
        self
    }

    /// Artifact metadata for an explicitly requested name
    ///
    /// Names the component does not declare get metadata without producing tasks.
    #[must_use]
    pub fn artifact(&self, name: &ArtifactName) -> ComponentArtifactMetadata {
        self.artifacts
            .iter()
            .find(|artifact| artifact.name() == name)
            .cloned()
            .unwrap_or_else(|| ComponentArtifactMetadata::new(self.id.clone(), name.clone()))
    }
}

/// Artifact exclusion rule carried by a dependency edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactExclusion {
    /// Excluded base name; any when unset
    pub name: Option<String>,
    /// Excluded extension; any when unset
    pub extension: Option<String>,
}

impl ArtifactExclusion {
    /// Exclude artifacts by base name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            extension: None,
        }
    }

    /// Exclude artifacts by extension
    #[must_use]
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            name: None,
            extension: Some(extension.into()),
        }
    }

    /// Whether the rule removes `artifact`
    #[must_use]
    pub fn excludes(&self, artifact: &ArtifactName) -> bool {
        let name_matches = self.name.as_ref().map_or(true, |name| *name == artifact.name);
        let extension_matches = self
            .extension
            .as_ref()
            .map_or(true, |extension| artifact.extension.as_ref() == Some(extension));
        name_matches && extension_matches
    }
}

/// Selection criteria a dependency edge adds to its target variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeOverrides {
    /// Attributes overriding the consumer request
    pub attributes: AttributeContainer,
    /// Requested capabilities
    pub capabilities: Vec<Capability>,
    /// Explicitly requested artifacts
    pub artifacts: Vec<ArtifactName>,
    /// Artifact exclusions
    pub exclusions: Vec<ArtifactExclusion>,
}

impl EdgeOverrides {
    /// Edge that does not change selection
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the edge leaves selection unchanged
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.attributes.is_empty()
            && self.capabilities.is_empty()
            && self.artifacts.is_empty()
            && self.exclusions.is_empty()
    }

    /// Whether any exclusion removes `artifact`
    #[must_use]
    pub fn excludes(&self, artifact: &ArtifactName) -> bool {
        self.exclusions.iter().any(|rule| rule.excludes(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_monotonic() {
        let factory = VariantInstanceIdFactory::new();
        assert_eq!(factory.next_id(), VariantInstanceId(0));
        assert_eq!(factory.next_id(), VariantInstanceId(1));
    }

    #[test]
    fn exclusion_matches_name_and_extension() {
        let jar = ArtifactName::new("lib", "jar");
        let sources = ArtifactName::new("lib", "zip");

        assert!(ArtifactExclusion::named("lib").excludes(&jar));
        assert!(ArtifactExclusion::with_extension("zip").excludes(&sources));
        assert!(!ArtifactExclusion::with_extension("zip").excludes(&jar));
        assert!(ArtifactExclusion::default().excludes(&jar));
    }

    #[test]
    fn implicit_edges_carry_nothing() {
        assert!(EdgeOverrides::none().is_implicit());
        let edge = EdgeOverrides {
            exclusions: vec![ArtifactExclusion::named("lib")],
            ..EdgeOverrides::none()
        };
        assert!(!edge.is_implicit());
    }

    #[test]
    fn undeclared_artifact_has_no_tasks() {
        let id = ComponentId::project(":", ":lib");
        let declared = ComponentArtifactMetadata::new(id.clone(), ArtifactName::new("lib", "jar"))
            .with_build_dependencies(vec![TaskId::new(":lib:jar")]);
        let variant = GraphVariant::new(
            VariantInstanceId(0),
            VariantId::new(id.clone(), "runtimeElements"),
            AttributeContainer::new(),
        )
        .with_artifacts(vec![declared.clone()]);
        let component = ComponentMetadata::new(id).with_variant(variant);

        assert_eq!(component.artifact(&ArtifactName::new("lib", "jar")), declared);
        assert!(component
            .artifact(&ArtifactName::new("lib", "pom"))
            .build_dependencies()
            .is_empty());
    }

    #[test]
    fn capability_check_ignores_versions() {
        let id = ComponentId::module("org", "lib", "1.0");
        let variant = GraphVariant::new(
            VariantInstanceId(3),
            VariantId::new(id, "testFixtures"),
            AttributeContainer::new(),
        )
        .with_capabilities(vec![Capability::new("org", "lib-test-fixtures", Some("1.0"))]);

        assert!(variant.provides_all(&[Capability::new("org", "lib-test-fixtures", None)]));
        assert!(!variant.provides_all(&[Capability::new("org", "lib", None)]));
    }
}
