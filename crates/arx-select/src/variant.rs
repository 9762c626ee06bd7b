//! Candidate variants for artifact selection

use arx_artifact::{AttributeContainer, AttributesSchema, Capability, ComponentId, VariantId};
use arx_resolve::{ResolvedArtifactSet, VariantDescriptor};
use std::sync::Arc;

/// Artifacts of one producer variant, with what is needed to match it
#[derive(Debug, Clone)]
pub struct ResolvedVariant {
    descriptor: Arc<VariantDescriptor>,
    identifier: Option<VariantId>,
    artifacts: ResolvedArtifactSet,
}

impl ResolvedVariant {
    /// Create variant
    #[inline]
    #[must_use]
    pub fn new(
        descriptor: Arc<VariantDescriptor>,
        identifier: Option<VariantId>,
        artifacts: ResolvedArtifactSet,
    ) -> Self {
        Self {
            descriptor,
            identifier,
            artifacts,
        }
    }

    /// Descriptor handed to visitors
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &Arc<VariantDescriptor> {
        &self.descriptor
    }

    /// Stable identity, when the variant comes from component metadata
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> Option<&VariantId> {
        self.identifier.as_ref()
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.descriptor.display_name()
    }

    /// Attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeContainer {
        self.descriptor.attributes()
    }

    /// Capabilities
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        self.descriptor.capabilities()
    }

    /// Backing artifacts
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &ResolvedArtifactSet {
        &self.artifacts
    }
}

/// Candidates offered to the variant selector for one selection
#[derive(Debug, Clone)]
pub struct ResolvedVariantSet {
    display_name: String,
    component: Option<ComponentId>,
    schema: Arc<AttributesSchema>,
    overridden_attributes: AttributeContainer,
    variants: Vec<ResolvedVariant>,
}

impl ResolvedVariantSet {
    /// Create candidate set
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        schema: Arc<AttributesSchema>,
        variants: Vec<ResolvedVariant>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            component: None,
            schema,
            overridden_attributes: AttributeContainer::new(),
            variants,
        }
    }

    /// Set owning component
    #[must_use]
    pub fn with_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    /// Set attributes overriding the consumer request
    #[must_use]
    pub fn with_overridden_attributes(mut self, attributes: AttributeContainer) -> Self {
        self.overridden_attributes = attributes;
        self
    }

    /// Name used in diagnostics
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Owning component
    #[inline]
    #[must_use]
    pub fn component(&self) -> Option<&ComponentId> {
        self.component.as_ref()
    }

    /// Producer attribute schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &AttributesSchema {
        &self.schema
    }

    /// Attributes overriding the consumer request
    #[inline]
    #[must_use]
    pub fn overridden_attributes(&self) -> &AttributeContainer {
        &self.overridden_attributes
    }

    /// Candidates in declaration order
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[ResolvedVariant] {
        &self.variants
    }
}
