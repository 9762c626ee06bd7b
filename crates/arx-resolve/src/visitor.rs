//! Visitor protocol
//!
//! Visiting is two-phase. A [`Visitor`] walks the set tree and receives one
//! [`Artifacts`](crate::Artifacts) unit per leaf; the caller may schedule
//! finalization work for each unit and later deliver it, in order, to an
//! [`ArtifactVisitor`].

use crate::artifacts::Artifacts;
use arx_artifact::{AttributeContainer, Capability, ComponentId, ResolvableArtifact, ResolveError};
use std::fmt::{self, Display, Formatter};

/// Where a leaf's files come from, used to skip leaves before any work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactSource {
    /// Files of a resolved component
    Component(ComponentId),

    /// Files of a local file dependency
    LocalFiles(String),

    /// Anything else
    Other,
}

/// Decision returned by [`Visitor::prepare_for_visit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitType {
    /// Visit the leaf's contents
    Visit,

    /// Skip the leaf without resolving it
    NoContents,
}

/// Display name, attributes and capabilities of the variant an artifact belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    display_name: String,
    component: Option<ComponentId>,
    attributes: AttributeContainer,
    capabilities: Vec<Capability>,
}

impl VariantDescriptor {
    /// Create descriptor
    #[inline]
    #[must_use]
    pub fn new(display_name: impl Into<String>, attributes: AttributeContainer) -> Self {
        Self {
            display_name: display_name.into(),
            component: None,
            attributes,
            capabilities: Vec::new(),
        }
    }

    /// Set owning component
    #[inline]
    #[must_use]
    pub fn with_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    /// Set capabilities
    #[inline]
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Owning component, if any
    #[inline]
    #[must_use]
    pub fn component(&self) -> Option<&ComponentId> {
        self.component.as_ref()
    }

    /// Variant attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeContainer {
        &self.attributes
    }

    /// Variant capabilities
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Source reported to visitors for this variant's leaves
    #[must_use]
    pub fn source(&self) -> ArtifactSource {
        match &self.component {
            Some(component) => ArtifactSource::Component(component.clone()),
            None => ArtifactSource::Other,
        }
    }
}

impl Display for VariantDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// First-phase visitor: walks the tree and receives leaf units
pub trait Visitor {
    /// Called before any work is scheduled for a leaf, in result order
    fn prepare_for_visit(&mut self, source: &ArtifactSource) -> VisitType;

    /// Receive one leaf unit
    fn visit_artifacts(&mut self, artifacts: Artifacts);
}

/// Final, ordered consumer of artifacts and failures
///
/// Artifacts reachable through several graph paths are delivered once per
/// path. Implementations needing unique artifacts deduplicate by
/// [`ResolvableArtifact::id`].
pub trait ArtifactVisitor {
    /// Whether leaves must be visited at all
    fn prepare_for_visit(&mut self, _source: &ArtifactSource) -> VisitType {
        VisitType::Visit
    }

    /// Whether artifact files must be materialized before delivery
    fn requires_files(&self) -> bool {
        true
    }

    /// Receive one artifact
    fn visit_artifact(&mut self, variant: &VariantDescriptor, artifact: &ResolvableArtifact);

    /// Receive one failure
    fn visit_failure(&mut self, failure: &ResolveError);

    /// Called after all artifacts of a leaf were delivered
    fn end_visit_collection(&mut self, _source: &ArtifactSource) {}
}
