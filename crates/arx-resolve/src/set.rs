//! Composable resolved artifact sets
//!
//! [`ResolvedArtifactSet`] is a closed set of variants visited by pattern
//! matching. Visiting never fails: failures are leaves of the tree and reach
//! the visitor through the same channel as artifacts.

use crate::artifacts::Artifacts;
use crate::transform::TransformedArtifactSet;
use crate::visitor::{ArtifactSource, ArtifactVisitor, VariantDescriptor, VisitType, Visitor};
use arx_artifact::{ResolvableArtifact, ResolveError, TaskDependencyResolveContext};
use std::fmt::Debug;
use std::sync::Arc;

/// Lazily visited container of artifacts and failures
///
/// # Invariants
/// - Visiting order equals construction order
/// - A composite never holds [`ResolvedArtifactSet::Empty`] members
/// - Artifacts reachable through two members are visited twice
#[derive(Debug, Clone, Default)]
pub enum ResolvedArtifactSet {
    /// No artifacts; produces no units and no dependencies
    #[default]
    Empty,

    /// Ordered children
    Composite(Arc<[ResolvedArtifactSet]>),

    /// Captured failure
    Failed(ResolveError),

    /// File-backed artifacts of one variant
    Files(Arc<FileArtifactSet>),

    /// Source set decorated with a transform chain
    Transformed(Arc<TransformedArtifactSet>),

    /// Set whose contents are only known once it is visited
    Deferred(Arc<dyn DeferredArtifactSet>),
}

impl ResolvedArtifactSet {
    /// The empty set
    pub const EMPTY: Self = Self::Empty;

    /// Compose sets in order
    ///
    /// Empty members are dropped; a single remaining member is returned as is.
    #[must_use]
    pub fn composite<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = ResolvedArtifactSet>,
    {
        let mut members: Vec<Self> = sets.into_iter().filter(|set| !set.is_empty()).collect();
        match members.len() {
            0 => Self::Empty,
            1 => members.pop().unwrap_or_default(),
            _ => Self::Composite(members.into()),
        }
    }

    /// Set replaying `failure` on every visit
    #[inline]
    #[must_use]
    pub fn failed(failure: ResolveError) -> Self {
        Self::Failed(failure)
    }

    /// One leaf holding every artifact of `variant`
    ///
    /// No artifacts gives the empty set.
    #[must_use]
    pub fn artifacts<I>(variant: &Arc<VariantDescriptor>, artifacts: I) -> Self
    where
        I: IntoIterator<Item = ResolvableArtifact>,
    {
        let artifacts: Vec<ResolvableArtifact> = artifacts.into_iter().collect();
        if artifacts.is_empty() {
            return Self::Empty;
        }
        Self::Files(Arc::new(FileArtifactSet::new(Arc::clone(variant), artifacts)))
    }

    /// Leaf holding a single artifact
    #[inline]
    #[must_use]
    pub fn single(variant: Arc<VariantDescriptor>, artifact: ResolvableArtifact) -> Self {
        Self::Files(Arc::new(FileArtifactSet::new(variant, vec![artifact])))
    }

    /// Wrap a deferred set
    #[inline]
    #[must_use]
    pub fn deferred(set: Arc<dyn DeferredArtifactSet>) -> Self {
        Self::Deferred(set)
    }

    /// Whether this is the empty set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Whether this set is a captured failure
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Failure captured by this set, if it is a failed set
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<&ResolveError> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Walk the tree in order, handing one [`Artifacts`] unit per visited leaf
    pub fn visit(&self, visitor: &mut dyn Visitor) {
        match self {
            Self::Empty => {}
            Self::Composite(members) => {
                for member in members.iter() {
                    member.visit(visitor);
                }
            }
            Self::Failed(failure) => visitor.visit_artifacts(Artifacts::Broken(failure.clone())),
            Self::Files(files) => {
                if visitor.prepare_for_visit(&files.variant().source()) == VisitType::Visit {
                    visitor.visit_artifacts(Artifacts::Files(Arc::clone(files)));
                }
            }
            Self::Transformed(transformed) => transformed.visit(visitor),
            Self::Deferred(deferred) => {
                if visitor.prepare_for_visit(&deferred.source()) == VisitType::Visit {
                    deferred.resolve().visit(&mut Prepared { inner: visitor });
                }
            }
        }
    }

    /// Report producing tasks and failures without resolving files
    pub fn visit_dependencies(&self, context: &mut dyn TaskDependencyResolveContext) {
        match self {
            Self::Empty => {}
            Self::Composite(members) => {
                for member in members.iter() {
                    member.visit_dependencies(context);
                }
            }
            Self::Failed(failure) => context.visit_failure(failure),
            Self::Files(files) => {
                for artifact in files.artifacts() {
                    artifact.visit_dependencies(context);
                }
            }
            Self::Transformed(transformed) => transformed.source().visit_dependencies(context),
            Self::Deferred(deferred) => deferred.visit_dependencies(context),
        }
    }

    /// Report every artifact whose file needs scheduled work
    ///
    /// Deferred sets are skipped since their contents are not known yet.
    pub fn visit_external_artifacts(&self, visitor: &mut dyn FnMut(&ResolvableArtifact)) {
        match self {
            Self::Composite(members) => {
                for member in members.iter() {
                    member.visit_external_artifacts(visitor);
                }
            }
            Self::Files(files) => {
                for artifact in files.artifacts() {
                    if !artifact.is_resolve_synchronously() {
                        visitor(artifact);
                    }
                }
            }
            Self::Transformed(transformed) => {
                transformed.source().visit_external_artifacts(visitor);
            }
            _ => {}
        }
    }

    /// Report failures captured while selecting, without resolving anything
    pub fn visit_failures(&self, visitor: &mut dyn FnMut(&ResolveError)) {
        match self {
            Self::Composite(members) => {
                for member in members.iter() {
                    member.visit_failures(visitor);
                }
            }
            Self::Failed(failure) => visitor(failure),
            Self::Transformed(transformed) => transformed.source().visit_failures(visitor),
            _ => {}
        }
    }
}

impl FromIterator<ResolvedArtifactSet> for ResolvedArtifactSet {
    fn from_iter<I: IntoIterator<Item = ResolvedArtifactSet>>(iter: I) -> Self {
        Self::composite(iter)
    }
}

/// Set computed when first visited, such as the contents of a local file dependency
pub trait DeferredArtifactSet: Send + Sync + Debug {
    /// Source reported to visitors before resolving
    fn source(&self) -> ArtifactSource;

    /// Compute the actual set; expected to be memoized
    fn resolve(&self) -> ResolvedArtifactSet;

    /// Report producing tasks without resolving
    fn visit_dependencies(&self, context: &mut dyn TaskDependencyResolveContext);
}

/// Leaf holding the file-backed artifacts of one variant
///
/// Delivered as one collection: each artifact or its failure in order, then
/// a single [`ArtifactVisitor::end_visit_collection`] when anything was
/// delivered.
#[derive(Debug)]
pub struct FileArtifactSet {
    variant: Arc<VariantDescriptor>,
    artifacts: Vec<ResolvableArtifact>,
}

impl FileArtifactSet {
    /// Create leaf
    #[inline]
    #[must_use]
    pub fn new(variant: Arc<VariantDescriptor>, artifacts: Vec<ResolvableArtifact>) -> Self {
        Self { variant, artifacts }
    }

    /// Owning variant
    #[inline]
    #[must_use]
    pub fn variant(&self) -> &Arc<VariantDescriptor> {
        &self.variant
    }

    /// Artifacts in declaration order
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &[ResolvableArtifact] {
        &self.artifacts
    }

    pub(crate) fn deliver(&self, visitor: &mut dyn ArtifactVisitor) {
        let requires_files = visitor.requires_files();
        let mut delivered = false;
        for artifact in &self.artifacts {
            if requires_files {
                if let Err(failure) = artifact.file() {
                    visitor.visit_failure(&failure);
                    continue;
                }
            }
            visitor.visit_artifact(&self.variant, artifact);
            delivered = true;
        }
        if delivered {
            visitor.end_visit_collection(&self.variant.source());
        }
    }
}

/// Forwards units of a set whose source was already accepted
struct Prepared<'a> {
    inner: &'a mut dyn Visitor,
}

impl Visitor for Prepared<'_> {
    fn prepare_for_visit(&mut self, _source: &ArtifactSource) -> VisitType {
        VisitType::Visit
    }

    fn visit_artifacts(&mut self, artifacts: Artifacts) {
        self.inner.visit_artifacts(artifacts);
    }
}
