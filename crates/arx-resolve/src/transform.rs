//! Transform chains as artifact set decorators
//!
//! A [`TransformedArtifactSet`] wraps a source set and a [`TransformChain`].
//! It is itself a [`ResolvedArtifactSet`](crate::ResolvedArtifactSet) leaf,
//! so visiting and parallel finalization need no transform-specific path.

use crate::artifacts::Artifacts;
use crate::set::ResolvedArtifactSet;
use crate::visitor::{ArtifactSource, ArtifactVisitor, VariantDescriptor, VisitType, Visitor};
use arx_artifact::{CalculatedValue, ResolvableArtifact, ResolveError};
use once_cell::sync::OnceCell;
use std::fmt::{self, Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One artifact-to-artifact conversion
pub trait TransformStep: Send + Sync + Debug {
    /// Name used in diagnostics
    fn display_name(&self) -> &str;

    /// Convert one input file into zero or more output files
    ///
    /// # Errors
    /// Returns [`ResolveError::Transform`] when the input cannot be converted
    fn transform(&self, input: &Path) -> Result<Vec<PathBuf>, ResolveError>;
}

/// Ordered, non-empty sequence of transform steps
#[derive(Clone)]
pub struct TransformChain {
    steps: Arc<[Arc<dyn TransformStep>]>,
}

impl TransformChain {
    /// Chain made of `steps`, applied in order
    #[must_use]
    pub fn new(steps: Vec<Arc<dyn TransformStep>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Chain of one step
    #[must_use]
    pub fn single(step: Arc<dyn TransformStep>) -> Self {
        Self::new(vec![step])
    }

    /// Chain followed by `step`
    #[must_use]
    pub fn then(&self, step: Arc<dyn TransformStep>) -> Self {
        let mut steps = self.steps.to_vec();
        steps.push(step);
        Self::new(steps)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in application order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Arc<dyn TransformStep>] {
        &self.steps
    }

    /// Run every step over `input`, feeding each output to the next step
    ///
    /// # Errors
    /// Returns the first step failure
    pub fn apply(&self, input: &Path) -> Result<Vec<PathBuf>, ResolveError> {
        let mut current = vec![input.to_path_buf()];
        for step in self.steps.iter() {
            let mut next = Vec::with_capacity(current.len());
            for file in &current {
                next.extend(step.transform(file)?);
            }
            current = next;
        }
        Ok(current)
    }
}

impl Display for TransformChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            f.write_str(step.display_name())?;
        }
        Ok(())
    }
}

impl Debug for TransformChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TransformChain({self})")
    }
}

/// Source set seen through a transform chain
pub struct TransformedArtifactSet {
    target: Arc<VariantDescriptor>,
    source: ResolvedArtifactSet,
    chain: TransformChain,
    units: OnceCell<Vec<Artifacts>>,
}

impl TransformedArtifactSet {
    /// Create transformed set producing `target` from `source`
    #[must_use]
    pub fn new(
        target: Arc<VariantDescriptor>,
        source: ResolvedArtifactSet,
        chain: TransformChain,
    ) -> Self {
        Self {
            target,
            source,
            chain,
            units: OnceCell::new(),
        }
    }

    /// Wrap into a resolved artifact set
    #[must_use]
    pub fn into_set(self) -> ResolvedArtifactSet {
        ResolvedArtifactSet::Transformed(Arc::new(self))
    }

    /// Variant produced by the chain
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Arc<VariantDescriptor> {
        &self.target
    }

    /// Untransformed set
    #[inline]
    #[must_use]
    pub fn source(&self) -> &ResolvedArtifactSet {
        &self.source
    }

    /// The chain
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &TransformChain {
        &self.chain
    }

    pub(crate) fn visit(&self, visitor: &mut dyn Visitor) {
        if visitor.prepare_for_visit(&self.target.source()) == VisitType::NoContents {
            return;
        }
        for unit in self.units() {
            visitor.visit_artifacts(unit.clone());
        }
    }

    // One transformed unit per source artifact, created once so repeated
    // visits share the same memoized outputs.
    fn units(&self) -> &[Artifacts] {
        self.units.get_or_init(|| {
            let mut collector = SourceCollector {
                target: &self.target,
                chain: &self.chain,
                units: Vec::new(),
            };
            self.source.visit(&mut collector);
            collector.units
        })
    }
}

impl Debug for TransformedArtifactSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformedArtifactSet")
            .field("target", &self.target.display_name())
            .field("chain", &self.chain)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

struct SourceCollector<'a> {
    target: &'a Arc<VariantDescriptor>,
    chain: &'a TransformChain,
    units: Vec<Artifacts>,
}

impl Visitor for SourceCollector<'_> {
    fn prepare_for_visit(&mut self, _source: &ArtifactSource) -> VisitType {
        VisitType::Visit
    }

    fn visit_artifacts(&mut self, artifacts: Artifacts) {
        match artifacts {
            Artifacts::Files(files) => {
                for artifact in files.artifacts() {
                    self.push(TransformInput::Artifact(artifact.clone()));
                }
            }
            Artifacts::Transformed(upstream) => self.push(TransformInput::Upstream(upstream)),
            broken @ Artifacts::Broken(_) => self.units.push(broken),
        }
    }
}

impl SourceCollector<'_> {
    fn push(&mut self, input: TransformInput) {
        let transformed =
            TransformedArtifact::new(Arc::clone(self.target), input, self.chain.clone());
        self.units.push(Artifacts::Transformed(Arc::new(transformed)));
    }
}

enum TransformInput {
    Artifact(ResolvableArtifact),
    Upstream(Arc<TransformedArtifact>),
}

impl TransformInput {
    fn display_name(&self) -> String {
        match self {
            Self::Artifact(artifact) => artifact.id().to_string(),
            Self::Upstream(upstream) => upstream.display_name().to_string(),
        }
    }

    fn artifacts(&self) -> Result<Vec<ResolvableArtifact>, ResolveError> {
        match self {
            Self::Artifact(artifact) => Ok(vec![artifact.clone()]),
            Self::Upstream(upstream) => upstream.outputs().cloned(),
        }
    }

    fn source_artifacts(&self) -> Vec<ResolvableArtifact> {
        match self {
            Self::Artifact(artifact) => vec![artifact.clone()],
            Self::Upstream(upstream) => upstream.source_artifacts(),
        }
    }
}

/// Outputs of a chain applied to one source artifact, computed once
pub struct TransformedArtifact {
    target: Arc<VariantDescriptor>,
    input: Arc<TransformInput>,
    outputs: CalculatedValue<Vec<ResolvableArtifact>>,
}

impl TransformedArtifact {
    fn new(target: Arc<VariantDescriptor>, input: TransformInput, chain: TransformChain) -> Self {
        let display_name = format!("{} via {chain}", input.display_name());
        let input = Arc::new(input);
        let chain_input = Arc::clone(&input);
        let outputs = CalculatedValue::new(display_name, move || {
            let mut outputs = Vec::new();
            for artifact in chain_input.artifacts()? {
                let file = artifact.file()?;
                tracing::debug!(input = %file.display(), chain = %chain, "running transform chain");
                outputs.extend(
                    chain
                        .apply(file)?
                        .into_iter()
                        .map(|output| artifact.transformed_to(output)),
                );
            }
            Ok(outputs)
        });
        Self {
            target,
            input,
            outputs,
        }
    }

    /// Name used in diagnostics
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.outputs.display_name()
    }

    /// Variant produced by the chain
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Arc<VariantDescriptor> {
        &self.target
    }

    /// Whether the chain already ran
    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.outputs.is_finalized()
    }

    /// Run the chain unless it already ran
    pub fn finalize(&self) {
        self.outputs.finalize_if_not_already();
    }

    /// Transformed artifacts; runs the chain if needed
    ///
    /// # Errors
    /// Returns the failure of the source artifact or of a step
    pub fn outputs(&self) -> Result<&Vec<ResolvableArtifact>, ResolveError> {
        self.outputs.get()
    }

    /// Untransformed artifacts at the start of the chain; runs nothing
    #[must_use]
    pub fn source_artifacts(&self) -> Vec<ResolvableArtifact> {
        self.input.source_artifacts()
    }

    // Without files the chain never runs: the source artifacts are reported
    // as the target variant.
    pub(crate) fn deliver(&self, visitor: &mut dyn ArtifactVisitor) {
        if !visitor.requires_files() {
            let sources = self.source_artifacts();
            for source in &sources {
                visitor.visit_artifact(&self.target, source);
            }
            if !sources.is_empty() {
                visitor.end_visit_collection(&self.target.source());
            }
            return;
        }
        match self.outputs() {
            Ok(outputs) => {
                for output in outputs {
                    visitor.visit_artifact(&self.target, output);
                }
                visitor.end_visit_collection(&self.target.source());
            }
            Err(failure) => visitor.visit_failure(&failure),
        }
    }
}

impl Debug for TransformedArtifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformedArtifact")
            .field("target", &self.target.display_name())
            .field("outputs", &self.outputs)
            .finish()
    }
}
