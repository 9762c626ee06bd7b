//! Error taxonomy for artifact resolution
//!
//! Failures are values: a [`ResolveError`] is captured where it happens and
//! replayed to visitors, so it must be cheap to clone. Underlying I/O errors
//! are shared behind an [`Arc`].

use crate::attributes::AttributeContainer;
use crate::ids::{ArtifactId, ComponentId};
use std::path::PathBuf;
use std::sync::Arc;

/// Failure captured while selecting or resolving artifacts
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// No variant matched the request and matching was strict
    #[error("no variant of {component} matches {requested}; candidates: {}", candidates.join(", "))]
    NoMatchingVariants {
        /// Component (or file collection) that was searched
        component: String,
        /// Attributes requested by the consumer
        requested: AttributeContainer,
        /// Display names of the candidates
        candidates: Vec<String>,
    },

    /// More than one variant matched equally well
    #[error("more than one variant of {component} matches {requested}: {}", matches.join(", "))]
    AmbiguousVariants {
        /// Component that was searched
        component: String,
        /// Attributes requested by the consumer
        requested: AttributeContainer,
        /// Display names of the equally good matches
        matches: Vec<String>,
    },

    /// More than one transform chain of minimal length could produce the request
    #[error(
        "found multiple transforms that can produce {requested} for {component}: {}",
        chains.join("; ")
    )]
    AmbiguousTransforms {
        /// Component that was searched
        component: String,
        /// Attributes requested by the consumer
        requested: AttributeContainer,
        /// Description of each candidate chain
        chains: Vec<String>,
    },

    /// Materializing an artifact file failed
    #[error("could not resolve {artifact}: {source}")]
    ArtifactResolution {
        /// Artifact that failed
        artifact: ArtifactId,
        /// Underlying failure
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Listing the files of a local file dependency failed
    #[error("could not list files of {collection}: {source}")]
    FileCollection {
        /// Display name of the file collection
        collection: String,
        /// Underlying failure
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A transform step failed
    #[error("transform '{step}' failed for {}: {message}", input.display())]
    Transform {
        /// Display name of the failing step
        step: String,
        /// Input file of the step
        input: PathBuf,
        /// Failure description
        message: String,
    },

    /// A graph node failed to resolve, so it has no artifacts
    #[error("component {component} is unavailable: {reason}")]
    ComponentUnavailable {
        /// Component that failed
        component: ComponentId,
        /// Failure description
        reason: String,
    },

    /// Upstream dependency graph failure
    #[error("dependency graph failure: {0}")]
    Graph(String),

    /// A memoized calculation panicked and left no value
    #[error("calculation of {0} did not complete")]
    CalculationPanicked(String),
}

impl ResolveError {
    /// Create artifact resolution failure
    #[inline]
    #[must_use]
    pub fn artifact(artifact: ArtifactId, source: std::io::Error) -> Self {
        Self::ArtifactResolution {
            artifact,
            source: Arc::new(source),
        }
    }

    /// Create file collection failure
    #[inline]
    #[must_use]
    pub fn file_collection(collection: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileCollection {
            collection: collection.into(),
            source: Arc::new(source),
        }
    }

    /// Create transform failure
    #[inline]
    #[must_use]
    pub fn transform(
        step: impl Into<String>,
        input: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transform {
            step: step.into(),
            input: input.into(),
            message: message.into(),
        }
    }

    /// Whether this is a variant selection failure (as opposed to a resolution failure)
    #[inline]
    #[must_use]
    pub fn is_selection_failure(&self) -> bool {
        matches!(
            self,
            Self::NoMatchingVariants { .. }
                | Self::AmbiguousVariants { .. }
                | Self::AmbiguousTransforms { .. }
        )
    }

    /// Whether this failure stands for an unavailable graph component
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ComponentUnavailable { .. })
    }
}
