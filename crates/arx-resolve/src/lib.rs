//! ARX Resolved Artifact Sets
//!
//! Composable, lazily visited artifact sets and the two-phase visiting
//! protocol used to consume them.
//!
//! # Core Concepts
//!
//! - [`ResolvedArtifactSet`]: tagged union of empty, composite, failed,
//!   file-backed, transformed and deferred sets
//! - [`Visitor`] / [`Artifacts`] / [`ArtifactVisitor`]: collect leaf units,
//!   finalize them, then deliver in order
//! - [`TransformChain`] / [`TransformedArtifactSet`]: transforms modelled as
//!   a set decorator
//! - [`ParallelResolveArtifactSet`]: finalization on a rayon pool with
//!   ordered delivery
//!
//! # Example
//!
//! ```rust
//! use arx_artifact::{ArtifactId, AttributeContainer, ResolvableArtifact, ResolveError};
//! use arx_resolve::{
//!     ArtifactVisitor, OperationExecutor, ParallelResolveArtifactSet, ResolvedArtifactSet,
//!     VariantDescriptor,
//! };
//! use std::sync::Arc;
//!
//! struct Names(Vec<String>);
//!
//! impl ArtifactVisitor for Names {
//!     fn visit_artifact(&mut self, _variant: &VariantDescriptor, artifact: &ResolvableArtifact) {
//!         self.0.push(artifact.id().file_name());
//!     }
//!
//!     fn visit_failure(&mut self, _failure: &ResolveError) {}
//! }
//!
//! let variant = Arc::new(VariantDescriptor::new("files", AttributeContainer::new()));
//! let set = ResolvedArtifactSet::artifacts(
//!     &variant,
//!     ["a.jar", "b.jar"]
//!         .map(|f| ResolvableArtifact::resolved(ArtifactId::file(None, f), f, Vec::new())),
//! );
//!
//! let executor = OperationExecutor::sequential();
//! let mut names = Names(Vec::new());
//! ParallelResolveArtifactSet::wrap(&set, &executor).visit(&mut names);
//! assert_eq!(names.0, vec!["a.jar", "b.jar"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod artifacts;
mod parallel;
mod queue;
mod set;
mod transform;
mod visitor;

pub use artifacts::Artifacts;
pub use parallel::ParallelResolveArtifactSet;
pub use queue::{ExecutorError, Operation, OperationExecutor, OperationQueue};
pub use set::{DeferredArtifactSet, FileArtifactSet, ResolvedArtifactSet};
pub use transform::{TransformChain, TransformStep, TransformedArtifact, TransformedArtifactSet};
pub use visitor::{ArtifactSource, ArtifactVisitor, VariantDescriptor, VisitType, Visitor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
