//! Leaf units handed out during the first visiting phase

use crate::queue::OperationQueue;
use crate::set::FileArtifactSet;
use crate::transform::TransformedArtifact;
use crate::visitor::ArtifactVisitor;
use arx_artifact::ResolveError;
use std::sync::Arc;

/// Two-phase handle for one leaf of a resolved artifact set
///
/// [`start_finalization`](Self::start_finalization) only enqueues work;
/// [`visit`](Self::visit) delivers the artifacts once that work completed.
#[derive(Debug, Clone)]
pub enum Artifacts {
    /// File-backed artifacts of one variant
    Files(Arc<FileArtifactSet>),

    /// Outputs of a transform chain applied to one source artifact
    Transformed(Arc<TransformedArtifact>),

    /// Captured failure, replayed on every visit
    Broken(ResolveError),
}

impl Artifacts {
    /// Enqueue the work needed before delivery
    ///
    /// Nothing is enqueued unless `requires_files`. Returns whether an
    /// operation was added to the queue.
    pub fn start_finalization(&self, queue: &dyn OperationQueue, requires_files: bool) -> bool {
        if !requires_files {
            return false;
        }
        match self {
            Self::Files(files) => {
                let mut scheduled = false;
                for artifact in files.artifacts() {
                    let ready = artifact.file_source().is_finalized();
                    if artifact.is_resolve_synchronously() || ready {
                        continue;
                    }
                    let artifact = artifact.clone();
                    queue.add(Box::new(move || artifact.file_source().finalize_if_not_already()));
                    scheduled = true;
                }
                scheduled
            }
            Self::Transformed(transformed) => {
                if transformed.is_finalized() {
                    return false;
                }
                let transformed = Arc::clone(transformed);
                queue.add(Box::new(move || transformed.finalize()));
                true
            }
            Self::Broken(_) => false,
        }
    }

    /// Deliver the artifacts, or the failure, to `visitor`
    pub fn visit(&self, visitor: &mut dyn ArtifactVisitor) {
        match self {
            Self::Files(files) => files.deliver(visitor),
            Self::Transformed(transformed) => transformed.deliver(visitor),
            Self::Broken(failure) => visitor.visit_failure(failure),
        }
    }

    /// Failure carried by a broken unit
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<&ResolveError> {
        match self {
            Self::Broken(failure) => Some(failure),
            _ => None,
        }
    }
}
