//! Lazily resolved artifact file
//!
//! Defines [`ResolvableArtifact`], the single-file unit handed to visitors.

use crate::calculated::CalculatedValue;
use crate::error::ResolveError;
use crate::ids::{ArtifactId, TaskId};
use crate::task::TaskDependencyResolveContext;
use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single artifact whose file may not exist yet
///
/// Cheap to clone; clones share the same memoized file computation, so one
/// artifact identity is materialized at most once no matter how many
/// visits reach it.
#[derive(Clone)]
pub struct ResolvableArtifact {
    inner: Arc<Inner>,
}

struct Inner {
    id: ArtifactId,
    file: CalculatedValue<PathBuf>,
    resolve_synchronously: bool,
    build_dependencies: Vec<TaskId>,
}

impl ResolvableArtifact {
    /// Create artifact whose file is computed on demand
    ///
    /// `resolve_synchronously` marks files that are available without
    /// scheduled work (already on disk or produced by a task of this build).
    #[must_use]
    pub fn lazy<F>(
        id: ArtifactId,
        resolve_synchronously: bool,
        build_dependencies: Vec<TaskId>,
        resolve: F,
    ) -> Self
    where
        F: FnOnce() -> Result<PathBuf, ResolveError> + Send + 'static,
    {
        let display_name = id.to_string();
        Self {
            inner: Arc::new(Inner {
                id,
                file: CalculatedValue::new(display_name, resolve),
                resolve_synchronously,
                build_dependencies,
            }),
        }
    }

    /// Create artifact whose file is already known
    #[must_use]
    pub fn resolved(
        id: ArtifactId,
        file: impl Into<PathBuf>,
        build_dependencies: Vec<TaskId>,
    ) -> Self {
        let display_name = id.to_string();
        Self {
            inner: Arc::new(Inner {
                id,
                file: CalculatedValue::ready(display_name, file.into()),
                resolve_synchronously: true,
                build_dependencies,
            }),
        }
    }

    /// Artifact identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ArtifactId {
        &self.inner.id
    }

    /// Whether the file is available without scheduled work
    #[inline]
    #[must_use]
    pub fn is_resolve_synchronously(&self) -> bool {
        self.inner.resolve_synchronously
    }

    /// Memoized file computation
    #[inline]
    #[must_use]
    pub fn file_source(&self) -> &CalculatedValue<PathBuf> {
        &self.inner.file
    }

    /// Artifact file; blocks until the computation completes
    ///
    /// # Errors
    /// Returns the failure captured while materializing the file
    pub fn file(&self) -> Result<&Path, ResolveError> {
        self.inner.file.get().map(PathBuf::as_path)
    }

    /// Tasks producing this artifact
    #[inline]
    #[must_use]
    pub fn build_dependencies(&self) -> &[TaskId] {
        &self.inner.build_dependencies
    }

    /// Report producing tasks
    pub fn visit_dependencies(&self, context: &mut dyn TaskDependencyResolveContext) {
        for task in &self.inner.build_dependencies {
            context.add(task);
        }
    }

    /// Create the artifact standing for a transform output of this one
    #[must_use]
    pub fn transformed_to(&self, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        let id = ArtifactId::transformed(self.inner.id.clone(), &output);
        Self::resolved(id, output, Vec::new())
    }

    /// Whether both handles share the same underlying artifact
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for ResolvableArtifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvableArtifact")
            .field("id", &self.inner.id)
            .field("resolve_synchronously", &self.inner.resolve_synchronously)
            .field("finalized", &self.inner.file.is_finalized())
            .finish()
    }
}

impl fmt::Display for ResolvableArtifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner.id, f)
    }
}
