//! Build dependency reporting
//!
//! Artifact sets report the tasks that produce their files without
//! resolving anything, so a scheduler can wire task dependencies up front.

use crate::error::ResolveError;
use crate::ids::TaskId;

/// Receiver of build dependencies and dependency-wiring failures
pub trait TaskDependencyResolveContext {
    /// Record a task that must run before the files are available
    fn add(&mut self, task: &TaskId);

    /// Record a failure discovered while computing dependencies
    fn visit_failure(&mut self, failure: &ResolveError);
}

/// Context collecting tasks and failures in visit order
#[derive(Debug, Default, Clone)]
pub struct CollectingTaskDependencies {
    tasks: Vec<TaskId>,
    failures: Vec<ResolveError>,
}

impl CollectingTaskDependencies {
    /// Create empty collector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected tasks, without duplicates, in first-seen order
    #[inline]
    #[must_use]
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// Collected failures
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }

    /// Whether nothing was reported
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.failures.is_empty()
    }
}

impl TaskDependencyResolveContext for CollectingTaskDependencies {
    fn add(&mut self, task: &TaskId) {
        if !self.tasks.contains(task) {
            self.tasks.push(task.clone());
        }
    }

    fn visit_failure(&mut self, failure: &ResolveError) {
        self.failures.push(failure.clone());
    }
}
