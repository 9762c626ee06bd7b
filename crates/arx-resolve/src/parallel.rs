//! Parallel finalization with ordered delivery
//!
//! Visiting runs in three steps:
//! 1. Walk the set on the caller's thread, collecting leaf units in order
//!    and enqueueing their finalization work
//! 2. Wait for the executor to complete all queued work, in any order
//! 3. Deliver every unit to the artifact visitor in collection order

use crate::artifacts::Artifacts;
use crate::queue::{OperationExecutor, OperationQueue};
use crate::set::ResolvedArtifactSet;
use crate::visitor::{ArtifactSource, ArtifactVisitor, VisitType, Visitor};

/// Resolved artifact set visited with concurrent finalization
#[derive(Debug)]
pub struct ParallelResolveArtifactSet<'a> {
    artifacts: &'a ResolvedArtifactSet,
    executor: &'a OperationExecutor,
}

impl<'a> ParallelResolveArtifactSet<'a> {
    /// Wrap `artifacts` for visiting through `executor`
    #[inline]
    #[must_use]
    pub fn wrap(artifacts: &'a ResolvedArtifactSet, executor: &'a OperationExecutor) -> Self {
        Self { artifacts, executor }
    }

    /// Finalize all leaves, then deliver them in order
    pub fn visit(&self, visitor: &mut dyn ArtifactVisitor) {
        if self.artifacts.is_empty() {
            return;
        }

        let requires_files = visitor.requires_files();
        let (units, scheduled) = self.executor.run_all(|queue| {
            let mut collector = FinalizingCollector {
                visitor: &mut *visitor,
                queue,
                requires_files,
                units: Vec::new(),
                scheduled: 0,
            };
            self.artifacts.visit(&mut collector);
            (collector.units, collector.scheduled)
        });

        tracing::debug!(
            units = units.len(),
            scheduled,
            parallel = self.executor.is_parallel(),
            "finalized artifact sets"
        );

        for unit in &units {
            unit.visit(visitor);
        }
    }
}

struct FinalizingCollector<'v, 'q> {
    visitor: &'v mut dyn ArtifactVisitor,
    queue: &'q dyn OperationQueue,
    requires_files: bool,
    units: Vec<Artifacts>,
    scheduled: usize,
}

impl Visitor for FinalizingCollector<'_, '_> {
    fn prepare_for_visit(&mut self, source: &ArtifactSource) -> VisitType {
        self.visitor.prepare_for_visit(source)
    }

    fn visit_artifacts(&mut self, artifacts: Artifacts) {
        if artifacts.start_finalization(self.queue, self.requires_files) {
            self.scheduled += 1;
        }
        self.units.push(artifacts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::VariantDescriptor;
    use arx_artifact::{
        ArtifactId, ArtifactName, AttributeContainer, ComponentId, ResolvableArtifact, ResolveError,
    };
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        metadata_only: bool,
        skip: Option<ComponentId>,
    }

    impl ArtifactVisitor for Recorder {
        fn prepare_for_visit(&mut self, source: &ArtifactSource) -> VisitType {
            match (&self.skip, source) {
                (Some(skip), ArtifactSource::Component(component)) if skip == component => {
                    VisitType::NoContents
                }
                _ => VisitType::Visit,
            }
        }

        fn requires_files(&self) -> bool {
            !self.metadata_only
        }

        fn visit_artifact(&mut self, _variant: &VariantDescriptor, artifact: &ResolvableArtifact) {
            self.events.push(artifact.id().file_name());
        }

        fn visit_failure(&mut self, failure: &ResolveError) {
            self.events.push(format!("failure: {failure}"));
        }
    }

    fn slow_leaf(name: &str, delay_ms: u64, calls: &Arc<AtomicUsize>) -> ResolvedArtifactSet {
        let component = ComponentId::module("org", name, "1.0");
        let id = ArtifactId::component(component.clone(), ArtifactName::new(name, "jar"));
        let counter = Arc::clone(calls);
        let path = PathBuf::from(format!("/cache/{name}.jar"));
        let artifact = ResolvableArtifact::lazy(id, false, Vec::new(), move || {
            std::thread::sleep(Duration::from_millis(delay_ms));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(path)
        });
        let variant = Arc::new(
            VariantDescriptor::new("runtime", AttributeContainer::new()).with_component(component),
        );
        ResolvedArtifactSet::single(variant, artifact)
    }

    #[test]
    fn delivery_order_ignores_completion_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let set = ResolvedArtifactSet::composite(vec![
            slow_leaf("a", 40, &calls),
            slow_leaf("b", 0, &calls),
            slow_leaf("c", 20, &calls),
        ]);
        let executor = OperationExecutor::with_threads(3).unwrap();
        let mut recorder = Recorder::default();

        ParallelResolveArtifactSet::wrap(&set, &executor).visit(&mut recorder);

        assert_eq!(recorder.events, vec!["a.jar", "b.jar", "c.jar"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn metadata_only_visit_skips_file_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let leaves = vec![slow_leaf("a", 0, &calls), slow_leaf("b", 0, &calls)];
        let set = ResolvedArtifactSet::composite(leaves);
        let executor = OperationExecutor::shared_pool();
        let mut recorder = Recorder {
            metadata_only: true,
            ..Recorder::default()
        };

        ParallelResolveArtifactSet::wrap(&set, &executor).visit(&mut recorder);

        assert_eq!(recorder.events, vec!["a.jar", "b.jar"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn skipped_sources_are_never_resolved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let leaves = vec![slow_leaf("a", 0, &calls), slow_leaf("b", 0, &calls)];
        let set = ResolvedArtifactSet::composite(leaves);
        let executor = OperationExecutor::sequential();
        let mut recorder = Recorder {
            skip: Some(ComponentId::module("org", "a", "1.0")),
            ..Recorder::default()
        };

        ParallelResolveArtifactSet::wrap(&set, &executor).visit(&mut recorder);

        assert_eq!(recorder.events, vec!["b.jar"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failures_keep_their_position() {
        let calls = Arc::new(AtomicUsize::new(0));
        let set = ResolvedArtifactSet::composite(vec![
            ResolvedArtifactSet::failed(ResolveError::Graph("first".to_string())),
            slow_leaf("a", 5, &calls),
            ResolvedArtifactSet::failed(ResolveError::Graph("last".to_string())),
        ]);
        let executor = OperationExecutor::shared_pool();
        let mut recorder = Recorder::default();

        ParallelResolveArtifactSet::wrap(&set, &executor).visit(&mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "failure: dependency graph failure: first",
                "a.jar",
                "failure: dependency graph failure: last",
            ]
        );
    }

    #[test]
    fn empty_set_visits_nothing() {
        let executor = OperationExecutor::sequential();
        let mut recorder = Recorder::default();
        ParallelResolveArtifactSet::wrap(&ResolvedArtifactSet::EMPTY, &executor)
            .visit(&mut recorder);
        assert!(recorder.events.is_empty());
    }
}
