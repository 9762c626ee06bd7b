use arx_artifact::{ArtifactName, AttributeContainer};
use arx_resolve::{OperationExecutor, ParallelResolveArtifactSet, ResolvedArtifactSet};
use arx_results::{
    ArtifactResolutionEngine, GraphNode, ResolutionConfig, ResolvedGraph, VisitedArtifactSet,
};
use arx_select::{EdgeOverrides, TransformRegistry};
use arx_test_utils::{
    component, counting_artifact, jar, module, project, variant, RecordingArtifactVisitor,
    StubComponentArtifactResolver,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

fn counted_set(count: usize, counter: &Arc<AtomicUsize>) -> (ResolvedArtifactSet, Vec<String>) {
    let names: Vec<String> = (0..count).map(|index| format!("lib-{index}.jar")).collect();
    let set = names
        .iter()
        .map(|name| {
            let artifact = counting_artifact(&format!("/repo/{name}"), Arc::clone(counter));
            ResolvedArtifactSet::single(variant(name), artifact)
        })
        .collect();
    (set, names)
}

#[test]
fn test_concurrent_file_calls_compute_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let artifact = counting_artifact("/repo/lib.jar", Arc::clone(&counter));
    let barrier = Barrier::new(2);

    let files: Vec<PathBuf> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    artifact.file().map(Path::to_path_buf).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(files, vec![PathBuf::from("/repo/lib.jar"); 2]);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_parallel_visit_keeps_order_and_resolves_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (set, mut expected) = counted_set(32, &counter);
    let with_repeat = ResolvedArtifactSet::composite([set.clone(), set]);
    expected.extend(expected.clone());

    let executor = OperationExecutor::with_threads(4).unwrap();
    let mut visitor = RecordingArtifactVisitor::new();
    ParallelResolveArtifactSet::wrap(&with_repeat, &executor).visit(&mut visitor);

    assert_eq!(visitor.artifact_names(), expected);
    assert_eq!(counter.load(Ordering::SeqCst), 32);
}

#[test]
fn test_visitor_without_files_resolves_nothing() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (set, expected) = counted_set(4, &counter);

    let executor = OperationExecutor::with_threads(2).unwrap();
    let mut visitor = RecordingArtifactVisitor::without_files();
    ParallelResolveArtifactSet::wrap(&set, &executor).visit(&mut visitor);

    assert_eq!(visitor.artifact_names(), expected);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_artifact_reached_through_two_edges_is_resolved_once() {
    let app = component(project(":app"), 0, AttributeContainer::new(), Vec::new());
    let tools_id = module("org", "tools", "1.0");
    let tools = component(tools_id, 1, AttributeContainer::new(), Vec::new());
    let lib_id = module("org", "lib", "1.0");
    let lib = component(lib_id.clone(), 2, AttributeContainer::new(), vec![jar(&lib_id, "lib")]);

    let mut graph =
        ResolvedGraph::new(GraphNode::new(Arc::clone(&app), Arc::clone(&app.variants[0])));
    let tools_node =
        graph.add_node(GraphNode::new(Arc::clone(&tools), Arc::clone(&tools.variants[0])));
    let lib_node = graph.add_node(GraphNode::new(Arc::clone(&lib), Arc::clone(&lib.variants[0])));
    graph.add_edge(graph.root(), tools_node, EdgeOverrides::none()).unwrap();
    graph.add_edge(graph.root(), lib_node, EdgeOverrides::none()).unwrap();
    let explicit = EdgeOverrides {
        artifacts: vec![ArtifactName::new("lib", "jar")],
        ..EdgeOverrides::none()
    };
    graph.add_edge(tools_node, lib_node, explicit).unwrap();

    let repository = Arc::new(StubComponentArtifactResolver::new());
    let engine = ArtifactResolutionEngine::new(
        ResolutionConfig::new().with_worker_threads(4),
        TransformRegistry::new(),
        Arc::clone(&repository) as _,
    )
    .unwrap();
    let selected = engine.resolve(&graph).select(&engine.selection_spec(AttributeContainer::new()));

    let mut visitor = RecordingArtifactVisitor::new();
    selected.visit_artifacts(&mut visitor, false);
    assert_eq!(visitor.artifact_names(), vec!["lib.jar", "lib.jar"]);
    assert_eq!(repository.calls_for("lib.jar"), 1);
    assert_eq!(selected.files().unwrap(), vec![PathBuf::from("/repo/lib.jar")]);
}

proptest! {
    #[test]
    fn prop_parallel_delivery_matches_sequential(count in 1..24usize, threads in 2..6usize) {
        let sequential_counter = Arc::new(AtomicUsize::new(0));
        let (sequential_set, _) = counted_set(count, &sequential_counter);
        let mut sequential = RecordingArtifactVisitor::new();
        ParallelResolveArtifactSet::wrap(&sequential_set, &OperationExecutor::sequential())
            .visit(&mut sequential);

        let parallel_counter = Arc::new(AtomicUsize::new(0));
        let (parallel_set, _) = counted_set(count, &parallel_counter);
        let mut parallel = RecordingArtifactVisitor::new();
        let executor = OperationExecutor::with_threads(threads).unwrap();
        ParallelResolveArtifactSet::wrap(&parallel_set, &executor).visit(&mut parallel);

        prop_assert_eq!(sequential.events, parallel.events);
        prop_assert_eq!(parallel_counter.load(Ordering::SeqCst), count);
    }
}
