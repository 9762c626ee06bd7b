//! Testing utilities for ARX workspace
//!
//! Shared fixtures, recording visitors and resolver doubles.

#![allow(missing_docs)]

use arx_artifact::{
    ArtifactId, ArtifactName, AttributeContainer, ComponentId, ResolvableArtifact, ResolveError,
    TaskId, VariantId,
};
use arx_resolve::{
    ArtifactSource, ArtifactVisitor, ResolvedArtifactSet, VariantDescriptor, VisitType,
};
use arx_select::{
    ComponentArtifactMetadata, ComponentArtifactResolver, ComponentMetadata, FileCollection,
    GraphVariant, VariantInstanceId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitEvent {
    Prepared(ArtifactSource),
    Artifact { variant: String, name: String },
    Failure(String),
    End(ArtifactSource),
}

/// Artifact visitor recording every callback
#[derive(Debug)]
pub struct RecordingArtifactVisitor {
    pub events: Vec<VisitEvent>,
    requires_files: bool,
    skipped: HashSet<ArtifactSource>,
}

impl Default for RecordingArtifactVisitor {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            requires_files: true,
            skipped: HashSet::new(),
        }
    }
}

impl RecordingArtifactVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_files() -> Self {
        Self {
            requires_files: false,
            ..Self::default()
        }
    }

    pub fn skipping(mut self, source: ArtifactSource) -> Self {
        self.skipped.insert(source);
        self
    }

    /// File names of delivered artifacts, in delivery order
    pub fn artifact_names(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                VisitEvent::Artifact { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                VisitEvent::Failure(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ArtifactVisitor for RecordingArtifactVisitor {
    fn prepare_for_visit(&mut self, source: &ArtifactSource) -> VisitType {
        self.events.push(VisitEvent::Prepared(source.clone()));
        if self.skipped.contains(source) {
            VisitType::NoContents
        } else {
            VisitType::Visit
        }
    }

    fn requires_files(&self) -> bool {
        self.requires_files
    }

    fn visit_artifact(&mut self, variant: &VariantDescriptor, artifact: &ResolvableArtifact) {
        self.events.push(VisitEvent::Artifact {
            variant: variant.display_name().to_string(),
            name: artifact.id().file_name(),
        });
    }

    fn visit_failure(&mut self, failure: &ResolveError) {
        self.events.push(VisitEvent::Failure(failure.to_string()));
    }

    fn end_visit_collection(&mut self, source: &ArtifactSource) {
        self.events.push(VisitEvent::End(source.clone()));
    }
}

/// Repository double resolving artifacts to `/repo/<file name>`
#[derive(Debug, Default)]
pub struct StubComponentArtifactResolver {
    calls: Mutex<HashMap<String, usize>>,
    missing: HashSet<String>,
}

impl StubComponentArtifactResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail resolution of artifacts with `file_name`
    pub fn missing(mut self, file_name: &str) -> Self {
        self.missing.insert(file_name.to_string());
        self
    }

    pub fn calls_for(&self, file_name: &str) -> usize {
        self.calls.lock().get(file_name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

impl ComponentArtifactResolver for StubComponentArtifactResolver {
    fn resolve_artifact(&self, artifact: &ComponentArtifactMetadata) -> io::Result<PathBuf> {
        let file_name = artifact.name().file_name();
        *self.calls.lock().entry(file_name.clone()).or_insert(0) += 1;
        if self.missing.contains(&file_name) {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("{file_name} not found")));
        }
        Ok(PathBuf::from("/repo").join(file_name))
    }
}

/// File collection whose listing always fails
#[derive(Debug)]
pub struct FailingFileCollection {
    name: String,
    listings: AtomicUsize,
}

impl FailingFileCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            listings: AtomicUsize::new(0),
        }
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

impl FileCollection for FailingFileCollection {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn files(&self) -> io::Result<Vec<PathBuf>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::other(format!("{} is not built", self.name)))
    }
}

pub fn project(path: &str) -> ComponentId {
    ComponentId::project(":", path)
}

pub fn module(group: &str, name: &str, version: &str) -> ComponentId {
    ComponentId::module(group, name, version)
}

pub fn jar(component: &ComponentId, name: &str) -> ComponentArtifactMetadata {
    ComponentArtifactMetadata::new(component.clone(), ArtifactName::new(name, "jar"))
}

pub fn attributes(pairs: &[(&str, &str)]) -> AttributeContainer {
    pairs.iter().copied().collect()
}

/// Component with a single variant named `runtime` holding `artifacts`
pub fn component(
    id: ComponentId,
    instance: u64,
    attributes: AttributeContainer,
    artifacts: Vec<ComponentArtifactMetadata>,
) -> Arc<ComponentMetadata> {
    let variant = GraphVariant::new(
        VariantInstanceId(instance),
        VariantId::new(id.clone(), "runtime"),
        attributes,
    )
    .with_artifacts(artifacts);
    Arc::new(ComponentMetadata::new(id).with_variant(variant))
}

pub fn variant(name: &str) -> Arc<VariantDescriptor> {
    Arc::new(VariantDescriptor::new(name, AttributeContainer::new()))
}

/// Artifact whose file is already known
pub fn resolved_file(path: &str) -> ResolvableArtifact {
    ResolvableArtifact::resolved(ArtifactId::file(None, path), path, Vec::new())
}

/// Single-artifact set for a file that is already known
pub fn file_set(path: &str) -> ResolvedArtifactSet {
    ResolvedArtifactSet::single(variant(path), resolved_file(path))
}

/// Scheduled artifact counting how often its file is computed
pub fn counting_artifact(path: &str, counter: Arc<AtomicUsize>) -> ResolvableArtifact {
    let file = PathBuf::from(path);
    ResolvableArtifact::lazy(
        ArtifactId::file(None, path),
        false,
        vec![TaskId::new(format!("produce {path}"))],
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(file)
        },
    )
}

/// Scheduled artifact whose resolution fails
pub fn missing_artifact(path: &str) -> ResolvableArtifact {
    let id = ArtifactId::file(None, path);
    let failure_id = id.clone();
    ResolvableArtifact::lazy(id, false, Vec::new(), move || {
        Err(ResolveError::artifact(
            failure_id,
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        ))
    })
}
