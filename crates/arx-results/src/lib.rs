//! ARX Resolution Results
//!
//! Collects the artifact sets of a resolved dependency graph and exposes
//! them for selection and ordered visiting.
//!
//! # Core Concepts
//!
//! - [`ResolvedGraph`]: nodes, edges and graph failures from dependency resolution
//! - [`ResolvedArtifactsGraphVisitor`]: assigns traversal-scoped ids to artifact sets
//! - [`VisitedArtifactResults`] / [`SelectedArtifactResults`]: per-id selection
//!   composed in sort order
//! - [`SelectedArtifactSet`]: visiting, files and artifacts of one selection
//! - [`ArtifactResolutionEngine`]: configured entry point
//!
//! # Example
//!
//! ```rust
//! use arx_artifact::{ArtifactName, AttributeContainer, ComponentId, VariantId};
//! use arx_results::{
//!     ArtifactResolutionEngine, GraphNode, ResolutionConfig, ResolvedGraph, VisitedArtifactSet,
//! };
//! use arx_select::{
//!     ComponentArtifactMetadata, ComponentArtifactResolver, ComponentMetadata, EdgeOverrides,
//!     GraphVariant, TransformRegistry, VariantInstanceId,
//! };
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct BuildDir;
//!
//! impl ComponentArtifactResolver for BuildDir {
//!     fn resolve_artifact(
//!         &self,
//!         artifact: &ComponentArtifactMetadata,
//!     ) -> std::io::Result<PathBuf> {
//!         Ok(PathBuf::from("/build").join(artifact.name().file_name()))
//!     }
//! }
//!
//! let app = ComponentId::project(":", ":app");
//! let lib = ComponentId::project(":", ":lib");
//! let jar = ComponentArtifactMetadata::new(lib.clone(), ArtifactName::new("lib", "jar"));
//! let runtime = VariantId::new(lib.clone(), "runtime");
//! let runtime = GraphVariant::new(VariantInstanceId(1), runtime, AttributeContainer::new())
//!     .with_artifacts(vec![jar]);
//! let lib = Arc::new(ComponentMetadata::new(lib).with_variant(runtime));
//! let root = VariantId::new(app.clone(), "runtime");
//! let root = GraphVariant::new(VariantInstanceId(0), root, AttributeContainer::new());
//!
//! let app = Arc::new(ComponentMetadata::new(app));
//! let mut graph = ResolvedGraph::new(GraphNode::new(app, Arc::new(root)));
//! let lib_node = graph.add_node(GraphNode::new(Arc::clone(&lib), Arc::clone(&lib.variants[0])));
//! graph.add_edge(graph.root(), lib_node, EdgeOverrides::none()).unwrap();
//!
//! let engine = ArtifactResolutionEngine::new(
//!     ResolutionConfig::new().with_worker_threads(1),
//!     TransformRegistry::new(),
//!     Arc::new(BuildDir),
//! )
//! .unwrap();
//! let files = engine
//!     .resolve(&graph)
//!     .select(&engine.selection_spec(AttributeContainer::new()))
//!     .files()
//!     .unwrap();
//! assert_eq!(files, vec![PathBuf::from("/build/lib.jar")]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod artifact_set;
mod config;
mod engine;
mod error;
mod graph;
mod graph_visitor;
mod visited;

pub use artifact_set::{
    DefaultVisitedArtifactSet, ResolvedArtifactResult, ResolvedFileVisitor, SelectedArtifactSet,
    VisitedArtifactSet, VisitedGraphResults,
};
pub use config::ResolutionConfig;
pub use engine::ArtifactResolutionEngine;
pub use error::{ConfigError, EngineError, GraphError, ResolveException};
pub use graph::{DependencyGraphVisitor, GraphEdge, GraphNode, NodeId, NodeState, ResolvedGraph};
pub use graph_visitor::ResolvedArtifactsGraphVisitor;
pub use visited::{DefaultVisitedArtifactResults, SelectedArtifactResults, VisitedArtifactResults};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
