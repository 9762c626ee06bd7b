//! ARX Artifact Selection
//!
//! Turns graph metadata into [`ResolvedArtifactSet`](arx_resolve::ResolvedArtifactSet)s
//! for a consumer request.
//!
//! # Core Concepts
//!
//! - [`ArtifactSet`]: per-node provider, built eagerly, selected lazily
//! - [`VariantResolvingArtifactSet`]: graph-variant backed set with memoized own variants
//! - [`FileDependencyArtifactSet`]: local files, selected when first visited
//! - [`ArtifactVariantSelector`]: attribute matching with transform-chain fallback
//! - [`VariantArtifactSetCache`]: implicit sets shared across edges (projects only)
//!
//! # Example
//!
//! ```rust
//! use arx_artifact::{AttributeContainer, ComponentId};
//! use arx_select::{
//!     ArtifactSelectionServices, ArtifactSelectionSpec, ArtifactSet, FileDependencyArtifactSet,
//!     FixedFileCollection, LocalFileDependencyMetadata,
//! };
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let files = FixedFileCollection::new("libs", vec![PathBuf::from("/libs/a.jar")]);
//! let metadata = LocalFileDependencyMetadata::new(None, Arc::new(files));
//! let set = FileDependencyArtifactSet::new(metadata);
//!
//! let spec = ArtifactSelectionSpec::new(AttributeContainer::new().with("artifactType", "jar"));
//! let selected = set.select(&ArtifactSelectionServices::default(), &spec);
//! assert!(!selected.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod artifact_set;
mod artifact_type;
mod cache;
mod file_collection;
mod local_files;
mod matching;
mod metadata;
mod resolver;
mod selector;
mod services;
mod spec;
mod transform_registry;
mod variant;

pub use artifact_set::{
    ArtifactSet, FixedArtifactSet, UnavailableArtifactSet, VariantResolvingArtifactSet,
};
pub use artifact_type::{ArtifactTypeRegistry, ARTIFACT_TYPE_ATTRIBUTE};
pub use cache::VariantArtifactSetCache;
pub use file_collection::{DirectoryFileCollection, FileCollection, FixedFileCollection};
pub use local_files::{
    FileDependencyArtifactSet, LocalFileDependencyBackedArtifactSet, LocalFileDependencyMetadata,
};
pub use matching::AttributeMatcher;
pub use metadata::{
    ArtifactExclusion, ComponentArtifactMetadata, ComponentMetadata, EdgeOverrides, GraphVariant,
    VariantArtifactsMetadata, VariantInstanceId, VariantInstanceIdFactory,
};
pub use resolver::{
    ComponentArtifactResolver, DefaultVariantArtifactResolver, VariantArtifactResolver,
};
pub use selector::{
    ArtifactVariantSelector, AttributeMatchingVariantSelector, DefaultTransformedVariantFactory,
    TransformedVariantFactory,
};
pub use services::ArtifactSelectionServices;
pub use spec::{ArtifactSelectionSpec, ComponentFilter, ReselectionPolicy, SortOrder};
pub use transform_registry::{
    CandidateChain, TransformRegistration, TransformRegistry, DEFAULT_MAX_CHAIN_LENGTH,
};
pub use variant::{ResolvedVariant, ResolvedVariantSet};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
