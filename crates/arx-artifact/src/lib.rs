//! ARX Artifact Primitives
//!
//! Value types shared by the artifact resolution engine.
//!
//! # Core Concepts
//!
//! - [`ComponentId`], [`VariantId`], [`ArtifactId`]: identities produced by graph resolution
//! - [`AttributeContainer`], [`Capability`], [`AttributesSchema`]: variant matching dimensions
//! - [`CalculatedValue<T>`]: compute-once cell shared by concurrent callers
//! - [`ResolvableArtifact`]: one lazily materialized artifact file
//! - [`ResolveError`]: failures captured as values and replayed to visitors
//!
//! # Example
//!
//! ```rust
//! use arx_artifact::{ArtifactId, ArtifactName, ComponentId, ResolvableArtifact};
//! use std::path::{Path, PathBuf};
//!
//! let id = ArtifactId::component(
//!     ComponentId::module("org", "lib", "1.0"),
//!     ArtifactName::new("lib", "jar"),
//! );
//! let artifact = ResolvableArtifact::lazy(id, false, Vec::new(), || {
//!     Ok(PathBuf::from("/cache/lib.jar"))
//! });
//!
//! assert!(!artifact.file_source().is_finalized());
//! assert_eq!(artifact.file().unwrap(), Path::new("/cache/lib.jar"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod attributes;
mod calculated;
mod error;
mod ids;
mod resolvable;
mod task;

pub use attributes::{AttributeContainer, AttributesSchema, Capability};
pub use calculated::CalculatedValue;
pub use error::ResolveError;
pub use ids::{ArtifactId, ArtifactName, ComponentId, TaskId, VariantId};
pub use resolvable::ResolvableArtifact;
pub use task::{CollectingTaskDependencies, TaskDependencyResolveContext};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
