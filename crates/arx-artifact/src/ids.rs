//! Identity primitives
//!
//! Provides the opaque identities handed over by graph resolution:
//! [`ComponentId`], [`VariantId`], [`ArtifactName`], [`ArtifactId`] and
//! [`TaskId`]. All are immutable value types used as equality keys.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Identity of a resolved component
///
/// Project components are built locally within the build tree; module
/// components come from a repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentId {
    /// Component produced by a project of the build tree
    Project {
        /// Build the project belongs to
        build: String,
        /// Project path within the build (e.g. `:lib`)
        path: String,
    },

    /// Component published to a repository
    Module {
        /// Group coordinate
        group: String,
        /// Module name
        name: String,
        /// Resolved version
        version: String,
    },
}

impl ComponentId {
    /// Create project component identity
    #[inline]
    #[must_use]
    pub fn project(build: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Project {
            build: build.into(),
            path: path.into(),
        }
    }

    /// Create module component identity
    #[inline]
    #[must_use]
    pub fn module(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::Module {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Whether this component is built inside the build tree
    #[inline]
    #[must_use]
    pub fn is_project(&self) -> bool {
        matches!(self, Self::Project { .. })
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project { build, path } if build == ":" => write!(f, "project {path}"),
            Self::Project { build, path } => write!(f, "project {build}{path}"),
            Self::Module {
                group,
                name,
                version,
            } => write!(f, "{group}:{name}:{version}"),
        }
    }
}

/// Identity of one variant of a component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantId {
    component: ComponentId,
    name: String,
}

impl VariantId {
    /// Create variant identity
    #[inline]
    #[must_use]
    pub fn new(component: ComponentId, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
        }
    }

    /// Owning component
    #[inline]
    #[must_use]
    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    /// Variant name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for VariantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} variant {}", self.component, self.name)
    }
}

/// Name of an artifact file within a component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactName {
    /// Base name
    pub name: String,
    /// Artifact type (usually equal to the extension)
    pub kind: String,
    /// File extension, if any
    pub extension: Option<String>,
    /// Classifier, if any
    pub classifier: Option<String>,
}

impl ArtifactName {
    /// Create artifact name with type and extension both set to `extension`
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            name: name.into(),
            kind: extension.clone(),
            extension: Some(extension),
            classifier: None,
        }
    }

    /// Set classifier
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// File name as it appears on disk (`name-classifier.ext`)
    #[must_use]
    pub fn file_name(&self) -> String {
        let mut file_name = self.name.clone();
        if let Some(classifier) = &self.classifier {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        if let Some(extension) = &self.extension {
            file_name.push('.');
            file_name.push_str(extension);
        }
        file_name
    }
}

impl Display for ArtifactName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Identity of one artifact file
///
/// Used as the deduplication key by visitors that need unique artifacts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactId {
    /// Artifact declared by a component
    Component {
        /// Owning component
        component: ComponentId,
        /// Declared name
        name: ArtifactName,
    },

    /// Plain file with no component metadata (local file dependency)
    File {
        /// Owning component, when the file collection declares one
        component: Option<ComponentId>,
        /// Location of the file
        path: PathBuf,
    },

    /// Output of a transform chain applied to another artifact
    Transformed {
        /// Artifact the chain was applied to
        source: Box<ArtifactId>,
        /// File name of the produced output
        file_name: String,
    },
}

impl ArtifactId {
    /// Create component artifact identity
    #[inline]
    #[must_use]
    pub fn component(component: ComponentId, name: ArtifactName) -> Self {
        Self::Component { component, name }
    }

    /// Create opaque file identity
    #[inline]
    #[must_use]
    pub fn file(component: Option<ComponentId>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            component,
            path: path.into(),
        }
    }

    /// Create identity for a transform output
    #[must_use]
    pub fn transformed(source: ArtifactId, output: &Path) -> Self {
        let file_name = output
            .file_name()
            .map_or_else(|| output.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::Transformed {
            source: Box::new(source),
            file_name,
        }
    }

    /// Component this artifact belongs to, if known
    #[must_use]
    pub fn component_id(&self) -> Option<&ComponentId> {
        match self {
            Self::Component { component, .. } => Some(component),
            Self::File { component, .. } => component.as_ref(),
            Self::Transformed { source, .. } => source.component_id(),
        }
    }

    /// File name shown to users
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Component { name, .. } => name.file_name(),
            Self::File { path, .. } => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            Self::Transformed { file_name, .. } => file_name.clone(),
        }
    }
}

impl Display for ArtifactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component { component, name } => write!(f, "{name} ({component})"),
            Self::File { path, .. } => write!(f, "{}", path.display()),
            Self::Transformed { source, file_name } => {
                write!(f, "{file_name} (transformed from {source})")
            }
        }
    }
}

/// Identity of a task producing files
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create task identity from its path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
