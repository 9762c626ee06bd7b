//! Attributes derived from file names

use arx_artifact::{ArtifactName, AttributeContainer};
use std::collections::BTreeMap;
use std::path::Path;

/// Attribute carrying the artifact type of a file
pub const ARTIFACT_TYPE_ATTRIBUTE: &str = "artifactType";

/// Maps file extensions to the attributes of an artifact type
#[derive(Debug, Clone, Default)]
pub struct ArtifactTypeRegistry {
    types: BTreeMap<String, AttributeContainer>,
}

impl ArtifactTypeRegistry {
    /// Create registry with no registered types
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register attributes for files with `extension`
    #[must_use]
    pub fn with_type(
        mut self,
        extension: impl Into<String>,
        attributes: AttributeContainer,
    ) -> Self {
        self.types.insert(extension.into(), attributes);
        self
    }

    /// Attributes for an opaque file
    ///
    /// Always carries [`ARTIFACT_TYPE_ATTRIBUTE`] set to the extension (empty
    /// when there is none), plus any attributes registered for it.
    #[must_use]
    pub fn map_attributes_for(&self, file: &Path) -> AttributeContainer {
        let extension = file
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.attributes_for_extension(&extension)
    }

    /// Attributes for a declared artifact, based on its type
    #[must_use]
    pub fn map_attributes_for_name(&self, artifact: &ArtifactName) -> AttributeContainer {
        self.attributes_for_extension(&artifact.kind)
    }

    fn attributes_for_extension(&self, extension: &str) -> AttributeContainer {
        let base = AttributeContainer::new().with(ARTIFACT_TYPE_ATTRIBUTE, extension);
        match self.types.get(extension) {
            Some(registered) => base.concat(registered),
            None => base,
        }
    }
}
