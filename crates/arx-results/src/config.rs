//! Resolution configuration

use crate::error::ConfigError;
use arx_select::{SortOrder, DEFAULT_MAX_CHAIN_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of an [`ArtifactResolutionEngine`](crate::ArtifactResolutionEngine)
///
/// Missing keys take their default value when loading from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Finalization workers: 0 shares the global pool, 1 runs sequentially
    pub worker_threads: usize,
    /// Replace sets of unresolved components with empty sets
    pub lenient: bool,
    /// Keep visiting after selection failures
    pub continue_on_selection_failure: bool,
    /// Default composition order
    pub sort_order: SortOrder,
    /// Longest transform chain considered
    pub max_transform_chain_length: usize,
}

impl ResolutionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML or the values are invalid
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns error if a value is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_transform_chain_length == 0 {
            return Err(ConfigError::Invalid(
                "max_transform_chain_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// With worker thread count
    #[inline]
    #[must_use]
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    /// With lenient selection
    #[inline]
    #[must_use]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// With continue-on-failure default
    #[inline]
    #[must_use]
    pub fn with_continue_on_selection_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_selection_failure = continue_on_failure;
        self
    }

    /// With default sort order
    #[inline]
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// With transform chain bound
    #[inline]
    #[must_use]
    pub fn with_max_transform_chain_length(mut self, length: usize) -> Self {
        self.max_transform_chain_length = length;
        self
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            lenient: false,
            continue_on_selection_failure: false,
            sort_order: SortOrder::Default,
            max_transform_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}
