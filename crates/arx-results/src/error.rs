//! Errors surfaced by the outer resolution API
//!
//! Inside the engine failures are values carried by artifact sets. They
//! only become Rust errors here: collected into one [`ResolveException`],
//! or raised while configuring the engine.

use crate::graph::NodeId;
use arx_artifact::ResolveError;
use arx_resolve::ExecutorError;
use std::path::PathBuf;

/// Every failure collected during one visit, as a single error
#[derive(Debug, Clone, thiserror::Error)]
#[error("could not resolve {context}: {}", summarize(.failures))]
pub struct ResolveException {
    context: String,
    failures: Vec<ResolveError>,
}

impl ResolveException {
    /// Create aggregate for `context`
    #[must_use]
    pub fn new(context: impl Into<String>, failures: Vec<ResolveError>) -> Self {
        Self {
            context: context.into(),
            failures,
        }
    }

    /// What was being resolved
    #[inline]
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Collected failures, in visit order
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }

    /// Take the collected failures
    #[inline]
    #[must_use]
    pub fn into_failures(self) -> Vec<ResolveError> {
        self.failures
    }
}

fn summarize(failures: &[ResolveError]) -> String {
    match failures {
        [] => "no failure recorded".to_string(),
        [only] => only.to_string(),
        many => {
            let mut summary = format!("{} failures", many.len());
            for failure in many {
                summary.push_str("\n  - ");
                summary.push_str(&failure.to_string());
            }
            summary
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("could not read configuration {}: {source}", path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while building a [`ResolvedGraph`](crate::ResolvedGraph)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Edge refers to a node that was never added
    #[error("unknown graph node {0}")]
    UnknownNode(NodeId),
}

/// Errors raised while creating an engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Worker pool could not be created
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}
