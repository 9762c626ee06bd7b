//! Registered transforms and chain discovery

use crate::matching::AttributeMatcher;
use arx_artifact::{AttributeContainer, AttributesSchema};
use arx_resolve::{TransformChain, TransformStep};
use std::fmt;
use std::sync::Arc;

/// Default bound on the number of steps in a discovered chain
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 3;

/// A step converting variants matching `from` into variants with `to` applied
#[derive(Debug, Clone)]
pub struct TransformRegistration {
    from: AttributeContainer,
    to: AttributeContainer,
    step: Arc<dyn TransformStep>,
}

impl TransformRegistration {
    /// Create registration
    #[must_use]
    pub fn new(
        from: AttributeContainer,
        to: AttributeContainer,
        step: Arc<dyn TransformStep>,
    ) -> Self {
        Self { from, to, step }
    }

    /// Attributes a source variant must match
    #[inline]
    #[must_use]
    pub fn from(&self) -> &AttributeContainer {
        &self.from
    }

    /// Attributes set on the produced variant
    #[inline]
    #[must_use]
    pub fn to(&self) -> &AttributeContainer {
        &self.to
    }
}

/// A chain able to turn a source variant into the requested one
#[derive(Debug, Clone)]
pub struct CandidateChain {
    /// Attributes of the produced variant
    pub attributes: AttributeContainer,
    /// Steps to apply
    pub chain: TransformChain,
}

/// Transforms known to the build, searched breadth-first
#[derive(Clone)]
pub struct TransformRegistry {
    registrations: Vec<TransformRegistration>,
    max_chain_length: usize,
}

impl TransformRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }

    /// Set the longest chain considered
    #[must_use]
    pub fn with_max_chain_length(mut self, max_chain_length: usize) -> Self {
        self.max_chain_length = max_chain_length;
        self
    }

    /// Register a transform (builder style)
    #[must_use]
    pub fn with(mut self, registration: TransformRegistration) -> Self {
        self.register(registration);
        self
    }

    /// Register a transform
    pub fn register(&mut self, registration: TransformRegistration) {
        self.registrations.push(registration);
    }

    /// Number of registered transforms
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no transform is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Longest chain considered
    #[inline]
    #[must_use]
    pub fn max_chain_length(&self) -> usize {
        self.max_chain_length
    }

    /// Shortest chains turning `source` into a variant matching `requested`
    ///
    /// All returned chains have the same length. An empty result means no
    /// chain of at most [`max_chain_length`](Self::max_chain_length) steps exists.
    #[must_use]
    pub fn find_chains(
        &self,
        schema: &AttributesSchema,
        source: &AttributeContainer,
        requested: &AttributeContainer,
    ) -> Vec<CandidateChain> {
        let matcher = AttributeMatcher::new(schema);
        let mut frontier: Vec<(AttributeContainer, Vec<Arc<dyn TransformStep>>)> =
            vec![(source.clone(), Vec::new())];

        for _ in 0..self.max_chain_length {
            let mut next = Vec::new();
            let mut found = Vec::new();
            for (attributes, steps) in &frontier {
                for registration in &self.registrations {
                    if !matcher.is_match(attributes, &registration.from) {
                        continue;
                    }
                    let produced = attributes.concat(&registration.to);
                    if produced == *attributes {
                        continue;
                    }
                    let mut chain = steps.clone();
                    chain.push(Arc::clone(&registration.step));
                    if matcher.is_match(&produced, requested) {
                        found.push(CandidateChain {
                            attributes: produced,
                            chain: TransformChain::new(chain),
                        });
                    } else {
                        next.push((produced, chain));
                    }
                }
            }
            if !found.is_empty() {
                return found;
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        Vec::new()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("registrations", &self.registrations.len())
            .field("max_chain_length", &self.max_chain_length)
            .finish()
    }
}
