//! Attributes, capabilities and the producer attribute schema

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

/// Immutable-by-convention set of named attribute values
///
/// Keys are kept sorted so display and comparison are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeContainer(BTreeMap<String, String>);

impl AttributeContainer {
    /// Create empty container
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute (builder style)
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Add or replace an attribute
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of an attribute
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the attribute is present
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of attributes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the container holds no attributes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate attributes in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attribute names in key order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Concatenate two containers; values in `overrides` win
    #[must_use]
    pub fn concat(&self, overrides: &AttributeContainer) -> Self {
        let mut merged = self.0.clone();
        for (name, value) in &overrides.0 {
            merged.insert(name.clone(), value.clone());
        }
        Self(merged)
    }

    /// Whether every attribute of `other` is present here with the same value
    #[must_use]
    pub fn contains_all(&self, other: &AttributeContainer) -> bool {
        other.iter().all(|(name, value)| self.get(name) == Some(value))
    }
}

impl Display for AttributeContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeContainer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A named, optionally versioned thing provided by a variant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Capability {
    /// Capability group
    pub group: String,
    /// Capability name
    pub name: String,
    /// Capability version
    pub version: Option<String>,
}

impl Capability {
    /// Create capability
    #[inline]
    #[must_use]
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.map(str::to_owned),
        }
    }

    /// Whether `self` satisfies a requested capability (version ignored)
    #[inline]
    #[must_use]
    pub fn matches(&self, requested: &Capability) -> bool {
        self.group == requested.group && self.name == requested.name
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group, self.name, version),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}

/// How a producer matches consumer attribute requests
///
/// A value is compatible when it is equal to the requested one or when the
/// schema declares the `(requested, candidate)` pair compatible. Attributes
/// missing on the candidate are compatible with anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributesSchema {
    compatible: BTreeMap<String, BTreeSet<(String, String)>>,
}

impl AttributesSchema {
    /// Create schema with equality-only matching
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `candidate` satisfies a request for `requested`
    #[must_use]
    pub fn with_compatible(
        mut self,
        attribute: impl Into<String>,
        requested: impl Into<String>,
        candidate: impl Into<String>,
    ) -> Self {
        self.compatible
            .entry(attribute.into())
            .or_default()
            .insert((requested.into(), candidate.into()));
        self
    }

    /// Check a single attribute value
    #[must_use]
    pub fn is_compatible(&self, attribute: &str, requested: &str, candidate: &str) -> bool {
        requested == candidate
            || self.compatible.get(attribute).is_some_and(|pairs| {
                pairs.contains(&(requested.to_owned(), candidate.to_owned()))
            })
    }

    /// Check every requested attribute against a candidate
    #[must_use]
    pub fn matches(&self, candidate: &AttributeContainer, requested: &AttributeContainer) -> bool {
        requested.iter().all(|(name, value)| {
            candidate
                .get(name)
                .map_or(true, |actual| self.is_compatible(name, value, actual))
        })
    }

    /// Whether every requested attribute is present with an equal value
    #[inline]
    #[must_use]
    pub fn matches_exactly(
        &self,
        candidate: &AttributeContainer,
        requested: &AttributeContainer,
    ) -> bool {
        candidate.contains_all(requested)
    }
}
