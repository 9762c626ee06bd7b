//! Selection criteria for one consumption of a resolved graph

use arx_artifact::{AttributeContainer, ComponentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Order in which node artifacts are composed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Traversal order
    #[default]
    Default,

    /// Consumers before their dependencies (traversal order)
    ConsumerFirst,

    /// Dependencies before their consumers (reversed traversal order)
    DependencyFirst,
}

impl SortOrder {
    /// Whether composition reverses traversal order
    #[inline]
    #[must_use]
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::DependencyFirst)
    }
}

/// How variants are reselected when selecting from all graph variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReselectionPolicy {
    /// Select one variant among those providing the requested capabilities
    #[default]
    HonorCapabilities,

    /// Select one variant per distinct capability set and union the results
    AllCapabilities,
}

type ComponentPredicate = dyn Fn(Option<&ComponentId>) -> bool + Send + Sync;

/// Filter on the component owning an artifact set
///
/// Sets without a component (plain local files) are offered `None`.
#[derive(Clone, Default)]
pub enum ComponentFilter {
    /// Accept every component
    #[default]
    All,

    /// Accept components for which the predicate holds
    Custom(Arc<ComponentPredicate>),
}

impl ComponentFilter {
    /// Filter from a predicate
    #[must_use]
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(Option<&ComponentId>) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Accept only project components
    #[must_use]
    pub fn projects_only() -> Self {
        Self::custom(|component| component.is_some_and(ComponentId::is_project))
    }

    /// Whether `component` passes the filter
    #[must_use]
    pub fn accepts(&self, component: Option<&ComponentId>) -> bool {
        match self {
            Self::All => true,
            Self::Custom(predicate) => predicate(component),
        }
    }
}

impl fmt::Debug for ComponentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ComponentFilter::All"),
            Self::Custom(_) => f.write_str("ComponentFilter::Custom"),
        }
    }
}

/// What a consumer asks from the resolved graph
#[derive(Debug, Clone, Default)]
pub struct ArtifactSelectionSpec {
    /// Attributes requested by the consumer
    pub request_attributes: AttributeContainer,
    /// Components to include
    pub component_filter: ComponentFilter,
    /// Reselect among all graph variants instead of the one picked by graph resolution
    pub select_from_all_variants: bool,
    /// Reselection policy, used with `select_from_all_variants`
    pub reselection: ReselectionPolicy,
    /// Whether sets with no matching variant become empty instead of failed
    pub allow_no_matching_variants: bool,
    /// Composition order
    pub sort_order: SortOrder,
}

impl ArtifactSelectionSpec {
    /// Spec requesting `attributes`, with every other option at its default
    #[inline]
    #[must_use]
    pub fn new(request_attributes: AttributeContainer) -> Self {
        Self {
            request_attributes,
            ..Self::default()
        }
    }

    /// Set component filter
    #[must_use]
    pub fn with_component_filter(mut self, filter: ComponentFilter) -> Self {
        self.component_filter = filter;
        self
    }

    /// Reselect among all graph variants
    #[must_use]
    pub fn with_select_from_all_variants(mut self, reselection: ReselectionPolicy) -> Self {
        self.select_from_all_variants = true;
        self.reselection = reselection;
        self
    }

    /// Set whether no match yields an empty set
    #[must_use]
    pub fn with_allow_no_matching_variants(mut self, allow: bool) -> Self {
        self.allow_no_matching_variants = allow;
        self
    }

    /// Set composition order
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_only_filter() {
        let filter = ComponentFilter::projects_only();
        assert!(filter.accepts(Some(&ComponentId::project(":", ":lib"))));
        assert!(!filter.accepts(Some(&ComponentId::module("org", "lib", "1.0"))));
        assert!(!filter.accepts(None));
        assert!(ComponentFilter::All.accepts(None));
    }

    #[test]
    fn sort_order_serializes_snake_case() {
        let json = serde_json::to_string(&SortOrder::DependencyFirst).unwrap();
        assert_eq!(json, "\"dependency_first\"");
        assert!(SortOrder::DependencyFirst.is_reversed());
        assert!(!SortOrder::ConsumerFirst.is_reversed());
    }

    #[test]
    fn builder_sets_reselection() {
        let spec = ArtifactSelectionSpec::new(AttributeContainer::new().with("usage", "runtime"))
            .with_select_from_all_variants(ReselectionPolicy::AllCapabilities)
            .with_sort_order(SortOrder::DependencyFirst);
        assert!(spec.select_from_all_variants);
        assert_eq!(spec.reselection, ReselectionPolicy::AllCapabilities);
        assert_eq!(spec.sort_order, SortOrder::DependencyFirst);
        assert!(!spec.allow_no_matching_variants);
    }
}
