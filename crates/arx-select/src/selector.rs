//! Variant selection
//!
//! [`ArtifactVariantSelector`] picks one variant out of a
//! [`ResolvedVariantSet`], applying a transform chain when no variant
//! matches directly. Failures come back as failed sets, never as errors.

use crate::matching::AttributeMatcher;
use crate::transform_registry::{CandidateChain, TransformRegistry};
use crate::variant::{ResolvedVariant, ResolvedVariantSet};
use arx_artifact::{AttributeContainer, ResolveError, VariantId};
use arx_resolve::{ResolvedArtifactSet, TransformChain, TransformedArtifactSet, VariantDescriptor};
use dashmap::DashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Builds the set standing for a variant seen through a transform chain
pub trait TransformedVariantFactory: Send + Sync + Debug {
    /// Transformed set producing `target` attributes from `source`
    fn transformed(
        &self,
        source: &ResolvedVariant,
        target: AttributeContainer,
        chain: TransformChain,
    ) -> ResolvedArtifactSet;
}

/// Factory sharing transformed sets of identified variants
///
/// Two selections transforming the same variant to the same attributes get
/// the same set, so each source artifact is transformed once.
#[derive(Debug, Default)]
pub struct DefaultTransformedVariantFactory {
    shared: DashMap<(VariantId, AttributeContainer), ResolvedArtifactSet>,
}

impl DefaultTransformedVariantFactory {
    /// Create factory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shared transformed sets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Whether nothing was shared yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    fn create(
        source: &ResolvedVariant,
        target: AttributeContainer,
        chain: TransformChain,
    ) -> ResolvedArtifactSet {
        let mut descriptor = VariantDescriptor::new(
            format!("{} transformed to {target}", source.display_name()),
            target,
        )
        .with_capabilities(source.capabilities().to_vec());
        if let Some(component) = source.descriptor().component() {
            descriptor = descriptor.with_component(component.clone());
        }
        TransformedArtifactSet::new(Arc::new(descriptor), source.artifacts().clone(), chain)
            .into_set()
    }
}

impl TransformedVariantFactory for DefaultTransformedVariantFactory {
    fn transformed(
        &self,
        source: &ResolvedVariant,
        target: AttributeContainer,
        chain: TransformChain,
    ) -> ResolvedArtifactSet {
        match source.identifier() {
            Some(identifier) => self
                .shared
                .entry((identifier.clone(), target.clone()))
                .or_insert_with(|| Self::create(source, target, chain))
                .clone(),
            None => Self::create(source, target, chain),
        }
    }
}

/// Picks the variant to use for a request
pub trait ArtifactVariantSelector: Send + Sync + Debug {
    /// Select among `variants`
    ///
    /// Returns [`ResolvedArtifactSet::Empty`] when nothing matches and
    /// `allow_no_matching_variants` is set, and a failed set otherwise.
    fn select(
        &self,
        variants: &ResolvedVariantSet,
        requested: &AttributeContainer,
        allow_no_matching_variants: bool,
        factory: &dyn TransformedVariantFactory,
    ) -> ResolvedArtifactSet;

    /// Copy of this selector searching transform chains of at most `max_chain_length` steps
    ///
    /// `None` for selectors that never search transform chains.
    fn with_max_chain_length(
        &self,
        _max_chain_length: usize,
    ) -> Option<Arc<dyn ArtifactVariantSelector>> {
        None
    }
}

/// Selector based on attribute matching, falling back to transform chains
#[derive(Debug, Clone, Default)]
pub struct AttributeMatchingVariantSelector {
    transforms: Arc<TransformRegistry>,
}

impl AttributeMatchingVariantSelector {
    /// Create selector using `transforms` when no variant matches directly
    #[inline]
    #[must_use]
    pub fn new(transforms: Arc<TransformRegistry>) -> Self {
        Self { transforms }
    }

    /// Registered transforms
    #[inline]
    #[must_use]
    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    fn select_transformed(
        &self,
        variants: &ResolvedVariantSet,
        requested: &AttributeContainer,
        factory: &dyn TransformedVariantFactory,
    ) -> Option<ResolvedArtifactSet> {
        let mut shortest: Option<usize> = None;
        let mut candidates: Vec<(&ResolvedVariant, CandidateChain)> = Vec::new();
        for variant in variants.variants() {
            let chains = self
                .transforms
                .find_chains(variants.schema(), variant.attributes(), requested);
            for candidate in chains {
                let length = candidate.chain.len();
                match shortest {
                    Some(best) if length > best => continue,
                    Some(best) if length < best => candidates.clear(),
                    _ => {}
                }
                shortest = Some(length);
                candidates.push((variant, candidate));
            }
        }

        match candidates.len() {
            0 => None,
            1 => {
                let (variant, candidate) = candidates.remove(0);
                tracing::debug!(
                    variant = %variant.display_name(),
                    chain = %candidate.chain,
                    "selected variant through transform chain"
                );
                Some(factory.transformed(variant, candidate.attributes, candidate.chain))
            }
            _ => {
                let chains = candidates
                    .iter()
                    .map(|(variant, candidate)| {
                        format!("{}: {}", variant.display_name(), candidate.chain)
                    })
                    .collect();
                Some(ResolvedArtifactSet::failed(ResolveError::AmbiguousTransforms {
                    component: variants.display_name().to_string(),
                    requested: requested.clone(),
                    chains,
                }))
            }
        }
    }
}

impl ArtifactVariantSelector for AttributeMatchingVariantSelector {
    fn select(
        &self,
        variants: &ResolvedVariantSet,
        requested: &AttributeContainer,
        allow_no_matching_variants: bool,
        factory: &dyn TransformedVariantFactory,
    ) -> ResolvedArtifactSet {
        let requested = requested.concat(variants.overridden_attributes());
        let matcher = AttributeMatcher::new(variants.schema());
        let matches = matcher.best_matches(
            variants.variants().iter().map(ResolvedVariant::attributes),
            &requested,
        );

        match matches.as_slice() {
            [index] => return variants.variants()[*index].artifacts().clone(),
            [] => {}
            _ => {
                let matches = matches
                    .iter()
                    .map(|i| variants.variants()[*i].display_name().to_string())
                    .collect();
                tracing::debug!(
                    component = %variants.display_name(),
                    %requested,
                    "ambiguous variant selection"
                );
                return ResolvedArtifactSet::failed(ResolveError::AmbiguousVariants {
                    component: variants.display_name().to_string(),
                    requested,
                    matches,
                });
            }
        }

        if let Some(transformed) = self.select_transformed(variants, &requested, factory) {
            return transformed;
        }

        if allow_no_matching_variants {
            return ResolvedArtifactSet::EMPTY;
        }
        tracing::debug!(component = %variants.display_name(), %requested, "no matching variant");
        ResolvedArtifactSet::failed(ResolveError::NoMatchingVariants {
            component: variants.display_name().to_string(),
            requested,
            candidates: variants
                .variants()
                .iter()
                .map(|variant| variant.display_name().to_string())
                .collect(),
        })
    }

    fn with_max_chain_length(
        &self,
        max_chain_length: usize,
    ) -> Option<Arc<dyn ArtifactVariantSelector>> {
        let transforms = self.transforms.as_ref().clone().with_max_chain_length(max_chain_length);
        Some(Arc::new(Self::new(Arc::new(transforms))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform_registry::TransformRegistration;
    use arx_artifact::{ArtifactId, ArtifactName, AttributesSchema, ComponentId, ResolvableArtifact};
    use arx_resolve::TransformStep;
    use std::path::{Path, PathBuf};

    #[derive(Debug)]
    struct Named(&'static str);

    impl TransformStep for Named {
        fn display_name(&self) -> &str {
            self.0
        }

        fn transform(&self, input: &Path) -> Result<Vec<PathBuf>, ResolveError> {
            Ok(vec![input.with_extension(self.0)])
        }
    }

    fn variant(name: &str, artifact_type: &str) -> ResolvedVariant {
        let component = ComponentId::module("org", "lib", "1.0");
        let descriptor = Arc::new(
            VariantDescriptor::new(name, request(artifact_type)).with_component(component.clone()),
        );
        let artifact = ResolvableArtifact::resolved(
            ArtifactId::component(component.clone(), ArtifactName::new(name, artifact_type)),
            format!("/repo/{name}.{artifact_type}"),
            Vec::new(),
        );
        let artifacts = ResolvedArtifactSet::single(Arc::clone(&descriptor), artifact);
        ResolvedVariant::new(descriptor, Some(VariantId::new(component, name)), artifacts)
    }

    fn candidates(variants: Vec<ResolvedVariant>) -> ResolvedVariantSet {
        ResolvedVariantSet::new("org:lib:1.0", Arc::new(AttributesSchema::new()), variants)
    }

    fn request(artifact_type: &str) -> AttributeContainer {
        AttributeContainer::new().with("artifactType", artifact_type)
    }

    fn selected_variant(set: &ResolvedArtifactSet) -> Option<&str> {
        match set {
            ResolvedArtifactSet::Files(files) => Some(files.variant().display_name()),
            _ => None,
        }
    }

    fn unzip_registry() -> Arc<TransformRegistry> {
        Arc::new(TransformRegistry::new().with(TransformRegistration::new(
            request("jar"),
            request("classes"),
            Arc::new(Named("unzip")),
        )))
    }

    #[test]
    fn selects_single_match() {
        let selector = AttributeMatchingVariantSelector::default();
        let set = selector.select(
            &candidates(vec![variant("api", "jar"), variant("docs", "zip")]),
            &request("zip"),
            false,
            &DefaultTransformedVariantFactory::new(),
        );
        assert_eq!(selected_variant(&set), Some("docs"));
    }

    #[test]
    fn no_match_is_failure_unless_allowed() {
        let selector = AttributeMatchingVariantSelector::default();
        let variants = candidates(vec![variant("api", "jar")]);
        let factory = DefaultTransformedVariantFactory::new();

        let strict = selector.select(&variants, &request("aar"), false, &factory);
        assert!(matches!(strict.failure(), Some(ResolveError::NoMatchingVariants { .. })));

        let lenient = selector.select(&variants, &request("aar"), true, &factory);
        assert!(lenient.is_empty());
    }

    #[test]
    fn ambiguous_match_is_failure() {
        let selector = AttributeMatchingVariantSelector::default();
        let set = selector.select(
            &candidates(vec![variant("a", "jar"), variant("b", "jar")]),
            &request("jar"),
            true,
            &DefaultTransformedVariantFactory::new(),
        );
        let Some(ResolveError::AmbiguousVariants { matches, .. }) = set.failure() else {
            panic!("expected ambiguous variants, got {set:?}");
        };
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn overridden_attributes_win_over_request() {
        let selector = AttributeMatchingVariantSelector::default();
        let variants = candidates(vec![variant("api", "jar"), variant("docs", "zip")])
            .with_overridden_attributes(request("zip"));
        let factory = DefaultTransformedVariantFactory::new();
        let set = selector.select(&variants, &request("jar"), false, &factory);
        assert_eq!(selected_variant(&set), Some("docs"));
    }

    #[test]
    fn transform_chain_applies_when_nothing_matches() {
        let selector = AttributeMatchingVariantSelector::new(unzip_registry());
        let set = selector.select(
            &candidates(vec![variant("api", "jar")]),
            &request("classes"),
            false,
            &DefaultTransformedVariantFactory::new(),
        );
        match set {
            ResolvedArtifactSet::Transformed(transformed) => {
                assert_eq!(transformed.chain().to_string(), "unzip");
                assert_eq!(transformed.target().attributes(), &request("classes"));
            }
            other => panic!("expected transformed set, got {other:?}"),
        }
    }

    #[test]
    fn two_transformable_variants_are_ambiguous() {
        let selector = AttributeMatchingVariantSelector::new(unzip_registry());
        let set = selector.select(
            &candidates(vec![variant("a", "jar"), variant("b", "jar")]),
            &request("classes"),
            false,
            &DefaultTransformedVariantFactory::new(),
        );
        assert!(matches!(set.failure(), Some(ResolveError::AmbiguousTransforms { .. })));
    }

    #[test]
    fn identified_variants_share_transformed_sets() {
        let factory = DefaultTransformedVariantFactory::new();
        let source = variant("api", "jar");
        let chain = TransformChain::single(Arc::new(Named("unzip")));

        let first = factory.transformed(&source, request("classes"), chain.clone());
        let second = factory.transformed(&source, request("classes"), chain);
        match (first, second) {
            (ResolvedArtifactSet::Transformed(a), ResolvedArtifactSet::Transformed(b)) => {
                assert!(Arc::ptr_eq(&a, &b));
            }
            _ => panic!("expected transformed sets"),
        }
        assert_eq!(factory.len(), 1);
    }
}
