//! Per-node artifact providers
//!
//! An [`ArtifactSet`] is built eagerly during graph traversal and selects a
//! [`ResolvedArtifactSet`] later, once the consumer's criteria are known.
//! Selection never fails; failures are returned as failed sets.

use crate::metadata::{ComponentArtifactMetadata, ComponentMetadata, EdgeOverrides, GraphVariant};
use crate::resolver::VariantArtifactResolver;
use crate::services::ArtifactSelectionServices;
use crate::spec::{ArtifactSelectionSpec, ReselectionPolicy};
use crate::variant::{ResolvedVariant, ResolvedVariantSet};
use arx_artifact::{AttributeContainer, Capability, ComponentId, ResolveError, VariantId};
use arx_resolve::{ResolvedArtifactSet, VariantDescriptor};
use once_cell::sync::OnceCell;
use std::fmt::Debug;
use std::sync::Arc;

/// Artifacts contributed by one graph node or edge
pub trait ArtifactSet: Send + Sync + Debug {
    /// Select the artifacts matching `spec`
    fn select(
        &self,
        services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
    ) -> ResolvedArtifactSet;

    /// Whether this set stands for a component that failed to resolve
    fn is_unavailable(&self) -> bool {
        false
    }
}

/// Artifact set backed by a variant chosen during graph resolution
///
/// Holds the overrides of the edge it was created for; implicit edges share
/// one instance per variant through
/// [`VariantArtifactSetCache`](crate::VariantArtifactSetCache).
#[derive(Debug)]
pub struct VariantResolvingArtifactSet {
    resolver: Arc<dyn VariantArtifactResolver>,
    component: Arc<ComponentMetadata>,
    variant: Arc<GraphVariant>,
    overrides: EdgeOverrides,
    own_variants: OnceCell<Vec<ResolvedVariant>>,
}

impl VariantResolvingArtifactSet {
    /// Create set for `variant` of `component` reached through an edge with `overrides`
    #[must_use]
    pub fn new(
        resolver: Arc<dyn VariantArtifactResolver>,
        component: Arc<ComponentMetadata>,
        variant: Arc<GraphVariant>,
        overrides: EdgeOverrides,
    ) -> Self {
        Self {
            resolver,
            component,
            variant,
            overrides,
            own_variants: OnceCell::new(),
        }
    }

    /// Owning component
    #[inline]
    #[must_use]
    pub fn component(&self) -> &ComponentMetadata {
        &self.component
    }

    /// Graph variant
    #[inline]
    #[must_use]
    pub fn variant(&self) -> &GraphVariant {
        &self.variant
    }

    /// Edge overrides
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &EdgeOverrides {
        &self.overrides
    }

    /// Variants exposed by the graph variant, computed once
    #[must_use]
    pub fn own_variants(&self) -> &[ResolvedVariant] {
        self.own_variants.get_or_init(|| self.variants_of(&self.variant))
    }

    fn variants_of(&self, graph_variant: &GraphVariant) -> Vec<ResolvedVariant> {
        if graph_variant.artifact_variants.is_empty() {
            return vec![self.resolved_variant(
                graph_variant,
                graph_variant.id.name(),
                graph_variant.attributes.clone(),
                &graph_variant.artifacts,
            )];
        }
        graph_variant
            .artifact_variants
            .iter()
            .map(|secondary| {
                self.resolved_variant(
                    graph_variant,
                    &format!("{}-{}", graph_variant.id.name(), secondary.name),
                    graph_variant.attributes.concat(&secondary.attributes),
                    &secondary.artifacts,
                )
            })
            .collect()
    }

    fn resolved_variant(
        &self,
        graph_variant: &GraphVariant,
        name: &str,
        attributes: AttributeContainer,
        artifacts: &[ComponentArtifactMetadata],
    ) -> ResolvedVariant {
        let descriptor = Arc::new(
            VariantDescriptor::new(format!("{} variant {name}", self.component.id), attributes)
                .with_component(self.component.id.clone())
                .with_capabilities(graph_variant.capabilities.clone()),
        );
        let kept: Vec<ComponentArtifactMetadata> = artifacts
            .iter()
            .filter(|artifact| !self.overrides.excludes(artifact.name()))
            .cloned()
            .collect();
        // Exclusions make the contents edge specific, so the variant must not
        // share transformed sets with other edges.
        let identifier = if self.overrides.exclusions.is_empty() {
            Some(VariantId::new(self.component.id.clone(), name))
        } else {
            None
        };
        let artifacts = self.resolver.resolve_variant(&self.component, &descriptor, &kept);
        ResolvedVariant::new(descriptor, identifier, artifacts)
    }

    fn adhoc_artifacts(&self) -> ResolvedArtifactSet {
        let artifacts: Vec<ComponentArtifactMetadata> = self
            .overrides
            .artifacts
            .iter()
            .filter(|name| !self.overrides.excludes(name))
            .map(|name| self.component.artifact(name))
            .collect();
        self.resolver.resolve_adhoc_variant(&self.component, &artifacts)
    }

    fn reselection_groups(&self, policy: ReselectionPolicy) -> Vec<Vec<ResolvedVariant>> {
        match policy {
            ReselectionPolicy::HonorCapabilities => {
                let requested = if self.overrides.capabilities.is_empty() {
                    &self.variant.capabilities
                } else {
                    &self.overrides.capabilities
                };
                let candidates: Vec<ResolvedVariant> = self
                    .component
                    .variants
                    .iter()
                    .filter(|candidate| candidate.provides_all(requested))
                    .flat_map(|candidate| self.variants_of(candidate))
                    .collect();
                vec![candidates]
            }
            ReselectionPolicy::AllCapabilities => {
                let mut groups: Vec<(Vec<Capability>, Vec<ResolvedVariant>)> = Vec::new();
                for candidate in &self.component.variants {
                    let mut key = candidate.capabilities.clone();
                    key.sort();
                    let variants = self.variants_of(candidate);
                    match groups.iter_mut().find(|(existing, _)| *existing == key) {
                        Some((_, group)) => group.extend(variants),
                        None => groups.push((key, variants)),
                    }
                }
                groups.into_iter().map(|(_, group)| group).collect()
            }
        }
    }

    fn candidates(&self, variants: Vec<ResolvedVariant>) -> ResolvedVariantSet {
        ResolvedVariantSet::new(
            self.component.id.to_string(),
            Arc::clone(&self.component.schema),
            variants,
        )
        .with_component(self.component.id.clone())
        .with_overridden_attributes(self.overrides.attributes.clone())
    }
}

impl ArtifactSet for VariantResolvingArtifactSet {
    fn select(
        &self,
        services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
    ) -> ResolvedArtifactSet {
        if !spec.component_filter.accepts(Some(&self.component.id)) {
            return ResolvedArtifactSet::EMPTY;
        }

        let explicit_artifacts = !self.overrides.artifacts.is_empty();
        if spec.select_from_all_variants && explicit_artifacts {
            return ResolvedArtifactSet::EMPTY;
        }
        if explicit_artifacts {
            return self.adhoc_artifacts();
        }

        let groups = if spec.select_from_all_variants {
            self.reselection_groups(spec.reselection)
        } else {
            vec![self.own_variants().to_vec()]
        };

        groups
            .into_iter()
            .map(|variants| {
                services.variant_selector.select(
                    &self.candidates(variants),
                    &spec.request_attributes,
                    spec.allow_no_matching_variants,
                    services.transformed_variant_factory.as_ref(),
                )
            })
            .collect()
    }
}

/// Artifact set with contents fixed at construction
#[derive(Debug, Clone)]
pub struct FixedArtifactSet {
    component: Option<ComponentId>,
    artifacts: ResolvedArtifactSet,
}

impl FixedArtifactSet {
    /// Create set owned by `component`
    #[inline]
    #[must_use]
    pub fn new(component: Option<ComponentId>, artifacts: ResolvedArtifactSet) -> Self {
        Self { component, artifacts }
    }
}

impl ArtifactSet for FixedArtifactSet {
    fn select(
        &self,
        _services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
    ) -> ResolvedArtifactSet {
        if spec.component_filter.accepts(self.component.as_ref()) {
            self.artifacts.clone()
        } else {
            ResolvedArtifactSet::EMPTY
        }
    }
}

/// Artifact set of a graph node that failed to resolve
#[derive(Debug, Clone)]
pub struct UnavailableArtifactSet {
    component: ComponentId,
    failure: ResolveError,
}

impl UnavailableArtifactSet {
    /// Create set for `component`, which failed with `reason`
    #[must_use]
    pub fn new(component: ComponentId, reason: impl Into<String>) -> Self {
        let failure = ResolveError::ComponentUnavailable {
            component: component.clone(),
            reason: reason.into(),
        };
        Self { component, failure }
    }
}

impl ArtifactSet for UnavailableArtifactSet {
    fn select(
        &self,
        _services: &ArtifactSelectionServices,
        spec: &ArtifactSelectionSpec,
    ) -> ResolvedArtifactSet {
        if spec.component_filter.accepts(Some(&self.component)) {
            ResolvedArtifactSet::failed(self.failure.clone())
        } else {
            ResolvedArtifactSet::EMPTY
        }
    }

    fn is_unavailable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ArtifactExclusion, VariantArtifactsMetadata, VariantInstanceId};
    use crate::resolver::{ComponentArtifactResolver, DefaultVariantArtifactResolver};
    use crate::spec::ComponentFilter;
    use arx_artifact::ArtifactName;
    use arx_resolve::{ArtifactSource, Artifacts, VisitType, Visitor};
    use pretty_assertions::assert_eq;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug)]
    struct RepoResolver;

    impl ComponentArtifactResolver for RepoResolver {
        fn resolve_artifact(&self, artifact: &ComponentArtifactMetadata) -> io::Result<PathBuf> {
            Ok(PathBuf::from(format!("/repo/{}", artifact.name().file_name())))
        }
    }

    struct Names(Vec<String>);

    impl Visitor for Names {
        fn prepare_for_visit(&mut self, _source: &ArtifactSource) -> VisitType {
            VisitType::Visit
        }

        fn visit_artifacts(&mut self, artifacts: Artifacts) {
            match artifacts {
                Artifacts::Files(files) => {
                    let names = files.artifacts().iter().map(|artifact| artifact.id().file_name());
                    self.0.extend(names);
                }
                Artifacts::Transformed(_) => self.0.push("transformed".to_string()),
                Artifacts::Broken(failure) => self.0.push(format!("failure: {failure}")),
            }
        }
    }

    fn names(set: &ResolvedArtifactSet) -> Vec<String> {
        let mut names = Names(Vec::new());
        set.visit(&mut names);
        names.0
    }

    fn artifact(component: &ComponentId, name: &str, ext: &str) -> ComponentArtifactMetadata {
        ComponentArtifactMetadata::new(component.clone(), ArtifactName::new(name, ext))
    }

    fn usage(value: &str) -> AttributeContainer {
        AttributeContainer::new().with("usage", value)
    }

    fn library() -> Arc<ComponentMetadata> {
        let id = ComponentId::module("org", "lib", "1.0");
        let variant_id = VariantId::new(id.clone(), "runtime");
        let runtime = GraphVariant::new(VariantInstanceId(0), variant_id, usage("runtime"))
            .with_capabilities(vec![Capability::new("org", "lib", Some("1.0"))])
            .with_artifacts(vec![artifact(&id, "lib", "jar")])
            .with_artifact_variant(VariantArtifactsMetadata {
                name: "classes".to_string(),
                attributes: AttributeContainer::new().with("artifactType", "classes"),
                artifacts: vec![artifact(&id, "lib-classes", "dir")],
            })
            .with_artifact_variant(VariantArtifactsMetadata {
                name: "jar".to_string(),
                attributes: AttributeContainer::new().with("artifactType", "jar"),
                artifacts: vec![artifact(&id, "lib", "jar"), artifact(&id, "lib-extra", "jar")],
            });
        let fixtures = GraphVariant::new(
            VariantInstanceId(1),
            VariantId::new(id.clone(), "testFixtures"),
            usage("runtime"),
        )
        .with_capabilities(vec![Capability::new("org", "lib-test-fixtures", Some("1.0"))])
        .with_artifacts(vec![artifact(&id, "lib-test-fixtures", "jar")]);
        Arc::new(ComponentMetadata::new(id).with_variant(runtime).with_variant(fixtures))
    }

    fn set_for(
        component: &Arc<ComponentMetadata>,
        overrides: EdgeOverrides,
    ) -> VariantResolvingArtifactSet {
        VariantResolvingArtifactSet::new(
            Arc::new(DefaultVariantArtifactResolver::new(Arc::new(RepoResolver))),
            Arc::clone(component),
            Arc::clone(&component.variants[0]),
            overrides,
        )
    }

    fn jar_request() -> ArtifactSelectionSpec {
        ArtifactSelectionSpec::new(AttributeContainer::new().with("artifactType", "jar"))
    }

    #[test]
    fn selects_secondary_variant_by_attributes() {
        let set = set_for(&library(), EdgeOverrides::none());
        let selected = set.select(&ArtifactSelectionServices::default(), &jar_request());
        assert_eq!(names(&selected), vec!["lib.jar", "lib-extra.jar"]);
    }

    #[test]
    fn own_variants_are_computed_once() {
        let set = set_for(&library(), EdgeOverrides::none());
        let first = set.own_variants().as_ptr();
        let second = set.own_variants().as_ptr();
        assert_eq!(first, second);
        assert_eq!(set.own_variants().len(), 2);
    }

    #[test]
    fn exclusions_remove_artifacts() {
        let overrides = EdgeOverrides {
            exclusions: vec![ArtifactExclusion::named("lib-extra")],
            ..EdgeOverrides::none()
        };
        let set = set_for(&library(), overrides);
        let selected = set.select(&ArtifactSelectionServices::default(), &jar_request());
        assert_eq!(names(&selected), vec!["lib.jar"]);
    }

    #[test]
    fn explicit_artifacts_bypass_matching() {
        let overrides = EdgeOverrides {
            artifacts: vec![ArtifactName::new("lib", "pom")],
            ..EdgeOverrides::none()
        };
        let set = set_for(&library(), overrides);
        let nothing = AttributeContainer::new().with("artifactType", "nothing-matches");
        let spec = ArtifactSelectionSpec::new(nothing);
        let selected = set.select(&ArtifactSelectionServices::default(), &spec);
        assert_eq!(names(&selected), vec!["lib.pom"]);
    }

    #[test]
    fn explicit_artifacts_with_fan_out_select_nothing() {
        let overrides = EdgeOverrides {
            artifacts: vec![ArtifactName::new("lib", "pom")],
            ..EdgeOverrides::none()
        };
        let set = set_for(&library(), overrides);
        let spec = jar_request().with_select_from_all_variants(ReselectionPolicy::AllCapabilities);
        assert!(set.select(&ArtifactSelectionServices::default(), &spec).is_empty());
    }

    #[test]
    fn missing_match_fails_unless_allowed() {
        let set = set_for(&library(), EdgeOverrides::none());
        let spec =
            ArtifactSelectionSpec::new(AttributeContainer::new().with("artifactType", "aar"));
        let services = ArtifactSelectionServices::default();

        let strict = set.select(&services, &spec);
        assert!(matches!(strict.failure(), Some(ResolveError::NoMatchingVariants { .. })));

        let lenient = set.select(&services, &spec.with_allow_no_matching_variants(true));
        assert!(lenient.is_empty());
    }

    #[test]
    fn component_filter_excludes_set() {
        let set = set_for(&library(), EdgeOverrides::none());
        let spec = jar_request().with_component_filter(ComponentFilter::projects_only());
        assert!(set.select(&ArtifactSelectionServices::default(), &spec).is_empty());
    }

    #[test]
    fn honor_capabilities_keeps_requested_capability() {
        let overrides = EdgeOverrides {
            capabilities: vec![Capability::new("org", "lib-test-fixtures", None)],
            ..EdgeOverrides::none()
        };
        let set = set_for(&library(), overrides);
        let spec = ArtifactSelectionSpec::new(usage("runtime"))
            .with_select_from_all_variants(ReselectionPolicy::HonorCapabilities);
        let selected = set.select(&ArtifactSelectionServices::default(), &spec);
        assert_eq!(names(&selected), vec!["lib-test-fixtures.jar"]);
    }

    #[test]
    fn all_capabilities_unions_one_selection_per_capability() {
        let set = set_for(&library(), EdgeOverrides::none());
        let spec = jar_request().with_select_from_all_variants(ReselectionPolicy::AllCapabilities);
        let selected = set.select(&ArtifactSelectionServices::default(), &spec);
        assert_eq!(
            names(&selected),
            vec!["lib.jar", "lib-extra.jar", "lib-test-fixtures.jar"]
        );
    }

    #[test]
    fn unavailable_set_replays_failure() {
        let set =
            UnavailableArtifactSet::new(ComponentId::module("org", "gone", "1.0"), "not found");
        assert!(set.is_unavailable());
        let selected =
            set.select(&ArtifactSelectionServices::default(), &ArtifactSelectionSpec::default());
        assert!(matches!(selected.failure(), Some(failure) if failure.is_unavailable()));
    }
}
