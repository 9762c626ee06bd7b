//! Services shared by every selection of a resolution

use crate::artifact_type::ArtifactTypeRegistry;
use crate::selector::{
    ArtifactVariantSelector, AttributeMatchingVariantSelector, DefaultTransformedVariantFactory,
    TransformedVariantFactory,
};
use crate::transform_registry::TransformRegistry;
use arx_artifact::AttributesSchema;
use std::sync::Arc;

/// Collaborators used by [`ArtifactSet::select`](crate::ArtifactSet::select)
#[derive(Debug, Clone)]
pub struct ArtifactSelectionServices {
    /// Picks variants
    pub variant_selector: Arc<dyn ArtifactVariantSelector>,
    /// Builds transformed sets
    pub transformed_variant_factory: Arc<dyn TransformedVariantFactory>,
    /// Derives attributes of plain files
    pub artifact_type_registry: Arc<ArtifactTypeRegistry>,
    /// Schema used to match plain files, which carry no producer schema
    pub consumer_schema: Arc<AttributesSchema>,
}

impl ArtifactSelectionServices {
    /// Services using attribute matching and `transforms`
    #[must_use]
    pub fn new(transforms: TransformRegistry) -> Self {
        Self {
            variant_selector: Arc::new(AttributeMatchingVariantSelector::new(Arc::new(transforms))),
            transformed_variant_factory: Arc::new(DefaultTransformedVariantFactory::new()),
            artifact_type_registry: Arc::new(ArtifactTypeRegistry::new()),
            consumer_schema: Arc::new(AttributesSchema::new()),
        }
    }

    /// Set artifact type registry
    #[must_use]
    pub fn with_artifact_types(mut self, registry: ArtifactTypeRegistry) -> Self {
        self.artifact_type_registry = Arc::new(registry);
        self
    }

    /// Set the schema used for plain files
    #[must_use]
    pub fn with_consumer_schema(mut self, schema: AttributesSchema) -> Self {
        self.consumer_schema = Arc::new(schema);
        self
    }

    /// Set variant selector
    #[must_use]
    pub fn with_variant_selector(mut self, selector: Arc<dyn ArtifactVariantSelector>) -> Self {
        self.variant_selector = selector;
        self
    }

    /// Bound the transform chains searched by the variant selector
    ///
    /// Selectors that never search chains are kept as they are.
    #[must_use]
    pub fn with_max_chain_length(mut self, max_chain_length: usize) -> Self {
        if let Some(selector) = self.variant_selector.with_max_chain_length(max_chain_length) {
            self.variant_selector = selector;
        }
        self
    }
}

impl Default for ArtifactSelectionServices {
    fn default() -> Self {
        Self::new(TransformRegistry::new())
    }
}
