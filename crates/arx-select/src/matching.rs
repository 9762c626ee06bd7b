//! Attribute matching with disambiguation

use arx_artifact::{AttributeContainer, AttributesSchema};

/// Picks the best candidates for a request under a producer schema
#[derive(Debug, Clone, Copy)]
pub struct AttributeMatcher<'a> {
    schema: &'a AttributesSchema,
}

impl<'a> AttributeMatcher<'a> {
    /// Create matcher for `schema`
    #[inline]
    #[must_use]
    pub fn new(schema: &'a AttributesSchema) -> Self {
        Self { schema }
    }

    /// Whether a single candidate satisfies the request
    #[inline]
    #[must_use]
    pub fn is_match(&self, candidate: &AttributeContainer, requested: &AttributeContainer) -> bool {
        self.schema.matches(candidate, requested)
    }

    /// Indices of the best matching candidates
    ///
    /// # Algorithm
    /// 1. Keep compatible candidates
    /// 2. If several remain, prefer candidates carrying every requested value exactly
    /// 3. If several remain, prefer candidates with the fewest attributes the
    ///    request does not mention
    ///
    /// More than one index in the result means the match is ambiguous.
    #[must_use]
    pub fn best_matches<'c, I>(&self, candidates: I, requested: &AttributeContainer) -> Vec<usize>
    where
        I: IntoIterator<Item = &'c AttributeContainer>,
    {
        let compatible: Vec<(usize, &AttributeContainer)> = candidates
            .into_iter()
            .enumerate()
            .filter(|(_, candidate)| self.is_match(candidate, requested))
            .collect();
        if compatible.len() <= 1 {
            return compatible.into_iter().map(|(i, _)| i).collect();
        }

        let exact: Vec<(usize, &AttributeContainer)> = compatible
            .iter()
            .copied()
            .filter(|(_, candidate)| self.schema.matches_exactly(candidate, requested))
            .collect();
        let pool = if exact.is_empty() { compatible } else { exact };
        if pool.len() == 1 {
            return vec![pool[0].0];
        }

        let extra = |candidate: &AttributeContainer| {
            candidate.names().filter(|name| !requested.contains(name)).count()
        };
        let fewest = pool.iter().map(|(_, candidate)| extra(candidate)).min().unwrap_or(0);
        pool.into_iter()
            .filter(|(_, candidate)| extra(candidate) == fewest)
            .map(|(i, _)| i)
            .collect()
    }
}
