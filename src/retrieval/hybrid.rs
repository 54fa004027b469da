//! Hybrid retrieval strategy
//!
//! Runs the lexical and vector legs concurrently over an oversampled
//! candidate budget, fuses their scores, applies the soft color boost, and
//! paginates the merged set in memory. A failing leg degrades the search to
//! the surviving leg; only when the store itself is unreachable does the
//! failure propagate.

use crate::config::SearchConfig;
use crate::error::Result;
use crate::intent::SearchIntent;
use crate::query::RetrievalFilter;
use crate::retrieval::fusion::{apply_color_boost, fuse, FusionWeights};
use crate::retrieval::pagination::paginate;
use crate::retrieval::{degrade_or_propagate, RetrievalOutcome, TextStrategy, VectorStrategy};

#[derive(Clone)]
pub struct HybridStrategy {
    text: TextStrategy,
    vector: VectorStrategy,
    weights: FusionWeights,
    sample_multiplier: usize,
    sample_floor: usize,
    color_boost: f32,
    color_boost_threshold: f32,
}

impl HybridStrategy {
    pub fn new(text: TextStrategy, vector: VectorStrategy, config: &SearchConfig) -> Self {
        Self {
            text,
            vector,
            weights: FusionWeights {
                text: config.text_weight,
                vector: config.vector_weight,
            },
            sample_multiplier: config.hybrid_sample_multiplier,
            sample_floor: config.hybrid_sample_floor,
            color_boost: config.color_boost,
            color_boost_threshold: config.color_boost_threshold,
        }
    }

    /// Execute one hybrid page
    ///
    /// `text_query` feeds the lexical leg, `embed_query` the vector leg; both
    /// legs share the same filter so their result sets stay consistent.
    pub async fn execute(
        &self,
        text_query: &str,
        embed_query: &str,
        filter: Option<&RetrievalFilter>,
        intent: &SearchIntent,
        page: usize,
        page_size: usize,
    ) -> Result<RetrievalOutcome> {
        let sample = page
            .saturating_mul(page_size)
            .saturating_mul(self.sample_multiplier)
            .max(self.sample_floor);

        let (text_result, vector_result) = tokio::join!(
            self.text.sample(text_query, filter, sample),
            self.vector.sample(embed_query, filter, sample),
        );

        let text_hits = degrade_or_propagate(text_result, "hybrid lexical leg")?;
        let vector_hits = degrade_or_propagate(vector_result, "hybrid vector leg")?;
        let degraded = text_hits.is_none() || vector_hits.is_none();

        if degraded {
            tracing::warn!(
                text_leg_ok = text_hits.is_some(),
                vector_leg_ok = vector_hits.is_some(),
                "Hybrid search degraded to a single leg"
            );
        }

        let mut candidates = fuse(
            text_hits.unwrap_or_default(),
            vector_hits.unwrap_or_default(),
            self.weights,
        );
        apply_color_boost(
            &mut candidates,
            intent,
            self.color_boost,
            self.color_boost_threshold,
        );

        let total = candidates.len() as u64;
        Ok(RetrievalOutcome {
            candidates: paginate(candidates, page, page_size),
            total,
            degraded,
        })
    }
}
