//! Vector retrieval strategy
//!
//! ANN backends return a bounded ranked list and no exact count, so this
//! strategy oversamples: it requests a candidate budget that grows with the
//! requested page, applies the retrieval filter post-hoc, and paginates the
//! filtered set in memory. The reported total is the filtered candidate
//! count, an estimate bounded by the budget.

use crate::config::SearchConfig;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::error::{Result, SoukError};
use crate::query::RetrievalFilter;
use crate::retrieval::{degrade_or_propagate, Candidate, RetrievalOutcome};
use crate::storage::{DocumentStore, ScoredProduct};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct VectorStrategy {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    oversample_multiplier: usize,
    oversample_floor: usize,
    store_timeout: Duration,
    embed_timeout: Duration,
}

impl VectorStrategy {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &SearchConfig,
        embed_timeout_ms: u64,
    ) -> Self {
        Self {
            store,
            embedder,
            oversample_multiplier: config.vector_oversample_multiplier,
            oversample_floor: config.vector_oversample_floor,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            embed_timeout: Duration::from_millis(embed_timeout_ms),
        }
    }

    /// Candidate budget for a request needing `needed` ranked results.
    /// Monotonically increasing in `needed` so deeper pages stay stable.
    fn budget(&self, needed: usize) -> usize {
        needed
            .saturating_mul(self.oversample_multiplier)
            .max(self.oversample_floor)
    }

    /// Execute one vector page
    pub async fn execute(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        page: usize,
        page_size: usize,
    ) -> Result<RetrievalOutcome> {
        let needed = page.saturating_mul(page_size);
        let fetched = self.fetch_filtered(query, filter, self.budget(needed)).await;

        match degrade_or_propagate(fetched, "vector search")? {
            Some(hits) => {
                let total = hits.len() as u64;
                let skip = (page - 1).saturating_mul(page_size);
                let candidates = hits
                    .into_iter()
                    .skip(skip)
                    .take(page_size)
                    .map(|hit| Candidate::from_vector(hit.product, hit.score))
                    .collect();
                Ok(RetrievalOutcome {
                    candidates,
                    total,
                    degraded: false,
                })
            }
            None => Ok(RetrievalOutcome::empty_degraded()),
        }
    }

    /// Fetch an unpaginated, filtered sample for hybrid fusion
    pub(crate) async fn sample(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        sample_size: usize,
    ) -> Result<Vec<ScoredProduct>> {
        let mut hits = self
            .fetch_filtered(query, filter, self.budget(sample_size))
            .await?;
        hits.truncate(sample_size);
        Ok(hits)
    }

    /// Embed the query, run the ANN search, and filter post-hoc. Hits come
    /// back sorted by similarity descending with deterministic tie-breaks.
    async fn fetch_filtered(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        budget: usize,
    ) -> Result<Vec<ScoredProduct>> {
        let vector = self.embed_query(query).await?;

        let mut hits = tokio::time::timeout(
            self.store_timeout,
            self.store.vector_search(&vector, budget),
        )
        .await
        .map_err(|_| {
            SoukError::UpstreamTimeout(format!(
                "vector search exceeded {}ms",
                self.store_timeout.as_millis()
            ))
        })??;

        if let Some(filter) = filter {
            hits.retain(|hit| filter.matches(&hit.product));
        }
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        Ok(hits)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let vector = tokio::time::timeout(self.embed_timeout, self.embedder.embed(query))
            .await
            .map_err(|_| {
                SoukError::UpstreamTimeout(format!(
                    "embedding exceeded {}ms",
                    self.embed_timeout.as_millis()
                ))
            })??;

        let expected = self.embedder.dimension();
        if vector.len() != expected {
            return Err(SoukError::Embedding(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }));
        }
        Ok(vector)
    }
}
