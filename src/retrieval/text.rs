//! Lexical retrieval strategy

use crate::config::SearchConfig;
use crate::error::{Result, SoukError};
use crate::query::RetrievalFilter;
use crate::retrieval::{degrade_or_propagate, Candidate, RetrievalOutcome};
use crate::storage::{DocumentStore, ScoredProduct};
use std::sync::Arc;
use std::time::Duration;

/// Keyword search against the document store
///
/// The store ANDs the filter into its match predicate and counts exactly, so
/// this is the one strategy whose totals are authoritative.
#[derive(Clone)]
pub struct TextStrategy {
    store: Arc<dyn DocumentStore>,
    store_timeout: Duration,
}

impl TextStrategy {
    pub fn new(store: Arc<dyn DocumentStore>, config: &SearchConfig) -> Self {
        Self {
            store,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }

    /// Execute one lexical page
    pub async fn execute(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        page: usize,
        page_size: usize,
    ) -> Result<RetrievalOutcome> {
        let skip = (page - 1).saturating_mul(page_size);
        let fetched = self.bounded_search(query, filter, skip, page_size).await;

        match degrade_or_propagate(fetched, "lexical search")? {
            Some(page_result) => {
                let candidates = page_result
                    .hits
                    .into_iter()
                    .map(|hit| Candidate::from_text(hit.product, hit.score))
                    .collect();
                Ok(RetrievalOutcome {
                    candidates,
                    total: page_result.total,
                    degraded: false,
                })
            }
            None => Ok(RetrievalOutcome::empty_degraded()),
        }
    }

    /// Fetch an unpaginated sample of the top hits for hybrid fusion
    pub(crate) async fn sample(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        sample_size: usize,
    ) -> Result<Vec<ScoredProduct>> {
        let page = self.bounded_search(query, filter, 0, sample_size).await?;
        Ok(page.hits)
    }

    async fn bounded_search(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        skip: usize,
        limit: usize,
    ) -> Result<crate::storage::LexicalPage> {
        tokio::time::timeout(
            self.store_timeout,
            self.store.lexical_search(query, filter, skip, limit),
        )
        .await
        .map_err(|_| {
            SoukError::UpstreamTimeout(format!(
                "lexical search exceeded {}ms",
                self.store_timeout.as_millis()
            ))
        })?
        .map_err(SoukError::from)
    }
}
