//! Fail-open reranking adapter
//!
//! An external cross-encoder can reorder the top candidates, but search must
//! never fail because of it: any reranker error, timeout, or malformed answer
//! leaves the fused ordering untouched and reports `reranked = false`.

use crate::config::RerankingConfig;
use crate::retrieval::Candidate;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RerankError {
    #[error("Reranker unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed reranker response: {0}")]
    Malformed(String),
}

/// One scored entry from the reranker, referring back into the candidate
/// list by index.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RerankedItem {
    pub index: usize,
    pub relevance: f32,
}

/// External relevance model over (query, document summary) pairs
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score `documents` against `query`, returning one item per document
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankedItem>, RerankError>;
}

pub struct RerankingAdapter {
    reranker: Option<Arc<dyn Reranker>>,
    config: RerankingConfig,
}

impl RerankingAdapter {
    pub fn new(reranker: Option<Arc<dyn Reranker>>, config: RerankingConfig) -> Self {
        Self { reranker, config }
    }

    /// Rerank the head of `candidates`, fail-open
    ///
    /// At most `max_candidates` are sent out; the tail keeps its fused order
    /// behind the reranked head. Returns the (possibly reordered) candidates
    /// and whether reranking actually happened.
    pub async fn apply(&self, query: &str, candidates: Vec<Candidate>) -> (Vec<Candidate>, bool) {
        let reranker = match &self.reranker {
            Some(reranker) => reranker,
            None => return (candidates, false),
        };
        if candidates.len() < 2 {
            return (candidates, false);
        }

        let head_len = candidates.len().min(self.config.max_candidates);
        let summaries: Vec<String> = candidates[..head_len]
            .iter()
            .map(|c| self.summarize(c))
            .collect();

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = match tokio::time::timeout(timeout, reranker.rerank(query, &summaries)).await
        {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                tracing::warn!("Reranking failed, keeping fused order: {e}");
                return (candidates, false);
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.timeout_ms,
                    "Reranking timed out, keeping fused order"
                );
                return (candidates, false);
            }
        };

        if !Self::is_permutation(&response, head_len) {
            tracing::warn!(
                items = response.len(),
                head = head_len,
                "Reranker response is not a permutation of the head, keeping fused order"
            );
            return (candidates, false);
        }

        let mut items = response;
        items.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut head: Vec<Option<Candidate>> =
            candidates.iter().take(head_len).cloned().map(Some).collect();
        let mut reordered = Vec::with_capacity(candidates.len());
        for item in items {
            if let Some(mut candidate) = head[item.index].take() {
                candidate.relevance_score = Some(item.relevance);
                reordered.push(candidate);
            }
        }
        reordered.extend(candidates.into_iter().skip(head_len));

        (reordered, true)
    }

    /// Every head index exactly once, and finite scores
    fn is_permutation(items: &[RerankedItem], head_len: usize) -> bool {
        if items.len() != head_len {
            return false;
        }
        let mut seen = vec![false; head_len];
        for item in items {
            if item.index >= head_len || seen[item.index] || !item.relevance.is_finite() {
                return false;
            }
            seen[item.index] = true;
        }
        true
    }

    /// Flatten a candidate into the document line the relevance model scores
    fn summarize(&self, candidate: &Candidate) -> String {
        let product = &candidate.product;
        let description = product.description.as_deref().unwrap_or("");
        let truncated: String = description
            .chars()
            .take(self.config.summary_description_len)
            .collect();
        format!(
            "Title: {} | Brand: {} | Category: {} | Description: {} | Price: ₹{}",
            product.title,
            product.brand.as_deref().unwrap_or("Unknown"),
            product.category.as_deref().unwrap_or("Unknown"),
            truncated,
            product
                .effective_price()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Product;

    fn candidate(id: &str, fused: f32) -> Candidate {
        let mut candidate = Candidate::from_text(
            Product {
                id: id.to_string(),
                title: format!("Product {id}"),
                brand: None,
                category: None,
                sub_category: None,
                description: Some("long sleeve cotton".to_string()),
                color: None,
                selling_price: Some(499.0),
                list_price: None,
                images: Vec::new(),
            },
            fused,
        );
        candidate.fused_score = fused;
        candidate
    }

    fn candidates() -> Vec<Candidate> {
        vec![candidate("a", 0.9), candidate("b", 0.8), candidate("c", 0.7)]
    }

    struct Reversing;

    #[async_trait]
    impl Reranker for Reversing {
        async fn rerank(
            &self,
            _query: &str,
            documents: &[String],
        ) -> Result<Vec<RerankedItem>, RerankError> {
            Ok((0..documents.len())
                .map(|index| RerankedItem {
                    index,
                    relevance: index as f32,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn reorders_by_relevance() {
        let adapter = RerankingAdapter::new(Some(Arc::new(Reversing)), RerankingConfig::default());
        let (reordered, reranked) = adapter.apply("query", candidates()).await;

        assert!(reranked);
        assert_eq!(reordered[0].product.id, "c");
        assert_eq!(reordered[2].product.id, "a");
        assert_eq!(reordered[0].relevance_score, Some(2.0));
    }

    struct Failing;

    #[async_trait]
    impl Reranker for Failing {
        async fn rerank(
            &self,
            _query: &str,
            _documents: &[String],
        ) -> Result<Vec<RerankedItem>, RerankError> {
            Err(RerankError::Unavailable("503".to_string()))
        }
    }

    #[tokio::test]
    async fn failure_keeps_fused_order() {
        let adapter = RerankingAdapter::new(Some(Arc::new(Failing)), RerankingConfig::default());
        let (reordered, reranked) = adapter.apply("query", candidates()).await;

        assert!(!reranked);
        assert_eq!(reordered[0].product.id, "a");
        assert!(reordered.iter().all(|c| c.relevance_score.is_none()));
    }

    struct OutOfRange;

    #[async_trait]
    impl Reranker for OutOfRange {
        async fn rerank(
            &self,
            _query: &str,
            documents: &[String],
        ) -> Result<Vec<RerankedItem>, RerankError> {
            Ok(vec![
                RerankedItem {
                    index: documents.len() + 5,
                    relevance: 1.0,
                };
                documents.len()
            ])
        }
    }

    #[tokio::test]
    async fn malformed_indices_keep_fused_order() {
        let adapter = RerankingAdapter::new(Some(Arc::new(OutOfRange)), RerankingConfig::default());
        let (reordered, reranked) = adapter.apply("query", candidates()).await;

        assert!(!reranked);
        assert_eq!(reordered[0].product.id, "a");
    }

    struct Duplicating;

    #[async_trait]
    impl Reranker for Duplicating {
        async fn rerank(
            &self,
            _query: &str,
            documents: &[String],
        ) -> Result<Vec<RerankedItem>, RerankError> {
            Ok((0..documents.len())
                .map(|_| RerankedItem {
                    index: 0,
                    relevance: 1.0,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn duplicate_indices_keep_fused_order() {
        let adapter =
            RerankingAdapter::new(Some(Arc::new(Duplicating)), RerankingConfig::default());
        let (_, reranked) = adapter.apply("query", candidates()).await;
        assert!(!reranked);
    }

    struct Sleepy;

    #[async_trait]
    impl Reranker for Sleepy {
        async fn rerank(
            &self,
            _query: &str,
            _documents: &[String],
        ) -> Result<Vec<RerankedItem>, RerankError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn timeout_keeps_fused_order() {
        let mut config = RerankingConfig::default();
        config.timeout_ms = 20;
        let adapter = RerankingAdapter::new(Some(Arc::new(Sleepy)), config);
        let (reordered, reranked) = adapter.apply("query", candidates()).await;

        assert!(!reranked);
        assert_eq!(reordered.len(), 3);
    }

    #[tokio::test]
    async fn no_reranker_is_a_no_op() {
        let adapter = RerankingAdapter::new(None, RerankingConfig::default());
        let (reordered, reranked) = adapter.apply("query", candidates()).await;
        assert!(!reranked);
        assert_eq!(reordered.len(), 3);
    }

    #[tokio::test]
    async fn summary_truncates_description() {
        let mut config = RerankingConfig::default();
        config.summary_description_len = 4;
        let adapter = RerankingAdapter::new(None, config);

        let summary = adapter.summarize(&candidate("a", 0.5));
        assert!(summary.contains("Description: long |"));
        assert!(summary.starts_with("Title: Product a"));
        assert!(summary.contains("Price: ₹499"));
    }
}
