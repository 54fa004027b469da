//! Retrieval strategies, score fusion, pagination, and reranking
//!
//! Three strategies execute against the document store and return scored,
//! oversampled candidate pages: lexical, vector, and the hybrid combination
//! of both. Strategy failures degrade instead of erroring wherever a partial
//! answer exists; only a store outage propagates.

mod fusion;
mod hybrid;
mod pagination;
mod reranker;
mod text;
mod vector;

pub use fusion::{fuse, relevance_score, FusionWeights};
pub use hybrid::HybridStrategy;
pub use pagination::{reconcile, ResultPage};
pub use reranker::{RerankError, RerankedItem, Reranker, RerankingAdapter};
pub use text::TextStrategy;
pub use vector::VectorStrategy;

use crate::error::{Result, SoukError};
use crate::storage::{Product, StoreError};
use serde::{Deserialize, Serialize};

/// Retrieval strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Text,
    Vector,
    Hybrid,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Text => write!(f, "text"),
            SearchMode::Vector => write!(f, "vector"),
            SearchMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// A retrieved product with every score the pipeline attached to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub product: Product,
    /// Native lexical score, when the lexical leg saw this product
    pub text_score: Option<f32>,
    /// Native similarity score, when the vector leg saw this product
    pub vector_score: Option<f32>,
    /// Cross-strategy normalized score; the ranking key unless reranked
    pub fused_score: f32,
    /// Reranker relevance; supersedes `fused_score` for ordering when present
    pub relevance_score: Option<f32>,
}

impl Candidate {
    pub(crate) fn from_text(product: Product, score: f32) -> Self {
        Self {
            product,
            text_score: Some(score),
            vector_score: None,
            fused_score: score,
            relevance_score: None,
        }
    }

    pub(crate) fn from_vector(product: Product, score: f32) -> Self {
        Self {
            product,
            text_score: None,
            vector_score: Some(score),
            fused_score: score,
            relevance_score: None,
        }
    }
}

/// Candidates for one page plus the strategy's total
///
/// For the lexical strategy `total` is exact under the filter; for vector and
/// hybrid it is the size of the oversampled candidate set, a soft guarantee
/// that under-reports beyond the oversample horizon.
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    pub candidates: Vec<Candidate>,
    pub total: u64,
    /// True when a refinement was disabled on the way here
    pub degraded: bool,
}

impl RetrievalOutcome {
    pub fn empty_degraded() -> Self {
        Self {
            degraded: true,
            ..Self::default()
        }
    }
}

/// Sort candidates by fused score descending, breaking ties by id so equal
/// scores page deterministically.
pub(crate) fn sort_by_fused(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product.id.cmp(&b.product.id))
    });
}

/// Apply the degradation policy to a strategy-leg result: an unreachable
/// store propagates, every other failure turns into `None` and a warning.
pub(crate) fn degrade_or_propagate<T>(result: Result<T>, what: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ SoukError::Store(StoreError::Unavailable(_))) => Err(e),
        Err(e) => {
            tracing::warn!("{what} degraded: {e}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SearchMode::Hybrid).unwrap(), "\"hybrid\"");
        assert_eq!(SearchMode::Text.to_string(), "text");
    }

    #[test]
    fn degradation_policy() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(degrade_or_propagate(ok, "test").unwrap(), Some(7));

        let timeout: Result<u32> = Err(SoukError::UpstreamTimeout("slow".to_string()));
        assert_eq!(degrade_or_propagate(timeout, "test").unwrap(), None);

        let outage: Result<u32> =
            Err(SoukError::Store(StoreError::Unavailable("down".to_string())));
        assert!(degrade_or_propagate(outage, "test").is_err());
    }
}
