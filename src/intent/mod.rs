//! Query intent extraction
//!
//! Turns a free-text product query into a structured [`SearchIntent`] used by
//! the query builder, score fusion, and reranking. An optional LLM extractor
//! is consulted first with a bounded timeout and a confidence gate; the
//! heuristic parser is the fallback for every failure mode, so extraction as
//! a whole never fails.

mod heuristic;
mod llm;

pub use heuristic::HeuristicParser;
pub use llm::{IntentError, LlmIntent, LlmIntentExtractor};

use crate::config::IntentConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Which extractor produced an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentSource {
    Heuristic,
    Llm,
}

/// Normalized price bounds extracted from a query
///
/// Inclusive and strict comparisons collapse into the same bucket (`<=`
/// becomes `under`, `>=` becomes `above`). This is an intentional
/// simplification of the query language, not exact inequality semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub under: Option<f64>,
    pub above: Option<f64>,
}

impl PriceBounds {
    pub fn is_empty(&self) -> bool {
        self.under.is_none() && self.above.is_none()
    }

    /// Whether a price falls inside the extracted window
    pub fn contains(&self, price: f64) -> bool {
        if let Some(under) = self.under {
            if price > under {
                return false;
            }
        }
        if let Some(above) = self.above {
            if price < above {
                return false;
            }
        }
        true
    }
}

/// Structured interpretation of a free-text query
///
/// Category and color sets are ordered so that everything derived from an
/// intent (most importantly retrieval filters) is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIntent {
    pub original_query: String,
    pub normalized_query: String,
    /// Retrieval-friendly reformulation, only present for LLM intents
    pub rephrased_query: Option<String>,
    pub categories: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub price: PriceBounds,
    /// Ordered, stop-word-free query terms
    pub keywords: Vec<String>,
    pub brands: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub confidence: f32,
    pub source: IntentSource,
}

impl SearchIntent {
    /// The query text retrieval should run with: the LLM rephrasing when
    /// available, the raw query otherwise
    pub fn effective_query(&self) -> &str {
        self.rephrased_query
            .as_deref()
            .unwrap_or(&self.original_query)
    }

    /// True when nothing structural was extracted from the query
    pub fn has_structure(&self) -> bool {
        !self.categories.is_empty() || !self.price.is_empty()
    }
}

/// Facade over the LLM and heuristic intent extractors
///
/// `parse` is infallible: the LLM path is best-effort and every internal
/// error falls back to the heuristic parser.
pub struct IntentExtractor {
    heuristic: HeuristicParser,
    llm: Option<Arc<dyn LlmIntentExtractor>>,
    config: IntentConfig,
}

impl IntentExtractor {
    pub fn new(llm: Option<Arc<dyn LlmIntentExtractor>>, config: IntentConfig) -> Result<Self> {
        Ok(Self {
            heuristic: HeuristicParser::new()?,
            llm,
            config,
        })
    }

    /// Parse a query into a [`SearchIntent`]
    pub async fn parse(&self, query: &str) -> SearchIntent {
        if self.config.llm_enabled {
            if let Some(extracted) = self.try_llm(query).await {
                return extracted;
            }
        }
        self.heuristic.parse(query)
    }

    async fn try_llm(&self, query: &str) -> Option<SearchIntent> {
        let llm = self.llm.as_ref()?;
        let bound = Duration::from_millis(self.config.llm_timeout_ms);

        match tokio::time::timeout(bound, llm.parse_intent(query)).await {
            Ok(Ok(raw)) => {
                let confidence = raw.confidence;
                if confidence >= self.config.confidence_threshold {
                    match raw.into_intent(query) {
                        Some(intent) => {
                            tracing::debug!(
                                confidence,
                                "Using LLM intent for query: {}",
                                query
                            );
                            Some(intent)
                        }
                        None => {
                            tracing::warn!(
                                "Malformed LLM intent, falling back to heuristics"
                            );
                            None
                        }
                    }
                } else {
                    tracing::debug!(
                        confidence,
                        threshold = self.config.confidence_threshold,
                        "LLM confidence too low, falling back to heuristics"
                    );
                    None
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("LLM intent parsing failed, falling back to heuristics: {e}");
                None
            }
            Err(_) => {
                tracing::warn!(
                    "LLM intent parsing timed out after {}ms, falling back to heuristics",
                    self.config.llm_timeout_ms
                );
                None
            }
        }
    }
}
