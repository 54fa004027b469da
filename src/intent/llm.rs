//! LLM intent extraction seam
//!
//! The extractor itself is an external collaborator (a remote model behind an
//! API); this module defines the trait it is called through, the raw wire
//! shape it returns, and the sanitation that converts the raw shape into a
//! [`SearchIntent`]. Malformed output is discarded the same way a timeout is.

use crate::intent::{IntentSource, PriceBounds, SearchIntent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntentError {
    #[error("Intent extraction failed: {0}")]
    Extraction(String),

    #[error("Malformed intent payload: {0}")]
    Malformed(String),
}

/// External LLM-based intent extractor
#[async_trait]
pub trait LlmIntentExtractor: Send + Sync {
    /// Extract structured intent for a raw user query
    async fn parse_intent(&self, query: &str) -> Result<LlmIntent, IntentError>;
}

/// Raw structured intent as returned by the LLM
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmIntent {
    /// Short, retrieval-friendly reformulation of the query
    pub rephrased_query: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Minimum budget, mapped to the `above` price bound
    #[serde(default)]
    pub budget_min: Option<f64>,
    /// Maximum budget, mapped to the `under` price bound
    #[serde(default)]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Extractor confidence in 0.0..=1.0, used for the fallback gate
    #[serde(default)]
    pub confidence: f32,
}

impl LlmIntent {
    /// Sanitize and convert into a [`SearchIntent`]
    ///
    /// Returns `None` when the payload is malformed: confidence outside
    /// 0.0..=1.0 (or NaN), an empty rephrased query, or a non-finite budget.
    pub fn into_intent(self, original_query: &str) -> Option<SearchIntent> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return None;
        }
        let rephrased = self.rephrased_query.trim();
        if rephrased.is_empty() {
            return None;
        }
        if self.budget_min.is_some_and(|v| !v.is_finite())
            || self.budget_max.is_some_and(|v| !v.is_finite())
        {
            return None;
        }

        let price = PriceBounds {
            under: self.budget_max,
            above: self.budget_min,
        };

        Some(SearchIntent {
            original_query: original_query.to_string(),
            normalized_query: rephrased.to_lowercase(),
            rephrased_query: Some(rephrased.to_string()),
            categories: lowered(&self.categories),
            colors: lowered(&self.colors),
            price,
            keywords: self
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            brands: lowered(&self.brands),
            sizes: lowered(&self.sizes),
            confidence: self.confidence,
            source: IntentSource::Llm,
        })
    }
}

fn lowered(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_budget_to_price_bounds() {
        let raw = LlmIntent {
            rephrased_query: "gift ideas under 1500".to_string(),
            budget_min: Some(500.0),
            budget_max: Some(1500.0),
            confidence: 0.9,
            ..LlmIntent::default()
        };

        let intent = raw.into_intent("something nice").unwrap();
        assert_eq!(intent.price.above, Some(500.0));
        assert_eq!(intent.price.under, Some(1500.0));
        assert_eq!(intent.source, IntentSource::Llm);
        assert_eq!(intent.original_query, "something nice");
    }

    #[test]
    fn lowercases_and_dedupes_vocabulary() {
        let raw = LlmIntent {
            rephrased_query: "red shoes".to_string(),
            categories: vec!["Shoes".to_string(), "shoes".to_string()],
            colors: vec!["Red".to_string(), " ".to_string()],
            confidence: 0.8,
            ..LlmIntent::default()
        };

        let intent = raw.into_intent("red shoes").unwrap();
        assert_eq!(intent.categories.len(), 1);
        assert!(intent.categories.contains("shoes"));
        assert_eq!(intent.colors.len(), 1);
    }

    #[test]
    fn rejects_malformed_payloads() {
        let empty_rephrase = LlmIntent {
            rephrased_query: "  ".to_string(),
            confidence: 0.9,
            ..LlmIntent::default()
        };
        assert!(empty_rephrase.into_intent("q").is_none());

        let bad_confidence = LlmIntent {
            rephrased_query: "shoes".to_string(),
            confidence: f32::NAN,
            ..LlmIntent::default()
        };
        assert!(bad_confidence.into_intent("q").is_none());

        let out_of_range = LlmIntent {
            rephrased_query: "shoes".to_string(),
            confidence: 1.4,
            ..LlmIntent::default()
        };
        assert!(out_of_range.into_intent("q").is_none());

        let bad_budget = LlmIntent {
            rephrased_query: "shoes".to_string(),
            budget_max: Some(f64::INFINITY),
            confidence: 0.9,
            ..LlmIntent::default()
        };
        assert!(bad_budget.into_intent("q").is_none());
    }
}
