//! Document store seam
//!
//! The catalog lives behind [`DocumentStore`]; query execution, indexing, and
//! counting are the store's business. The contract the retrieval strategies
//! rely on:
//!
//! - lexical search ANDs the filter into its match predicate, returns pages
//!   sorted by native lexical score, and counts exactly under the filter
//! - vector search returns a bounded ranked candidate list with native
//!   similarity scores and no count; filtering happens post-hoc upstream
//!
//! [`MemoryStore`] is a reference backend for tests and offline use.

mod memory;

pub use memory::MemoryStore;

use crate::query::{Field, RetrievalFilter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot be reached; propagates as a genuine outage
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the response was unusable; degrades upstream
    #[error("Malformed store response: {0}")]
    Malformed(String),
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub selling_price: Option<f64>,
    pub list_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Text attribute lookup for filter evaluation
    pub fn text_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(&self.title),
            Field::Description => self.description.as_deref(),
            Field::Brand => self.brand.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::SubCategory => self.sub_category.as_deref(),
            Field::Color => self.color.as_deref(),
            Field::SellingPrice | Field::ListPrice => None,
        }
    }

    /// Numeric attribute lookup for filter evaluation
    pub fn numeric_field(&self, field: Field) -> Option<f64> {
        match field {
            Field::SellingPrice => self.selling_price,
            Field::ListPrice => self.list_price,
            _ => None,
        }
    }

    /// The price used for relevance scoring: selling price when present,
    /// list price otherwise
    pub fn effective_price(&self) -> Option<f64> {
        self.selling_price.or(self.list_price)
    }
}

/// A product with its strategy-native retrieval score
#[derive(Debug, Clone)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f32,
}

/// One page of lexical results with an exact total under the filter
#[derive(Debug, Clone, Default)]
pub struct LexicalPage {
    pub hits: Vec<ScoredProduct>,
    pub total: u64,
}

/// External document store executing lexical and vector queries
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lexical search sorted by native score descending
    ///
    /// The filter is ANDed into the match predicate; `total` counts every
    /// document matching query and filter, not just the returned page.
    async fn lexical_search(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        skip: usize,
        limit: usize,
    ) -> Result<LexicalPage, StoreError>;

    /// ANN search returning at most `budget` candidates by similarity
    /// descending; no exact count exists for this access path
    async fn vector_search(
        &self,
        vector: &[f32],
        budget: usize,
    ) -> Result<Vec<ScoredProduct>, StoreError>;
}
