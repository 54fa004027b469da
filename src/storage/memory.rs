//! In-process reference store
//!
//! Token-overlap lexical scoring with field weighting and cosine similarity
//! over caller-supplied embeddings. Not an index: every search scans the
//! whole catalog, which is exactly right for tests and small offline
//! datasets and wrong for everything else.

use crate::query::RetrievalFilter;
use crate::storage::{DocumentStore, LexicalPage, Product, ScoredProduct, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Relative weights of lexical matches per field
const TITLE_WEIGHT: f32 = 2.0;
const BRAND_WEIGHT: f32 = 1.5;
const CATEGORY_WEIGHT: f32 = 1.0;
const DESCRIPTION_WEIGHT: f32 = 0.5;

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<(Product, Vec<f32>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with its embedding
    pub async fn insert(&self, product: Product, embedding: Vec<f32>) {
        self.entries.write().await.push((product, embedding));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn lexical_score(product: &Product, terms: &[String]) -> f32 {
        let mut score = 0.0;
        let title = product.title.to_lowercase();
        let brand = product.brand.as_deref().unwrap_or("").to_lowercase();
        let category = format!(
            "{} {}",
            product.category.as_deref().unwrap_or(""),
            product.sub_category.as_deref().unwrap_or("")
        )
        .to_lowercase();
        let description = product.description.as_deref().unwrap_or("").to_lowercase();

        for term in terms {
            if title.contains(term) {
                score += TITLE_WEIGHT;
            }
            if brand.contains(term) {
                score += BRAND_WEIGHT;
            }
            if category.contains(term) {
                score += CATEGORY_WEIGHT;
            }
            if description.contains(term) {
                score += DESCRIPTION_WEIGHT;
            }
        }
        score
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn lexical_search(
        &self,
        query: &str,
        filter: Option<&RetrievalFilter>,
        skip: usize,
        limit: usize,
    ) -> Result<LexicalPage, StoreError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();

        let entries = self.entries.read().await;
        let mut hits: Vec<ScoredProduct> = entries
            .iter()
            .filter(|(product, _)| filter.map_or(true, |f| f.matches(product)))
            .map(|(product, _)| ScoredProduct {
                score: Self::lexical_score(product, &terms),
                product: product.clone(),
            })
            .filter(|hit| hit.score > 0.0)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });

        let total = hits.len() as u64;
        let hits = hits.into_iter().skip(skip).take(limit).collect();
        Ok(LexicalPage { hits, total })
    }

    async fn vector_search(
        &self,
        vector: &[f32],
        budget: usize,
    ) -> Result<Vec<ScoredProduct>, StoreError> {
        let entries = self.entries.read().await;
        let mut hits: Vec<ScoredProduct> = entries
            .iter()
            .map(|(product, embedding)| ScoredProduct {
                score: cosine(vector, embedding),
                product: product.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        hits.truncate(budget);
        Ok(hits)
    }
}
