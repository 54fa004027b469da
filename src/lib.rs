//! Souk - Hybrid Product Search
//!
//! A product catalog search library that answers free-text queries by
//! combining lexical search, dense vector similarity, and an externally
//! scored reranking step into one ranked, paginated result set, guided by
//! lightweight extraction of query intent (categories, colors, price bounds,
//! keywords).
//!
//! The document store, embedding generator, LLM intent extractor, and
//! reranker are collaborator traits; callers inject implementations and the
//! [`search::SearchService`] orchestrates them with fail-open semantics.

pub mod analytics;
pub mod config;
pub mod embedding;
pub mod error;
pub mod intent;
pub mod query;
pub mod retrieval;
pub mod search;
pub mod storage;

pub use error::{Result, SoukError};
pub use retrieval::{Candidate, ResultPage, SearchMode};
pub use search::{SearchRequest, SearchService};
