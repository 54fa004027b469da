//! Search orchestration
//!
//! [`SearchService`] wires intent extraction, filter building, the retrieval
//! strategies, reranking, and analytics into a single `search` call. It owns
//! no transport: callers hand it validated-enough requests and get back a
//! [`ResultPage`].

use crate::analytics::{AnalyticsRecorder, AnalyticsSnapshot};
use crate::config::{Config, ConfigValidator, SearchConfig};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SoukError};
use crate::intent::{IntentExtractor, LlmIntentExtractor};
use crate::query::FilterBuilder;
use crate::retrieval::{
    reconcile, HybridStrategy, Reranker, RerankingAdapter, ResultPage, SearchMode, TextStrategy,
    VectorStrategy,
};
use crate::storage::DocumentStore;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// One search call
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_mode")]
    pub mode: SearchMode,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_reranking")]
    pub use_reranking: bool,
}

fn default_mode() -> SearchMode {
    SearchMode::Hybrid
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

fn default_reranking() -> bool {
    true
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: default_mode(),
            page: default_page(),
            page_size: default_page_size(),
            use_reranking: default_reranking(),
        }
    }

    pub fn validate(&self, config: &SearchConfig) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SoukError::InvalidQuery("Query must not be empty".to_string()));
        }
        if self.query.chars().count() > config.max_query_len {
            return Err(SoukError::InvalidQuery(format!(
                "Query exceeds {} characters",
                config.max_query_len
            )));
        }
        if self.page == 0 {
            return Err(SoukError::InvalidQuery("Page numbers start at 1".to_string()));
        }
        if self.page_size == 0 || self.page_size > config.max_page_size {
            return Err(SoukError::InvalidQuery(format!(
                "Page size must be between 1 and {}",
                config.max_page_size
            )));
        }
        Ok(())
    }
}

/// The search pipeline, fully wired
pub struct SearchService {
    intent: IntentExtractor,
    text: TextStrategy,
    vector: VectorStrategy,
    hybrid: HybridStrategy,
    rerank: RerankingAdapter,
    analytics: Arc<AnalyticsRecorder>,
    builder: FilterBuilder,
    config: Config,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LlmIntentExtractor>>,
        reranker: Option<Arc<dyn Reranker>>,
        config: Config,
    ) -> Result<Self> {
        ConfigValidator::validate(&config)?;

        let text = TextStrategy::new(Arc::clone(&store), &config.search);
        let vector = VectorStrategy::new(
            store,
            embedder,
            &config.search,
            config.embedding.timeout_ms,
        );
        let hybrid = HybridStrategy::new(text.clone(), vector.clone(), &config.search);

        Ok(Self {
            intent: IntentExtractor::new(llm, config.intent.clone())?,
            text,
            vector,
            hybrid,
            rerank: RerankingAdapter::new(reranker, config.reranking.clone()),
            analytics: Arc::new(AnalyticsRecorder::new()),
            builder: FilterBuilder::new(),
            config,
        })
    }

    /// Run one search end to end
    pub async fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        request.validate(&self.config.search)?;
        let started = Instant::now();

        let intent = self.intent.parse(&request.query).await;
        let filter = self.builder.build(&intent, false);
        let text_query = self.builder.text_query(&intent);

        let outcome = match request.mode {
            SearchMode::Text => {
                self.text
                    .execute(&text_query, filter.as_ref(), request.page, request.page_size)
                    .await?
            }
            SearchMode::Vector => {
                self.vector
                    .execute(
                        intent.effective_query(),
                        filter.as_ref(),
                        request.page,
                        request.page_size,
                    )
                    .await?
            }
            SearchMode::Hybrid => {
                self.hybrid
                    .execute(
                        &text_query,
                        intent.effective_query(),
                        filter.as_ref(),
                        &intent,
                        request.page,
                        request.page_size,
                    )
                    .await?
            }
        };

        // Reranking sees the user's words, not the rewritten retrieval query
        let (results, reranked) = if request.use_reranking && outcome.candidates.len() > 1 {
            self.rerank.apply(&request.query, outcome.candidates).await
        } else {
            (outcome.candidates, false)
        };

        let execution_time = started.elapsed();
        let page = reconcile(
            &request.query,
            request.mode,
            results,
            outcome.total,
            request.page,
            request.page_size,
            reranked,
            execution_time,
        );

        self.analytics.record(request.mode, execution_time);
        tracing::info!(
            query = %request.query,
            mode = %request.mode,
            total = page.total,
            returned = page.returned,
            reranked = page.reranked,
            degraded = outcome.degraded,
            elapsed_ms = execution_time.as_millis() as u64,
            "Search completed"
        );

        Ok(page)
    }

    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.snapshot()
    }
}
