//! Best-effort search analytics
//!
//! Process-wide counters updated once per completed search. The recorder is
//! an explicitly owned component injected into the orchestrator; updates are
//! serialized behind a mutex so concurrent searches never lose counts. The
//! running average is approximate under concurrency, lost increments are not
//! acceptable.

use crate::retrieval::SearchMode;
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

/// Point-in-time copy of the analytics counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_searches: u64,
    /// Running average of search execution time, in seconds
    pub avg_response_time: f64,
    pub text_searches: u64,
    pub vector_searches: u64,
    pub hybrid_searches: u64,
}

/// Owner of the mutable analytics state
///
/// The lock is held only for the in-memory update, never across an await
/// point or a network call.
#[derive(Debug, Default)]
pub struct AnalyticsRecorder {
    inner: Mutex<AnalyticsSnapshot>,
}

impl AnalyticsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed search (successful or degraded)
    pub fn record(&self, mode: SearchMode, execution_time: Duration) {
        let mut stats = match self.inner.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic mid-update; the counters are
            // still usable, so keep recording
            Err(poisoned) => poisoned.into_inner(),
        };

        stats.total_searches += 1;
        let n = stats.total_searches as f64;
        let secs = execution_time.as_secs_f64();
        stats.avg_response_time += (secs - stats.avg_response_time) / n;

        match mode {
            SearchMode::Text => stats.text_searches += 1,
            SearchMode::Vector => stats.vector_searches += 1,
            SearchMode::Hybrid => stats.hybrid_searches += 1,
        }
    }

    /// Copy out the current counters
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
