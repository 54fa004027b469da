//! Pagination reconciliation
//!
//! The strategies count under different guarantees: lexical totals are exact,
//! vector and hybrid totals are the size of an oversampled candidate set.
//! The reconciler turns either kind of total into consistent page metadata;
//! deep pages beyond the oversample horizon may under-report, which the
//! growing oversample budget mitigates.

use crate::retrieval::{Candidate, SearchMode};
use serde::Serialize;
use std::time::Duration;

/// The final, ordered result page for one search call
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage {
    pub results: Vec<Candidate>,
    /// Exact for text mode, oversample-bounded estimate otherwise
    pub total: u64,
    pub returned: usize,
    pub query: String,
    pub mode: SearchMode,
    /// Wall-clock execution time in seconds
    pub execution_time: f64,
    pub reranked: bool,
    pub page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slice one page out of an in-memory candidate list
pub(crate) fn paginate(candidates: Vec<Candidate>, page: usize, page_size: usize) -> Vec<Candidate> {
    let skip = (page - 1).saturating_mul(page_size);
    candidates.into_iter().skip(skip).take(page_size).collect()
}

/// Compute consistent page metadata for a page of candidates
#[allow(clippy::too_many_arguments)]
pub fn reconcile(
    query: &str,
    mode: SearchMode,
    candidates: Vec<Candidate>,
    total: u64,
    page: usize,
    page_size: usize,
    reranked: bool,
    execution_time: Duration,
) -> ResultPage {
    let total_pages = (total.div_ceil(page_size as u64).max(1)) as usize;
    ResultPage {
        returned: candidates.len(),
        results: candidates,
        total,
        query: query.to_string(),
        mode,
        execution_time: execution_time.as_secs_f64(),
        reranked,
        page,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(total: u64, page: usize, page_size: usize) -> ResultPage {
        reconcile(
            "q",
            SearchMode::Text,
            Vec::new(),
            total,
            page,
            page_size,
            false,
            Duration::from_millis(5),
        )
    }

    #[test]
    fn first_of_eight_pages() {
        let result = page_with(150, 1, 20);
        assert_eq!(result.total_pages, 8);
        assert!(result.has_next);
        assert!(!result.has_prev);
    }

    #[test]
    fn last_page_has_no_next() {
        let result = page_with(150, 8, 20);
        assert!(!result.has_next);
        assert!(result.has_prev);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let result = page_with(0, 1, 20);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_next);
        assert!(!result.has_prev);
    }

    #[test]
    fn exact_multiple_of_page_size() {
        let result = page_with(40, 2, 20);
        assert_eq!(result.total_pages, 2);
        assert!(!result.has_next);
    }

    #[test]
    fn paginate_slices_in_order() {
        let candidates: Vec<Candidate> = (0..5)
            .map(|i| {
                Candidate::from_text(
                    crate::storage::Product {
                        id: format!("p{i}"),
                        title: "Item".to_string(),
                        brand: None,
                        category: None,
                        sub_category: None,
                        description: None,
                        color: None,
                        selling_price: None,
                        list_price: None,
                        images: Vec::new(),
                    },
                    1.0,
                )
            })
            .collect();

        let second = paginate(candidates, 2, 2);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].product.id, "p2");

        let beyond = paginate(Vec::new(), 3, 2);
        assert!(beyond.is_empty());
    }
}
