//! Cross-strategy score fusion and soft-preference boosting
//!
//! Lexical and vector scores live in incommensurate units, so each list is
//! min-max normalized before the weighted sum. A candidate present in only
//! one list keeps its own normalized score times its own weight; candidates
//! in both get the full blend. Color preferences never filter here, they
//! only multiply the fused score of well-matching candidates.

use crate::intent::SearchIntent;
use crate::retrieval::{sort_by_fused, Candidate};
use crate::storage::{Product, ScoredProduct};
use ahash::AHashMap;

/// Fusion weights for the two retrieval legs
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub text: f32,
    pub vector: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            text: 0.4,
            vector: 0.6,
        }
    }
}

/// Merge the two scored lists into fused candidates, sorted by fused score
/// descending with deterministic tie-breaks. Each input list is assumed
/// deduplicated by its strategy; ids shared across the lists merge.
pub fn fuse(
    text_hits: Vec<ScoredProduct>,
    vector_hits: Vec<ScoredProduct>,
    weights: FusionWeights,
) -> Vec<Candidate> {
    let text_hits = normalize(text_hits);
    let vector_hits = normalize(vector_hits);

    let mut merged: AHashMap<String, Candidate> = AHashMap::new();

    for (hit, norm) in text_hits {
        let fused = norm * weights.text;
        merged
            .entry(hit.product.id.clone())
            .and_modify(|existing| {
                if existing.text_score.map_or(true, |s| hit.score > s) {
                    existing.text_score = Some(hit.score);
                    existing.fused_score = existing.fused_score.max(fused);
                }
            })
            .or_insert_with(|| {
                let mut candidate = Candidate::from_text(hit.product, hit.score);
                candidate.fused_score = fused;
                candidate
            });
    }

    for (hit, norm) in vector_hits {
        let weighted = norm * weights.vector;
        match merged.entry(hit.product.id.clone()) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                let candidate = entry.get_mut();
                candidate.vector_score = Some(hit.score);
                let text_part = candidate
                    .text_score
                    .map(|_| candidate.fused_score)
                    .unwrap_or(0.0);
                candidate.fused_score = text_part + weighted;
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                let mut candidate = Candidate::from_vector(hit.product, hit.score);
                candidate.fused_score = weighted;
                entry.insert(candidate);
            }
        }
    }

    let mut candidates: Vec<Candidate> = merged.into_values().collect();
    sort_by_fused(&mut candidates);
    candidates
}

/// Min-max normalize native scores to [0, 1]
///
/// A constant list (including a single hit) maps to 1.0: the strategy ranked
/// those results best and fusion should not erase that.
fn normalize(hits: Vec<ScoredProduct>) -> Vec<(ScoredProduct, f32)> {
    let (min, max) = hits.iter().fold((f32::MAX, f32::MIN), |(lo, hi), hit| {
        (lo.min(hit.score), hi.max(hit.score))
    });
    let range = max - min;

    hits.into_iter()
        .map(|hit| {
            let norm = if range > 0.0 {
                (hit.score - min) / range
            } else {
                1.0
            };
            (hit, norm)
        })
        .collect()
}

/// Auxiliary relevance of a product against the intent, in [0, 1]
///
/// Weighted attribute matching: title keywords 0.3 each, categories 0.25,
/// brand keywords 0.1, colors 0.2, price window 0.2; the score is divided by
/// the maximum achievable for this intent.
pub fn relevance_score(product: &Product, intent: &SearchIntent) -> f32 {
    let mut score = 0.0f32;
    let mut max_score = 0.0f32;

    let title = product.title.to_lowercase();
    let category = product.category.as_deref().unwrap_or("").to_lowercase();
    let sub_category = product.sub_category.as_deref().unwrap_or("").to_lowercase();
    let brand = product.brand.as_deref().unwrap_or("").to_lowercase();
    let description = product.description.as_deref().unwrap_or("").to_lowercase();
    let color_attr = product.color.as_deref().unwrap_or("").to_lowercase();

    for keyword in &intent.keywords {
        max_score += 0.3;
        if title.contains(keyword) {
            score += 0.3;
        }
    }

    for cat in &intent.categories {
        max_score += 0.25;
        if category.contains(cat) || sub_category.contains(cat) || title.contains(cat) {
            score += 0.25;
        }
    }

    for keyword in &intent.keywords {
        if brand.contains(keyword) {
            max_score += 0.1;
            score += 0.1;
        }
    }

    for color in &intent.colors {
        max_score += 0.2;
        if title.contains(color) || description.contains(color) || color_attr.contains(color) {
            score += 0.2;
        }
    }

    if !intent.price.is_empty() {
        max_score += 0.2;
        if let Some(price) = product.effective_price() {
            if intent.price.contains(price) {
                score += 0.2;
            }
        }
    }

    if max_score > 0.0 {
        score / max_score
    } else {
        0.0
    }
}

/// Boost candidates whose auxiliary relevance clears the threshold, then
/// restore fused-score ordering. No-op when the intent has no colors: the
/// boost exists to surface color matches without hard-filtering on color.
pub(crate) fn apply_color_boost(
    candidates: &mut Vec<Candidate>,
    intent: &SearchIntent,
    boost: f32,
    threshold: f32,
) {
    if intent.colors.is_empty() || candidates.is_empty() {
        return;
    }

    for candidate in candidates.iter_mut() {
        if relevance_score(&candidate.product, intent) > threshold {
            candidate.fused_score *= boost;
        }
    }
    sort_by_fused(candidates);
}
