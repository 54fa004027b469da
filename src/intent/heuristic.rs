//! Heuristic intent parser
//!
//! Vocabulary-and-regex extraction of categories, colors, price bounds,
//! keywords, brands, and sizes. This is the path of last resort and must
//! always produce an intent, so it only uses fixed tables and pre-compiled
//! patterns. Heuristic intents carry confidence 1.0: the parser is certain
//! about what it matched, even if it understood less of the query than an
//! LLM would.

use crate::error::{Result, SoukError};
use crate::intent::{IntentSource, PriceBounds, SearchIntent};
use regex::Regex;
use std::collections::BTreeSet;

/// Canonical category to synonym table; matching is case-insensitive
/// substring, multiple categories may match one query.
const CATEGORY_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "shirt",
        &["shirt", "shirts", "tshirt", "t-shirt", "top", "blouse", "polo"],
    ),
    (
        "pant",
        &["pant", "pants", "trouser", "trousers", "jeans", "bottoms", "chinos"],
    ),
    ("dress", &["dress", "gown", "frock", "maxi", "midi"]),
    (
        "shoes",
        &["shoe", "shoes", "footwear", "sneaker", "sneakers", "boots", "sandals"],
    ),
    ("jacket", &["jacket", "blazer", "coat", "outerwear", "hoodie"]),
];

const COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "black", "white", "pink", "purple", "orange", "brown",
    "gray", "grey", "navy", "maroon",
];

const STOP_WORDS: &[&str] = &[
    "for", "and", "the", "a", "an", "in", "on", "at", "to", "is", "are", "with",
];

const BRANDS: &[&str] = &["nike", "adidas", "puma", "reebok", "levis", "zara"];

/// Which price bucket a pattern feeds
#[derive(Debug, Clone, Copy)]
enum PriceBucket {
    Under,
    Above,
}

/// Heuristic parser with pre-compiled patterns
pub struct HeuristicParser {
    price_patterns: Vec<(PriceBucket, Regex)>,
    word: Regex,
    size_words: Regex,
    size_numeric: Regex,
}

impl HeuristicParser {
    pub fn new() -> Result<Self> {
        // Natural-language forms first, then symbolic. `<=` and `>=` must
        // come before `<` and `>` so the inclusive forms win the match.
        let patterns: &[(PriceBucket, &str)] = &[
            (PriceBucket::Under, r"under\s+(?:rs\.?\s*)?(\d+)"),
            (PriceBucket::Under, r"below\s+(?:rs\.?\s*)?(\d+)"),
            (PriceBucket::Under, r"less\s+than\s+(?:rs\.?\s*)?(\d+)"),
            (PriceBucket::Above, r"above\s+(?:rs\.?\s*)?(\d+)"),
            (PriceBucket::Above, r"over\s+(?:rs\.?\s*)?(\d+)"),
            (PriceBucket::Under, r"<=\s*(\d+)"),
            (PriceBucket::Above, r">=\s*(\d+)"),
            (PriceBucket::Under, r"<\s*(\d+)"),
            (PriceBucket::Above, r">\s*(\d+)"),
        ];

        let price_patterns = patterns
            .iter()
            .map(|(bucket, pattern)| Ok((*bucket, Self::compile(pattern)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            price_patterns,
            word: Self::compile(r"\b\w+\b")?,
            size_words: Self::compile(r"\b(xs|s|m|l|xl|xxl|xxxl)\b")?,
            size_numeric: Self::compile(r"\b(\d{2,3})\b")?,
        })
    }

    fn compile(pattern: &str) -> Result<Regex> {
        Regex::new(pattern)
            .map_err(|e| SoukError::Config(format!("Invalid intent pattern '{pattern}': {e}")))
    }

    /// Parse a query into an intent; never fails
    pub fn parse(&self, query: &str) -> SearchIntent {
        let normalized = query.to_lowercase().trim().to_string();

        let categories = self.extract_categories(&normalized);
        let colors = self.extract_colors(&normalized);
        let price = self.extract_price(&normalized);
        let keywords = self.extract_keywords(&normalized);
        let brands = self.extract_brands(&normalized);
        let sizes = self.extract_sizes(&normalized);

        SearchIntent {
            original_query: query.to_string(),
            normalized_query: normalized,
            rephrased_query: None,
            categories,
            colors,
            price,
            keywords,
            brands,
            sizes,
            confidence: 1.0,
            source: IntentSource::Heuristic,
        }
    }

    fn extract_categories(&self, query: &str) -> BTreeSet<String> {
        CATEGORY_SYNONYMS
            .iter()
            .filter(|(_, synonyms)| synonyms.iter().any(|s| query.contains(s)))
            .map(|(category, _)| category.to_string())
            .collect()
    }

    fn extract_colors(&self, query: &str) -> BTreeSet<String> {
        COLORS
            .iter()
            .filter(|color| query.contains(*color))
            .map(|color| color.to_string())
            .collect()
    }

    fn extract_price(&self, query: &str) -> PriceBounds {
        let mut price = PriceBounds::default();
        for (bucket, pattern) in &self.price_patterns {
            if let Some(caps) = pattern.captures(query) {
                if let Ok(value) = caps[1].parse::<f64>() {
                    match bucket {
                        PriceBucket::Under => price.under = Some(value),
                        PriceBucket::Above => price.above = Some(value),
                    }
                }
            }
        }
        price
    }

    fn extract_keywords(&self, query: &str) -> Vec<String> {
        self.word
            .find_iter(query)
            .map(|m| m.as_str())
            .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
            .map(|word| word.to_string())
            .collect()
    }

    fn extract_brands(&self, query: &str) -> BTreeSet<String> {
        BRANDS
            .iter()
            .filter(|brand| query.contains(*brand))
            .map(|brand| brand.to_string())
            .collect()
    }

    fn extract_sizes(&self, query: &str) -> BTreeSet<String> {
        let mut sizes: BTreeSet<String> = self
            .size_words
            .captures_iter(query)
            .map(|caps| caps[1].to_string())
            .collect();
        sizes.extend(
            self.size_numeric
                .captures_iter(query)
                .map(|caps| caps[1].to_string()),
        );
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> HeuristicParser {
        HeuristicParser::new().unwrap()
    }

    #[test]
    fn red_shoes_under_500() {
        let intent = parser().parse("red shoes under 500");

        assert!(intent.categories.contains("shoes"));
        assert!(intent.colors.contains("red"));
        assert_eq!(intent.price.under, Some(500.0));
        assert_eq!(intent.price.above, None);
        assert_eq!(intent.source, IntentSource::Heuristic);
        assert_eq!(intent.confidence, 1.0);
    }

    #[test]
    fn shirt_above_600() {
        let intent = parser().parse("shirt above 600");

        assert!(intent.categories.contains("shirt"));
        assert_eq!(intent.price.above, Some(600.0));
        assert_eq!(intent.price.under, None);
    }

    #[test]
    fn symbolic_price_forms() {
        let p = parser();

        assert_eq!(p.parse("jeans < 1000").price.under, Some(1000.0));
        assert_eq!(p.parse("jeans <= 1000").price.under, Some(1000.0));
        assert_eq!(p.parse("jeans >200").price.above, Some(200.0));
        assert_eq!(p.parse("jeans >= 200").price.above, Some(200.0));
    }

    #[test]
    fn currency_prefix_is_ignored() {
        let intent = parser().parse("dress under rs. 2500");
        assert_eq!(intent.price.under, Some(2500.0));
    }

    #[test]
    fn both_bounds_form_a_window() {
        let intent = parser().parse("sneakers above 500 under 2000");
        assert_eq!(intent.price.above, Some(500.0));
        assert_eq!(intent.price.under, Some(2000.0));
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        let intent = parser().parse("a red dress for the party");
        assert_eq!(intent.keywords, vec!["red", "dress", "party"]);
    }

    #[test]
    fn category_synonyms_match() {
        let p = parser();
        assert!(p.parse("mens t-shirt").categories.contains("shirt"));
        assert!(p.parse("running sneakers").categories.contains("shoes"));
        assert!(p.parse("winter hoodie").categories.contains("jacket"));
    }

    #[test]
    fn multiple_categories_allowed() {
        let intent = parser().parse("shirt and jeans combo");
        assert!(intent.categories.contains("shirt"));
        assert!(intent.categories.contains("pant"));
    }

    #[test]
    fn brands_and_sizes() {
        let intent = parser().parse("nike shoes size xl 42");
        assert!(intent.brands.contains("nike"));
        assert!(intent.sizes.contains("xl"));
        assert!(intent.sizes.contains("42"));
    }

    #[test]
    fn parse_is_deterministic() {
        let p = parser();
        let query = "blue nike sneakers under 3000 size 42";
        assert_eq!(p.parse(query), p.parse(query));
    }
}
