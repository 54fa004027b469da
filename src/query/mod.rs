//! Filter and query construction
//!
//! Turns a parsed [`SearchIntent`] into a backend-agnostic predicate tree and
//! a lexical query string. The same filter is handed to every retrieval
//! strategy for a given intent so cross-mode results stay consistent, and the
//! construction is a pure function of its inputs: identical intent and
//! strictness always produce a byte-identical filter. Reproducible pagination
//! depends on this.

use crate::intent::SearchIntent;
use crate::storage::Product;
use serde::{Deserialize, Serialize};

/// Product attribute a predicate applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
    Brand,
    Category,
    SubCategory,
    Color,
    SellingPrice,
    ListPrice,
}

/// Backend-agnostic AND/OR predicate tree
///
/// Document stores translate this into their native query language; the
/// vector strategy additionally evaluates it in-process via [`matches`]
/// because ANN backends return unfiltered candidate lists.
///
/// [`matches`]: RetrievalFilter::matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalFilter {
    /// Every child predicate must hold
    All(Vec<RetrievalFilter>),
    /// At least one child predicate must hold
    Any(Vec<RetrievalFilter>),
    /// Case-insensitive substring match on a text attribute
    Contains { field: Field, needle: String },
    /// Numeric attribute at most `limit` (inclusive)
    AtMost { field: Field, limit: f64 },
    /// Numeric attribute at least `limit` (inclusive)
    AtLeast { field: Field, limit: f64 },
}

impl RetrievalFilter {
    /// Evaluate the predicate tree against a product
    ///
    /// Missing attributes never match: a price bound on a product without a
    /// price excludes it, mirroring how stores treat absent fields.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            RetrievalFilter::All(children) => children.iter().all(|c| c.matches(product)),
            RetrievalFilter::Any(children) => children.iter().any(|c| c.matches(product)),
            RetrievalFilter::Contains { field, needle } => product
                .text_field(*field)
                .is_some_and(|value| value.to_lowercase().contains(needle)),
            RetrievalFilter::AtMost { field, limit } => product
                .numeric_field(*field)
                .is_some_and(|value| value <= *limit),
            RetrievalFilter::AtLeast { field, limit } => product
                .numeric_field(*field)
                .is_some_and(|value| value >= *limit),
        }
    }
}

/// Builds retrieval filters and lexical queries from intents
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder;

impl FilterBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the retrieval filter for an intent
    ///
    /// Category and price are hard constraints. Color only filters when
    /// `strict_color` is set; otherwise colors influence scoring alone.
    /// Returns `None` when the intent has no filterable structure, meaning
    /// retrieval runs unconstrained over the lexical/vector match itself.
    pub fn build(&self, intent: &SearchIntent, strict_color: bool) -> Option<RetrievalFilter> {
        let mut clauses = Vec::new();

        if !intent.categories.is_empty() {
            let mut category_clauses = Vec::new();
            for category in &intent.categories {
                for field in [Field::Category, Field::SubCategory, Field::Title] {
                    category_clauses.push(RetrievalFilter::Contains {
                        field,
                        needle: category.clone(),
                    });
                }
            }
            clauses.push(RetrievalFilter::Any(category_clauses));
        }

        if !intent.price.is_empty() {
            let mut price_clauses = Vec::new();
            for field in [Field::SellingPrice, Field::ListPrice] {
                let mut bounds = Vec::new();
                if let Some(under) = intent.price.under {
                    bounds.push(RetrievalFilter::AtMost {
                        field,
                        limit: under,
                    });
                }
                if let Some(above) = intent.price.above {
                    bounds.push(RetrievalFilter::AtLeast {
                        field,
                        limit: above,
                    });
                }
                price_clauses.push(collapse(RetrievalFilter::All(bounds)));
            }
            clauses.push(RetrievalFilter::Any(price_clauses));
        }

        if strict_color && !intent.colors.is_empty() {
            let mut color_clauses = Vec::new();
            for color in &intent.colors {
                for field in [Field::Title, Field::Color] {
                    color_clauses.push(RetrievalFilter::Contains {
                        field,
                        needle: color.clone(),
                    });
                }
            }
            clauses.push(RetrievalFilter::Any(color_clauses));
        }

        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(RetrievalFilter::All(clauses)),
        }
    }

    /// Build the lexical query string for an intent
    ///
    /// Keywords are the retrieval terms; a query with no surviving keywords
    /// falls back to a broad match on the normalized query text, which stores
    /// apply against title and description.
    pub fn text_query(&self, intent: &SearchIntent) -> String {
        if intent.keywords.is_empty() {
            intent.normalized_query.clone()
        } else {
            intent.keywords.join(" ")
        }
    }
}

/// Unwrap single-child conjunctions so equivalent intents serialize
/// identically.
fn collapse(filter: RetrievalFilter) -> RetrievalFilter {
    match filter {
        RetrievalFilter::All(mut children) if children.len() == 1 => children.remove(0),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::HeuristicParser;

    fn intent_for(query: &str) -> SearchIntent {
        HeuristicParser::new().unwrap().parse(query)
    }

    fn sample_product() -> Product {
        Product {
            id: "p1".to_string(),
            title: "Red Running Shoes".to_string(),
            brand: Some("Nike".to_string()),
            category: Some("Footwear".to_string()),
            sub_category: Some("Sports Shoes".to_string()),
            description: Some("Lightweight red mesh runners".to_string()),
            color: Some("Red".to_string()),
            selling_price: Some(450.0),
            list_price: Some(600.0),
            images: Vec::new(),
        }
    }

    #[test]
    fn build_is_deterministic() {
        let builder = FilterBuilder::new();
        let intent = intent_for("red nike shoes under 500 above 100");

        let first = serde_json::to_vec(&builder.build(&intent, false)).unwrap();
        for _ in 0..10 {
            let again = serde_json::to_vec(&builder.build(&intent, false)).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn category_and_price_are_hard_constraints() {
        let builder = FilterBuilder::new();
        let intent = intent_for("shoes under 500");
        let filter = builder.build(&intent, false).unwrap();

        let product = sample_product();
        assert!(filter.matches(&product));

        let mut expensive = sample_product();
        expensive.selling_price = Some(800.0);
        expensive.list_price = Some(900.0);
        assert!(!filter.matches(&expensive));

        let mut wrong_category = sample_product();
        wrong_category.title = "Red Cotton Saree".to_string();
        wrong_category.category = Some("Ethnic Wear".to_string());
        wrong_category.sub_category = None;
        assert!(!wrong_category.title.to_lowercase().contains("shoe"));
        assert!(!filter.matches(&wrong_category));
    }

    #[test]
    fn price_window_accepts_either_price_attribute() {
        let builder = FilterBuilder::new();
        let intent = intent_for("shoes under 500");
        let filter = builder.build(&intent, false).unwrap();

        // selling price over, list price within
        let mut product = sample_product();
        product.selling_price = Some(800.0);
        product.list_price = Some(480.0);
        assert!(filter.matches(&product));
    }

    #[test]
    fn color_is_soft_unless_strict() {
        let builder = FilterBuilder::new();
        let intent = intent_for("red shoes");

        let soft = builder.build(&intent, false).unwrap();
        let strict = builder.build(&intent, true).unwrap();

        let mut blue = sample_product();
        blue.title = "Blue Running Shoes".to_string();
        blue.color = Some("Blue".to_string());
        blue.description = Some("Lightweight mesh runners".to_string());

        assert!(soft.matches(&blue));
        assert!(!strict.matches(&blue));
    }

    #[test]
    fn no_structure_means_no_filter() {
        let builder = FilterBuilder::new();
        let intent = intent_for("something cozy");
        assert!(builder.build(&intent, false).is_none());
    }

    #[test]
    fn missing_price_never_matches_a_bound() {
        let builder = FilterBuilder::new();
        let intent = intent_for("shoes under 500");
        let filter = builder.build(&intent, false).unwrap();

        let mut unpriced = sample_product();
        unpriced.selling_price = None;
        unpriced.list_price = None;
        assert!(!filter.matches(&unpriced));
    }

    #[test]
    fn text_query_prefers_keywords() {
        let builder = FilterBuilder::new();

        let intent = intent_for("a red dress for the party");
        assert_eq!(builder.text_query(&intent), "red dress party");

        // Nothing survives stop-wording: fall back to the normalized query
        let sparse = intent_for("an it");
        assert_eq!(builder.text_query(&sparse), "an it");
    }

    #[test]
    fn single_clause_is_not_wrapped() {
        let builder = FilterBuilder::new();
        let intent = intent_for("shoes");
        let filter = builder.build(&intent, false).unwrap();
        assert!(matches!(filter, RetrievalFilter::Any(_)));
    }
}
