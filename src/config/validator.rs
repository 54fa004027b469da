use crate::config::Config;
use crate::error::{Result, SoukError, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_search(config, &mut errors);
        Self::validate_intent(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_reranking(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SoukError::ConfigValidation { errors })
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        let search = &config.search;

        if search.max_query_len == 0 {
            errors.push(ValidationError::new(
                "search.max_query_len",
                "Maximum query length must be greater than 0",
            ));
        }

        if search.default_page_size == 0 || search.default_page_size > search.max_page_size {
            errors.push(ValidationError::new(
                "search.default_page_size",
                format!(
                    "Default page size must be in 1..={}",
                    search.max_page_size
                ),
            ));
        }

        if search.max_page_size == 0 {
            errors.push(ValidationError::new(
                "search.max_page_size",
                "Maximum page size must be greater than 0",
            ));
        }

        if search.text_weight <= 0.0 || search.vector_weight <= 0.0 {
            errors.push(ValidationError::new(
                "search.text_weight",
                "Fusion weights must be positive",
            ));
        }

        if search.color_boost < 1.0 {
            errors.push(ValidationError::new(
                "search.color_boost",
                "Color boost must not penalize matching candidates",
            ));
        }

        if !(0.0..=1.0).contains(&search.color_boost_threshold) {
            errors.push(ValidationError::new(
                "search.color_boost_threshold",
                "Color boost threshold must be within 0.0..=1.0",
            ));
        }

        if search.vector_oversample_multiplier == 0 || search.hybrid_sample_multiplier == 0 {
            errors.push(ValidationError::new(
                "search.vector_oversample_multiplier",
                "Oversample multipliers must be at least 1",
            ));
        }

        if search.store_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "search.store_timeout_ms",
                "Store timeout must be greater than 0",
            ));
        }
    }

    fn validate_intent(config: &Config, errors: &mut Vec<ValidationError>) {
        if !(0.0..=1.0).contains(&config.intent.confidence_threshold) {
            errors.push(ValidationError::new(
                "intent.confidence_threshold",
                "Confidence threshold must be within 0.0..=1.0",
            ));
        }

        if config.intent.llm_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "intent.llm_timeout_ms",
                "LLM timeout must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Embedding dimension must be greater than 0",
            ));
        }

        if config.embedding.timeout_ms == 0 {
            errors.push(ValidationError::new(
                "embedding.timeout_ms",
                "Embedding timeout must be greater than 0",
            ));
        }
    }

    fn validate_reranking(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.reranking.timeout_ms == 0 {
            errors.push(ValidationError::new(
                "reranking.timeout_ms",
                "Reranking timeout must be greater than 0",
            ));
        }

        if config.reranking.max_candidates == 0 {
            errors.push(ValidationError::new(
                "reranking.max_candidates",
                "Reranking candidate limit must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_weights() {
        let mut config = Config::default();
        config.search.vector_weight = 0.0;

        let err = ConfigValidator::validate(&config).unwrap_err();
        match err {
            SoukError::ConfigValidation { errors } => {
                assert!(errors.iter().any(|e| e.path == "search.text_weight"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.intent.confidence_threshold = 1.5;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn collects_all_failures_at_once() {
        let mut config = Config::default();
        config.search.max_query_len = 0;
        config.embedding.dimension = 0;
        config.reranking.max_candidates = 0;

        match ConfigValidator::validate(&config).unwrap_err() {
            SoukError::ConfigValidation { errors } => assert!(errors.len() >= 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
