use super::schema::Config;
use crate::enrich::EnrichmentProvider;
use crate::fusion::validate_fusion;
use crate::scoring::validate_scoring;

/// Validate the whole configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_scoring(&config.scoring) {
        errors.extend(e);
    }
    if let Err(e) = validate_fusion(&config.fusion) {
        errors.extend(e);
    }

    // Aggregation
    let aggregation = &config.aggregation;
    check_duration(&mut errors, "aggregation.late_fee_window", &aggregation.late_fee_window);
    if let Ok(window) = humantime::parse_duration(aggregation.late_fee_window.trim()) {
        if chrono::Duration::from_std(window).is_err() {
            errors.push(format!(
                "aggregation.late_fee_window: '{}' is too large",
                aggregation.late_fee_window
            ));
        }
    }
    if aggregation.late_payment_reference.is_nan() || aggregation.late_payment_reference <= 0.0 {
        errors.push("aggregation.late_payment_reference: must be positive".to_string());
    }
    if aggregation.min_regularity_records < 2 {
        errors.push("aggregation.min_regularity_records: must be at least 2".to_string());
    }
    if aggregation.savings_buffer_months.is_nan() || aggregation.savings_buffer_months <= 0.0 {
        errors.push("aggregation.savings_buffer_months: must be positive".to_string());
    }
    for (question, entry) in &aggregation.lifestyle {
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            errors.push(format!(
                "aggregation.lifestyle.{}.weight: must be a non-negative number",
                question
            ));
        }
        for (answer, risk) in &entry.answers {
            if !(0.0..=1.0).contains(risk) {
                errors.push(format!(
                    "aggregation.lifestyle.{}.answers.{}: risk must be within 0-1",
                    question, answer
                ));
            }
        }
    }

    // Enrichment
    let enrichment = &config.enrichment;
    if enrichment.provider == EnrichmentProvider::Http {
        match enrichment.endpoint.as_deref().map(str::trim) {
            None | Some("") => errors.push(
                "enrichment.endpoint: required when provider is http".to_string(),
            ),
            Some(endpoint) if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) => {
                errors.push(format!(
                    "enrichment.endpoint: '{}' must be an http(s) URL",
                    endpoint
                ));
            }
            Some(_) => {}
        }
    }
    check_duration(&mut errors, "enrichment.attempt_timeout", &enrichment.attempt_timeout);
    check_duration(&mut errors, "enrichment.total_timeout", &enrichment.total_timeout);
    check_duration(&mut errors, "enrichment.retry_backoff", &enrichment.retry_backoff);
    check_duration(&mut errors, "enrichment.cache_ttl", &enrichment.cache_ttl);
    if !enrichment.max_adjustment.is_finite() || enrichment.max_adjustment < 0.0 {
        errors.push("enrichment.max_adjustment: must be a non-negative number".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duration(errors: &mut Vec<String>, path: &str, value: &str) {
    if let Err(e) = humantime::parse_duration(value.trim()) {
        errors.push(format!("{}: invalid duration '{}' - {}", path, value, e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_errors_from_every_section() {
        let mut config = Config::default();
        config.scoring.neutral_score = -1.0;
        config.fusion.behavior_weight = 0.9;
        config.aggregation.late_fee_window = "ninety days".to_string();
        config.enrichment.provider = EnrichmentProvider::Http;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.starts_with("scoring.neutral_score")));
        assert!(errors.iter().any(|e| e.starts_with("fusion:")));
        assert!(errors.iter().any(|e| e.starts_with("aggregation.late_fee_window")));
        assert!(errors.iter().any(|e| e.starts_with("enrichment.endpoint")));
    }

    #[test]
    fn test_endpoint_must_be_http_url() {
        let mut config = Config::default();
        config.enrichment.provider = EnrichmentProvider::Http;
        config.enrichment.endpoint = Some("ftp://example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("http(s) URL"));
    }

    #[test]
    fn test_late_fee_window_range() {
        let mut config = Config::default();
        config.aggregation.late_fee_window = "1000000years".to_string();
        assert!(validate_config(&config).is_ok());
        assert!(crate::features::Aggregator::new(config.aggregation.clone()).is_ok());

        config.aggregation.late_fee_window = "500000000000years".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err()[0].starts_with("aggregation.late_fee_window"));
    }

    #[test]
    fn test_lifestyle_risk_bounds() {
        let mut config = Config::default();
        config
            .aggregation
            .lifestyle
            .get_mut("housing")
            .unwrap()
            .answers
            .insert("castle".to_string(), 1.5);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec!["aggregation.lifestyle.housing.answers.castle: risk must be within 0-1".to_string()]
        );
    }
}
