use super::config::ScoringConfig;
use super::curve::Curve;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !(0.0..=100.0).contains(&config.neutral_score) {
        errors.push("scoring.neutral_score: must be within 0-100".to_string());
    }

    if config.indicators.is_empty() {
        errors.push("scoring.indicators: at least one indicator must be configured".to_string());
    }

    for (indicator, scoring) in &config.indicators {
        if !scoring.weight.is_finite() || scoring.weight < 0.0 {
            errors.push(format!(
                "scoring.indicators.{}.weight: must be a non-negative number",
                indicator
            ));
        }
        if let Err(e) = Curve::parse(&scoring.curve) {
            errors.push(format!(
                "scoring.indicators.{}.curve: invalid '{}' - {}",
                indicator, scoring.curve, e
            ));
        }
    }

    let total: f64 = config.indicators.values().map(|s| s.weight).sum();
    if !config.indicators.is_empty() && (total - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(format!(
            "scoring.indicators: weights must sum to 1.0 (got {})",
            total
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Indicator;
    use crate::scoring::IndicatorScoring;
    use std::collections::BTreeMap;

    #[test]
    fn test_valid_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_curve_reports_path() {
        let mut config = ScoringConfig::default();
        config
            .indicators
            .get_mut(&Indicator::SavingsRate)
            .unwrap()
            .curve = "0:0, 2:100".to_string();
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("scoring.indicators.savings_rate.curve"));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = ScoringConfig::default();
        config
            .indicators
            .get_mut(&Indicator::LifestyleRisk)
            .unwrap()
            .weight = 0.5;
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("weights must sum to 1.0"));
    }

    #[test]
    fn test_all_errors_collected() {
        let config = ScoringConfig {
            neutral_score: 150.0,
            indicators: BTreeMap::from([(
                Indicator::SavingsRate,
                IndicatorScoring {
                    weight: -1.0,
                    curve: "bad".to_string(),
                },
            )]),
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("scoring.neutral_score"));
        assert!(errors[1].contains("scoring.indicators.savings_rate.weight"));
        assert!(errors[2].contains("scoring.indicators.savings_rate.curve"));
    }

    #[test]
    fn test_empty_indicators() {
        let config = ScoringConfig {
            neutral_score: 50.0,
            indicators: BTreeMap::new(),
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
