use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::ScoringConfig;
use super::curve::Curve;
use super::validation::validate_scoring;
use crate::error::InvalidBureauScoreError;
use crate::features::{FeatureValue, FeatureVector, Indicator};

/// Rationale attached to a sub-score computed from the sentinel.
pub const INSUFFICIENT_DATA: &str = "insufficient_data";

pub const BUREAU_MIN: u32 = 300;
pub const BUREAU_MAX: u32 = 900;

/// One scored component of the hybrid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,        // e.g. "bureau", "savings_rate"
    pub input: Option<f64>,  // Raw input, None for the sentinel
    pub value: f64,          // 0-100
    pub weight: f64,         // Share in its parent score
    pub rationale: String,   // e.g. "0.400 on curve", "insufficient_data"
}

impl SubScore {
    pub fn is_insufficient(&self) -> bool {
        self.rationale == INSUFFICIENT_DATA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorComposite {
    pub value: f64,
    pub components: Vec<SubScore>,
}

#[derive(Debug, Clone)]
struct IndicatorCurve {
    weight: f64,
    curve: Curve,
}

/// Maps indicators and the bureau score onto 0-100 sub-scores.
#[derive(Debug, Clone)]
pub struct SubScoreCalculator {
    curves: BTreeMap<Indicator, IndicatorCurve>,
    neutral_score: f64,
    bureau_weight: f64,
}

impl SubScoreCalculator {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        validate_scoring(config).map_err(|errors| anyhow!(errors.join("; ")))?;

        let mut curves = BTreeMap::new();
        for (indicator, scoring) in &config.indicators {
            let curve = Curve::parse(&scoring.curve)
                .with_context(|| format!("Invalid curve for {}", indicator))?;
            curves.insert(
                *indicator,
                IndicatorCurve {
                    weight: scoring.weight,
                    curve,
                },
            );
        }

        Ok(Self {
            curves,
            neutral_score: config.neutral_score,
            bureau_weight: 0.4,
        })
    }

    /// Weight reported on the bureau sub-score; the fusion bureau weight.
    pub fn with_bureau_weight(mut self, weight: f64) -> Self {
        self.bureau_weight = weight;
        self
    }

    pub fn score_indicator(&self, indicator: Indicator, value: FeatureValue) -> SubScore {
        let (weight, curve) = match self.curves.get(&indicator) {
            Some(entry) => (entry.weight, Some(&entry.curve)),
            None => (0.0, None),
        };

        match (value, curve) {
            (FeatureValue::Known(x), Some(curve)) => {
                let score = curve.eval(x).clamp(0.0, 100.0);
                SubScore {
                    name: indicator.as_str().to_string(),
                    input: Some(x),
                    value: score,
                    weight,
                    rationale: format!("{:.3} on curve '{}'", x, curve),
                }
            }
            (FeatureValue::Known(x), None) => SubScore {
                name: indicator.as_str().to_string(),
                input: Some(x),
                value: self.neutral_score,
                weight,
                rationale: "not weighted".to_string(),
            },
            (FeatureValue::InsufficientData, _) => SubScore {
                name: indicator.as_str().to_string(),
                input: None,
                value: self.neutral_score,
                weight,
                rationale: INSUFFICIENT_DATA.to_string(),
            },
        }
    }

    pub fn score_bureau(&self, value: u32) -> Result<SubScore, InvalidBureauScoreError> {
        if !(BUREAU_MIN..=BUREAU_MAX).contains(&value) {
            return Err(InvalidBureauScoreError::OutOfRange(value));
        }
        let score = f64::from(value - BUREAU_MIN) / 6.0;
        Ok(SubScore {
            name: "bureau".to_string(),
            input: Some(f64::from(value)),
            value: score,
            weight: self.bureau_weight,
            rationale: format!("{} on the {}-{} scale", value, BUREAU_MIN, BUREAU_MAX),
        })
    }

    /// Score every indicator and combine them with the configured weights.
    pub fn composite(&self, features: &FeatureVector) -> BehaviorComposite {
        let components: Vec<SubScore> = features
            .iter()
            .map(|(indicator, value)| self.score_indicator(indicator, value))
            .collect();

        let total: f64 = components.iter().map(|c| c.weight * c.value).sum();
        let value = if total.is_finite() {
            total.clamp(0.0, 100.0)
        } else {
            self.neutral_score
        };

        debug!(
            "Behavior composite {:.2} from {} indicator(s)",
            value,
            components.len()
        );
        BehaviorComposite { value, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::IndicatorScoring;

    fn calculator() -> SubScoreCalculator {
        SubScoreCalculator::new(&ScoringConfig::default()).unwrap()
    }

    #[test]
    fn test_bureau_endpoints() {
        let calc = calculator();
        assert_eq!(calc.score_bureau(300).unwrap().value, 0.0);
        assert_eq!(calc.score_bureau(900).unwrap().value, 100.0);
        assert_eq!(calc.score_bureau(750).unwrap().value, 75.0);
    }

    #[test]
    fn test_bureau_monotonic() {
        let calc = calculator();
        let mut last = -1.0;
        for b in BUREAU_MIN..=BUREAU_MAX {
            let value = calc.score_bureau(b).unwrap().value;
            assert!(value >= last, "score dropped at {}", b);
            last = value;
        }
    }

    #[test]
    fn test_bureau_out_of_range() {
        let calc = calculator();
        assert_eq!(calc.score_bureau(0), Err(InvalidBureauScoreError::OutOfRange(0)));
        assert_eq!(calc.score_bureau(299), Err(InvalidBureauScoreError::OutOfRange(299)));
        assert_eq!(calc.score_bureau(901), Err(InvalidBureauScoreError::OutOfRange(901)));
    }

    #[test]
    fn test_bureau_weight_follows_fusion() {
        let calc = calculator().with_bureau_weight(0.3);
        assert_eq!(calc.score_bureau(600).unwrap().weight, 0.3);
    }

    #[test]
    fn test_sentinel_scores_neutral() {
        let sub = calculator().score_indicator(Indicator::SavingsRate, FeatureValue::InsufficientData);
        assert_eq!(sub.value, 50.0);
        assert_eq!(sub.rationale, INSUFFICIENT_DATA);
        assert!(sub.is_insufficient());
        assert_eq!(sub.input, None);
    }

    #[test]
    fn test_known_value_follows_curve() {
        let sub = calculator().score_indicator(Indicator::SavingsRate, FeatureValue::Known(0.2));
        assert_eq!(sub.value, 60.0);
        assert_eq!(sub.weight, 0.25);
        assert_eq!(sub.input, Some(0.2));
        assert!(!sub.is_insufficient());
    }

    #[test]
    fn test_composite_of_two_indicators() {
        // Identity curves, half weight each: 0.49 and 0.75 give 62
        let mut config = ScoringConfig::default();
        config.indicators = BTreeMap::from([
            (Indicator::SavingsRate, IndicatorScoring { weight: 0.5, curve: "0:0, 1:100".into() }),
            (Indicator::BillDiscipline, IndicatorScoring { weight: 0.5, curve: "0:0, 1:100".into() }),
        ]);
        let calc = SubScoreCalculator::new(&config).unwrap();

        let mut features = FeatureVector::default();
        features.set(Indicator::SavingsRate, FeatureValue::Known(0.49));
        features.set(Indicator::BillDiscipline, FeatureValue::Known(0.75));
        let composite = calc.composite(&features);

        assert!((composite.value - 62.0).abs() < 1e-9);
        assert_eq!(composite.components.len(), 6);
        assert_eq!(composite.components[2].weight, 0.0);
    }

    #[test]
    fn test_composite_all_insufficient_is_neutral() {
        let composite = calculator().composite(&FeatureVector::default());
        assert!((composite.value - 50.0).abs() < 1e-9);
        assert!(composite.components.iter().all(SubScore::is_insufficient));
    }

    #[test]
    fn test_composite_components_in_indicator_order() {
        let composite = calculator().composite(&FeatureVector::default());
        let names: Vec<&str> = composite.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "savings_rate",
                "bill_discipline",
                "transaction_regularity",
                "spending_volatility",
                "lifestyle_risk",
                "savings_buffer"
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScoringConfig::default();
        config
            .indicators
            .get_mut(&Indicator::SavingsRate)
            .unwrap()
            .curve = "nonsense".to_string();
        assert!(SubScoreCalculator::new(&config).is_err());
    }
}
