use anyhow::{anyhow, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use super::config::{validate_fusion, FusionConfig, Rounding};
use super::insights::rule_insights;
use crate::enrich::EnrichmentResult;
use crate::error::EnrichmentUnavailable;
use crate::lending::RiskTier;
use crate::scoring::{BehaviorComposite, SubScore};

/// Final output of one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridScoreResult {
    pub bureau_score: u32,
    pub behavior_score: f64,
    pub hybrid_score: f64,
    pub hybrid_on_bureau_scale: f64,
    pub risk_tier: RiskTier,
    pub enrichment_applied: bool,
    pub adjustment: Option<f64>,
    /// Why enrichment did not contribute, when it did not
    pub enrichment_note: Option<String>,
    pub breakdown: Vec<SubScore>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Result<Self> {
        validate_fusion(&config).map_err(|errors| anyhow!(errors.join("; ")))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn fuse(
        &self,
        bureau_value: u32,
        bureau: SubScore,
        behavior: BehaviorComposite,
        enrichment: &Result<EnrichmentResult, EnrichmentUnavailable>,
    ) -> HybridScoreResult {
        let adjustment = match enrichment {
            Ok(result) => result.adjustment.filter(|a| a.is_finite()),
            Err(_) => None,
        };

        let behavior_score = clamp_score(behavior.value + adjustment.unwrap_or(0.0));
        let bureau_score = clamp_score(bureau.value);
        let hybrid = clamp_score(
            self.config.bureau_weight * bureau_score + self.config.behavior_weight * behavior_score,
        );
        let on_bureau_scale = (300.0 + 6.0 * hybrid).clamp(300.0, 900.0);

        let hybrid_score = self.config.rounding.apply(hybrid);
        let hybrid_on_bureau_scale = self.config.rounding.apply(on_bureau_scale);
        let risk_tier = RiskTier::from_bureau_scale(hybrid_on_bureau_scale);

        let mut breakdown = Vec::with_capacity(behavior.components.len() + 1);
        breakdown.push(bureau);
        breakdown.extend(behavior.components);

        let insights = match enrichment {
            Ok(result) if !result.insights.is_empty() => result.insights.clone(),
            _ => rule_insights(
                &breakdown,
                self.config.insight_threshold,
                self.config.max_rule_insights,
            ),
        };

        debug!(
            "Fused bureau {:.2} and behavior {:.2} into {:.2} ({})",
            bureau_score, behavior_score, hybrid, risk_tier
        );

        HybridScoreResult {
            bureau_score: bureau_value,
            behavior_score: Rounding::TwoDecimals.apply(behavior_score),
            hybrid_score,
            hybrid_on_bureau_scale,
            risk_tier,
            enrichment_applied: enrichment.is_ok(),
            adjustment,
            enrichment_note: enrichment.as_ref().err().map(|e| e.to_string()),
            breakdown,
            insights,
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::insights::ALL_CLEAR;

    fn bureau(value: f64) -> SubScore {
        SubScore {
            name: "bureau".to_string(),
            input: None,
            value,
            weight: 0.4,
            rationale: String::new(),
        }
    }

    fn behavior(value: f64) -> BehaviorComposite {
        BehaviorComposite {
            value,
            components: vec![SubScore {
                name: "savings_rate".to_string(),
                input: Some(0.5),
                value,
                weight: 1.0,
                rationale: String::new(),
            }],
        }
    }

    fn engine() -> FusionEngine {
        FusionEngine::new(FusionConfig::default()).unwrap()
    }

    fn disabled() -> Result<EnrichmentResult, EnrichmentUnavailable> {
        Err(EnrichmentUnavailable::Disabled)
    }

    #[test]
    fn test_worked_example() {
        // Bureau 750 -> 75, behavior 62: 0.4 * 75 + 0.6 * 62 = 67.2
        let result = engine().fuse(750, bureau(75.0), behavior(62.0), &disabled());
        assert_eq!(result.hybrid_score, 67.0);
        assert_eq!(result.behavior_score, 62.0);
        assert_eq!(result.hybrid_on_bureau_scale, 703.0);
        assert_eq!(result.risk_tier, RiskTier::Yellow);
        assert!(!result.enrichment_applied);
        assert_eq!(result.enrichment_note.as_deref(), Some("enrichment is disabled"));
    }

    #[test]
    fn test_two_decimal_rounding() {
        let config = FusionConfig {
            rounding: Rounding::TwoDecimals,
            ..FusionConfig::default()
        };
        let engine = FusionEngine::new(config).unwrap();
        let result = engine.fuse(750, bureau(75.0), behavior(62.0), &disabled());
        assert_eq!(result.hybrid_score, 67.2);
    }

    #[test]
    fn test_adjustment_only_moves_behavior() {
        let enrichment = Ok(EnrichmentResult {
            insights: vec!["Tip from service".to_string()],
            adjustment: Some(5.0),
        });
        let result = engine().fuse(750, bureau(75.0), behavior(62.0), &enrichment);
        assert_eq!(result.behavior_score, 67.0);
        assert_eq!(result.breakdown[0].value, 75.0);
        // 0.4 * 75 + 0.6 * 67 = 70.2
        assert_eq!(result.hybrid_score, 70.0);
        assert!(result.enrichment_applied);
        assert_eq!(result.adjustment, Some(5.0));
        assert_eq!(result.insights, vec!["Tip from service".to_string()]);
    }

    #[test]
    fn test_adjusted_behavior_is_clamped() {
        let enrichment = Ok(EnrichmentResult {
            insights: vec![],
            adjustment: Some(5.0),
        });
        let result = engine().fuse(900, bureau(100.0), behavior(98.0), &enrichment);
        assert_eq!(result.behavior_score, 100.0);
        assert_eq!(result.hybrid_score, 100.0);
        assert_eq!(result.hybrid_on_bureau_scale, 900.0);
        assert_eq!(result.risk_tier, RiskTier::Green);
    }

    #[test]
    fn test_empty_enrichment_insights_fall_back_to_rules() {
        let enrichment = Ok(EnrichmentResult::default());
        let result = engine().fuse(900, bureau(100.0), behavior(95.0), &enrichment);
        assert_eq!(result.insights, vec![ALL_CLEAR.to_string()]);
    }

    #[test]
    fn test_failed_enrichment_uses_rule_insights() {
        let failure = Err(EnrichmentUnavailable::Timeout);
        let result = engine().fuse(320, bureau(3.33), behavior(20.0), &failure);
        assert_eq!(result.insights.len(), 2);
        assert!(result.insights[0].starts_with("Your bureau score"));
        assert_eq!(result.risk_tier, RiskTier::Red);
        assert_eq!(result.adjustment, None);
    }

    #[test]
    fn test_breakdown_starts_with_bureau() {
        let result = engine().fuse(600, bureau(50.0), behavior(50.0), &disabled());
        assert_eq!(result.breakdown[0].name, "bureau");
        assert_eq!(result.breakdown[1].name, "savings_rate");
    }

    #[test]
    fn test_bounds_hold_for_extremes() {
        let weights = [(0.0, 1.0), (1.0, 0.0), (0.25, 0.75), (0.4, 0.6), (0.5, 0.5)];
        let adjustments = [None, Some(-10.0), Some(10.0)];
        for (bureau_weight, behavior_weight) in weights {
            for rounding in [Rounding::Integer, Rounding::TwoDecimals] {
                let engine = FusionEngine::new(FusionConfig {
                    bureau_weight,
                    behavior_weight,
                    rounding,
                    ..FusionConfig::default()
                })
                .unwrap();
                for (score, b, v) in [(300, 0.0, 0.0), (900, 100.0, 100.0), (300, 0.0, 100.0), (900, 100.0, 0.0)] {
                    for adjustment in adjustments {
                        let enrichment = match adjustment {
                            None => disabled(),
                            Some(adj) => Ok(EnrichmentResult {
                                insights: vec![],
                                adjustment: Some(adj),
                            }),
                        };
                        let result = engine.fuse(score, bureau(b), behavior(v), &enrichment);
                        assert!(
                            (0.0..=100.0).contains(&result.hybrid_score),
                            "weights ({bureau_weight}, {behavior_weight}) gave {}",
                            result.hybrid_score
                        );
                        assert!((0.0..=100.0).contains(&result.behavior_score));
                        assert!((300.0..=900.0).contains(&result.hybrid_on_bureau_scale));
                        assert!(!result.insights.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let config = FusionConfig {
            bureau_weight: 0.7,
            ..FusionConfig::default()
        };
        assert!(FusionEngine::new(config).is_err());
    }
}
