use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// How the hybrid score is rounded for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Nearest integer, halves away from zero
    #[default]
    Integer,
    TwoDecimals,
    None,
}

impl Rounding {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Rounding::Integer => value.round(),
            Rounding::TwoDecimals => (value * 100.0).round() / 100.0,
            Rounding::None => value,
        }
    }
}

/// Fusion weights and reporting rules.
///
/// Example YAML:
/// ```yaml
/// fusion:
///   bureau_weight: 0.4
///   behavior_weight: 0.6
///   rounding: integer
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    pub bureau_weight: f64,
    pub behavior_weight: f64,
    pub rounding: Rounding,

    /// Sub-scores below this get a tip when no enrichment insights exist
    pub insight_threshold: f64,

    /// Most rule-based tips per result
    pub max_rule_insights: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            bureau_weight: 0.4,
            behavior_weight: 0.6,
            rounding: Rounding::Integer,
            insight_threshold: 60.0,
            max_rule_insights: 2,
        }
    }
}

/// Validate fusion configuration, collecting every error.
pub fn validate_fusion(config: &FusionConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (name, weight) in [
        ("bureau_weight", config.bureau_weight),
        ("behavior_weight", config.behavior_weight),
    ] {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            errors.push(format!("fusion.{}: must be within 0-1", name));
        }
    }
    let total = config.bureau_weight + config.behavior_weight;
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(format!(
            "fusion: bureau_weight + behavior_weight must equal 1.0 (got {})",
            total
        ));
    }

    if !(0.0..=100.0).contains(&config.insight_threshold) {
        errors.push("fusion.insight_threshold: must be within 0-100".to_string());
    }
    if config.max_rule_insights == 0 {
        errors.push("fusion.max_rule_insights: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
