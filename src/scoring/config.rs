use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::features::Indicator;

/// Main scoring configuration.
///
/// Each behavioral indicator carries a composite weight and a
/// piecewise-linear curve that maps its [0, 1] value onto 0-100.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   neutral_score: 50
///   indicators:
///     savings_rate:
///       weight: 0.25
///       curve: "0:0, 0.1:40, 0.2:60, 0.3:80, 0.5:100"
///     bill_discipline:
///       weight: 0.25
///       curve: "0:0, 0.5:30, 0.8:70, 1:100"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Score given to an indicator without enough data (default: 50)
    pub neutral_score: f64,

    /// Weight and curve per indicator. Indicators left out carry no weight.
    pub indicators: BTreeMap<Indicator, IndicatorScoring>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndicatorScoring {
    /// Share of the behavioral composite; all weights sum to 1
    pub weight: f64,

    /// Breakpoints as "x:y, x:y, ..." with x increasing in 0-1, y in 0-100
    pub curve: String,
}

impl IndicatorScoring {
    fn new(weight: f64, curve: &str) -> Self {
        Self {
            weight,
            curve: curve.to_string(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let indicators = BTreeMap::from([
            (
                Indicator::SavingsRate,
                IndicatorScoring::new(0.25, "0:0, 0.1:40, 0.2:60, 0.3:80, 0.5:100"),
            ),
            (
                Indicator::BillDiscipline,
                IndicatorScoring::new(0.25, "0:0, 0.5:30, 0.8:70, 1:100"),
            ),
            (
                Indicator::TransactionRegularity,
                IndicatorScoring::new(0.15, "0:0, 0.5:50, 1:100"),
            ),
            (
                Indicator::SpendingVolatility,
                IndicatorScoring::new(0.15, "0:100, 0.25:75, 0.5:40, 1:0"),
            ),
            (
                Indicator::LifestyleRisk,
                IndicatorScoring::new(0.10, "0:100, 0.5:50, 1:0"),
            ),
            (
                Indicator::SavingsBuffer,
                IndicatorScoring::new(0.10, "0:0, 0.5:50, 1:100"),
            ),
        ]);

        Self {
            neutral_score: 50.0,
            indicators,
        }
    }
}
