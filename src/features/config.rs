use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for turning records and questionnaire answers into indicators.
///
/// Example YAML:
/// ```yaml
/// aggregation:
///   late_payment_reference: 6
///   late_fee_window: "90days"
///   min_regularity_records: 3
///   savings_buffer_months: 6
///   lifestyle:
///     housing:
///       weight: 0.2
///       answers: { own: 0.1, family: 0.3, rent: 0.5 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// Late payments at which bill discipline bottoms out
    pub late_payment_reference: f64,

    /// How far back late-fee records count, as a humantime duration
    pub late_fee_window: String,

    /// Fewest records for which regularity is meaningful
    pub min_regularity_records: usize,

    /// Months of expenses a full savings buffer covers
    pub savings_buffer_months: f64,

    /// Questionnaire risk table keyed by question id
    pub lifestyle: BTreeMap<String, LifestyleQuestion>,
}

/// One questionnaire question: its weight and the risk of each answer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LifestyleQuestion {
    pub weight: f64,
    pub answers: BTreeMap<String, f64>,
}

impl LifestyleQuestion {
    fn new(weight: f64, answers: &[(&str, f64)]) -> Self {
        Self {
            weight,
            answers: answers
                .iter()
                .map(|(answer, risk)| (answer.to_string(), *risk))
                .collect(),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        let lifestyle = [
            (
                "employment",
                LifestyleQuestion::new(
                    0.35,
                    &[
                        ("salaried", 0.1),
                        ("self_employed", 0.4),
                        ("gig", 0.6),
                        ("unemployed", 1.0),
                    ],
                ),
            ),
            (
                "housing",
                LifestyleQuestion::new(0.2, &[("own", 0.1), ("family", 0.3), ("rent", 0.5)]),
            ),
            (
                "dependents",
                LifestyleQuestion::new(
                    0.15,
                    &[("none", 0.1), ("one_two", 0.4), ("three_plus", 0.7)],
                ),
            ),
            (
                "credit_card_usage",
                LifestyleQuestion::new(
                    0.2,
                    &[
                        ("none", 0.3),
                        ("pays_full", 0.05),
                        ("pays_minimum", 0.7),
                        ("revolves", 0.9),
                    ],
                ),
            ),
            (
                "impulse_spending",
                LifestyleQuestion::new(
                    0.1,
                    &[("rarely", 0.1), ("sometimes", 0.5), ("often", 0.9)],
                ),
            ),
        ]
        .into_iter()
        .map(|(id, question)| (id.to_string(), question))
        .collect();

        Self {
            late_payment_reference: 6.0,
            late_fee_window: "90days".to_string(),
            min_regularity_records: 3,
            savings_buffer_months: 6.0,
            lifestyle,
        }
    }
}
