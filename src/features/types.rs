use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::extract::{BureauReport, SalarySlip};

/// Behavioral indicators, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    SavingsRate,
    BillDiscipline,
    TransactionRegularity,
    SpendingVolatility,
    LifestyleRisk,
    SavingsBuffer,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::SavingsRate,
        Indicator::BillDiscipline,
        Indicator::TransactionRegularity,
        Indicator::SpendingVolatility,
        Indicator::LifestyleRisk,
        Indicator::SavingsBuffer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::SavingsRate => "savings_rate",
            Indicator::BillDiscipline => "bill_discipline",
            Indicator::TransactionRegularity => "transaction_regularity",
            Indicator::SpendingVolatility => "spending_volatility",
            Indicator::LifestyleRisk => "lifestyle_risk",
            Indicator::SavingsBuffer => "savings_buffer",
        }
    }

    /// Human label used in breakdowns
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::SavingsRate => "Savings rate",
            Indicator::BillDiscipline => "Bill discipline",
            Indicator::TransactionRegularity => "Transaction regularity",
            Indicator::SpendingVolatility => "Spending volatility",
            Indicator::LifestyleRisk => "Lifestyle risk",
            Indicator::SavingsBuffer => "Savings buffer",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Indicator::ALL.iter().find(|i| i.as_str() == s.trim()) {
            Some(indicator) => Ok(*indicator),
            None => bail!("Unknown indicator: {}", s),
        }
    }
}

/// A normalized indicator value, or the sentinel for "not enough data".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum FeatureValue {
    Known(f64),
    InsufficientData,
}

impl FeatureValue {
    /// Build a known value, clamped to [0, 1]. Non-finite input is the sentinel.
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            FeatureValue::Known(value.clamp(0.0, 1.0))
        } else {
            FeatureValue::InsufficientData
        }
    }

    pub fn known(&self) -> Option<f64> {
        match self {
            FeatureValue::Known(v) => Some(*v),
            FeatureValue::InsufficientData => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, FeatureValue::InsufficientData)
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::InsufficientData, FeatureValue::clamped)
    }
}

impl From<FeatureValue> for Option<f64> {
    fn from(value: FeatureValue) -> Self {
        value.known()
    }
}

/// Every indicator mapped to its value. Always complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<Indicator, FeatureValue>);

impl Default for FeatureVector {
    fn default() -> Self {
        Self(
            Indicator::ALL
                .iter()
                .map(|i| (*i, FeatureValue::InsufficientData))
                .collect(),
        )
    }
}

impl FeatureVector {
    pub fn set(&mut self, indicator: Indicator, value: FeatureValue) {
        self.0.insert(indicator, value);
    }

    pub fn get(&self, indicator: Indicator) -> FeatureValue {
        self.0
            .get(&indicator)
            .copied()
            .unwrap_or(FeatureValue::InsufficientData)
    }

    /// Indicators in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, FeatureValue)> + '_ {
        Indicator::ALL.iter().map(move |i| (*i, self.get(*i)))
    }

    /// SHA-256 of the canonical JSON form. Identical vectors share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let canonical: BTreeMap<&str, Option<f64>> = self
            .iter()
            .map(|(indicator, value)| (indicator.as_str(), value.known()))
            .collect();
        // A map of str to Option<f64> always serializes
        let json = serde_json::to_string(&canonical).unwrap_or_default();
        format!("{:x}", Sha256::digest(json.as_bytes()))
    }
}

/// Self-reported questionnaire answers plus the evaluation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BehavioralInputs {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    #[serde(default)]
    pub savings_amount: f64,
    #[serde(default)]
    pub late_payments_count: u32,
    #[serde(default)]
    pub lifestyle_answers: BTreeMap<String, String>,
    /// Instant the statement is evaluated against; never the wall clock.
    pub reference_now: DateTime<Utc>,
}

impl BehavioralInputs {
    /// Fold in figures read from a bureau report.
    ///
    /// The larger late payment count wins, so applying a report twice
    /// changes nothing.
    pub fn apply_bureau_report(&mut self, report: &BureauReport) {
        if let Some(late) = report.late_payments {
            self.late_payments_count = self.late_payments_count.max(late);
        }
    }

    /// Replace the stated income with the figure from a salary slip.
    pub fn apply_salary_slip(&mut self, slip: &SalarySlip) {
        if let Some(income) = slip.monthly_income() {
            self.monthly_income = income;
        }
    }
}
