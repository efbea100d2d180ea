use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, Utc};
use log::{debug, warn};
use std::collections::BTreeMap;

use super::config::AggregationConfig;
use super::stats::coefficient_of_variation;
use super::types::{BehavioralInputs, FeatureValue, FeatureVector, Indicator};
use crate::extract::{Category, TransactionRecord};

/// Derives the behavioral indicators from records and questionnaire answers.
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: AggregationConfig,
    late_fee_window: Duration,
}

impl Aggregator {
    pub fn new(config: AggregationConfig) -> Result<Self> {
        let window = humantime::parse_duration(config.late_fee_window.trim())
            .with_context(|| format!("Invalid late fee window '{}'", config.late_fee_window))?;
        let late_fee_window =
            Duration::from_std(window).context("Late fee window is too large")?;
        if config.late_payment_reference <= 0.0 {
            bail!("Late payment reference must be positive");
        }
        if config.min_regularity_records < 2 {
            bail!("Regularity needs at least 2 records");
        }
        Ok(Self {
            config,
            late_fee_window,
        })
    }

    pub fn aggregate(
        &self,
        records: &[TransactionRecord],
        inputs: &BehavioralInputs,
    ) -> FeatureVector {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.amount.total_cmp(&b.amount))
                .then_with(|| a.counterparty.cmp(&b.counterparty))
        });

        let mut vector = FeatureVector::default();
        vector.set(Indicator::SavingsRate, savings_rate(inputs));
        vector.set(Indicator::BillDiscipline, self.bill_discipline(&sorted, inputs));
        vector.set(Indicator::TransactionRegularity, self.regularity(&sorted));
        vector.set(Indicator::SpendingVolatility, spending_volatility(&sorted));
        vector.set(Indicator::LifestyleRisk, self.lifestyle_risk(inputs));
        vector.set(Indicator::SavingsBuffer, self.savings_buffer(inputs));

        debug!(
            "Aggregated {} record(s) into features: {}",
            sorted.len(),
            vector
                .iter()
                .map(|(i, v)| match v.known() {
                    Some(x) => format!("{}={:.3}", i, x),
                    None => format!("{}=n/a", i),
                })
                .collect::<Vec<_>>()
                .join(", ")
        );
        vector
    }

    fn bill_discipline(
        &self,
        sorted: &[TransactionRecord],
        inputs: &BehavioralInputs,
    ) -> FeatureValue {
        // A window reaching past the calendar's start covers all history
        let window_start = inputs
            .reference_now
            .checked_sub_signed(self.late_fee_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let late_fees = sorted
            .iter()
            .filter(|r| r.category == Category::LateFee)
            .filter(|r| r.timestamp > window_start && r.timestamp <= inputs.reference_now)
            .count();
        let late = f64::from(inputs.late_payments_count) + late_fees as f64;
        FeatureValue::clamped(1.0 - (late / self.config.late_payment_reference).min(1.0))
    }

    fn regularity(&self, sorted: &[TransactionRecord]) -> FeatureValue {
        if sorted.len() < self.config.min_regularity_records {
            return FeatureValue::InsufficientData;
        }
        let gaps: Vec<f64> = sorted
            .windows(2)
            .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64)
            .collect();
        match coefficient_of_variation(&gaps) {
            Some(cv) => FeatureValue::clamped(1.0 / (1.0 + cv)),
            None => FeatureValue::InsufficientData,
        }
    }

    fn lifestyle_risk(&self, inputs: &BehavioralInputs) -> FeatureValue {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for (question, answer) in &inputs.lifestyle_answers {
            let Some(entry) = self.config.lifestyle.get(question.trim()) else {
                warn!("Ignoring unknown lifestyle question '{}'", question);
                continue;
            };
            let normalized = answer.trim().to_lowercase().replace([' ', '-'], "_");
            let Some(risk) = entry.answers.get(&normalized) else {
                warn!(
                    "Ignoring unknown answer '{}' to lifestyle question '{}'",
                    answer, question
                );
                continue;
            };
            weighted += entry.weight * risk;
            total_weight += entry.weight;
        }

        if total_weight <= 0.0 {
            return FeatureValue::InsufficientData;
        }
        FeatureValue::clamped(weighted / total_weight)
    }

    fn savings_buffer(&self, inputs: &BehavioralInputs) -> FeatureValue {
        if inputs.monthly_expenses.is_nan() || inputs.monthly_expenses <= 0.0 {
            return FeatureValue::InsufficientData;
        }
        let target = inputs.monthly_expenses * self.config.savings_buffer_months;
        FeatureValue::clamped(inputs.savings_amount / target)
    }
}

fn savings_rate(inputs: &BehavioralInputs) -> FeatureValue {
    if inputs.monthly_income.is_nan() || inputs.monthly_income <= 0.0 {
        return FeatureValue::InsufficientData;
    }
    FeatureValue::clamped((inputs.monthly_income - inputs.monthly_expenses) / inputs.monthly_income)
}

fn spending_volatility(sorted: &[TransactionRecord]) -> FeatureValue {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in sorted.iter().filter(|r| r.is_debit()) {
        let key = (record.timestamp.year(), record.timestamp.month());
        *months.entry(key).or_default() += -record.amount;
    }
    // Refunds only reduce months that already have spending
    for record in sorted.iter().filter(|r| !r.is_debit()) {
        if matches!(record.category, Category::Salary | Category::Transfer) {
            continue;
        }
        let key = (record.timestamp.year(), record.timestamp.month());
        if let Some(spend) = months.get_mut(&key) {
            *spend -= record.amount;
        }
    }

    let spends: Vec<f64> = months.values().map(|s| s.max(0.0)).collect();
    if spends.len() < 2 {
        return FeatureValue::InsufficientData;
    }
    match coefficient_of_variation(&spends) {
        Some(cv) => FeatureValue::clamped(cv.min(1.0)),
        None => FeatureValue::InsufficientData,
    }
}
