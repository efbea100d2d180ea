use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::features::BehavioralInputs;

/// On-disk applicant profile. `reference_now` may be left out, in which
/// case the caller supplies the evaluation instant.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    monthly_income: f64,
    monthly_expenses: f64,
    #[serde(default)]
    savings_amount: f64,
    #[serde(default)]
    late_payments_count: u32,
    #[serde(default)]
    lifestyle_answers: BTreeMap<String, String>,
    #[serde(default)]
    reference_now: Option<DateTime<Utc>>,
}

/// Parse a profile from YAML (or JSON) text.
pub fn parse_profile(content: &str, now: DateTime<Utc>) -> Result<BehavioralInputs> {
    let file: ProfileFile = serde_saphyr::from_str(content).context("Invalid profile")?;
    Ok(BehavioralInputs {
        monthly_income: file.monthly_income,
        monthly_expenses: file.monthly_expenses,
        savings_amount: file.savings_amount,
        late_payments_count: file.late_payments_count,
        lifestyle_answers: file.lifestyle_answers,
        reference_now: file.reference_now.unwrap_or(now),
    })
}

/// Load the applicant profile at `path`.
pub fn load_profile(path: &Path, now: DateTime<Utc>) -> Result<BehavioralInputs> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile at {}", path.display()))?;
    parse_profile(&content, now).with_context(|| format!("in {}", path.display()))
}
