use serde::{Deserialize, Serialize};

use super::rate::LoanType;
use super::tier::RiskTier;
use crate::features::BehavioralInputs;

/// No loan should take more than this share of net income, whatever the tier.
const GLOBAL_EMI_CAP: f64 = 0.40;

/// Range of monthly EMI and principal a borrower can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affordability {
    pub loan_type: LoanType,
    pub risk_tier: RiskTier,
    pub tenure_months: u32,
    pub apr_mid: f64,
    pub emi_ratio_min: f64,
    pub emi_ratio_max: f64,
    pub tier_multiplier: f64,
    pub safe_emi_min: f64,
    pub safe_emi_max: f64,
    pub disposable_after_max_emi: f64,
    pub principal_min: f64,
    pub principal_max: f64,
}

pub fn tenure_months(loan_type: LoanType) -> u32 {
    match loan_type {
        LoanType::Home => 240,
        LoanType::Education => 84,
        LoanType::Vehicle => 60,
        LoanType::Business => 36,
        LoanType::Personal | LoanType::Gold | LoanType::Other => 24,
    }
}

/// Share of income a loan type's EMI may take, before the tier multiplier.
fn emi_ratio_band(loan_type: LoanType) -> (f64, f64) {
    match loan_type {
        LoanType::Home => (0.32, 0.40),
        LoanType::Gold => (0.30, 0.40),
        LoanType::Education => (0.30, 0.38),
        LoanType::Personal => (0.28, 0.35),
        LoanType::Vehicle => (0.28, 0.34),
        LoanType::Business | LoanType::Other => (0.25, 0.33),
    }
}

fn tier_multiplier(tier: RiskTier) -> f64 {
    match tier {
        RiskTier::Green => 1.0,
        RiskTier::Yellow => 0.85,
        RiskTier::Red => 0.65,
    }
}

/// Principal repaid by `emi` over `months` at `apr_percent`: the annuity present value.
pub fn principal_for_emi(emi: f64, apr_percent: f64, months: u32) -> f64 {
    if emi <= 0.0 || months == 0 {
        return 0.0;
    }
    let r = apr_percent / 100.0 / 12.0;
    if r <= 0.0 {
        return emi * f64::from(months);
    }
    emi * (1.0 - (1.0 + r).powi(-(months as i32))) / r
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn estimate_affordability(
    inputs: &BehavioralInputs,
    tier: RiskTier,
    loan_type: LoanType,
    apr_mid: f64,
) -> Affordability {
    let income = inputs.monthly_income.max(0.0);
    let disposable = (income - inputs.monthly_expenses.max(0.0)).max(0.0);

    let (band_min, band_max) = emi_ratio_band(loan_type);
    let multiplier = tier_multiplier(tier);
    let red_discount = if tier == RiskTier::Red { 0.9 } else { 1.0 };

    let ratio_max = (band_max * multiplier).min(GLOBAL_EMI_CAP);
    let ratio_min = (band_min * red_discount).min(ratio_max);

    // EMI can never eat into money already committed to expenses
    let safe_emi_max = (income * ratio_max).min(disposable);
    let safe_emi_min = (income * ratio_min).min(safe_emi_max);

    let tenure = tenure_months(loan_type);
    Affordability {
        loan_type,
        risk_tier: tier,
        tenure_months: tenure,
        apr_mid,
        emi_ratio_min: ratio_min,
        emi_ratio_max: ratio_max,
        tier_multiplier: multiplier,
        safe_emi_min: round2(safe_emi_min),
        safe_emi_max: round2(safe_emi_max),
        disposable_after_max_emi: round2(disposable - safe_emi_max),
        principal_min: round2(principal_for_emi(safe_emi_min, apr_mid, tenure)),
        principal_max: round2(principal_for_emi(safe_emi_max, apr_mid, tenure)),
    }
}
