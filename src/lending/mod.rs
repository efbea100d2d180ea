//! Lender-facing guidance derived from a finished score.

pub mod affordability;
pub mod rate;
pub mod tier;

pub use affordability::{estimate_affordability, Affordability};
pub use rate::{recommend_rate, AprRange, LoanType, RateRecommendation};
pub use tier::RiskTier;

use serde::{Deserialize, Serialize};

use crate::features::BehavioralInputs;

/// Rate band plus affordability for one loan type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingGuidance {
    pub rate: RateRecommendation,
    pub affordability: Affordability,
}

pub fn guidance(inputs: &BehavioralInputs, tier: RiskTier, loan_type: LoanType) -> LendingGuidance {
    let rate = recommend_rate(tier, loan_type);
    let affordability = estimate_affordability(inputs, tier, loan_type, rate.apr_percent.mid());
    LendingGuidance {
        rate,
        affordability,
    }
}
