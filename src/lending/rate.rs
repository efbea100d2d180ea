use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::tier::RiskTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Personal,
    Home,
    Gold,
    Vehicle,
    Education,
    Business,
    Other,
}

impl LoanType {
    pub const ALL: [LoanType; 7] = [
        LoanType::Personal,
        LoanType::Home,
        LoanType::Gold,
        LoanType::Vehicle,
        LoanType::Education,
        LoanType::Business,
        LoanType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Personal => "personal",
            LoanType::Home => "home",
            LoanType::Gold => "gold",
            LoanType::Vehicle => "vehicle",
            LoanType::Education => "education",
            LoanType::Business => "business",
            LoanType::Other => "other",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match LoanType::ALL.iter().find(|t| t.as_str() == s) {
            Some(loan_type) => Ok(*loan_type),
            None => bail!(
                "Unknown loan type '{}' (expected one of: {})",
                s,
                LoanType::ALL.map(|t| t.as_str()).join(", ")
            ),
        }
    }
}

/// APR range in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AprRange {
    pub min: f64,
    pub max: f64,
}

impl AprRange {
    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecommendation {
    pub risk_tier: RiskTier,
    pub loan_type: LoanType,
    pub apr_percent: AprRange,
}

/// Indicative APR band for a tier and loan type. Secured loans price lower.
pub fn recommend_rate(tier: RiskTier, loan_type: LoanType) -> RateRecommendation {
    use LoanType::*;
    use RiskTier::*;

    let (min, max) = match (loan_type, tier) {
        (Home, Green) => (8.5, 10.5),
        (Home, Yellow) => (10.5, 13.0),
        (Home, Red) => (13.5, 16.5),
        (Gold, Green) => (9.5, 12.0),
        (Gold, Yellow) => (12.0, 15.0),
        (Gold, Red) => (16.0, 22.0),
        (Vehicle, Green) => (9.5, 12.0),
        (Vehicle, Yellow) => (12.0, 16.0),
        (Vehicle, Red) => (17.0, 23.0),
        (Education, Green) => (10.0, 12.5),
        (Education, Yellow) => (12.5, 16.5),
        (Education, Red) => (18.0, 24.0),
        (Business, Green) => (12.0, 15.0),
        (Business, Yellow) => (15.0, 20.0),
        (Business, Red) => (22.0, 30.0),
        (Personal | Other, Green) => (11.0, 13.0),
        (Personal | Other, Yellow) => (14.0, 18.0),
        (Personal | Other, Red) => (20.0, 28.0),
    };

    RateRecommendation {
        risk_tier: tier,
        loan_type,
        apr_percent: AprRange { min, max },
    }
}
