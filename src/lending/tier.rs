use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Green,
    Yellow,
    Red,
}

impl RiskTier {
    /// Band a score expressed on the 300-900 bureau scale.
    pub fn from_bureau_scale(score: f64) -> Self {
        if score >= 750.0 {
            RiskTier::Green
        } else if score >= 650.0 {
            RiskTier::Yellow
        } else {
            RiskTier::Red
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Green => "Low risk",
            RiskTier::Yellow => "Medium risk",
            RiskTier::Red => "High risk",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Green => write!(f, "green"),
            RiskTier::Yellow => write!(f, "yellow"),
            RiskTier::Red => write!(f, "red"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskTier::from_bureau_scale(900.0), RiskTier::Green);
        assert_eq!(RiskTier::from_bureau_scale(750.0), RiskTier::Green);
        assert_eq!(RiskTier::from_bureau_scale(749.0), RiskTier::Yellow);
        assert_eq!(RiskTier::from_bureau_scale(650.0), RiskTier::Yellow);
        assert_eq!(RiskTier::from_bureau_scale(649.99), RiskTier::Red);
        assert_eq!(RiskTier::from_bureau_scale(300.0), RiskTier::Red);
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskTier::Yellow).unwrap(), "\"yellow\"");
    }
}
