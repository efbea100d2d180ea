pub mod config;
pub mod engine;
pub mod insights;

pub use config::{validate_fusion, FusionConfig, Rounding};
pub use engine::{FusionEngine, HybridScoreResult};
pub use insights::{add_utilization_tip, rule_insights};
