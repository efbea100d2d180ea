pub mod aggregate;
pub mod config;
pub mod stats;
pub mod types;

pub use aggregate::Aggregator;
pub use config::{AggregationConfig, LifestyleQuestion};
pub use types::{BehavioralInputs, FeatureValue, FeatureVector, Indicator};
