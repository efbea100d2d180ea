pub mod config;
pub mod curve;
pub mod engine;
pub mod validation;

pub use config::*;
pub use curve::Curve;
pub use engine::{BehaviorComposite, SubScore, SubScoreCalculator, INSUFFICIENT_DATA};
pub use validation::validate_scoring;
