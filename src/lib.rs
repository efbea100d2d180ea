//! Hybrid credit scoring: fuse a bureau score with a behavioral score built
//! from a questionnaire and a parsed transaction history.

pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod features;
pub mod fusion;
pub mod lending;
pub mod output;
pub mod pipeline;
pub mod scoring;

pub use error::{
    EnrichmentUnavailable, ExtractionError, InvalidBureauScoreError, PipelineError, PipelineResult,
};
pub use pipeline::{ScoreReport, ScoreRequest, ScoringPipeline};

/// Install the rustls crypto provider (required for rustls 0.23+).
/// Safe to call more than once.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
