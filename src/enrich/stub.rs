use async_trait::async_trait;

use super::{Enricher, EnrichmentResult};
use crate::error::EnrichmentUnavailable;
use crate::features::FeatureVector;

/// Always answers with the same outcome.
#[derive(Debug, Clone)]
pub struct StubEnricher {
    outcome: Result<EnrichmentResult, EnrichmentUnavailable>,
}

impl StubEnricher {
    pub fn new(insights: Vec<String>, adjustment: Option<f64>) -> Self {
        Self {
            outcome: Ok(EnrichmentResult {
                insights,
                adjustment,
            }),
        }
    }

    pub fn failing(error: EnrichmentUnavailable) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// Canned advice for offline runs; no adjustment.
    pub fn offline() -> Self {
        Self::new(
            vec![
                "Automate bill payments so due dates are never missed.".to_string(),
                "Move a fixed share of salary into savings on payday.".to_string(),
            ],
            None,
        )
    }
}

#[async_trait]
impl Enricher for StubEnricher {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn enrich(
        &self,
        _features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
        self.outcome.clone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEnricher;

#[async_trait]
impl Enricher for DisabledEnricher {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn enrich(
        &self,
        _features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
        Err(EnrichmentUnavailable::Disabled)
    }
}
