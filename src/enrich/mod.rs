//! Optional, best-effort enrichment of a feature vector by an external
//! insight service. Failures never stop a score from being produced.

pub mod cache;
pub mod config;
pub mod http;
pub mod response;
pub mod stub;

pub use cache::CachedEnricher;
pub use config::{EnrichmentConfig, EnrichmentProvider, ResponseLimits};
pub use http::HttpEnricher;
pub use stub::{DisabledEnricher, StubEnricher};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EnrichmentUnavailable;
use crate::features::FeatureVector;

/// What an enrichment service adds to a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub insights: Vec<String>,
    /// Points added to the behavioral score, bounded by the configured maximum
    pub adjustment: Option<f64>,
}

/// Enricher trait - every enrichment backend implements this
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Ask for insights about a feature vector.
    ///
    /// Only anonymized indicator values leave the process.
    async fn enrich(
        &self,
        features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable>;
}

#[async_trait]
impl<E: Enricher + ?Sized> Enricher for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn enrich(
        &self,
        features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
        (**self).enrich(features).await
    }
}

/// Build the backend named in configuration, wrapped in the fingerprint
/// cache when caching is on.
pub fn build_enricher(config: &EnrichmentConfig, use_cache: bool) -> Result<Box<dyn Enricher>> {
    let backend: Box<dyn Enricher> = match config.provider {
        EnrichmentProvider::Disabled => return Ok(Box::new(DisabledEnricher)),
        EnrichmentProvider::Stub => Box::new(StubEnricher::offline()),
        EnrichmentProvider::Http => Box::new(HttpEnricher::new(config)?),
    };

    if use_cache && config.cache {
        let ttl = humantime::parse_duration(config.cache_ttl.trim())?;
        Ok(Box::new(CachedEnricher::new(
            backend,
            cache::get_cache_path(),
            ttl,
        )))
    } else {
        Ok(backend)
    }
}
