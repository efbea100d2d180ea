use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;

use super::config::{EnrichmentConfig, ResponseLimits};
use super::response::parse_response;
use super::{Enricher, EnrichmentResult};
use crate::error::EnrichmentUnavailable;
use crate::features::FeatureVector;

#[derive(Serialize)]
struct EnrichmentRequest<'a> {
    features: &'a FeatureVector,
}

/// Posts the feature vector to an insight service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEnricher {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    attempt_timeout: Duration,
    retry_backoff: Duration,
    limits: ResponseLimits,
}

impl HttpEnricher {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .context("enrichment.endpoint is required for the http provider")?;
        let attempt_timeout = humantime::parse_duration(config.attempt_timeout.trim())
            .with_context(|| format!("Invalid attempt timeout '{}'", config.attempt_timeout))?;
        let retry_backoff = humantime::parse_duration(config.retry_backoff.trim())
            .with_context(|| format!("Invalid retry backoff '{}'", config.retry_backoff))?;

        let token = config
            .token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            debug!("No enrichment token in the environment; sending unauthenticated requests");
        }

        crate::install_crypto_provider();
        let client = reqwest::Client::builder()
            .user_agent(concat!("hybrid-score/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            token,
            attempt_timeout,
            retry_backoff,
            limits: ResponseLimits::from(config),
        })
    }

    async fn attempt(
        &self,
        features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&EnrichmentRequest { features });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let exchange = async move {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.attempt_timeout, exchange).await {
            Err(_) => return Err(EnrichmentUnavailable::Timeout),
            Ok(Err(e)) if e.is_timeout() => return Err(EnrichmentUnavailable::Timeout),
            Ok(Err(e)) => return Err(EnrichmentUnavailable::Transport(e.to_string())),
            Ok(Ok(exchange)) => exchange,
        };

        if !status.is_success() {
            return Err(EnrichmentUnavailable::Status(status.as_u16()));
        }
        parse_response(&body, &self.limits)
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn enrich(
        &self,
        features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
        // One retry at most, only for failures that may clear up
        let strategy = FixedInterval::new(self.retry_backoff).take(1);

        RetryIf::spawn(
            strategy,
            || async {
                let outcome = self.attempt(features).await;
                if let Err(e) = &outcome {
                    warn!("Enrichment attempt against {} failed: {}", self.endpoint, e);
                }
                outcome
            },
            |e: &EnrichmentUnavailable| e.is_transient(),
        )
        .await
    }
}
