use serde::{Deserialize, Serialize};

/// Which enrichment backend a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentProvider {
    #[default]
    Disabled,
    Http,
    /// Fixed, offline insights
    Stub,
}

/// Enrichment service settings.
///
/// Example YAML:
/// ```yaml
/// enrichment:
///   provider: http
///   endpoint: "https://insights.example.com/v1/enrich"
///   token_env: HYBRID_SCORE_ENRICHMENT_TOKEN
///   attempt_timeout: "5s"
///   total_timeout: "12s"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentConfig {
    pub provider: EnrichmentProvider,

    /// POST target for the http provider
    pub endpoint: Option<String>,

    /// Environment variable holding the bearer token, if the service needs one
    pub token_env: Option<String>,

    /// Deadline for a single request
    pub attempt_timeout: String,

    /// Deadline for the whole enrichment step, retry included
    pub total_timeout: String,

    /// Pause before the single retry
    pub retry_backoff: String,

    pub max_insights: usize,

    /// Largest accepted adjustment to the behavioral score, either way
    pub max_adjustment: f64,

    /// Reuse results for identical feature vectors
    pub cache: bool,

    pub cache_ttl: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider: EnrichmentProvider::Disabled,
            endpoint: None,
            token_env: Some("HYBRID_SCORE_ENRICHMENT_TOKEN".to_string()),
            attempt_timeout: "5s".to_string(),
            total_timeout: "12s".to_string(),
            retry_backoff: "250ms".to_string(),
            max_insights: 5,
            max_adjustment: 5.0,
            cache: true,
            cache_ttl: "24h".to_string(),
        }
    }
}

/// Bounds an enrichment answer must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseLimits {
    pub max_insights: usize,
    pub max_adjustment: f64,
}

impl From<&EnrichmentConfig> for ResponseLimits {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            max_insights: config.max_insights,
            max_adjustment: config.max_adjustment,
        }
    }
}

impl Default for ResponseLimits {
    fn default() -> Self {
        ResponseLimits::from(&EnrichmentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = EnrichmentConfig::default();
        assert_eq!(config.provider, EnrichmentProvider::Disabled);
        assert_eq!(config.max_adjustment, 5.0);
        assert_eq!(config.cache_ttl, "24h");
    }

    #[test]
    fn test_enrichment_config_serde_roundtrip() {
        let config = EnrichmentConfig {
            provider: EnrichmentProvider::Http,
            endpoint: Some("http://127.0.0.1:9000/enrich".to_string()),
            ..EnrichmentConfig::default()
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: EnrichmentConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_provider_names() {
        let config: EnrichmentConfig = serde_saphyr::from_str("provider: stub\n").unwrap();
        assert_eq!(config.provider, EnrichmentProvider::Stub);
    }
}
