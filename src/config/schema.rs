use serde::{Deserialize, Serialize};

use crate::enrich::EnrichmentConfig;
use crate::extract::ExtractionConfig;
use crate::features::AggregationConfig;
use crate::fusion::FusionConfig;
use crate::scoring::ScoringConfig;

/// Root of `config.yaml`. Every section is optional and falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub aggregation: AggregationConfig,
    pub fusion: FusionConfig,
    pub enrichment: EnrichmentConfig,
    pub extraction: ExtractionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichmentProvider;
    use crate::fusion::Rounding;

    #[test]
    fn test_empty_yaml_is_default() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
fusion:
  rounding: none
enrichment:
  provider: stub
extraction:
  day_first: false
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.fusion.rounding, Rounding::None);
        assert_eq!(config.fusion.bureau_weight, 0.4);
        assert_eq!(config.enrichment.provider, EnrichmentProvider::Stub);
        assert!(!config.extraction.day_first);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []\n");
        assert!(result.is_err());
    }
}
