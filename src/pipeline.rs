use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::Serialize;
use std::time::Duration;

use crate::config::{validate_config, Config};
use crate::enrich::response::validate;
use crate::enrich::{build_enricher, Enricher, ResponseLimits};
use crate::error::{EnrichmentUnavailable, InvalidBureauScoreError, PipelineResult};
use crate::extract::{BureauReport, Extractor, SourceKind};
use crate::features::{Aggregator, BehavioralInputs, FeatureVector};
use crate::fusion::{add_utilization_tip, FusionEngine, HybridScoreResult};
use crate::scoring::SubScoreCalculator;

/// Everything one scoring run needs.
#[derive(Debug, Clone)]
pub struct ScoreRequest<'a> {
    pub bureau_score: Option<u32>,
    pub inputs: &'a BehavioralInputs,
    pub document: &'a [u8],
    pub kind: SourceKind,
    /// Parsed bureau report; supplies the score when none is given and
    /// a utilization tip. Its late payments belong in `inputs` already.
    pub bureau_report: Option<&'a BureauReport>,
}

/// A finished run plus the intermediate values worth showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    #[serde(flatten)]
    pub result: HybridScoreResult,
    pub features: FeatureVector,
    pub transactions: usize,
    pub skipped_rows: usize,
}

/// Extract, aggregate, score, enrich and fuse.
///
/// Built once from a validated [`Config`] and immutable afterwards, so a
/// single pipeline can serve concurrent requests.
pub struct ScoringPipeline {
    extractor: Extractor,
    aggregator: Aggregator,
    calculator: SubScoreCalculator,
    fusion: FusionEngine,
    enricher: Box<dyn Enricher>,
    enrichment_timeout: Duration,
    enrichment_limits: ResponseLimits,
}

impl ScoringPipeline {
    /// Build a pipeline with the enricher the configuration selects.
    pub fn from_config(config: &Config, use_cache: bool) -> Result<Self> {
        let enricher = build_enricher(&config.enrichment, use_cache)
            .context("Failed to set up enrichment")?;
        Self::with_enricher(config, enricher)
    }

    /// Build a pipeline around an explicit enricher.
    pub fn with_enricher(config: &Config, enricher: Box<dyn Enricher>) -> Result<Self> {
        validate_config(config).map_err(|errors| anyhow!(errors.join("; ")))?;

        let calculator = SubScoreCalculator::new(&config.scoring)?
            .with_bureau_weight(config.fusion.bureau_weight);
        let enrichment_timeout = humantime::parse_duration(config.enrichment.total_timeout.trim())
            .context("enrichment.total_timeout")?;

        Ok(Self {
            extractor: Extractor::new(config.extraction.clone()),
            aggregator: Aggregator::new(config.aggregation.clone())?,
            calculator,
            fusion: FusionEngine::new(config.fusion.clone())?,
            enricher,
            enrichment_timeout,
            enrichment_limits: ResponseLimits::from(&config.enrichment),
        })
    }

    pub async fn score(&self, request: ScoreRequest<'_>) -> PipelineResult<HybridScoreResult> {
        Ok(self.run(request).await?.result)
    }

    pub async fn run(&self, request: ScoreRequest<'_>) -> PipelineResult<ScoreReport> {
        // Bureau score first: a bad one stops the run before any parsing
        let reported = request.bureau_report.and_then(|r| r.score);
        if let (Some(given), Some(reported)) = (request.bureau_score, reported) {
            if given != reported {
                warn!("Bureau score {} overrides {} from the report", given, reported);
            }
        }
        let bureau_value = request
            .bureau_score
            .or(reported)
            .ok_or(InvalidBureauScoreError::Missing)?;
        let bureau = self.calculator.score_bureau(bureau_value)?;

        let extraction = self.extractor.extract(request.document, request.kind)?;
        if extraction.skipped_rows > 0 {
            warn!(
                "Skipped {} unparseable rows in the {}",
                extraction.skipped_rows, request.kind
            );
        }
        debug!("Extracted {} transactions", extraction.records.len());

        let features = self.aggregator.aggregate(&extraction.records, request.inputs);
        let behavior = self.calculator.composite(&features);
        debug!("Behavioral composite {:.2}", behavior.value);

        let enrichment = self.enrich(&features).await;
        let mut result = self.fusion.fuse(bureau_value, bureau, behavior, &enrichment);
        if let Some(utilization) = request.bureau_report.and_then(|r| r.credit_utilization) {
            add_utilization_tip(&mut result.insights, utilization);
        }

        Ok(ScoreReport {
            result,
            features,
            transactions: extraction.records.len(),
            skipped_rows: extraction.skipped_rows,
        })
    }

    async fn enrich(
        &self,
        features: &FeatureVector,
    ) -> Result<crate::enrich::EnrichmentResult, EnrichmentUnavailable> {
        let outcome = match tokio::time::timeout(self.enrichment_timeout, self.enricher.enrich(features)).await {
            // Every backend answer is held to the configured bounds, cached ones included
            Ok(outcome) => outcome.and_then(|result| validate(result, &self.enrichment_limits)),
            Err(_) => Err(EnrichmentUnavailable::Timeout),
        };
        match &outcome {
            Ok(_) => debug!("Enrichment from {} applied", self.enricher.name()),
            Err(EnrichmentUnavailable::Disabled) => debug!("Enrichment disabled"),
            Err(e) => warn!("Continuing without enrichment: {}", e),
        }
        outcome
    }
}
