use serde::Deserialize;

use super::config::ResponseLimits;
use super::EnrichmentResult;
use crate::error::EnrichmentUnavailable;

pub const MAX_INSIGHT_CHARS: usize = 280;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnrichmentResponse {
    insights: Vec<String>,
    #[serde(default)]
    adjustment: Option<f64>,
}

/// Decode and validate a service answer. Anything off-contract is `Malformed`.
pub fn parse_response(
    body: &[u8],
    limits: &ResponseLimits,
) -> Result<EnrichmentResult, EnrichmentUnavailable> {
    let response: EnrichmentResponse = serde_json::from_slice(body)
        .map_err(|e| EnrichmentUnavailable::Malformed(e.to_string()))?;
    validate(
        EnrichmentResult {
            insights: response.insights,
            adjustment: response.adjustment,
        },
        limits,
    )
}

/// Check an enrichment result against the limits, trimming insight text.
pub fn validate(
    result: EnrichmentResult,
    limits: &ResponseLimits,
) -> Result<EnrichmentResult, EnrichmentUnavailable> {
    if result.insights.len() > limits.max_insights {
        return Err(EnrichmentUnavailable::Malformed(format!(
            "{} insights exceed the limit of {}",
            result.insights.len(),
            limits.max_insights
        )));
    }

    let mut insights = Vec::with_capacity(result.insights.len());
    for (i, insight) in result.insights.into_iter().enumerate() {
        let trimmed = insight.trim();
        if trimmed.is_empty() {
            return Err(EnrichmentUnavailable::Malformed(format!(
                "insight {} is blank",
                i
            )));
        }
        if trimmed.chars().count() > MAX_INSIGHT_CHARS {
            return Err(EnrichmentUnavailable::Malformed(format!(
                "insight {} is longer than {} characters",
                i, MAX_INSIGHT_CHARS
            )));
        }
        insights.push(trimmed.to_string());
    }

    if let Some(adjustment) = result.adjustment {
        if !adjustment.is_finite() || adjustment.abs() > limits.max_adjustment {
            return Err(EnrichmentUnavailable::Malformed(format!(
                "adjustment {} is outside ±{}",
                adjustment, limits.max_adjustment
            )));
        }
    }

    Ok(EnrichmentResult {
        insights,
        adjustment: result.adjustment,
    })
}
