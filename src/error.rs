use thiserror::Error;

use crate::extract::SourceKind;

/// The document could not be turned into any transaction at all.
///
/// Distinct from a readable document that simply holds no transactions,
/// which extracts to an empty record list instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no transactions could be recovered from the {kind} ({skipped_rows} rows skipped)")]
    NoRecords {
        kind: SourceKind,
        skipped_rows: usize,
    },

    #[error("the {kind} is unreadable: {reason}")]
    Unreadable { kind: SourceKind, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidBureauScoreError {
    #[error("bureau score has not been provided")]
    Missing,

    #[error("bureau score {0} is outside the 300-900 range")]
    OutOfRange(u32),
}

/// Why enrichment did not contribute to a run. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentUnavailable {
    #[error("enrichment is disabled")]
    Disabled,

    #[error("enrichment timed out")]
    Timeout,

    #[error("enrichment transport failed: {0}")]
    Transport(String),

    #[error("enrichment service answered with status {0}")]
    Status(u16),

    #[error("enrichment response rejected: {0}")]
    Malformed(String),
}

impl EnrichmentUnavailable {
    /// Failures worth a single retry. A malformed answer will not improve.
    pub fn is_transient(&self) -> bool {
        match self {
            EnrichmentUnavailable::Timeout | EnrichmentUnavailable::Transport(_) => true,
            EnrichmentUnavailable::Status(code) => *code >= 500,
            EnrichmentUnavailable::Disabled | EnrichmentUnavailable::Malformed(_) => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    InvalidBureauScore(#[from] InvalidBureauScoreError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
