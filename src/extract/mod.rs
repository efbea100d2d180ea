pub mod bureau_report;
pub mod category;
pub mod cleaner;
pub mod document;
pub mod parse;
pub mod salary_slip;
pub mod tabular;
pub mod types;

pub use bureau_report::{parse_bureau_report, BureauReport};
pub use salary_slip::{parse_salary_slip, SalarySlip};
pub use types::{Category, Extraction, SourceKind, TransactionRecord};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Parsing options shared by both document kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Read ambiguous slash dates as DD/MM rather than MM/DD
    pub day_first: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { day_first: true }
    }
}

/// Turns raw statement bytes into transaction records. Performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, input: &[u8], kind: SourceKind) -> Result<Extraction, ExtractionError> {
        let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
        if input.iter().all(u8::is_ascii_whitespace) {
            debug!("Empty {} input, nothing to extract", kind);
            return Ok(Extraction::default());
        }

        let extraction = match kind {
            SourceKind::Tabular => tabular::extract_tabular(input, &self.config)?,
            SourceKind::DocumentText => {
                let text = std::str::from_utf8(input).map_err(|e| ExtractionError::Unreadable {
                    kind,
                    reason: e.to_string(),
                })?;
                document::extract_document(text, &self.config)
            }
        };

        debug!(
            "Extracted {} record(s) from {} ({} skipped)",
            extraction.records.len(),
            kind,
            extraction.skipped_rows
        );

        if extraction.records.is_empty() && extraction.skipped_rows > 0 {
            return Err(ExtractionError::NoRecords {
                kind,
                skipped_rows: extraction.skipped_rows,
            });
        }
        Ok(extraction)
    }
}
