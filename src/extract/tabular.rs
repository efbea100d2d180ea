use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

use super::category::infer_category;
use super::cleaner::is_balance_entry;
use super::parse::{parse_amount, parse_timestamp, Direction};
use super::types::{Category, Extraction, TransactionRecord};
use super::ExtractionConfig;
use crate::error::ExtractionError;
use crate::extract::SourceKind;

/// Role a header column plays. Roles are assigned in declaration order and a
/// column takes at most one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Timestamp,
    Debit,
    Credit,
    Direction,
    Amount,
    Counterparty,
    Category,
}

const ROLE_KEYWORDS: &[(Role, &[&str])] = &[
    (Role::Timestamp, &["date", "time", "timestamp", "posted"]),
    (Role::Direction, &["type", "direction", "drcr"]),
    (Role::Debit, &["debit", "withdrawal", "withdrawals", "paid", "dr"]),
    (Role::Credit, &["credit", "deposit", "deposits", "received", "cr"]),
    (Role::Amount, &["amount", "amt", "value", "inr", "rs"]),
    (
        Role::Counterparty,
        &[
            "description", "narration", "remarks", "remark", "merchant", "counterparty", "payee",
            "details", "particulars", "to", "from",
        ],
    ),
    (Role::Category, &["category"]),
];

/// Header tokens naming the other party, as in "Paid To" or "Received From".
const PARTY_TOKENS: &[&str] = &["to", "from"];

const BALANCE_TOKENS: &[&str] = &["balance", "bal"];

impl Role {
    /// Whether a header with these tokens can take this role.
    fn claims(&self, keywords: &[&str], tokens: &[String]) -> bool {
        let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
        if !has(keywords) {
            return false;
        }
        match self {
            // A running balance is never a transaction amount
            Role::Debit | Role::Credit | Role::Amount if has(BALANCE_TOKENS) => false,
            Role::Debit | Role::Credit => !has(PARTY_TOKENS),
            _ => true,
        }
    }
}

/// Column indexes for each detected role.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ColumnMap {
    timestamp: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    direction: Option<usize>,
    amount: Option<usize>,
    counterparty: Option<usize>,
    category: Option<usize>,
}

impl ColumnMap {
    fn detect(headers: &StringRecord) -> Self {
        let tokenized: Vec<Vec<String>> = headers.iter().map(header_tokens).collect();
        let mut taken = vec![false; tokenized.len()];
        let mut map = ColumnMap::default();

        for (role, keywords) in ROLE_KEYWORDS {
            let found = tokenized
                .iter()
                .enumerate()
                .find(|(i, tokens)| !taken[*i] && role.claims(keywords, tokens));
            if let Some((index, _)) = found {
                taken[index] = true;
                let slot = match role {
                    Role::Timestamp => &mut map.timestamp,
                    Role::Debit => &mut map.debit,
                    Role::Credit => &mut map.credit,
                    Role::Direction => &mut map.direction,
                    Role::Amount => &mut map.amount,
                    Role::Counterparty => &mut map.counterparty,
                    Role::Category => &mut map.category,
                };
                *slot = Some(index);
            }
        }
        map
    }

    fn has_amount(&self) -> bool {
        self.amount.is_some() || self.debit.is_some() || self.credit.is_some()
    }
}

fn header_tokens(header: &str) -> Vec<String> {
    let mut tokens: Vec<String> = header
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    // "Dr/Cr" marks direction, not a debit amount column
    if tokens.iter().any(|t| t == "dr") && tokens.iter().any(|t| t == "cr") {
        tokens.push("drcr".to_string());
    }
    tokens
}

/// Parse a CSV export with a header row into transaction records.
pub fn extract_tabular(
    input: &[u8],
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractionError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(sniff_delimiter(input))
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| ExtractionError::Unreadable {
            kind: SourceKind::Tabular,
            reason: e.to_string(),
        })?
        .clone();

    let columns = ColumnMap::detect(&headers);
    debug!("Tabular columns detected: {:?}", columns);
    if columns.timestamp.is_none() || !columns.has_amount() {
        warn!(
            "Export header has no recognizable {} column; every row will be skipped",
            if columns.timestamp.is_none() { "date" } else { "amount" }
        );
    }

    let mut extraction = Extraction::default();
    for (row_index, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping unreadable row {}: {}", row_index + 2, e);
                extraction.skipped_rows += 1;
                continue;
            }
        };
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }
        let description = columns.counterparty.and_then(|i| row.get(i)).unwrap_or_default();
        if is_balance_entry(description) {
            debug!("Ignoring balance row {}", row_index + 2);
            continue;
        }

        match parse_row(&row, &columns, config) {
            Some(record) => extraction.records.push(record),
            None => {
                debug!("Skipping row {}: missing timestamp or amount", row_index + 2);
                extraction.skipped_rows += 1;
            }
        }
    }

    Ok(extraction)
}

fn parse_row(
    row: &StringRecord,
    columns: &ColumnMap,
    config: &ExtractionConfig,
) -> Option<TransactionRecord> {
    let field = |index: Option<usize>| index.and_then(|i| row.get(i)).filter(|s| !s.is_empty());

    let timestamp = parse_timestamp(field(columns.timestamp)?, config.day_first)?;
    let amount = row_amount(&field, columns)?;

    let counterparty = field(columns.counterparty)
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string());
    let category = field(columns.category)
        .and_then(Category::from_label)
        .unwrap_or_else(|| infer_category(&counterparty));

    Some(TransactionRecord {
        timestamp,
        amount,
        counterparty,
        category,
    })
}

fn row_amount<'a, F>(field: &F, columns: &ColumnMap) -> Option<f64>
where
    F: Fn(Option<usize>) -> Option<&'a str>,
{
    // Split debit/credit columns: one of the two is usually blank
    if columns.debit.is_some() || columns.credit.is_some() {
        let debit = field(columns.debit).and_then(parse_amount);
        let credit = field(columns.credit).and_then(parse_amount);
        match (debit, credit) {
            (None, None) => {}
            (d, c) => return Some(c.map_or(0.0, f64::abs) - d.map_or(0.0, f64::abs)),
        }
    }

    let amount = parse_amount(field(columns.amount)?)?;
    match field(columns.direction).and_then(Direction::from_marker) {
        Some(direction) => Some(direction.apply(amount)),
        None => Some(amount),
    }
}

fn sniff_delimiter(input: &[u8]) -> u8 {
    let first_line = input.split(|b| *b == b'\n').next().unwrap_or_default();
    [b',', b';', b'\t', b'|']
        .into_iter()
        .max_by_key(|d| first_line.iter().filter(|b| *b == d).count())
        .filter(|d| first_line.contains(d))
        .unwrap_or(b',')
}
