use log::{debug, warn};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::category::infer_category;
use super::cleaner::{is_balance_entry, is_noise};
use super::parse::{parse_amount, parse_timestamp, Direction};
use super::types::{Category, Extraction, TransactionRecord};
use super::ExtractionConfig;

const DATE: &str = r"(?P<date>\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2})?)?|\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}|\d{1,2}[ -][A-Za-z]{3}[ -]\d{2,4}|[A-Za-z]{3} \d{1,2}, \d{4})";

static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{DATE}\s+(?P<rest>.+)$")).expect("date pattern is valid")
});

// Amounts written with paise: a trailing balance column can follow.
static DECIMAL_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    let amount = r"(?:₹|rs\.?|inr|\$)?\s?[-+]?\(?[\d,]*\d\.\d{2}\)?";
    Regex::new(&format!(
        r"(?i)^(?P<desc>.*?)\s*(?P<amount>{amount})(?:\s+(?P<dir>dr|cr)\b\.?)?(?:\s+(?P<balance>{amount})(?:\s+(?:dr|cr)\b\.?)?)?$"
    ))
    .expect("decimal amount pattern is valid")
});

// Whole-unit amounts, as in UPI exports: exactly one amount at the end.
static PLAIN_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<desc>.*?)\s*(?P<amount>(?:₹|rs\.?|inr|\$)?\s?[-+]?\(?\d[\d,]*\)?)(?:\s+(?P<dir>dr|cr)\b\.?)?$",
    )
    .expect("plain amount pattern is valid")
});

static UPI_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<verb>paid\s+to|sent\s+to|received\s+from)\s+(?P<party>.+)$")
        .expect("upi pattern is valid")
});

const DEBIT_WORDS: &[&str] = &["debit", "debited", "withdrawal", "dr"];
const CREDIT_WORDS: &[&str] = &["credit", "credited", "deposit", "cr"];

/// Outcome of one statement line.
#[derive(Debug, PartialEq)]
enum LineOutcome {
    Record(TransactionRecord),
    Noise,
    Skipped,
}

/// Parse statement text line by line.
pub fn extract_document(text: &str, config: &ExtractionConfig) -> Extraction {
    let mut extraction = Extraction::default();

    for (line_no, raw) in text.lines().enumerate() {
        match parse_line(raw, config) {
            LineOutcome::Record(record) => extraction.records.push(record),
            LineOutcome::Noise => {}
            LineOutcome::Skipped => {
                debug!("Skipping statement line {}: {:?}", line_no + 1, raw.trim());
                extraction.skipped_rows += 1;
            }
        }
    }

    if extraction.skipped_rows > 0 {
        warn!(
            "Skipped {} statement line(s) that looked like data but could not be parsed",
            extraction.skipped_rows
        );
    }
    extraction
}

fn parse_line(raw: &str, config: &ExtractionConfig) -> LineOutcome {
    let line = normalize_separators(raw);
    if is_noise(&line) {
        return LineOutcome::Noise;
    }

    let Some(caps) = LEADING_DATE.captures(&line) else {
        return LineOutcome::Skipped;
    };
    if is_balance_entry(&caps["rest"]) {
        return LineOutcome::Noise;
    }
    match parse_dated_line(&caps, config) {
        Some(record) => LineOutcome::Record(record),
        None => LineOutcome::Skipped,
    }
}

fn parse_dated_line(caps: &Captures<'_>, config: &ExtractionConfig) -> Option<TransactionRecord> {
    let timestamp = parse_timestamp(&caps["date"], config.day_first)?;
    let rest = caps["rest"].trim();

    let tail = DECIMAL_TAIL
        .captures(rest)
        .or_else(|| PLAIN_TAIL.captures(rest))?;
    let amount = parse_amount(&tail["amount"])?;
    let description = tail["desc"].trim();

    let (counterparty, phrase_direction) = match UPI_PARTY.captures(description) {
        Some(upi) => {
            let verb = upi["verb"].to_lowercase();
            let direction = if verb.starts_with("received") {
                Direction::Credit
            } else {
                Direction::Debit
            };
            (upi["party"].trim().to_string(), Some(direction))
        }
        None => (description.to_string(), None),
    };
    if counterparty.is_empty() {
        return None;
    }

    let category = infer_category(&counterparty);
    let direction = tail
        .name("dir")
        .and_then(|m| Direction::from_marker(m.as_str()))
        .or(phrase_direction)
        .or_else(|| keyword_direction(&counterparty));

    let amount = match direction {
        Some(direction) => direction.apply(amount),
        // Unsigned and unmarked: statement lines list outflows unless it is pay
        None if amount > 0.0 && category != Category::Salary => -amount,
        None => amount,
    };

    Some(TransactionRecord {
        timestamp,
        amount,
        counterparty,
        category,
    })
}

fn keyword_direction(description: &str) -> Option<Direction> {
    let lower = description.to_lowercase().replace("credit card", "card");
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if words.iter().any(|w| DEBIT_WORDS.contains(w)) {
        Some(Direction::Debit)
    } else if words.iter().any(|w| CREDIT_WORDS.contains(w)) {
        Some(Direction::Credit)
    } else {
        None
    }
}

fn normalize_separators(line: &str) -> String {
    line.split(['|', ';', '\t'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    fn record(line: &str) -> TransactionRecord {
        match parse_line(line, &config()) {
            LineOutcome::Record(record) => record,
            other => panic!("expected a record for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_date_description_amount_with_marker_and_balance() {
        let r = record("12/01/2024 Swiggy order 450.00 Dr 8,800.00 Cr");
        assert_eq!(r.amount, -450.0);
        assert_eq!(r.counterparty, "Swiggy order");
        assert_eq!(r.category, Category::Dining);
        assert_eq!((r.timestamp.day(), r.timestamp.month()), (12, 1));
    }

    #[test]
    fn test_number_in_description_is_not_amount() {
        let r = record("12/01/2024 Order 12345 Amazon 1,299.00 Dr");
        assert_eq!(r.amount, -1299.0);
        assert_eq!(r.counterparty, "Order 12345 Amazon");
    }

    #[test]
    fn test_pipe_and_tab_separators() {
        let r = record("2024-01-15 | ACME SALARY JAN | 52,000.00 | Cr | 60,800.00");
        assert_eq!(r.amount, 52000.0);
        assert_eq!(r.category, Category::Salary);

        let r = record("15-01-2024\tBESCOM electricity\t1,150.00\tDr");
        assert_eq!(r.amount, -1150.0);
        assert_eq!(r.category, Category::Bills);
    }

    #[test]
    fn test_upi_layouts() {
        let r = record("05 Feb 2024 Paid to Zomato ₹320");
        assert_eq!(r.amount, -320.0);
        assert_eq!(r.counterparty, "Zomato");

        let r = record("06 Feb 2024 Received from Ravi Kumar 1500");
        assert_eq!(r.amount, 1500.0);
        assert_eq!(r.counterparty, "Ravi Kumar");
    }

    #[test]
    fn test_keyword_direction() {
        let r = record("01/03/2024 Cash deposit branch 5,000.00");
        assert_eq!(r.amount, 5000.0);

        let r = record("01/03/2024 Credit card payment 2,000.00");
        assert_eq!(r.amount, -2000.0);
    }

    #[test]
    fn test_unmarked_amount_defaults_to_debit() {
        let r = record("02/03/2024 Big Bazaar groceries 870.50");
        assert_eq!(r.amount, -870.5);
    }

    #[test]
    fn test_noise_and_skipped_lines() {
        assert_eq!(parse_line("Page 1 of 3", &config()), LineOutcome::Noise);
        assert_eq!(parse_line("Account Summary", &config()), LineOutcome::Noise);
        assert_eq!(parse_line("   ", &config()), LineOutcome::Noise);
        assert_eq!(parse_line("garbled 9x!", &config()), LineOutcome::Skipped);
        assert_eq!(parse_line("12/01/2024 no amount here", &config()), LineOutcome::Skipped);
        assert_eq!(parse_line("45/45/2024 Swiggy 100.00", &config()), LineOutcome::Skipped);
    }

    #[test]
    fn test_dated_balance_lines_are_not_transactions() {
        let text = "01/04/2024 Opening Balance 10,000.00\n\
                    02/04/2024 Swiggy 450.00 Dr 9,550.00\n\
                    15/04/2024 Balance B/F 9,550.00 Cr\n\
                    30/04/2024 Closing Balance 9,550.00\n";
        let extraction = extract_document(text, &config());
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.skipped_rows, 0);
        assert_eq!(extraction.records[0].counterparty, "Swiggy");
        assert_eq!(extraction.records[0].amount, -450.0);
    }

    #[test]
    fn test_extract_document_counts() {
        let text = "Statement period: 01/01/2024 to 31/01/2024\n\
                    Date Narration Amount\n\
                    03/01/2024 Rent transfer 15,000.00 Dr\n\
                    \n\
                    ??? 77 ???\n\
                    10/01/2024 Salary credit 50,000.00 Cr\n\
                    Page 1 of 1\n";
        let extraction = extract_document(text, &config());
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.skipped_rows, 1);
    }
}
