use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::parse::parse_amount;

/// Figures read from the text of a credit bureau report.
///
/// Every field is optional: reports vary by bureau and by how the text was
/// extracted, and a figure that cannot be found is left out rather than guessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BureauReport {
    pub score: Option<u32>,
    pub late_payments: Option<u32>,
    /// Percent of available credit in use, 0-100
    pub credit_utilization: Option<f64>,
    pub open_loans: Option<u32>,
    pub credit_history_years: Option<u32>,
    pub total_credit_limit: Option<f64>,
}

const SCORE_RANGE: std::ops::RangeInclusive<u32> = 300..=900;

// Most specific first; the first in-range match wins
static SCORE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:cibil|credit)\s*(?:transunion\s*)?score\s*(?:is|of)?\s*[:\-]?\s*(\d{3})\b",
        r"(?i)\b(\d{3})\s*(?:\(\s*)?(?:cibil|credit\s*score)\b",
        r"(?i)\bscore\s*[:\-]?\s*(\d{3})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid score pattern"))
    .collect()
});

static LATE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:late|delayed|missed|overdue)\s+payments?\s*[:\-]?\s*(\d+)\b")
        .expect("valid late payment pattern")
});

static DPD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bDPD\s*[:\-]?\s*(\d+)\b").expect("valid DPD pattern")
});

static UTILIZATION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\butili[sz]ation(?:\s*ratio)?\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*%?",
        r"(?i)(\d+(?:\.\d+)?)\s*%\s*(?:credit\s*)?utili[sz]ation\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid utilization pattern"))
    .collect()
});

static OPEN_LOANS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:open|active)\s+(?:loans|accounts|credit\s+lines)\s*[:\-]?\s*(\d+)\b")
        .expect("valid open loans pattern")
});

static HISTORY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(\d{1,2})\s*(?:years?|yrs?)\s*(?:of\s*)?(?:credit\s*)?history\b",
        r"(?i)\bhistory(?:\s*length)?\s*[:\-]?\s*(\d{1,2})\s*(?:years?|yrs?)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid history pattern"))
    .collect()
});

static CREDIT_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:total\s+)?credit\s*limit\s*[:\-]?\s*((?:₹|rs\.?|inr)?\s*\d[\d,]*(?:\.\d+)?)")
        .expect("valid credit limit pattern")
});

fn first_in_range<T: PartialOrd + std::str::FromStr>(
    patterns: &[Regex],
    text: &str,
    range: std::ops::RangeInclusive<T>,
) -> Option<T> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps[1].parse::<T>().ok())
            .find(|v| range.contains(v))
    })
}

/// Late payments: an explicit count when the report states one, otherwise
/// the number of accounts reporting days past due.
fn late_payments(text: &str) -> Option<u32> {
    if let Some(caps) = LATE_COUNT.captures(text) {
        return caps[1].parse().ok();
    }
    let days: Vec<u32> = DPD
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    if days.is_empty() {
        None
    } else {
        Some(days.iter().filter(|d| **d > 0).count() as u32)
    }
}

pub fn parse_bureau_report(text: &str) -> BureauReport {
    BureauReport {
        score: first_in_range(&SCORE_PATTERNS, text, SCORE_RANGE),
        late_payments: late_payments(text),
        credit_utilization: first_in_range(&UTILIZATION, text, 0.0..=100.0),
        open_loans: OPEN_LOANS
            .captures(text)
            .and_then(|caps| caps[1].parse().ok()),
        credit_history_years: first_in_range(&HISTORY, text, 0..=80),
        total_credit_limit: CREDIT_LIMIT
            .captures(text)
            .and_then(|caps| parse_amount(&caps[1]))
            .filter(|v| *v >= 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
CIBIL TransUnion Score: 742
Report date 12/06/2024
Active Accounts: 3
Total Credit Limit: Rs. 2,50,000
Credit Utilization: 64%
Payment history: 2 late payments in the last 24 months
Late payments: 2
Credit history: 6 years
";

    #[test]
    fn test_full_report() {
        let report = parse_bureau_report(REPORT);
        assert_eq!(report.score, Some(742));
        assert_eq!(report.late_payments, Some(2));
        assert_eq!(report.credit_utilization, Some(64.0));
        assert_eq!(report.open_loans, Some(3));
        assert_eq!(report.credit_history_years, Some(6));
        assert_eq!(report.total_credit_limit, Some(250000.0));
    }

    #[test]
    fn test_out_of_range_score_is_ignored() {
        assert_eq!(parse_bureau_report("Credit score: 999").score, None);
        // A later in-range figure still counts
        let report = parse_bureau_report("Score: 120 (old scale)\nCIBIL score 705");
        assert_eq!(report.score, Some(705));
    }

    #[test]
    fn test_score_after_number() {
        assert_eq!(parse_bureau_report("You scored 781 CIBIL").score, Some(781));
    }

    #[test]
    fn test_dpd_entries_count_as_late() {
        let text = "HDFC Card DPD: 0\nSBI Home Loan DPD 30\nBFL EMI DPD-90";
        assert_eq!(parse_bureau_report(text).late_payments, Some(2));
        assert_eq!(parse_bureau_report("HDFC Card DPD 0").late_payments, Some(0));
    }

    #[test]
    fn test_utilization_forms() {
        assert_eq!(
            parse_bureau_report("Utilisation ratio - 35.5%").credit_utilization,
            Some(35.5)
        );
        assert_eq!(
            parse_bureau_report("You are at 48% credit utilization").credit_utilization,
            Some(48.0)
        );
        assert_eq!(parse_bureau_report("Utilization: 140%").credit_utilization, None);
    }

    #[test]
    fn test_unrelated_text_is_empty() {
        assert_eq!(
            parse_bureau_report("Dear customer, thank you for banking with us."),
            BureauReport::default()
        );
    }
}
