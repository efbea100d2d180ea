use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Direction marker attached to an amount, either as a suffix ("1,200.00 Dr")
/// or carried by a separate column/keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Classify free text such as a "Type" column value or a "Dr"/"Cr" marker.
    pub fn from_marker(s: &str) -> Option<Self> {
        match s.trim().trim_end_matches('.').to_lowercase().as_str() {
            "dr" | "d" | "debit" | "debited" | "paid" | "sent" | "withdrawal" | "out" => {
                Some(Direction::Debit)
            }
            "cr" | "c" | "credit" | "credited" | "received" | "deposit" | "in" => {
                Some(Direction::Credit)
            }
            _ => None,
        }
    }

    pub fn apply(&self, amount: f64) -> f64 {
        match self {
            Direction::Debit => -amount.abs(),
            Direction::Credit => amount.abs(),
        }
    }
}

const CURRENCY_MARKERS: &[&str] = &["₹", "rs.", "rs", "inr", "$"];

/// Parse an amount as written in statements.
///
/// Accepts currency markers, thousands separators, a leading sign,
/// accounting parentheses and a trailing Dr/Cr marker. Returns `None`
/// for anything that does not reduce to a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    let mut direction = None;
    for (suffix, dir) in [("dr", Direction::Debit), ("cr", Direction::Credit)] {
        if let Some(rest) = s.strip_suffix(suffix) {
            // "inr" ends in "r" but not "dr"/"cr", so only a real marker lands here
            if rest.chars().last().map_or(false, |c| c.is_ascii_digit() || c == ' ' || c == '.') {
                direction = Some(dir);
                s = rest.trim().to_string();
                break;
            }
        }
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }

    let mut s = s.trim().to_string();
    loop {
        let before = s.len();
        if let Some(rest) = s.strip_prefix('-') {
            negative = !negative;
            s = rest.trim_start().to_string();
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest.trim_start().to_string();
        }
        for marker in CURRENCY_MARKERS {
            if let Some(rest) = s.strip_prefix(marker) {
                s = rest.trim_start().to_string();
                break;
            }
        }
        if s.len() == before {
            break;
        }
    }
    for marker in CURRENCY_MARKERS {
        if let Some(rest) = s.strip_suffix(marker) {
            s = rest.trim_end().to_string();
            break;
        }
    }

    let digits: String = s.chars().filter(|c| *c != ',' && *c != ' ').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let signed = if negative { -value } else { value };
    Some(match direction {
        Some(dir) => dir.apply(signed),
        None => signed,
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

// Two-digit year formats come first: "%Y" would happily read "24" as year 24.
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%Y", "%d-%b-%y",
    "%d-%b-%Y", "%d %b %y", "%d %b %Y", "%b %d, %Y", "%d %B %Y",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y", "%d-%b-%y", "%d-%b-%Y",
    "%d %b %y", "%d %b %Y", "%b %d, %Y", "%d %B %Y",
];

/// Parse a statement timestamp. Dates without a time resolve to midnight UTC.
pub fn parse_timestamp(raw: &str, day_first: bool) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let mut datetime_formats: Vec<&str> = DATETIME_FORMATS.to_vec();
    if !day_first {
        datetime_formats.retain(|f| !f.starts_with("%d/") && !f.starts_with("%d-%m"));
        datetime_formats.extend(["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"]);
    }
    for format in datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date_formats = if day_first {
        DAY_FIRST_DATE_FORMATS
    } else {
        MONTH_FIRST_DATE_FORMATS
    };
    date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
