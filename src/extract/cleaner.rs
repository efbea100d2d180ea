use regex::Regex;
use std::sync::LazyLock;

static HEADER_FOOTER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^page\s+\d+",
        r"^\d+\s+of\s+\d+$",
        r"^confidential",
        r"^internal\s+use",
        r"^statement\s+(period|date|of\s+account)",
        r"^(generated|printed)\s+on",
        r"^©",
        r"^all\s+rights\s+reserved",
        r"^this\s+is\s+a\s+(system|computer)\s+generated",
        r"^(opening|closing)\s+balance",
        r"^(date|txn\s+date|transaction\s+date)\s+(description|narration|particulars|details)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("header/footer pattern is valid"))
    .collect()
});

static BALANCE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:opening|closing|available)\s+bal(?:ance)?|bal(?:ance)?\s+(?:b/f|c/f|brought\s+forward|carried\s+forward)|b/f|c/f|brought\s+forward|carried\s+forward)\b",
    )
    .expect("balance pattern is valid")
});

const BOILERPLATE: &[&str] = &[
    "terms and conditions",
    "terms & conditions",
    "disclaimer",
    "liability",
    "warranty",
    "copyright",
    "trademark",
    "by using this",
    "you agree",
    "please note",
];

/// A statement line that carries no transaction and should be ignored
/// without counting as a parse failure.
pub fn is_noise(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();

    if HEADER_FOOTER.iter().any(|re| re.is_match(&lower)) {
        return true;
    }
    if BOILERPLATE.iter().any(|kw| lower.contains(kw)) {
        return true;
    }

    // Headings, account names and similar prose: nothing numeric to parse
    !trimmed.chars().any(|c| c.is_ascii_digit())
}

/// A running-balance entry such as "Opening Balance" or "Balance B/F".
/// These restate the account total and are never transactions.
pub fn is_balance_entry(description: &str) -> bool {
    BALANCE_ENTRY.is_match(&description.trim().to_lowercase())
}
