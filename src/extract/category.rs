use super::types::Category;

/// Keyword table checked in order; the first category with a matching keyword wins.
/// Late fees come before bills so "late payment charge" is not read as a bill.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::LateFee,
        &["late fee", "late payment", "penalty", "overdue", "bounce", "dishonour"],
    ),
    (Category::Salary, &["salary", "payroll", "sal credit", "stipend"]),
    (Category::Emi, &["emi", "installment", "instalment", "loan repayment", "nach"]),
    (
        Category::Bills,
        &[
            "bill", "electricity", "water", "gas", "phone", "internet", "broadband",
            "recharge", "mobile", "dth", "insurance",
        ],
    ),
    (
        Category::Groceries,
        &["grocery", "groceries", "supermarket", "mart", "bigbasket", "blinkit"],
    ),
    (
        Category::Dining,
        &["restaurant", "cafe", "food", "swiggy", "zomato", "dining"],
    ),
    (
        Category::Shopping,
        &["amazon", "flipkart", "myntra", "store", "shop", "merchant"],
    ),
    (Category::Cash, &["atm", "cash withdrawal", "cash wdl"]),
    (
        Category::Transfer,
        &["neft", "imps", "rtgs", "transfer", "self", "upi/p2p"],
    ),
];

/// Infer a category from a counterparty/description string.
pub fn infer_category(description: &str) -> Category {
    let lower = description.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| contains_word(&lower, w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Unknown)
}

/// Keyword match on word boundaries, so "emi" does not fire inside "premium".
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
