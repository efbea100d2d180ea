use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which parsing strategy applies to an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// CSV-like export with a header row
    Tabular,
    /// Text already pulled out of a statement (PDF text layer, e-mail body, ...)
    DocumentText,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Tabular => write!(f, "tabular export"),
            SourceKind::DocumentText => write!(f, "statement text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Salary,
    Bills,
    Emi,
    LateFee,
    Groceries,
    Dining,
    Shopping,
    Transfer,
    Cash,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Bills => "bills",
            Category::Emi => "emi",
            Category::LateFee => "late_fee",
            Category::Groceries => "groceries",
            Category::Dining => "dining",
            Category::Shopping => "shopping",
            Category::Transfer => "transfer",
            Category::Cash => "cash",
            Category::Unknown => "unknown",
        }
    }

    /// Parse a category name as written in an export's category column.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        let category = match normalized.as_str() {
            "salary" | "income" => Category::Salary,
            "bills" | "bill" | "utilities" | "utility" => Category::Bills,
            "emi" | "loan" => Category::Emi,
            "late_fee" | "fees" | "penalty" => Category::LateFee,
            "groceries" | "grocery" => Category::Groceries,
            "dining" | "food" | "restaurants" => Category::Dining,
            "shopping" => Category::Shopping,
            "transfer" | "transfers" => Category::Transfer,
            "cash" | "atm" => Category::Cash,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized transaction. Debits are negative, credits positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub counterparty: String,
    pub category: Category,
}

impl TransactionRecord {
    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }
}

/// Records recovered from one document plus the rows that had to be dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub records: Vec<TransactionRecord>,
    pub skipped_rows: usize,
}
