use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::parse::parse_amount;

/// Monthly pay figures read from the text of a salary slip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalarySlip {
    pub gross_monthly: Option<f64>,
    pub net_monthly: Option<f64>,
    pub total_deductions: Option<f64>,
}

impl SalarySlip {
    /// Take-home pay when known, else gross pay.
    pub fn monthly_income(&self) -> Option<f64> {
        self.net_monthly.or(self.gross_monthly)
    }
}

// Anything outside this band is a year, an id or a misread figure
const PLAUSIBLE_PAY: std::ops::RangeInclusive<f64> = 10_000.0..=10_000_000.0;

const AMOUNT: &str = r"\s*[:\-]?\s*((?:₹|rs\.?|inr)?\s*\d[\d,]*(?:\.\d{1,2})?)";

static GROSS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:gross\s*(?:salary|earnings|pay)?|total\s*earnings){AMOUNT}"
    ))
    .expect("valid gross pattern")
});

static NET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:net\s*(?:salary|pay)?|take\s*home(?:\s*pay)?|total\s*payable){AMOUNT}"
    ))
    .expect("valid net pattern")
});

static DEDUCTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\btotal\s*deductions?{AMOUNT}")).expect("valid deductions pattern")
});

fn first_amount(re: &Regex, text: &str, plausible: impl Fn(f64) -> bool) -> Option<f64> {
    re.captures_iter(text)
        .filter_map(|caps| parse_amount(&caps[1]))
        .find(|v| plausible(*v))
}

pub fn parse_salary_slip(text: &str) -> SalarySlip {
    let gross_monthly = first_amount(&GROSS, text, |v| PLAUSIBLE_PAY.contains(&v));
    let total_deductions = first_amount(&DEDUCTIONS, text, |v| v >= 0.0);
    let net_monthly = first_amount(&NET, text, |v| PLAUSIBLE_PAY.contains(&v)).or_else(|| {
        let net = gross_monthly? - total_deductions?;
        PLAUSIBLE_PAY.contains(&net).then_some(net)
    });

    SalarySlip {
        gross_monthly,
        net_monthly,
        total_deductions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slip_with_all_figures() {
        let slip = parse_salary_slip(
            "ACME Technologies Pvt Ltd\n\
             Pay slip for June 2024\n\
             Basic 30,000.00  HRA 15,000.00\n\
             Gross Salary: Rs. 62,500.00\n\
             Provident Fund 3,600.00  Professional Tax 200.00\n\
             Total Deductions: 4,800.00\n\
             Net Pay: ₹57,700.00\n",
        );
        assert_eq!(slip.gross_monthly, Some(62500.0));
        assert_eq!(slip.total_deductions, Some(4800.0));
        assert_eq!(slip.net_monthly, Some(57700.0));
        assert_eq!(slip.monthly_income(), Some(57700.0));
    }

    #[test]
    fn test_net_falls_back_to_gross_minus_deductions() {
        let slip = parse_salary_slip("Total Earnings 80,000\nTotal Deductions - 12,500\n");
        assert_eq!(slip.net_monthly, Some(67500.0));
    }

    #[test]
    fn test_implausible_figures_are_ignored() {
        // The year is not a salary
        let slip = parse_salary_slip("Net pay for 2024\nGross: 500\n");
        assert_eq!(slip, SalarySlip::default());
        assert_eq!(slip.monthly_income(), None);
    }

    #[test]
    fn test_gross_only() {
        let slip = parse_salary_slip("Gross Earnings : INR 45,000");
        assert_eq!(slip.gross_monthly, Some(45000.0));
        assert_eq!(slip.net_monthly, None);
        assert_eq!(slip.monthly_income(), Some(45000.0));
    }
}
