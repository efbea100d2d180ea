use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::lending::{LendingGuidance, RiskTier};
use crate::pipeline::ScoreReport;
use crate::scoring::SubScore;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn paint_tier(tier: RiskTier, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match tier {
        RiskTier::Green => text.green().bold().to_string(),
        RiskTier::Yellow => text.yellow().bold().to_string(),
        RiskTier::Red => text.red().bold().to_string(),
    }
}

/// Format a sub-score value; the sentinel prints as "n/a*"
pub fn format_sub_score(sub: &SubScore) -> String {
    if sub.is_insufficient() {
        "n/a*".to_string()
    } else {
        format!("{:.1}", sub.value)
    }
}

/// Breakdown rows: Name, Value, Weight, Rationale
/// Name column: 22 chars, Value: 6 chars right-aligned, Weight: 5 chars
/// The rationale takes the remaining width on a terminal.
fn format_breakdown(breakdown: &[SubScore], width: Option<usize>, use_colors: bool) -> String {
    let name_width = 22;
    let value_width = 6;
    let weight_width = 5;
    let separator = "  ";
    let fixed = 2 + name_width + value_width + weight_width + separator.len() * 3;

    breakdown
        .iter()
        .map(|sub| {
            let value = format!("{:>value_width$}", format_sub_score(sub));
            let weight = format!("{:>weight_width$.2}", sub.weight);
            let rationale = match width {
                Some(w) if w > fixed + 10 => truncate(&sub.rationale, w - fixed),
                _ => sub.rationale.clone(),
            };
            let name = format!("{:<name_width$}", sub.name);

            if use_colors {
                let value = if sub.is_insufficient() {
                    value.dimmed().to_string()
                } else if sub.value < 40.0 {
                    value.red().to_string()
                } else if sub.value < 60.0 {
                    value.yellow().to_string()
                } else {
                    value.green().to_string()
                };
                format!(
                    "  {}{}{}{}{}{}{}",
                    name, separator, value, separator, weight.dimmed(), separator, rationale.dimmed()
                )
            } else {
                format!(
                    "  {}{}{}{}{}{}{}",
                    name, separator, value, separator, weight, separator, rationale
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable rendering of a scoring run.
pub fn format_report(report: &ScoreReport, use_colors: bool) -> String {
    let result = &report.result;
    let width = get_terminal_width();
    let mut lines = Vec::new();

    let headline = format!(
        "Hybrid score {} / 100 ({} on the 300-900 scale)",
        result.hybrid_score, result.hybrid_on_bureau_scale
    );
    let tier = format!("{} ({})", result.risk_tier.label(), result.risk_tier);
    if use_colors {
        lines.push(format!("{}  {}", headline.bold(), paint_tier(result.risk_tier, &tier, true)));
    } else {
        lines.push(format!("{}  {}", headline, tier));
    }

    lines.push(format!(
        "Bureau {}  Behavior {:.2}  Transactions {} ({} skipped)",
        result.bureau_score, result.behavior_score, report.transactions, report.skipped_rows
    ));

    let enrichment = if result.enrichment_applied {
        match result.adjustment {
            Some(adj) => format!("Enrichment applied (adjustment {:+.2})", adj),
            None => "Enrichment applied".to_string(),
        }
    } else {
        format!(
            "Enrichment skipped: {}",
            result.enrichment_note.as_deref().unwrap_or("unavailable")
        )
    };
    lines.push(if use_colors {
        enrichment.dimmed().to_string()
    } else {
        enrichment
    });

    lines.push(String::new());
    lines.push(if use_colors {
        "Breakdown".bold().to_string()
    } else {
        "Breakdown".to_string()
    });
    lines.push(format_breakdown(&result.breakdown, width, use_colors));
    if result.breakdown.iter().any(SubScore::is_insufficient) {
        lines.push("  * not enough data, scored neutral".to_string());
    }

    lines.push(String::new());
    lines.push(if use_colors {
        "Insights".bold().to_string()
    } else {
        "Insights".to_string()
    });
    for insight in &result.insights {
        lines.push(format!("  - {}", insight));
    }

    lines.join("\n")
}

fn format_money(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Human-readable rate band and affordability.
pub fn format_guidance(guidance: &LendingGuidance, use_colors: bool) -> String {
    let rate = &guidance.rate;
    let afford = &guidance.affordability;

    let title = format!("Lending guidance: {} loan", rate.loan_type.as_str());
    let title = if use_colors {
        title.bold().to_string()
    } else {
        title
    };

    [
        title,
        format!(
            "  APR {:.1}% - {:.1}% ({} tier)",
            rate.apr_percent.min,
            rate.apr_percent.max,
            paint_tier(rate.risk_tier, &rate.risk_tier.to_string(), use_colors)
        ),
        format!(
            "  Safe EMI {} - {} per month ({:.0}% - {:.0}% of income)",
            format_money(afford.safe_emi_min),
            format_money(afford.safe_emi_max),
            afford.emi_ratio_min * 100.0,
            afford.emi_ratio_max * 100.0
        ),
        format!(
            "  Principal {} - {} over {} months",
            format_money(afford.principal_min),
            format_money(afford.principal_max),
            afford.tenure_months
        ),
        format!(
            "  Left after max EMI {}",
            format_money(afford.disposable_after_max_emi)
        ),
    ]
    .join("\n")
}
