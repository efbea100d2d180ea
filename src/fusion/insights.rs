use crate::scoring::SubScore;

pub const ALL_CLEAR: &str =
    "Your credit profile looks healthy across the board. Keep paying on time and saving steadily.";

fn tip_for(sub: &SubScore) -> String {
    if sub.is_insufficient() {
        return format!(
            "There is not enough data to judge {}; a longer statement history or a complete questionnaire would sharpen your score.",
            sub.name.replace('_', " ")
        );
    }
    let score = sub.value.round();
    match sub.name.as_str() {
        "bureau" => format!("Your bureau score maps to {score}/100. Paying every card and EMI on time is the surest way to lift it."),
        "savings_rate" => format!("Savings rate scores {score}/100. Setting aside a fixed share of income each payday would raise it."),
        "bill_discipline" => format!("Bill discipline scores {score}/100. Late payments weigh heavily; automate bills to avoid penalties."),
        "transaction_regularity" => format!("Transaction regularity scores {score}/100. Steadier, predictable spending patterns read as lower risk."),
        "spending_volatility" => format!("Spending volatility scores {score}/100. Large month-to-month swings in spending pull your score down."),
        "lifestyle_risk" => format!("Lifestyle risk scores {score}/100. Revolving card balances and impulse spending add risk."),
        "savings_buffer" => format!("Savings buffer scores {score}/100. Aim for an emergency fund covering six months of expenses."),
        other => format!("{} scores {score}/100.", other.replace('_', " ")),
    }
}

/// Tips for the weakest sub-scores, lowest first, ties in breakdown order.
///
/// Unweighted components are not scored against, so they never get a tip.
/// Falls back to a single positive message so the list is never empty.
pub fn rule_insights(breakdown: &[SubScore], threshold: f64, max: usize) -> Vec<String> {
    let mut weak: Vec<&SubScore> = breakdown
        .iter()
        .filter(|s| s.weight > 0.0)
        .filter(|s| s.is_insufficient() || s.value < threshold)
        .collect();
    // Stable sort keeps breakdown order among equal values
    weak.sort_by(|a, b| a.value.total_cmp(&b.value));

    let tips: Vec<String> = weak.into_iter().take(max).map(tip_for).collect();
    if tips.is_empty() {
        vec![ALL_CLEAR.to_string()]
    } else {
        tips
    }
}

/// Utilization at or above this share of available credit earns a tip.
pub const HIGH_UTILIZATION_PERCENT: f64 = 50.0;

/// Lead with a utilization tip when a bureau report shows heavy card use.
///
/// The all-clear message no longer holds once a tip is added, so it goes.
pub fn add_utilization_tip(insights: &mut Vec<String>, utilization_percent: f64) {
    if utilization_percent.is_nan() || utilization_percent < HIGH_UTILIZATION_PERCENT {
        return;
    }
    insights.retain(|insight| insight != ALL_CLEAR);
    insights.insert(
        0,
        format!(
            "Your credit utilization is {:.0}%. Keeping card balances under 30% of your limits would lift your bureau score.",
            utilization_percent
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::INSUFFICIENT_DATA;

    fn sub(name: &str, value: f64, rationale: &str) -> SubScore {
        SubScore {
            name: name.to_string(),
            input: None,
            value,
            weight: 0.1,
            rationale: rationale.to_string(),
        }
    }

    #[test]
    fn test_weakest_first() {
        let breakdown = vec![
            sub("bureau", 75.0, ""),
            sub("savings_rate", 40.0, ""),
            sub("bill_discipline", 20.0, ""),
            sub("savings_buffer", 55.0, ""),
        ];
        let tips = rule_insights(&breakdown, 60.0, 2);
        assert_eq!(tips.len(), 2);
        assert!(tips[0].starts_with("Bill discipline scores 20/100"));
        assert!(tips[1].starts_with("Savings rate scores 40/100"));
    }

    #[test]
    fn test_ties_keep_breakdown_order() {
        let breakdown = vec![
            sub("lifestyle_risk", 50.0, INSUFFICIENT_DATA),
            sub("savings_buffer", 50.0, ""),
        ];
        let tips = rule_insights(&breakdown, 60.0, 2);
        assert!(tips[0].contains("lifestyle risk"));
        assert!(tips[1].starts_with("Savings buffer"));
    }

    #[test]
    fn test_insufficient_qualifies_above_threshold() {
        let breakdown = vec![sub("transaction_regularity", 70.0, INSUFFICIENT_DATA)];
        let tips = rule_insights(&breakdown, 60.0, 2);
        assert!(tips[0].contains("not enough data"));
    }

    #[test]
    fn test_unweighted_components_skipped() {
        let mut unweighted = sub("savings_rate", 10.0, "");
        unweighted.weight = 0.0;
        let tips = rule_insights(&[unweighted], 60.0, 2);
        assert_eq!(tips, vec![ALL_CLEAR.to_string()]);
    }

    #[test]
    fn test_all_clear_when_nothing_weak() {
        let breakdown = vec![sub("bureau", 90.0, ""), sub("savings_rate", 80.0, "")];
        assert_eq!(rule_insights(&breakdown, 60.0, 2), vec![ALL_CLEAR.to_string()]);
    }

    #[test]
    fn test_utilization_tip_threshold() {
        let mut insights = vec![ALL_CLEAR.to_string()];
        add_utilization_tip(&mut insights, 49.9);
        assert_eq!(insights, vec![ALL_CLEAR.to_string()]);

        add_utilization_tip(&mut insights, 50.0);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].starts_with("Your credit utilization is 50%"));

        let mut insights = vec!["Savings rate scores 40/100.".to_string()];
        add_utilization_tip(&mut insights, 82.0);
        assert_eq!(insights.len(), 2);
        assert!(insights[0].contains("82%"));
        assert_eq!(insights[1], "Savings rate scores 40/100.");
    }
}
