use super::super::domain::{format_money, Debt};
use super::features::{FeatureKind, FEATURE_COUNT};

/// Attributions below this magnitude are not called out as drivers.
const NOTABLE_ATTRIBUTION: f64 = 0.1;

/// Features ordered by attribution magnitude, strongest first.
pub(crate) fn dominant_features(values: &[f64; FEATURE_COUNT]) -> Vec<(FeatureKind, f64)> {
    let mut ranked: Vec<(FeatureKind, f64)> = FeatureKind::ALL
        .iter()
        .map(|kind| (*kind, values[kind.index()]))
        .collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    ranked
}

pub(crate) fn render_explanation(
    debt: &Debt,
    rank: usize,
    values: &[f64; FEATURE_COUNT],
    currency: &str,
) -> String {
    let mut parts = Vec::new();

    for (kind, impact) in dominant_features(values).into_iter().take(2) {
        let impact_pct = (impact.abs() * 100.0) as u32;
        match kind {
            FeatureKind::InterestRate if impact > NOTABLE_ATTRIBUTION => parts.push(format!(
                "The high interest rate ({:.1}% APR) is a major factor ({impact_pct}% weight). \
                 Every month you carry this debt costs {currency}{:.0} in interest.",
                debt.apr,
                debt.monthly_interest()
            )),
            FeatureKind::BalanceSize if impact < 0.0 => parts.push(format!(
                "While the balance is large ({}), we're balancing total interest \
                 savings with psychological wins.",
                format_money(currency, debt.balance, 0)
            )),
            FeatureKind::QuickWin if impact > NOTABLE_ATTRIBUTION => parts.push(format!(
                "This debt can be paid off quickly for a motivational boost ({impact_pct}% factor)."
            )),
            _ => {}
        }
    }

    if parts.is_empty() {
        rank_statement(rank)
    } else {
        parts.join(" ")
    }
}

pub(crate) fn rank_statement(rank: usize) -> String {
    format!("This debt is ranked #{rank} in the recommended payoff order.")
}
