use super::domain::{round_money, Debt, PlannerError};
use super::simulator::{simulate_order, HistoryLimit};
use super::strategy::Strategy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUDGET_STEPS: [f64; 3] = [0.0, 100.0, 200.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetScenario {
    pub budget: f64,
    pub months: u32,
    pub interest: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub months: u32,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub months_saved: i64,
    pub interest_saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentImpact {
    /// Debt that received the lump sum; `None` when nothing was owed.
    pub target_debt: Option<String>,
    pub original: ScenarioOutcome,
    pub accelerated: ScenarioOutcome,
    pub savings: Savings,
}

/// Hybrid-strategy outcome at `base_budget + step` for each step.
pub fn budget_scenarios(debts: &[Debt], base_budget: f64, steps: &[f64]) -> Vec<BudgetScenario> {
    steps
        .iter()
        .map(|step| {
            let budget = base_budget + step;
            let result = Strategy::Hybrid.simulate(debts, budget, HistoryLimit::capped(0, 0));
            BudgetScenario {
                budget: round_money(budget),
                months: result.months_to_freedom,
                interest: result.total_interest,
                converged: result.converged,
            }
        })
        .collect()
}

/// Compare the hybrid plan with and without a one-off payment applied today to
/// the debt at the head of the hybrid order. Both runs share that order.
pub fn extra_payment_impact(
    debts: &[Debt],
    base_budget: f64,
    extra_payment: f64,
) -> Result<ExtraPaymentImpact, PlannerError> {
    if !extra_payment.is_finite() || extra_payment < 0.0 {
        return Err(PlannerError::invalid(format!(
            "extra payment must be a non-negative amount, got {extra_payment}"
        )));
    }

    let order = Strategy::Hybrid.order(debts);
    let history = HistoryLimit::capped(0, 0);
    let original = simulate_order(debts, &order, base_budget, history);

    let mut accelerated_debts = debts.to_vec();
    let target = order
        .iter()
        .copied()
        .find(|&index| accelerated_debts[index].balance > 0.0);
    if let Some(index) = target {
        let debt = &mut accelerated_debts[index];
        debt.balance = (debt.balance - extra_payment).max(0.0);
    }
    let accelerated = simulate_order(&accelerated_debts, &order, base_budget, history);

    Ok(ExtraPaymentImpact {
        target_debt: target.map(|index| debts[index].name.clone()),
        savings: Savings {
            months_saved: i64::from(original.months_to_freedom)
                - i64::from(accelerated.months_to_freedom),
            interest_saved: round_money(original.total_interest - accelerated.total_interest),
        },
        original: ScenarioOutcome {
            months: original.months_to_freedom,
            interest: original.total_interest,
        },
        accelerated: ScenarioOutcome {
            months: accelerated.months_to_freedom,
            interest: accelerated.total_interest,
        },
    })
}
