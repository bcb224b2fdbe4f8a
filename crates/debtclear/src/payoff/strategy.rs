use super::domain::Debt;
use super::simulator::{simulate_order, HistoryLimit, SimulationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weights of the composite hybrid score.
const HYBRID_APR_WEIGHT: f64 = 0.5;
const HYBRID_QUICK_WIN_WEIGHT: f64 = 0.3;
const HYBRID_PAYMENT_WEIGHT: f64 = 0.2;
const HYBRID_QUICK_WIN_NUMERATOR: f64 = 5000.0;
const HYBRID_BALANCE_FLOOR: f64 = 100.0;

/// Prioritisation used to direct surplus payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Highest APR first.
    Avalanche,
    /// Smallest balance first.
    Snowball,
    /// Composite of rate, balance, and payment burden.
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Avalanche, Strategy::Snowball, Strategy::Hybrid];

    pub const fn recommended() -> Self {
        Strategy::Hybrid
    }

    pub const fn label(self) -> &'static str {
        match self {
            Strategy::Avalanche => "Avalanche",
            Strategy::Snowball => "Snowball",
            Strategy::Hybrid => "Hybrid",
        }
    }

    pub fn order(self, debts: &[Debt]) -> Vec<usize> {
        match self {
            Strategy::Avalanche => avalanche_order(debts),
            Strategy::Snowball => snowball_order(debts),
            Strategy::Hybrid => hybrid_order(debts),
        }
    }

    pub fn simulate(
        self,
        debts: &[Debt],
        monthly_budget: f64,
        history: HistoryLimit,
    ) -> SimulationResult {
        let order = self.order(debts);
        simulate_order(debts, &order, monthly_budget, history)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Indices by descending APR; equal rates keep input order.
pub fn avalanche_order(debts: &[Debt]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..debts.len()).collect();
    order.sort_by(|&a, &b| debts[b].apr.total_cmp(&debts[a].apr));
    order
}

/// Indices by ascending balance; equal balances keep input order.
pub fn snowball_order(debts: &[Debt]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..debts.len()).collect();
    order.sort_by(|&a, &b| debts[a].balance.total_cmp(&debts[b].balance));
    order
}

/// Indices by descending [`hybrid_score`]; equal scores keep input order.
pub fn hybrid_order(debts: &[Debt]) -> Vec<usize> {
    let scores: Vec<f64> = debts.iter().map(hybrid_score).collect();
    let mut order: Vec<usize> = (0..debts.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

pub fn hybrid_score(debt: &Debt) -> f64 {
    HYBRID_APR_WEIGHT * debt.apr
        + HYBRID_QUICK_WIN_WEIGHT
            * (HYBRID_QUICK_WIN_NUMERATOR / debt.balance.max(HYBRID_BALANCE_FLOOR))
        + HYBRID_PAYMENT_WEIGHT * debt.min_payment
}

/// One simulation per strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResults {
    pub avalanche: SimulationResult,
    pub snowball: SimulationResult,
    pub hybrid: SimulationResult,
}

impl StrategyResults {
    pub fn get(&self, strategy: Strategy) -> &SimulationResult {
        match strategy {
            Strategy::Avalanche => &self.avalanche,
            Strategy::Snowball => &self.snowball,
            Strategy::Hybrid => &self.hybrid,
        }
    }
}

pub fn compare_strategies(
    debts: &[Debt],
    monthly_budget: f64,
    history: HistoryLimit,
) -> StrategyResults {
    StrategyResults {
        avalanche: Strategy::Avalanche.simulate(debts, monthly_budget, history),
        snowball: Strategy::Snowball.simulate(debts, monthly_budget, history),
        hybrid: Strategy::Hybrid.simulate(debts, monthly_budget, history),
    }
}
