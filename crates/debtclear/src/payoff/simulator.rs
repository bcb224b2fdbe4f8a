use super::domain::{ensure_permutation, round_money, Debt, PlannerError};
use serde::{Deserialize, Serialize};

/// Hard cap on simulated months (30 years).
pub const MAX_MONTHS: u32 = 360;

/// How much month-by-month history a result keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLimit {
    pub timeline_months: Option<usize>,
    pub schedule_months: Option<usize>,
}

impl HistoryLimit {
    pub const DEFAULT_TIMELINE_MONTHS: usize = 12;
    pub const DEFAULT_SCHEDULE_MONTHS: usize = 24;

    pub const fn capped(timeline_months: usize, schedule_months: usize) -> Self {
        Self {
            timeline_months: Some(timeline_months),
            schedule_months: Some(schedule_months),
        }
    }

    pub const fn full() -> Self {
        Self {
            timeline_months: None,
            schedule_months: None,
        }
    }

    fn keeps_timeline(&self, recorded: usize) -> bool {
        self.timeline_months.map_or(true, |cap| recorded < cap)
    }

    fn keeps_schedule(&self, recorded: usize) -> bool {
        self.schedule_months.map_or(true, |cap| recorded < cap)
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        Self::capped(Self::DEFAULT_TIMELINE_MONTHS, Self::DEFAULT_SCHEDULE_MONTHS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub month: u32,
    pub remaining_balance: f64,
    pub interest_this_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub name: String,
    pub payment: f64,
    pub remaining_balance: f64,
    pub paid_off: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    pub month: u32,
    pub minimum_total: f64,
    pub extra_applied: f64,
    pub total_paid: f64,
    pub payments: Vec<DebtPayment>,
}

/// Outcome of running one priority order against a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub months_to_freedom: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    /// False when balance remained after [`MAX_MONTHS`].
    pub converged: bool,
    pub priority_order: Vec<usize>,
    pub timeline: Vec<MonthSnapshot>,
    pub payment_schedule: Vec<PaymentScheduleEntry>,
}

/// Simulate month-by-month payoff, directing any surplus above the minimums at
/// the first debt in `order` that still carries a balance.
///
/// Surplus is applied to a single debt per month; whatever that debt cannot
/// absorb is left unspent rather than rolled to the next debt. Interest is
/// charged on post-payment balances and capitalised.
///
/// `order` must visit every debt index exactly once.
pub fn simulate(
    debts: &[Debt],
    order: &[usize],
    monthly_budget: f64,
    history: HistoryLimit,
) -> Result<SimulationResult, PlannerError> {
    ensure_permutation(order, debts.len())?;
    Ok(simulate_order(debts, order, monthly_budget, history))
}

/// Month loop behind [`simulate`] for orders produced by the rankers.
pub(super) fn simulate_order(
    debts: &[Debt],
    order: &[usize],
    monthly_budget: f64,
    history: HistoryLimit,
) -> SimulationResult {
    let mut balances: Vec<f64> = debts.iter().map(|debt| debt.balance.max(0.0)).collect();
    let mut months = 0;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut timeline = Vec::new();
    let mut payment_schedule = Vec::new();

    while months < MAX_MONTHS && has_balance(&balances) {
        months += 1;

        let minimum_total: f64 = debts
            .iter()
            .zip(&balances)
            .filter(|(_, balance)| **balance > 0.0)
            .map(|(debt, _)| debt.min_payment)
            .sum();
        let extra = (monthly_budget - minimum_total).max(0.0);

        let mut paid = vec![0.0; debts.len()];
        for (index, debt) in debts.iter().enumerate() {
            if balances[index] > 0.0 {
                let payment = debt.min_payment.min(balances[index]);
                balances[index] = (balances[index] - payment).max(0.0);
                paid[index] += payment;
            }
        }

        let mut extra_applied = 0.0;
        if extra > 0.0 {
            if let Some(&target) = order.iter().find(|&&index| balances[index] > 0.0) {
                extra_applied = extra.min(balances[target]);
                balances[target] = (balances[target] - extra_applied).max(0.0);
                paid[target] += extra_applied;
            }
        }

        let mut month_interest = 0.0;
        for (index, debt) in debts.iter().enumerate() {
            if balances[index] > 0.0 {
                let interest = balances[index] * debt.monthly_rate();
                balances[index] += interest;
                month_interest += interest;
            }
        }
        total_interest += month_interest;

        let month_paid: f64 = paid.iter().sum();
        total_paid += month_paid;

        if history.keeps_timeline(timeline.len()) {
            timeline.push(MonthSnapshot {
                month: months,
                remaining_balance: round_money(balances.iter().sum()),
                interest_this_month: round_money(month_interest),
            });
        }

        if history.keeps_schedule(payment_schedule.len()) {
            let payments = debts
                .iter()
                .zip(&paid)
                .zip(&balances)
                .map(|((debt, payment), balance)| DebtPayment {
                    name: debt.name.clone(),
                    payment: round_money(*payment),
                    remaining_balance: round_money(*balance),
                    paid_off: *balance <= 0.0,
                })
                .collect();

            payment_schedule.push(PaymentScheduleEntry {
                month: months,
                minimum_total: round_money(month_paid - extra_applied),
                extra_applied: round_money(extra_applied),
                total_paid: round_money(month_paid),
                payments,
            });
        }
    }

    SimulationResult {
        months_to_freedom: months,
        total_interest: round_money(total_interest),
        total_paid: round_money(total_paid),
        converged: !has_balance(&balances),
        priority_order: order.to_vec(),
        timeline,
        payment_schedule,
    }
}

fn has_balance(balances: &[f64]) -> bool {
    balances.iter().any(|balance| *balance > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        debts: &[Debt],
        order: &[usize],
        monthly_budget: f64,
        history: HistoryLimit,
    ) -> SimulationResult {
        simulate(debts, order, monthly_budget, history).expect("valid order")
    }

    fn cards() -> Vec<Debt> {
        vec![
            Debt::new("CardA", 1000.0, 20.0, 50.0),
            Debt::new("CardB", 500.0, 10.0, 25.0),
        ]
    }

    #[test]
    fn empty_debt_list_is_immediately_free() {
        let result = run(&[], &[], 100.0, HistoryLimit::default());
        assert_eq!(result.months_to_freedom, 0);
        assert_eq!(result.total_interest, 0.0);
        assert!(result.converged);
        assert!(result.timeline.is_empty());
    }

    #[test]
    fn surplus_goes_to_first_debt_in_order() {
        let result = run(&cards(), &[1, 0], 100.0, HistoryLimit::default());
        let first = &result.payment_schedule[0];
        assert_eq!(first.minimum_total, 75.0);
        assert_eq!(first.extra_applied, 25.0);
        assert_eq!(first.payments[0].payment, 50.0);
        assert_eq!(first.payments[1].payment, 50.0);
    }

    #[test]
    fn unused_surplus_is_not_redistributed() {
        let debts = vec![
            Debt::new("Tiny", 30.0, 0.0, 10.0),
            Debt::new("Large", 1000.0, 0.0, 10.0),
        ];
        let result = run(&debts, &[0, 1], 200.0, HistoryLimit::default());
        let first = &result.payment_schedule[0];
        assert_eq!(first.payments[0].payment, 30.0);
        assert!(first.payments[0].paid_off);
        assert_eq!(first.payments[1].payment, 10.0);
        assert_eq!(first.total_paid, 40.0);
    }

    #[test]
    fn minimum_payment_is_clamped_to_balance() {
        let debts = vec![Debt::new("Store", 20.0, 0.0, 50.0)];
        let result = run(&debts, &[0], 50.0, HistoryLimit::default());
        assert_eq!(result.months_to_freedom, 1);
        assert_eq!(result.payment_schedule[0].payments[0].payment, 20.0);
        assert_eq!(result.payment_schedule[0].payments[0].remaining_balance, 0.0);
    }

    #[test]
    fn underfunded_budget_runs_to_the_cap() {
        let debts = vec![Debt::new("Payday", 5000.0, 36.0, 100.0)];
        let result = run(&debts, &[0], 50.0, HistoryLimit::default());
        assert_eq!(result.months_to_freedom, MAX_MONTHS);
        assert!(!result.converged);
        assert_eq!(result.payment_schedule[0].extra_applied, 0.0);
    }

    #[test]
    fn history_is_truncated_by_default_and_full_on_request() {
        let debts = vec![Debt::new("Loan", 6000.0, 6.0, 150.0)];
        let capped = run(&debts, &[0], 150.0, HistoryLimit::default());
        assert!(capped.months_to_freedom > 24);
        assert_eq!(capped.timeline.len(), 12);
        assert_eq!(capped.payment_schedule.len(), 24);

        let full = run(&debts, &[0], 150.0, HistoryLimit::full());
        assert_eq!(full.timeline.len(), full.months_to_freedom as usize);
        assert_eq!(full.payment_schedule.len(), full.months_to_freedom as usize);
        assert_eq!(full.total_interest, capped.total_interest);
        assert_eq!(full.timeline.last().map(|m| m.remaining_balance), Some(0.0));
    }

    #[test]
    fn zero_interest_payoff_matches_arithmetic() {
        let debts = vec![Debt::new("Family loan", 1000.0, 0.0, 100.0)];
        let result = run(&debts, &[0], 250.0, HistoryLimit::default());
        assert_eq!(result.months_to_freedom, 4);
        assert_eq!(result.total_interest, 0.0);
        assert_eq!(result.total_paid, 1000.0);
    }

    #[test]
    fn rejects_orders_that_skip_or_overrun_debts() {
        let error = simulate(&cards(), &[0], 100.0, HistoryLimit::default())
            .expect_err("order misses a debt");
        assert_eq!(
            error,
            PlannerError::InvalidOrder {
                order: vec![0],
                debts: 2
            }
        );

        let error = simulate(&cards(), &[0, 2], 100.0, HistoryLimit::default())
            .expect_err("index out of range");
        assert!(matches!(error, PlannerError::InvalidOrder { debts: 2, .. }));
    }

    #[test]
    fn interest_is_rounded_once_at_emission() {
        let debts = vec![
            Debt::new("Card", 4321.17, 19.99, 97.0),
            Debt::new("Store", 1234.56, 19.99, 41.0),
            Debt::new("Loan", 2718.28, 19.99, 63.0),
        ];
        let order = [0, 1, 2];
        let budget = 230.0;
        let result = run(&debts, &order, budget, HistoryLimit::full());
        assert!(result.converged);
        assert!(result.months_to_freedom > 48);

        // replay the month loop without any rounding
        let mut balances: Vec<f64> = debts.iter().map(|debt| debt.balance).collect();
        let mut unrounded = 0.0;
        while balances.iter().any(|balance| *balance > 0.0) {
            let minimums: f64 = debts
                .iter()
                .zip(&balances)
                .filter(|(_, balance)| **balance > 0.0)
                .map(|(debt, _)| debt.min_payment)
                .sum();
            let extra = (budget - minimums).max(0.0);
            for (debt, balance) in debts.iter().zip(balances.iter_mut()) {
                if *balance > 0.0 {
                    *balance = (*balance - debt.min_payment.min(*balance)).max(0.0);
                }
            }
            if extra > 0.0 {
                if let Some(&target) = order.iter().find(|&&index| balances[index] > 0.0) {
                    balances[target] = (balances[target] - extra.min(balances[target])).max(0.0);
                }
            }
            let mut month = 0.0;
            for (debt, balance) in debts.iter().zip(balances.iter_mut()) {
                if *balance > 0.0 {
                    let interest = *balance * debt.monthly_rate();
                    *balance += interest;
                    month += interest;
                }
            }
            unrounded += month;
        }
        assert_eq!(result.total_interest, round_money(unrounded));

        let per_month_rounded: f64 = result
            .timeline
            .iter()
            .map(|month| month.interest_this_month)
            .sum();
        assert_ne!(result.total_interest, round_money(per_month_rounded));
    }
}
