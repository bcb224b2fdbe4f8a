use debtclear::payoff::{
    compare_strategies, simulate, Debt, HistoryLimit, Strategy, MAX_MONTHS,
};
use proptest::collection::vec;
use proptest::prelude::{prop_assert, prop_assert_eq, prop_oneof, proptest, Just};
use proptest::strategy::Strategy as _;

fn portfolio() -> impl proptest::strategy::Strategy<Value = Vec<Debt>> {
    let balance = prop_oneof![1 => Just(0.0), 9 => 50.0f64..8000.0];
    vec((balance, 0.0f64..35.0, 5.0f64..250.0), 1..=6).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (balance, apr, min_payment))| {
                Debt::new(format!("Debt {index}"), balance, apr, min_payment)
            })
            .collect()
    })
}

fn minimum_total(debts: &[Debt]) -> f64 {
    debts.iter().map(|debt| debt.min_payment).sum()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_monthly_payments_never_exceed_a_sufficient_budget(
        debts in portfolio(),
        surplus in 0.0f64..600.0,
    ) {
        let budget = minimum_total(&debts) + surplus;

        for strategy in Strategy::ALL {
            let result = strategy.simulate(&debts, budget, HistoryLimit::full());
            for entry in &result.payment_schedule {
                let paid: f64 = entry.payments.iter().map(|payment| payment.payment).sum();
                let tolerance = 0.01 * (debts.len() as f64 + 1.0);
                prop_assert!((paid - entry.total_paid).abs() <= tolerance);
                prop_assert!(
                    (entry.minimum_total + entry.extra_applied - entry.total_paid).abs() <= 0.02
                );
                prop_assert!(entry.extra_applied <= budget - entry.minimum_total + 0.02);
                prop_assert!(entry.total_paid <= budget + 0.01);
            }
        }
    }

    #[test]
    fn prop_raising_the_budget_never_slows_payoff(
        debts in portfolio(),
        factor in 0.5f64..1.5,
        raise in 1.0f64..500.0,
    ) {
        let low = minimum_total(&debts) * factor;
        let high = low + raise;

        for strategy in Strategy::ALL {
            let slow = strategy.simulate(&debts, low, HistoryLimit::capped(0, 0));
            let fast = strategy.simulate(&debts, high, HistoryLimit::capped(0, 0));
            prop_assert!(fast.months_to_freedom <= slow.months_to_freedom);
            prop_assert!(fast.total_interest <= slow.total_interest);
        }
    }

    #[test]
    fn prop_simulation_is_deterministic_and_bounded(
        debts in portfolio(),
        budget in 0.0f64..1500.0,
    ) {
        let first = compare_strategies(&debts, budget, HistoryLimit::default());
        let second = compare_strategies(&debts, budget, HistoryLimit::default());
        prop_assert_eq!(&first, &second);

        for strategy in Strategy::ALL {
            let result = first.get(strategy);
            prop_assert!(result.months_to_freedom <= MAX_MONTHS);
            prop_assert!(result.timeline.len() <= HistoryLimit::DEFAULT_TIMELINE_MONTHS);
            prop_assert!(result.payment_schedule.len() <= HistoryLimit::DEFAULT_SCHEDULE_MONTHS);
            if !result.converged {
                prop_assert_eq!(result.months_to_freedom, MAX_MONTHS);
            }
        }
    }
}

#[test]
fn single_debt_paid_by_minimums_accrues_interest() {
    let debts = vec![Debt::new("Loan", 1200.0, 24.0, 100.0)];
    let result = simulate(&debts, &[0], 100.0, HistoryLimit::full()).expect("valid order");

    assert!(result.converged);
    assert!(result.total_interest > 0.0);
    assert!(result.months_to_freedom > 12);
    assert!(result
        .payment_schedule
        .iter()
        .all(|entry| entry.extra_applied == 0.0));
}

#[test]
fn two_card_example_orders_and_converges() {
    let debts = vec![
        Debt::new("CardA", 1000.0, 20.0, 50.0),
        Debt::new("CardB", 500.0, 10.0, 25.0),
    ];
    let results = compare_strategies(&debts, 100.0, HistoryLimit::default());

    assert_eq!(results.avalanche.priority_order, vec![0, 1]);
    assert_eq!(results.snowball.priority_order, vec![1, 0]);
    for strategy in Strategy::ALL {
        let result = results.get(strategy);
        assert!(result.converged, "{strategy} should clear both cards");
        assert!(result.total_paid > 1500.0);
    }
}

#[test]
fn underfunded_budget_still_pays_minimums() {
    let debts = vec![
        Debt::new("CardA", 1000.0, 20.0, 50.0),
        Debt::new("CardB", 500.0, 10.0, 25.0),
    ];
    let result = Strategy::Hybrid.simulate(&debts, 40.0, HistoryLimit::default());
    let first = &result.payment_schedule[0];
    assert_eq!(first.total_paid, 75.0);
    assert_eq!(first.extra_applied, 0.0);
}
