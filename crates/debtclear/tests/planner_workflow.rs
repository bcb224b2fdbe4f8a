use chrono::NaiveDate;
use debtclear::import::DebtCsvImporter;
use debtclear::payoff::{
    budget_scenarios, extra_payment_impact, AttributionExplainer, AttributionStatus, Debt,
    DebtPlanner, FeatureKind, PlanOptions, PlannerConfig, PlannerError, Strategy,
};
use proptest::collection::vec;
use proptest::prelude::{prop_assert, proptest};
use proptest::strategy::Strategy as _;

fn sample_debts() -> Vec<Debt> {
    let data = include_bytes!("../sample_debts.csv");
    DebtCsvImporter::from_reader(&data[..]).expect("sample debts import")
}

#[test]
fn sample_file_imports_with_spreadsheet_formatting() {
    let debts = sample_debts();
    assert_eq!(debts.len(), 5);
    assert_eq!(debts[0], Debt::new("Credit card", 3200.0, 24.9, 90.0));
    assert_eq!(debts[4].apr, 0.0);
}

#[test]
fn plan_explains_every_debt_in_recommended_order() {
    let debts = sample_debts();
    let plan = DebtPlanner::default()
        .plan_for(
            &debts,
            650.0,
            PlanOptions {
                full_history: false,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            },
        )
        .expect("plan builds");

    assert_eq!(plan.recommended, Strategy::Hybrid);
    let order = &plan.recommended_result().priority_order;
    let names: Vec<&str> = plan
        .attribution
        .explanations
        .iter()
        .map(|explanation| explanation.debt_name.as_str())
        .collect();
    let expected: Vec<&str> = order.iter().map(|&index| debts[index].name.as_str()).collect();
    assert_eq!(names, expected);

    assert!(matches!(
        plan.attribution.attribution,
        AttributionStatus::Fitted { .. }
    ));
    assert_eq!(plan.attribution.feature_importance.len(), FeatureKind::ALL.len());
    assert!(plan
        .attribution
        .explanations
        .iter()
        .all(|explanation| !explanation.explanation.is_empty()));

    let dates = plan.debt_free_by.expect("dates projected");
    assert_eq!(dates.len(), Strategy::ALL.len());
}

fn portfolio() -> impl proptest::strategy::Strategy<Value = Vec<Debt>> {
    vec((0.0f64..12_000.0, 0.0f64..35.0, 5.0f64..300.0), 2..=7).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (balance, apr, min_payment))| {
                Debt::new(format!("Debt {index}"), balance, apr, min_payment)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(16))]

    #[test]
    fn prop_attributions_sum_to_prediction_minus_baseline(debts in portfolio()) {
        let order = Strategy::Hybrid.order(&debts);
        let report = AttributionExplainer::default()
            .explain(&debts, &order)
            .expect("report");
        let AttributionStatus::Fitted { baseline } = report.attribution else {
            panic!("expected fitted attribution");
        };

        for explanation in &report.explanations {
            let prediction = explanation.prediction.expect("prediction");
            let total: f64 = explanation.attributions.values().sum();
            prop_assert!((total - (prediction - baseline)).abs() < 1e-9);
        }
    }
}

#[test]
fn explainer_rejects_foreign_orders() {
    let debts = sample_debts();
    let error = AttributionExplainer::default()
        .explain(&debts, &[0, 1, 2, 3, 9])
        .expect_err("index out of range");
    assert!(matches!(error, PlannerError::InvalidOrder { .. }));
}

#[test]
fn budget_scenarios_use_configured_steps() {
    let debts = sample_debts();
    let config = PlannerConfig {
        budget_steps: vec![0.0, 50.0, 150.0, 400.0],
        ..PlannerConfig::default()
    };
    let plan = DebtPlanner::new(config)
        .plan_for(&debts, 500.0, PlanOptions::default())
        .expect("plan builds");

    let budgets: Vec<f64> = plan
        .budget_scenarios
        .iter()
        .map(|scenario| scenario.budget)
        .collect();
    assert_eq!(budgets, vec![500.0, 550.0, 650.0, 900.0]);
    assert_eq!(
        plan.budget_scenarios,
        budget_scenarios(&debts, 500.0, &[0.0, 50.0, 150.0, 400.0])
    );
    assert!(plan
        .budget_scenarios
        .windows(2)
        .all(|pair| pair[1].months <= pair[0].months && pair[1].interest <= pair[0].interest));
}

#[test]
fn extra_payments_never_cost_more() {
    let debts = sample_debts();
    let mut previous = extra_payment_impact(&debts, 450.0, 0.0).expect("baseline");
    assert_eq!(previous.savings.months_saved, 0);
    assert_eq!(previous.savings.interest_saved, 0.0);

    for extra in [100.0, 250.0, 1000.0, 5000.0] {
        let impact = extra_payment_impact(&debts, 450.0, extra).expect("impact");
        assert!(impact.savings.months_saved >= previous.savings.months_saved);
        assert!(impact.savings.interest_saved >= previous.savings.interest_saved);
        previous = impact;
    }
}
