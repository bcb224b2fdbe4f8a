use crate::infra::{parse_amount, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use debtclear::config::AppConfig;
use debtclear::error::AppError;
use debtclear::import::DebtCsvImporter;
use debtclear::payoff::{
    extra_payment_impact, format_money, AttributionStatus, Debt, DebtExplanation, DebtPlanner,
    ExtraPaymentImpact, PayoffPlan, PlanOptions, Strategy,
};
use std::path::PathBuf;

/// Months of the recommended schedule echoed in text output.
const SCHEDULE_PREVIEW_MONTHS: usize = 3;

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// CSV file with name,balance,apr,min_payment columns
    #[arg(long)]
    pub(crate) debts: PathBuf,
    /// Total amount available for debt payments each month
    #[arg(long, value_parser = parse_amount)]
    pub(crate) budget: f64,
    /// Keep every simulated month instead of the configured preview
    #[arg(long)]
    pub(crate) full_history: bool,
    /// Project debt-free dates from this month (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Print the plan as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AccelerateArgs {
    /// CSV file with name,balance,apr,min_payment columns
    #[arg(long)]
    pub(crate) debts: PathBuf,
    /// Total amount available for debt payments each month
    #[arg(long, value_parser = parse_amount)]
    pub(crate) budget: f64,
    /// One-off payment applied today
    #[arg(long, value_parser = parse_amount)]
    pub(crate) extra: f64,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Monthly budget for the sample portfolio (defaults to 600)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) budget: Option<f64>,
    /// One-off payment for the acceleration example (defaults to 500)
    #[arg(long, value_parser = parse_amount)]
    pub(crate) extra: Option<f64>,
    /// Start month for debt-free dates (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let PlanArgs {
        debts,
        budget,
        full_history,
        start_date,
        json,
    } = args;

    let config = AppConfig::load()?;
    let debts = DebtCsvImporter::from_path(debts)?;
    let planner = DebtPlanner::new(config.planner);
    let plan = planner.plan_for(
        &debts,
        budget,
        PlanOptions {
            full_history,
            start_date,
        },
    )?;

    if json {
        print_json(&plan)?;
    } else {
        render_plan(&debts, budget, &plan, &planner.config().currency_symbol);
    }
    Ok(())
}

pub(crate) fn run_accelerate(args: AccelerateArgs) -> Result<(), AppError> {
    let AccelerateArgs {
        debts,
        budget,
        extra,
        json,
    } = args;

    let config = AppConfig::load()?;
    let debts = DebtCsvImporter::from_path(debts)?;
    let impact = extra_payment_impact(&debts, budget, extra)?;

    if json {
        print_json(&impact)?;
    } else {
        render_impact(&impact, extra, &config.planner.currency_symbol);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        budget,
        extra,
        start_date,
    } = args;

    let budget = budget.unwrap_or(600.0);
    let extra = extra.unwrap_or(500.0);
    let start_date = start_date.unwrap_or_else(|| Local::now().date_naive());

    let config = AppConfig::load()?;
    let planner = DebtPlanner::new(config.planner);
    let currency = planner.config().currency_symbol.clone();
    let debts = sample_portfolio();

    println!("DebtClear demo");
    let plan = planner.plan_for(
        &debts,
        budget,
        PlanOptions {
            full_history: false,
            start_date: Some(start_date),
        },
    )?;
    render_plan(&debts, budget, &plan, &currency);

    println!();
    let impact = extra_payment_impact(&debts, budget, extra)?;
    render_impact(&impact, extra, &currency);
    Ok(())
}

fn sample_portfolio() -> Vec<Debt> {
    vec![
        Debt::new("Credit card", 3200.0, 24.9, 90.0),
        Debt::new("Store card", 280.0, 29.9, 25.0),
        Debt::new("Car loan", 8400.0, 6.9, 210.0),
        Debt::new("Overdraft", 650.0, 19.0, 20.0),
    ]
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

fn render_plan(debts: &[Debt], budget: f64, plan: &PayoffPlan, currency: &str) {
    let minimums: f64 = debts.iter().map(|debt| debt.min_payment).sum();
    println!(
        "Payoff plan for {} debts | budget {} | minimums {}",
        debts.len(),
        money(currency, budget),
        money(currency, minimums)
    );
    if budget < minimums {
        println!("  Budget is below the combined minimums; minimums are still paid in full.");
    }

    println!("\nStrategy comparison");
    for strategy in Strategy::ALL {
        let result = plan.strategies.get(strategy);
        let marker = if strategy == plan.recommended {
            " (recommended)"
        } else {
            ""
        };
        let months = if result.converged {
            format!("{} months", result.months_to_freedom)
        } else {
            format!("not cleared after {} months", result.months_to_freedom)
        };
        println!(
            "- {}{}: {} | interest {} | total paid {}",
            strategy.label(),
            marker,
            months,
            money(currency, result.total_interest),
            money(currency, result.total_paid)
        );
        if let Some(date) = plan
            .debt_free_by
            .as_ref()
            .and_then(|dates| dates.get(&strategy))
        {
            println!("  Debt-free by {}", date.format("%B %Y"));
        }
    }

    println!("\nWhy this order");
    if plan.attribution.is_degenerate() {
        if let AttributionStatus::Degenerate { reason } = &plan.attribution.attribution {
            println!("  Attribution unavailable: {reason}");
        }
    }
    for explanation in &plan.attribution.explanations {
        println!("{}", explanation_line(explanation));
    }

    if !plan.attribution.feature_importance.is_empty() {
        println!("\nFeature importance");
        let mut importance: Vec<_> = plan.attribution.feature_importance.iter().collect();
        importance.sort_by(|a, b| b.1.total_cmp(a.1));
        for (feature, weight) in importance {
            println!("  - {}: {:.3}", feature.label(), weight);
        }
    }

    let schedule = &plan.recommended_result().payment_schedule;
    if !schedule.is_empty() {
        println!("\nFirst months of the recommended schedule");
        for entry in schedule.iter().take(SCHEDULE_PREVIEW_MONTHS) {
            let payments = entry
                .payments
                .iter()
                .filter(|payment| payment.payment > 0.0)
                .map(|payment| format!("{} {}", payment.name, money(currency, payment.payment)))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "  Month {}: {} (extra {}) -> {}",
                entry.month,
                money(currency, entry.total_paid),
                money(currency, entry.extra_applied),
                payments
            );
        }
    }

    println!("\nWhat if you paid more each month?");
    for scenario in &plan.budget_scenarios {
        println!(
            "  - {}: {} months | interest {}",
            money(currency, scenario.budget),
            scenario.months,
            money(currency, scenario.interest)
        );
    }
}

fn render_impact(impact: &ExtraPaymentImpact, extra: f64, currency: &str) {
    match &impact.target_debt {
        Some(name) => println!(
            "One-off payment of {} applied to {}",
            money(currency, extra),
            name
        ),
        None => println!("Nothing is owed; a one-off payment changes nothing"),
    }
    println!(
        "- Original: {} months | interest {}",
        impact.original.months,
        money(currency, impact.original.interest)
    );
    println!(
        "- Accelerated: {} months | interest {}",
        impact.accelerated.months,
        money(currency, impact.accelerated.interest)
    );
    println!(
        "- Saves {} months and {} in interest",
        impact.savings.months_saved,
        money(currency, impact.savings.interest_saved)
    );
}

fn explanation_line(explanation: &DebtExplanation) -> String {
    let driver = explanation
        .dominant_feature()
        .map(|kind| format!(" [driver: {}]", kind.label()))
        .unwrap_or_default();
    format!(
        "{}. {}: {}{}",
        explanation.rank, explanation.debt_name, explanation.explanation, driver
    )
}

fn money(currency: &str, amount: f64) -> String {
    format_money(currency, amount, 2)
}
