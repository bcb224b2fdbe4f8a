pub mod calendar;
pub mod domain;
pub mod explain;
pub mod planner;
pub mod scenario;
pub mod simulator;
pub mod strategy;

pub use domain::{
    format_money, round_money, validate_budget, validate_debts, Debt, DebtInput, PlannerError,
};
pub use explain::{
    AttributionExplainer, AttributionReport, AttributionStatus, DebtExplanation, FeatureKind,
    ForestConfig,
};
pub use planner::{
    AccelerationRequest, DebtPlanner, PayoffPlan, PlanOptions, PlanRequest, PlannerConfig,
};
pub use scenario::{
    budget_scenarios, extra_payment_impact, BudgetScenario, ExtraPaymentImpact, Savings,
    ScenarioOutcome, DEFAULT_BUDGET_STEPS,
};
pub use simulator::{
    simulate, DebtPayment, HistoryLimit, MonthSnapshot, PaymentScheduleEntry, SimulationResult,
    MAX_MONTHS,
};
pub use strategy::{compare_strategies, Strategy, StrategyResults};
