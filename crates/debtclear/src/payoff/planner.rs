use super::calendar::debt_free_date;
use super::domain::{validate_budget, validate_debts, Debt, DebtInput, PlannerError};
use super::explain::{AttributionExplainer, AttributionReport, ForestConfig};
use super::scenario::{
    budget_scenarios, extra_payment_impact, BudgetScenario, ExtraPaymentImpact,
    DEFAULT_BUDGET_STEPS,
};
use super::simulator::{HistoryLimit, SimulationResult};
use super::strategy::{compare_strategies, Strategy, StrategyResults};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Tunables for the planner; loaded from the environment by `AppConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub history: HistoryLimit,
    pub budget_steps: Vec<f64>,
    pub currency_symbol: String,
    pub forest: ForestConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            history: HistoryLimit::default(),
            budget_steps: DEFAULT_BUDGET_STEPS.to_vec(),
            currency_symbol: "£".to_string(),
            forest: ForestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub debts: Vec<DebtInput>,
    #[serde(default, alias = "monthly_budget")]
    pub monthly_budget: Option<f64>,
    #[serde(default, alias = "full_history")]
    pub full_history: bool,
    #[serde(default, alias = "start_date")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccelerationRequest {
    #[serde(default)]
    pub debts: Vec<DebtInput>,
    #[serde(default, alias = "monthly_budget")]
    pub monthly_budget: Option<f64>,
    #[serde(default, alias = "extra_payment")]
    pub extra_payment: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    pub full_history: bool,
    pub start_date: Option<NaiveDate>,
}

/// Everything a caller needs to choose and understand a payoff strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoffPlan {
    pub strategies: StrategyResults,
    pub recommended: Strategy,
    #[serde(flatten)]
    pub attribution: AttributionReport,
    pub budget_scenarios: Vec<BudgetScenario>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_free_by: Option<BTreeMap<Strategy, NaiveDate>>,
}

impl PayoffPlan {
    pub fn recommended_result(&self) -> &SimulationResult {
        self.strategies.get(self.recommended)
    }
}

/// Entry point composing the ranker, simulator, explainer, and scenarios.
#[derive(Debug, Clone)]
pub struct DebtPlanner {
    config: PlannerConfig,
    explainer: AttributionExplainer,
}

impl Default for DebtPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl DebtPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let explainer =
            AttributionExplainer::new(config.forest.clone(), config.currency_symbol.clone());
        Self { config, explainer }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Validate a wire request and build the full plan.
    pub fn plan(&self, request: PlanRequest) -> Result<PayoffPlan, PlannerError> {
        let debts = validate_debts(request.debts)?;
        let budget = validate_budget(request.monthly_budget)?;
        self.plan_for(
            &debts,
            budget,
            PlanOptions {
                full_history: request.full_history,
                start_date: request.start_date,
            },
        )
    }

    pub fn plan_for(
        &self,
        debts: &[Debt],
        monthly_budget: f64,
        options: PlanOptions,
    ) -> Result<PayoffPlan, PlannerError> {
        let history = if options.full_history {
            HistoryLimit::full()
        } else {
            self.config.history
        };

        let strategies = compare_strategies(debts, monthly_budget, history);
        for strategy in Strategy::ALL {
            let result = strategies.get(strategy);
            debug!(
                %strategy,
                months = result.months_to_freedom,
                interest = result.total_interest,
                "simulated payoff strategy"
            );
            if !result.converged {
                warn!(
                    %strategy,
                    months = result.months_to_freedom,
                    "balance remains after the simulation horizon"
                );
            }
        }

        let recommended = Strategy::recommended();
        let order = &strategies.get(recommended).priority_order;
        let attribution = match self.explainer.explain(debts, order) {
            Ok(report) => report,
            Err(err @ PlannerError::DegenerateAttribution { .. }) => {
                warn!(debts = debts.len(), "attribution skipped: {err}");
                AttributionReport::degenerate(debts, order, err.to_string())
            }
            Err(err) => return Err(err),
        };

        let budget_scenarios = budget_scenarios(debts, monthly_budget, &self.config.budget_steps);

        let debt_free_by = options.start_date.map(|start| {
            Strategy::ALL
                .iter()
                .filter_map(|strategy| {
                    let result = strategies.get(*strategy);
                    if !result.converged {
                        return None;
                    }
                    debt_free_date(start, result.months_to_freedom).map(|date| (*strategy, date))
                })
                .collect()
        });

        let headline = strategies.get(recommended);
        info!(
            debts = debts.len(),
            monthly_budget,
            %recommended,
            months = headline.months_to_freedom,
            interest = headline.total_interest,
            "payoff plan ready"
        );

        Ok(PayoffPlan {
            strategies,
            recommended,
            attribution,
            budget_scenarios,
            debt_free_by,
        })
    }

    /// Validate a wire request and measure the effect of a one-off payment.
    pub fn accelerate(
        &self,
        request: AccelerationRequest,
    ) -> Result<ExtraPaymentImpact, PlannerError> {
        let debts = validate_debts(request.debts)?;
        let budget = validate_budget(request.monthly_budget)?;
        let extra = request
            .extra_payment
            .ok_or_else(|| PlannerError::invalid("extra payment is required"))?;

        let impact = extra_payment_impact(&debts, budget, extra)?;
        info!(
            extra_payment = extra,
            months_saved = impact.savings.months_saved,
            interest_saved = impact.savings.interest_saved,
            "extra payment impact computed"
        );
        Ok(impact)
    }
}
