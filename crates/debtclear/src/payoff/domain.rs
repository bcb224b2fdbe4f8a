use serde::{Deserialize, Serialize};

/// Errors raised while validating input or explaining a payoff ordering.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("priority order {order:?} is not a permutation of {debts} debt indices")]
    InvalidOrder { order: Vec<usize>, debts: usize },
    #[error(
        "attribution needs at least 2 debts with distinct features, got {distinct} distinct of {debts}"
    )]
    DegenerateAttribution { debts: usize, distinct: usize },
}

impl PlannerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Debt as it arrives on the wire; every field is optional so missing values
/// surface as validation errors instead of decode failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub apr: Option<f64>,
    #[serde(default, rename = "minPayment", alias = "min_payment")]
    pub min_payment: Option<f64>,
}

/// Validated debt record. Balances are non-negative; `min_payment` may exceed
/// the balance, in which case payments are clamped during simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    pub apr: f64,
    pub min_payment: f64,
}

impl Debt {
    pub fn new(name: impl Into<String>, balance: f64, apr: f64, min_payment: f64) -> Self {
        Self {
            name: name.into(),
            balance,
            apr,
            min_payment,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.apr / 100.0 / 12.0
    }

    /// Interest one month of carrying the current balance costs.
    pub fn monthly_interest(&self) -> f64 {
        self.balance * self.monthly_rate()
    }
}

impl TryFrom<DebtInput> for Debt {
    type Error = PlannerError;

    fn try_from(input: DebtInput) -> Result<Self, Self::Error> {
        let name = input
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| PlannerError::invalid("debt name is required"))?;

        let balance = required_amount(&name, "balance", input.balance)?;
        let apr = required_amount(&name, "apr", input.apr)?;
        let min_payment = required_amount(&name, "minPayment", input.min_payment.or(Some(0.0)))?;

        Ok(Self {
            name,
            balance,
            apr,
            min_payment,
        })
    }
}

fn required_amount(name: &str, field: &str, value: Option<f64>) -> Result<f64, PlannerError> {
    match value {
        None => Err(PlannerError::invalid(format!(
            "debt '{name}' is missing {field}"
        ))),
        Some(value) if !value.is_finite() => Err(PlannerError::invalid(format!(
            "debt '{name}' has a non-numeric {field}"
        ))),
        Some(value) if value < 0.0 => Err(PlannerError::invalid(format!(
            "debt '{name}' has a negative {field} ({value})"
        ))),
        Some(value) => Ok(value),
    }
}

/// Validate a full debt list, rejecting empty input.
pub fn validate_debts(inputs: Vec<DebtInput>) -> Result<Vec<Debt>, PlannerError> {
    if inputs.is_empty() {
        return Err(PlannerError::invalid("at least one debt is required"));
    }

    inputs.into_iter().map(Debt::try_from).collect()
}

pub fn validate_budget(budget: Option<f64>) -> Result<f64, PlannerError> {
    match budget {
        None => Err(PlannerError::invalid("monthly budget is required")),
        Some(value) if !value.is_finite() => {
            Err(PlannerError::invalid("monthly budget must be a number"))
        }
        Some(value) if value < 0.0 => Err(PlannerError::invalid(format!(
            "monthly budget cannot be negative ({value})"
        ))),
        Some(value) => Ok(value),
    }
}

/// Check that `order` visits every debt index exactly once.
pub fn ensure_permutation(order: &[usize], debts: usize) -> Result<(), PlannerError> {
    let mut seen = vec![false; debts];
    let valid = order.len() == debts
        && order.iter().all(|&index| {
            if index >= debts || seen[index] {
                false
            } else {
                seen[index] = true;
                true
            }
        });

    if valid {
        Ok(())
    } else {
        Err(PlannerError::InvalidOrder {
            order: order.to_vec(),
            debts,
        })
    }
}

/// Round a monetary figure to cents. Only applied when building emitted results.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Currency amount with comma thousands separators, e.g. `£1,234.50` or `-$12`.
pub fn format_money(currency: &str, amount: f64, decimals: usize) -> String {
    let digits = format!("{:.*}", decimals, amount.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + whole.len() / 3);
    for (position, digit) in whole.chars().enumerate() {
        if position > 0 && (whole.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    // "-£0.00" reads as a bug
    let negative = amount < 0.0 && digits.chars().any(|digit| matches!(digit, '1'..='9'));
    let sign = if negative { "-" } else { "" };
    format!("{sign}{currency}{grouped}")
}
