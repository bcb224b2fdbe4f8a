use super::super::domain::Debt;
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 4;

const QUICK_WIN_NUMERATOR: f64 = 10_000.0;
const QUICK_WIN_BALANCE_FLOOR: f64 = 100.0;

/// Debt characteristics the surrogate model learns the ranking from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    InterestRate,
    BalanceSize,
    QuickWin,
    PaymentBurden,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; FEATURE_COUNT] = [
        FeatureKind::InterestRate,
        FeatureKind::BalanceSize,
        FeatureKind::QuickWin,
        FeatureKind::PaymentBurden,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            FeatureKind::InterestRate => "Interest Rate Impact",
            FeatureKind::BalanceSize => "Balance Size Impact",
            FeatureKind::QuickWin => "Quick Win Potential",
            FeatureKind::PaymentBurden => "Monthly Payment Burden",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

pub type FeatureVector = [f64; FEATURE_COUNT];

pub fn feature_vector(debt: &Debt) -> FeatureVector {
    let payment_burden = if debt.balance > 0.0 {
        debt.min_payment / debt.balance * 100.0
    } else {
        0.0
    };

    [
        debt.apr,
        debt.balance.ln_1p(),
        QUICK_WIN_NUMERATOR / debt.balance.max(QUICK_WIN_BALANCE_FLOOR),
        payment_burden,
    ]
}

pub fn feature_matrix(debts: &[Debt]) -> Vec<FeatureVector> {
    debts.iter().map(feature_vector).collect()
}

/// Synthetic target: the k-th debt in `order` scores `1/k`.
pub fn rank_targets(order: &[usize], debts: usize) -> Vec<f64> {
    let mut targets = vec![0.0; debts];
    for (rank, &index) in order.iter().enumerate() {
        targets[index] = 1.0 / (rank as f64 + 1.0);
    }
    targets
}
