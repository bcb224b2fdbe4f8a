//! Attribution explanations for a payoff ordering.
//!
//! The ordering is turned into a regression problem (the k-th debt scores
//! `1/k`), a small seeded forest learns it from debt features, and each
//! debt's prediction is decomposed into per-feature Shapley values that feed
//! templated sentences.

mod features;
mod forest;
mod narrative;
mod shapley;

pub use features::{
    feature_matrix, feature_vector, rank_targets, FeatureKind, FeatureVector, FEATURE_COUNT,
};
pub use forest::ForestConfig;

use super::domain::{ensure_permutation, Debt, PlannerError};
use forest::RandomForest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Whether the surrogate model could be fit for this request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttributionStatus {
    Fitted { baseline: f64 },
    Degenerate { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtExplanation {
    pub debt_name: String,
    pub rank: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributions: BTreeMap<FeatureKind, f64>,
}

impl DebtExplanation {
    /// Feature with the largest absolute attribution, if any were computed.
    pub fn dominant_feature(&self) -> Option<FeatureKind> {
        self.attributions
            .iter()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(kind, _)| *kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionReport {
    pub attribution: AttributionStatus,
    pub explanations: Vec<DebtExplanation>,
    pub feature_importance: BTreeMap<FeatureKind, f64>,
}

impl AttributionReport {
    /// Minimal, clearly flagged report used when no model can be fit.
    pub fn degenerate(debts: &[Debt], order: &[usize], reason: impl Into<String>) -> Self {
        let explanations = order
            .iter()
            .enumerate()
            .filter_map(|(position, &index)| {
                debts.get(index).map(|debt| DebtExplanation {
                    debt_name: debt.name.clone(),
                    rank: position + 1,
                    explanation: narrative::rank_statement(position + 1),
                    prediction: None,
                    attributions: BTreeMap::new(),
                })
            })
            .collect();

        Self {
            attribution: AttributionStatus::Degenerate {
                reason: reason.into(),
            },
            explanations,
            feature_importance: BTreeMap::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.attribution, AttributionStatus::Degenerate { .. })
    }
}

/// Stateless explainer; each call fits its own model.
#[derive(Debug, Clone)]
pub struct AttributionExplainer {
    forest: ForestConfig,
    currency_symbol: String,
}

impl Default for AttributionExplainer {
    fn default() -> Self {
        Self::new(ForestConfig::default(), "£")
    }
}

impl AttributionExplainer {
    pub fn new(forest: ForestConfig, currency_symbol: impl Into<String>) -> Self {
        Self {
            forest,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn explain(
        &self,
        debts: &[Debt],
        order: &[usize],
    ) -> Result<AttributionReport, PlannerError> {
        ensure_permutation(order, debts.len())?;
        let features = feature_matrix(debts);
        // identical rows leave the forest nothing to split on
        let distinct = distinct_rows(&features);
        if distinct < 2 {
            return Err(PlannerError::DegenerateAttribution {
                debts: debts.len(),
                distinct,
            });
        }

        let targets = rank_targets(order, debts.len());
        let model = RandomForest::fit(&features, &targets, &self.forest);
        let attributions: Vec<shapley::Attribution> = features
            .iter()
            .map(|x| shapley::shapley_values(&model, x))
            .collect();

        let baseline = attributions.first().map_or(0.0, |attribution| attribution.baseline);
        debug!(
            debts = debts.len(),
            trees = self.forest.trees,
            baseline,
            "fitted attribution surrogate"
        );

        let explanations = order
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                let rank = position + 1;
                let attribution = &attributions[index];
                DebtExplanation {
                    debt_name: debts[index].name.clone(),
                    rank,
                    explanation: narrative::render_explanation(
                        &debts[index],
                        rank,
                        &attribution.values,
                        &self.currency_symbol,
                    ),
                    prediction: Some(attribution.prediction),
                    attributions: by_feature(&attribution.values),
                }
            })
            .collect();

        let mut mean_abs = [0.0; FEATURE_COUNT];
        for attribution in &attributions {
            for (total, value) in mean_abs.iter_mut().zip(attribution.values) {
                *total += value.abs();
            }
        }
        for total in mean_abs.iter_mut() {
            *total /= attributions.len() as f64;
        }

        Ok(AttributionReport {
            attribution: AttributionStatus::Fitted { baseline },
            explanations,
            feature_importance: by_feature(&mean_abs),
        })
    }
}

fn distinct_rows(features: &[FeatureVector]) -> usize {
    features
        .iter()
        .enumerate()
        .filter(|(index, row)| !features[..*index].contains(row))
        .count()
}

fn by_feature(values: &[f64; FEATURE_COUNT]) -> BTreeMap<FeatureKind, f64> {
    FeatureKind::ALL
        .iter()
        .map(|kind| (*kind, values[kind.index()]))
        .collect()
}
