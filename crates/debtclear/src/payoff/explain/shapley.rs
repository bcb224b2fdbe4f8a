use super::features::{FeatureVector, FEATURE_COUNT};
use super::forest::{Node, RandomForest, RegressionTree};

const COALITIONS: usize = 1 << FEATURE_COUNT;

/// Per-feature decomposition of one prediction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attribution {
    pub baseline: f64,
    pub prediction: f64,
    pub values: [f64; FEATURE_COUNT],
}

#[cfg(test)]
impl Attribution {
    pub(crate) fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Expected tree output when only the features in `known` are fixed to `x`.
/// Unknown splits average their children by training cover.
fn conditional_expectation(tree: &RegressionTree, x: &FeatureVector, known: usize) -> f64 {
    fn walk(nodes: &[Node], index: usize, x: &FeatureVector, known: usize) -> f64 {
        match &nodes[index] {
            Node::Leaf { value, .. } => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if known & (1 << *feature) != 0 {
                    let next = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    walk(nodes, next, x, known)
                } else {
                    let left_cover = nodes[*left].cover();
                    let right_cover = nodes[*right].cover();
                    let total = left_cover + right_cover;
                    if total <= 0.0 {
                        return 0.0;
                    }
                    (left_cover * walk(nodes, *left, x, known)
                        + right_cover * walk(nodes, *right, x, known))
                        / total
                }
            }
        }
    }

    walk(&tree.nodes, 0, x, known)
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|value| value as f64).product()
}

/// Exact Shapley values of the forest's path-dependent value function,
/// enumerating every coalition. Cheap because the feature set is tiny.
pub(crate) fn shapley_values(forest: &RandomForest, x: &FeatureVector) -> Attribution {
    let trees = forest.trees();
    let mut coalition_value = [0.0; COALITIONS];
    for (known, value) in coalition_value.iter_mut().enumerate() {
        let total: f64 = trees
            .iter()
            .map(|tree| conditional_expectation(tree, x, known))
            .sum();
        *value = total / trees.len() as f64;
    }

    let players = FEATURE_COUNT;
    let weights: Vec<f64> = (0..players)
        .map(|size| factorial(size) * factorial(players - size - 1) / factorial(players))
        .collect();

    let mut values = [0.0; FEATURE_COUNT];
    for (feature, slot) in values.iter_mut().enumerate() {
        let bit = 1 << feature;
        *slot = (0..COALITIONS)
            .filter(|&coalition| coalition & bit == 0)
            .map(|coalition| {
                let size = coalition.count_ones() as usize;
                weights[size] * (coalition_value[coalition | bit] - coalition_value[coalition])
            })
            .sum();
    }

    Attribution {
        baseline: coalition_value[0],
        prediction: coalition_value[COALITIONS - 1],
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::super::forest::ForestConfig;
    use super::*;

    fn training() -> (Vec<FeatureVector>, Vec<f64>) {
        let features = vec![
            [24.9, 7.6, 5.0, 3.0],
            [18.0, 6.2, 20.0, 5.0],
            [6.5, 9.4, 1.0, 1.2],
            [29.9, 5.3, 50.0, 12.5],
            [12.0, 8.0, 3.3, 2.0],
        ];
        let targets = vec![0.5, 1.0 / 3.0, 0.2, 1.0, 0.25];
        (features, targets)
    }

    #[test]
    fn attributions_sum_to_prediction_minus_baseline() {
        let (features, targets) = training();
        let forest = RandomForest::fit(&features, &targets, &ForestConfig::default());

        for x in &features {
            let attribution = shapley_values(&forest, x);
            assert!((attribution.prediction - forest.predict(x)).abs() < 1e-9);
            assert!(
                (attribution.total() - (attribution.prediction - attribution.baseline)).abs()
                    < 1e-9
            );
        }
    }

    #[test]
    fn baseline_is_shared_across_instances() {
        let (features, targets) = training();
        let forest = RandomForest::fit(&features, &targets, &ForestConfig::default());
        let first = shapley_values(&forest, &features[0]);
        let second = shapley_values(&forest, &features[3]);
        assert!((first.baseline - second.baseline).abs() < 1e-12);
    }

    #[test]
    fn unused_features_receive_no_attribution() {
        let features = vec![
            [1.0, 0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0, 0.0],
            [3.0, 0.0, 0.0, 0.0],
        ];
        let targets = vec![1.0 / 3.0, 0.5, 1.0];
        let forest = RandomForest::fit(&features, &targets, &ForestConfig::default());

        let attribution = shapley_values(&forest, &features[2]);
        assert!(attribution.values[0] > 0.0);
        assert_eq!(attribution.values[1], 0.0);
        assert_eq!(attribution.values[2], 0.0);
        assert_eq!(attribution.values[3], 0.0);
    }

    #[test]
    fn shapley_weights_cover_every_coalition_size() {
        let total: f64 = (0..FEATURE_COUNT)
            .map(|size| {
                let weight = factorial(size) * factorial(FEATURE_COUNT - size - 1)
                    / factorial(FEATURE_COUNT);
                let coalitions = factorial(FEATURE_COUNT - 1)
                    / (factorial(size) * factorial(FEATURE_COUNT - 1 - size));
                weight * coalitions
            })
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
