//! Bootstrap random forest of shallow CART regression trees.
//!
//! Small and deterministic: every tree sees a bootstrap resample drawn from a
//! seeded ChaCha stream, considers every feature at every split, and stops at
//! `max_depth`. Nodes keep their (bootstrap-weighted) sample cover so the
//! attribution step can compute path-dependent expectations.

use super::features::{FeatureVector, FEATURE_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const MIN_IMPURITY: f64 = 1e-12;

/// Capacity and reproducibility settings for the surrogate model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Node {
    Leaf {
        value: f64,
        cover: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
}

impl Node {
    pub(super) fn cover(&self) -> f64 {
        match self {
            Node::Leaf { cover, .. } | Node::Split { cover, .. } => *cover,
        }
    }
}

/// Regression tree stored as an arena; the root is node 0.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegressionTree {
    pub(super) nodes: Vec<Node>,
}

struct TrainingSet<'a> {
    features: &'a [FeatureVector],
    targets: &'a [f64],
    weights: &'a [f64],
}

struct NodeStats {
    cover: f64,
    weighted_sum: f64,
    weighted_squares: f64,
    mean: f64,
    sse: f64,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TrainingSet<'_> {
    fn stats(&self, samples: &[usize]) -> NodeStats {
        let (mut w, mut wy, mut wyy) = (0.0, 0.0, 0.0);
        for &index in samples {
            let weight = self.weights[index];
            let target = self.targets[index];
            w += weight;
            wy += weight * target;
            wyy += weight * target * target;
        }

        NodeStats {
            cover: w,
            weighted_sum: wy,
            weighted_squares: wyy,
            mean: if w > 0.0 { wy / w } else { 0.0 },
            sse: sum_of_squares(w, wy, wyy),
        }
    }

    fn best_split(&self, samples: &[usize], parent: &NodeStats) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..FEATURE_COUNT {
            let mut sorted = samples.to_vec();
            sorted.sort_by(|&a, &b| {
                self.features[a][feature].total_cmp(&self.features[b][feature])
            });

            let (mut w, mut wy, mut wyy) = (0.0, 0.0, 0.0);
            for pair in sorted.windows(2) {
                let (current, next) = (pair[0], pair[1]);
                let weight = self.weights[current];
                let target = self.targets[current];
                w += weight;
                wy += weight * target;
                wyy += weight * target * target;

                let low = self.features[current][feature];
                let high = self.features[next][feature];
                if low >= high {
                    continue;
                }

                let left_sse = sum_of_squares(w, wy, wyy);
                let right_sse = sum_of_squares(
                    parent.cover - w,
                    parent.weighted_sum - wy,
                    parent.weighted_squares - wyy,
                );
                let gain = parent.sse - left_sse - right_sse;

                if best.as_ref().map_or(true, |candidate| gain > candidate.gain) {
                    let mut threshold = (low + high) / 2.0;
                    if threshold >= high {
                        threshold = low;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn sum_of_squares(w: f64, wy: f64, wyy: f64) -> f64 {
    if w > 0.0 {
        (wyy - wy * wy / w).max(0.0)
    } else {
        0.0
    }
}

impl RegressionTree {
    fn fit(
        features: &[FeatureVector],
        targets: &[f64],
        weights: &[f64],
        max_depth: usize,
    ) -> Self {
        let data = TrainingSet {
            features,
            targets,
            weights,
        };
        let samples: Vec<usize> = (0..features.len())
            .filter(|&index| weights[index] > 0.0)
            .collect();

        let mut tree = Self { nodes: Vec::new() };
        tree.grow(&data, &samples, 0, max_depth);
        tree
    }

    fn grow(
        &mut self,
        data: &TrainingSet<'_>,
        samples: &[usize],
        depth: usize,
        max_depth: usize,
    ) -> usize {
        let stats = data.stats(samples);
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: stats.mean,
            cover: stats.cover,
        });

        if depth >= max_depth || stats.sse <= MIN_IMPURITY || samples.len() < 2 {
            return slot;
        }

        let Some(split) = data.best_split(samples, &stats) else {
            return slot;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .copied()
            .partition(|&index| data.features[index][split.feature] <= split.threshold);

        let left = self.grow(data, &left_samples, depth + 1, max_depth);
        let right = self.grow(data, &right_samples, depth + 1, max_depth);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            cover: stats.cover,
        };

        slot
    }

    #[cfg(test)]
    pub(crate) fn predict(&self, x: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub(crate) fn fit(features: &[FeatureVector], targets: &[f64], config: &ForestConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let samples = features.len();

        let trees = (0..config.trees.max(1))
            .map(|_| {
                let mut weights = vec![0.0; samples];
                for _ in 0..samples {
                    weights[rng.gen_range(0..samples)] += 1.0;
                }
                RegressionTree::fit(features, targets, &weights, config.max_depth)
            })
            .collect();

        Self { trees }
    }

    pub(crate) fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    #[cfg(test)]
    pub(crate) fn predict(&self, x: &FeatureVector) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(x)).sum();
        total / self.trees.len() as f64
    }
}
