//! Tree growing shared by the decision tree, random tree and random forest

use crate::core::{Dataset, Instance};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Gains below this are treated as no improvement
const MIN_GAIN: f64 = 1e-10;

/// Split scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Criterion {
    /// C4.5: gain ratio among splits with at least average gain
    GainRatio,
    /// Plain information gain
    InfoGain,
}

#[derive(Debug, Clone)]
pub(crate) struct GrowConfig {
    pub criterion: Criterion,
    pub min_leaf: usize,
    /// Attributes examined per node; `None` examines all of them
    pub random_features: Option<usize>,
}

/// A grown tree node; `counts` are the training class counts that reached it
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf {
        counts: Vec<f64>,
    },
    Nominal {
        attribute: usize,
        children: Vec<Node>,
        /// Branch taken by missing or unseen values
        default_child: usize,
        counts: Vec<f64>,
    },
    Numeric {
        attribute: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
        default_left: bool,
        counts: Vec<f64>,
    },
}

impl Node {
    pub fn counts(&self) -> &[f64] {
        match self {
            Self::Leaf { counts } | Self::Nominal { counts, .. } | Self::Numeric { counts, .. } => {
                counts
            }
        }
    }

    /// Class counts of the leaf `instance` reaches; an empty leaf answers with
    /// the nearest non-empty ancestor's counts
    pub fn distribution(&self, instance: &Instance) -> &[f64] {
        let mut node = self;
        let mut fallback = self.counts();
        loop {
            if node.counts().iter().sum::<f64>() > 0.0 {
                fallback = node.counts();
            }
            node = match node {
                Self::Leaf { .. } => return fallback,
                Self::Nominal {
                    attribute,
                    children,
                    default_child,
                    ..
                } => instance
                    .get(*attribute)
                    .and_then(|v| children.get(v as usize))
                    .unwrap_or(&children[*default_child]),
                Self::Numeric {
                    attribute,
                    threshold,
                    left,
                    right,
                    default_left,
                    ..
                } => {
                    let go_left = match instance.get(*attribute) {
                        Some(v) => v <= *threshold,
                        None => *default_left,
                    };
                    if go_left {
                        left
                    } else {
                        right
                    }
                }
            };
        }
    }

    pub fn num_leaves(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Nominal { children, .. } => children.iter().map(Node::num_leaves).sum(),
            Self::Numeric { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SplitKind {
    Nominal,
    Numeric(f64),
}

#[derive(Debug, Clone, Copy)]
struct Split {
    attribute: usize,
    kind: SplitKind,
    gain: f64,
    split_info: f64,
}

impl Split {
    fn gain_ratio(&self) -> f64 {
        if self.split_info > 0.0 {
            self.gain / self.split_info
        } else {
            0.0
        }
    }
}

/// Entropy in bits of a count vector
pub(crate) fn entropy(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum()
}

/// Grows a tree over `indices` of a dataset
pub(crate) struct TreeGrower<'a> {
    data: &'a Dataset,
    config: &'a GrowConfig,
    features: Vec<usize>,
}

impl<'a> TreeGrower<'a> {
    pub fn new(data: &'a Dataset, config: &'a GrowConfig) -> Self {
        Self {
            data,
            config,
            features: data.non_class_indices(),
        }
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.data.num_classes()];
        for &i in indices {
            counts[self.data.class_value(i)] += 1.0;
        }
        counts
    }

    pub fn grow(&self, indices: &[usize], rng: &mut ChaCha8Rng) -> Node {
        let counts = self.class_counts(indices);
        let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
        if pure || indices.len() < 2 * self.config.min_leaf.max(1) {
            return Node::Leaf { counts };
        }

        let Some(split) = self.best_split(indices, &counts, rng) else {
            return Node::Leaf { counts };
        };

        match split.kind {
            SplitKind::Nominal => {
                let width = self.data.attribute(split.attribute).num_values();
                let mut parts = vec![Vec::new(); width];
                let mut missing = Vec::new();
                for &i in indices {
                    match self.data.instance(i).get(split.attribute) {
                        Some(v) => parts[v as usize].push(i),
                        None => missing.push(i),
                    }
                }
                let default_child = largest(&parts);
                parts[default_child].extend(missing);
                let children = parts.iter().map(|p| self.grow(p, rng)).collect();
                Node::Nominal {
                    attribute: split.attribute,
                    children,
                    default_child,
                    counts,
                }
            }
            SplitKind::Numeric(threshold) => {
                let (mut left, mut right, mut missing) = (Vec::new(), Vec::new(), Vec::new());
                for &i in indices {
                    match self.data.instance(i).get(split.attribute) {
                        Some(v) if v <= threshold => left.push(i),
                        Some(_) => right.push(i),
                        None => missing.push(i),
                    }
                }
                let default_left = left.len() >= right.len();
                if default_left {
                    left.extend(missing);
                } else {
                    right.extend(missing);
                }
                Node::Numeric {
                    attribute: split.attribute,
                    threshold,
                    left: Box::new(self.grow(&left, rng)),
                    right: Box::new(self.grow(&right, rng)),
                    default_left,
                    counts,
                }
            }
        }
    }

    fn best_split(&self, indices: &[usize], counts: &[f64], rng: &mut ChaCha8Rng) -> Option<Split> {
        let mut candidates = Vec::new();

        match self.config.random_features {
            None => {
                candidates.extend(self.features.iter().filter_map(|&a| self.evaluate(a, indices)));
            }
            Some(k) => {
                // Keep drawing past k attributes until one yields a useful split
                let mut order = self.features.clone();
                order.shuffle(rng);
                for (examined, &attribute) in order.iter().enumerate() {
                    if examined >= k && candidates.iter().any(|s: &Split| s.gain > MIN_GAIN) {
                        break;
                    }
                    candidates.extend(self.evaluate(attribute, indices));
                }
            }
        }

        let useful: Vec<Split> = candidates.into_iter().filter(|s| s.gain > MIN_GAIN).collect();
        if useful.is_empty() || entropy(counts) <= 0.0 {
            return None;
        }

        match self.config.criterion {
            Criterion::InfoGain => pick(&useful, |s| s.gain),
            Criterion::GainRatio => {
                let average = useful.iter().map(|s| s.gain).sum::<f64>() / useful.len() as f64;
                let eligible: Vec<Split> = useful
                    .into_iter()
                    .filter(|s| s.gain >= average - 1e-3 && s.split_info > 0.0)
                    .collect();
                pick(&eligible, Split::gain_ratio)
            }
        }
    }

    fn evaluate(&self, attribute: usize, indices: &[usize]) -> Option<Split> {
        if self.data.attribute(attribute).is_nominal() {
            self.evaluate_nominal(attribute, indices)
        } else {
            self.evaluate_numeric(attribute, indices)
        }
    }

    fn evaluate_nominal(&self, attribute: usize, indices: &[usize]) -> Option<Split> {
        let width = self.data.attribute(attribute).num_values();
        let num_classes = self.data.num_classes();
        let mut parts = vec![vec![0.0; num_classes]; width];
        let mut missing = 0.0;
        for &i in indices {
            match self.data.instance(i).get(attribute) {
                Some(v) => parts[v as usize][self.data.class_value(i)] += 1.0,
                None => missing += 1.0,
            }
        }

        let sizes: Vec<f64> = parts.iter().map(|p| p.iter().sum()).collect();
        let min_leaf = self.config.min_leaf as f64;
        if sizes.iter().filter(|&&s| s >= min_leaf && s > 0.0).count() < 2 {
            return None;
        }

        let known: f64 = sizes.iter().sum();
        let total = known + missing;
        let mut known_counts = vec![0.0; num_classes];
        for part in &parts {
            for (k, c) in part.iter().enumerate() {
                known_counts[k] += c;
            }
        }
        let children: f64 = parts
            .iter()
            .zip(&sizes)
            .map(|(p, s)| s / known * entropy(p))
            .sum();

        let mut split_sizes = sizes;
        split_sizes.push(missing);
        Some(Split {
            attribute,
            kind: SplitKind::Nominal,
            gain: known / total * (entropy(&known_counts) - children),
            split_info: entropy(&split_sizes),
        })
    }

    fn evaluate_numeric(&self, attribute: usize, indices: &[usize]) -> Option<Split> {
        let num_classes = self.data.num_classes();
        let mut known: Vec<(f64, usize)> = indices
            .iter()
            .filter_map(|&i| Some((self.data.instance(i).get(attribute)?, self.data.class_value(i))))
            .collect();
        known.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n_known = known.len() as f64;
        let missing = (indices.len() - known.len()) as f64;
        let min_leaf = self.config.min_leaf.max(1);
        if known.len() < 2 * min_leaf {
            return None;
        }

        let mut right = vec![0.0; num_classes];
        for &(_, class) in &known {
            right[class] += 1.0;
        }
        let base = entropy(&right);
        let mut left = vec![0.0; num_classes];

        let mut best: Option<(f64, usize)> = None;
        let mut thresholds = 0usize;
        for p in 0..known.len() - 1 {
            let (value, class) = known[p];
            left[class] += 1.0;
            right[class] -= 1.0;

            let left_n = p + 1;
            if value >= known[p + 1].0 || left_n < min_leaf || known.len() - left_n < min_leaf {
                continue;
            }
            thresholds += 1;

            let l = left_n as f64;
            let info = (l * entropy(&left) + (n_known - l) * entropy(&right)) / n_known;
            let gain = base - info;
            if best.map_or(true, |(g, _)| gain > g) {
                best = Some((gain, p));
            }
        }

        let (mut gain, p) = best?;
        if self.config.criterion == Criterion::GainRatio {
            gain -= (thresholds as f64).log2() / n_known;
        }
        let left_n = (p + 1) as f64;
        Some(Split {
            attribute,
            kind: SplitKind::Numeric((known[p].0 + known[p + 1].0) / 2.0),
            gain: n_known / (n_known + missing) * gain,
            split_info: entropy(&[left_n, n_known - left_n, missing]),
        })
    }
}

/// First split with the highest score
fn pick(splits: &[Split], score: impl Fn(&Split) -> f64) -> Option<Split> {
    let mut best: Option<&Split> = None;
    for split in splits {
        if best.map_or(true, |b| score(split) > score(b)) {
            best = Some(split);
        }
    }
    best.copied()
}

fn largest(parts: &[Vec<usize>]) -> usize {
    let mut best = 0;
    for (i, p) in parts.iter().enumerate() {
        if p.len() > parts[best].len() {
            best = i;
        }
    }
    best
}
