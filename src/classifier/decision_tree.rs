//! C4.5-style decision tree
//!
//! Grown with the gain ratio criterion, then pruned bottom-up by subtree
//! replacement whenever the pessimistic error estimate of a single leaf is no
//! worse than that of the subtree it would replace.

use crate::classifier::tree::{Criterion, GrowConfig, Node, TreeGrower};
use crate::classifier::{argmax, ensure_trainable};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Pruned C4.5-style tree over nominal and numeric attributes
#[derive(Debug, Clone)]
pub struct DecisionTree {
    confidence: f64,
    min_leaf: usize,
    root: Option<Node>,
}

impl DecisionTree {
    /// `confidence` is the pruning confidence factor in (0, 0.5]
    pub fn new(confidence: f64, min_leaf: usize) -> Self {
        Self {
            confidence,
            min_leaf,
            root: None,
        }
    }

    pub fn num_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Node::num_leaves)
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        if !(self.confidence > 0.0 && self.confidence <= 0.5) {
            return Err(SelectError::InvalidParameter(format!(
                "pruning confidence must be in (0, 0.5], got {}",
                self.confidence
            )));
        }

        let config = GrowConfig {
            criterion: Criterion::GainRatio,
            min_leaf: self.min_leaf,
            random_features: None,
        };
        let indices: Vec<usize> = (0..data.num_instances()).collect();
        // Unused when every attribute is examined
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut root = TreeGrower::new(data, &config).grow(&indices, &mut rng);

        let z = normal_quantile(1.0 - self.confidence);
        prune(&mut root, self.confidence, z);
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        let root = self.root.as_ref().ok_or(SelectError::NotTrained)?;
        Ok(argmax(root.distribution(instance)))
    }
}

/// Prune `node` in place, returning its estimated error count
fn prune(node: &mut Node, confidence: f64, z: f64) -> f64 {
    let subtree = match node {
        Node::Leaf { counts } => return leaf_estimate(counts, confidence, z),
        Node::Nominal { children, .. } => children
            .iter_mut()
            .map(|child| prune(child, confidence, z))
            .sum::<f64>(),
        Node::Numeric { left, right, .. } => {
            prune(left, confidence, z) + prune(right, confidence, z)
        }
    };

    let leaf = leaf_estimate(node.counts(), confidence, z);
    if leaf <= subtree + 0.1 {
        *node = Node::Leaf {
            counts: node.counts().to_vec(),
        };
        leaf
    } else {
        subtree
    }
}

fn leaf_estimate(counts: &[f64], confidence: f64, z: f64) -> f64 {
    let n: f64 = counts.iter().sum();
    let errors = n - counts.iter().cloned().fold(0.0, f64::max);
    errors + added_errors(n, errors, confidence, z)
}

/// Upper confidence bound on the error count of a leaf with `n` instances and
/// `e` observed errors, minus `e`
fn added_errors(n: f64, e: f64, confidence: f64, z: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    if e < 1.0 {
        let base = n * (1.0 - confidence.powf(1.0 / n));
        if e == 0.0 {
            return base;
        }
        return base + e * (added_errors(n, 1.0, confidence, z) - base);
    }
    if e + 0.5 >= n {
        return (n - e).max(0.0);
    }

    let f = (e + 0.5) / n;
    let r = (f + z * z / (2.0 * n)
        + z * (f / n - f * f / n + z * z / (4.0 * n * n)).sqrt())
        / (1.0 + z * z / n);
    r * n - e
}

/// Inverse of the standard normal CDF (Acklam's rational approximation)
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_data;
    use crate::core::Attribute;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_quantile() {
        assert_relative_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-9);
        assert_relative_eq!(normal_quantile(0.75), 0.6744897501960817, epsilon = 1e-6);
        assert_relative_eq!(normal_quantile(0.975), 1.959963984540054, epsilon = 1e-6);
        assert_relative_eq!(normal_quantile(0.01), -2.326347874040841, epsilon = 1e-6);
    }

    #[test]
    fn test_added_errors() {
        let z = normal_quantile(0.75);
        // No observed errors: n * (1 - cf^(1/n))
        assert_relative_eq!(
            added_errors(4.0, 0.0, 0.25, z),
            4.0 * (1.0 - 0.25_f64.powf(0.25)),
            epsilon = 1e-12
        );
        assert!(added_errors(10.0, 2.0, 0.25, z) > 0.0);
        assert_eq!(added_errors(0.0, 0.0, 0.25, z), 0.0);
    }

    #[test]
    fn test_fits_separable_data() {
        let data = test_data::blobs();
        let mut tree = DecisionTree::new(0.25, 2);
        tree.fit(&data).unwrap();
        assert!(tree.num_leaves() >= 3);
        for (i, instance) in data.instances().iter().enumerate() {
            assert_eq!(tree.predict(instance).unwrap(), data.class_value(i));
        }
    }

    #[test]
    fn test_weak_split_is_pruned_to_a_leaf() {
        // coin=h: 9 a / 1 b, coin=t: 8 a / 2 b; the split has positive gain but
        // a higher pessimistic error estimate than the single leaf
        let mut instances = Vec::new();
        for (coin, a, b) in [(0.0, 9, 1), (1.0, 8, 2)] {
            instances.extend((0..a).map(|_| Instance::from_values(&[coin, 0.0])));
            instances.extend((0..b).map(|_| Instance::from_values(&[coin, 1.0])));
        }
        let data = Dataset::new(
            "coins",
            vec![
                Attribute::nominal("coin", vec!["h", "t"]),
                Attribute::nominal("class", vec!["a", "b"]),
            ],
            None,
            instances,
        )
        .unwrap();

        let mut tree = DecisionTree::new(0.25, 2);
        tree.fit(&data).unwrap();
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.predict(&Instance::from_values(&[1.0, 0.0])).unwrap(), 0);
    }

    #[test]
    fn test_rejects_bad_confidence() {
        let mut tree = DecisionTree::new(0.9, 2);
        assert!(matches!(
            tree.fit(&test_data::blobs()),
            Err(SelectError::InvalidParameter(_))
        ));
    }
}
