//! Random tree
//!
//! An unpruned information-gain tree that examines `floor(log2(attributes)) + 1`
//! randomly chosen attributes at each node.

use crate::classifier::tree::{Criterion, GrowConfig, Node, TreeGrower};
use crate::classifier::{argmax, ensure_trainable};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct RandomTree {
    seed: u64,
    root: Option<Node>,
}

impl RandomTree {
    pub fn new(seed: u64) -> Self {
        Self { seed, root: None }
    }

    /// Attributes examined per node for `num_features` candidate attributes
    pub fn features_per_node(num_features: usize) -> usize {
        if num_features <= 1 {
            1
        } else {
            (num_features as f64).log2().floor() as usize + 1
        }
    }

    pub(crate) fn grow(data: &Dataset, indices: &[usize], rng: &mut ChaCha8Rng) -> Node {
        let config = GrowConfig {
            criterion: Criterion::InfoGain,
            min_leaf: 1,
            random_features: Some(Self::features_per_node(data.num_attributes() - 1)),
        };
        TreeGrower::new(data, &config).grow(indices, rng)
    }

    /// Normalized class distribution for `instance`
    pub(crate) fn probabilities(root: &Node, instance: &Instance) -> Vec<f64> {
        let counts = root.distribution(instance);
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![0.0; counts.len()]
        }
    }
}

impl Classifier for RandomTree {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        let indices: Vec<usize> = (0..data.num_instances()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.root = Some(Self::grow(data, &indices, &mut rng));
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        let root = self.root.as_ref().ok_or(SelectError::NotTrained)?;
        Ok(argmax(root.distribution(instance)))
    }
}
