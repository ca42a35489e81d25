//! Random forest: bagged random trees grown in parallel

use crate::classifier::random_tree::RandomTree;
use crate::classifier::tree::Node;
use crate::classifier::{argmax, ensure_trainable};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct RandomForest {
    num_trees: usize,
    seed: u64,
    trees: Vec<Node>,
}

impl RandomForest {
    pub fn new(num_trees: usize, seed: u64) -> Self {
        Self {
            num_trees,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        if self.num_trees == 0 {
            return Err(SelectError::InvalidParameter(
                "a forest needs at least one tree".to_string(),
            ));
        }

        let n = data.num_instances();
        let seed = self.seed;
        // Tree i always draws from seed + i, whatever thread grows it
        self.trees = (0..self.num_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RandomTree::grow(data, &sample, &mut rng)
            })
            .collect();

        debug!(
            "Grew {} trees, {} leaves in total",
            self.trees.len(),
            self.trees.iter().map(Node::num_leaves).sum::<usize>()
        );
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        let first = self.trees.first().ok_or(SelectError::NotTrained)?;
        let mut votes = vec![0.0; first.counts().len()];
        for tree in &self.trees {
            for (v, p) in votes.iter_mut().zip(RandomTree::probabilities(tree, instance)) {
                *v += p;
            }
        }
        Ok(argmax(&votes))
    }
}
