//! Stratified k-fold cross-validation

use crate::core::{Classifier, Dataset, Result, SelectError};
use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Correct predictions and instances scored over every fold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldScore {
    pub correct: usize,
    pub total: usize,
}

/// Seeded, stratified fold assignment
///
/// Instances are shuffled with the seed, grouped by class in order of first
/// appearance in the shuffled order, then dealt round-robin into the folds, so
/// each fold's class mix follows the whole dataset's.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    folds: usize,
    seed: u64,
}

impl CrossValidator {
    pub fn new(folds: usize, seed: u64) -> Self {
        Self { folds, seed }
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Test indices of every fold
    pub fn splits(&self, data: &Dataset) -> Result<Vec<Vec<usize>>> {
        let n = data.num_instances();
        if self.folds < 2 {
            return Err(SelectError::InvalidParameter(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.folds
            )));
        }
        if self.folds > n {
            return Err(SelectError::InvalidParameter(format!(
                "{} folds requested for {} instances",
                self.folds, n
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(self.seed));

        let mut classes: Vec<usize> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in order {
            let class = data.class_value(i);
            match classes.iter().position(|&c| c == class) {
                Some(g) => groups[g].push(i),
                None => {
                    classes.push(class);
                    groups.push(vec![i]);
                }
            }
        }

        let mut splits = vec![Vec::new(); self.folds];
        for (position, i) in groups.into_iter().flatten().enumerate() {
            splits[position % self.folds].push(i);
        }
        Ok(splits)
    }

    /// Fit a fresh classifier per fold and count correct test predictions
    pub fn run<F>(&self, data: &Dataset, build: F) -> Result<FoldScore>
    where
        F: Fn() -> Box<dyn Classifier>,
    {
        let splits = self.splits(data)?;
        let mut in_test = vec![false; data.num_instances()];
        let mut correct = 0;
        let mut total = 0;

        for (fold, test) in splits.iter().enumerate() {
            in_test.iter_mut().for_each(|t| *t = false);
            for &i in test {
                in_test[i] = true;
            }
            let train: Vec<usize> = (0..data.num_instances()).filter(|&i| !in_test[i]).collect();

            let mut classifier = build();
            classifier.fit(&data.subset(&train))?;

            let mut fold_correct = 0;
            for &i in test {
                if classifier.predict(data.instance(i))? == data.class_value(i) {
                    fold_correct += 1;
                }
            }
            debug!(
                "Fold {}/{}: {}/{} correct",
                fold + 1,
                self.folds,
                fold_correct,
                test.len()
            );
            correct += fold_correct;
            total += test.len();
        }

        Ok(FoldScore { correct, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Algorithm;
    use crate::core::{Attribute, Instance};

    fn two_class(n_a: usize, n_b: usize) -> Dataset {
        let instances = (0..n_a)
            .map(|i| Instance::from_values(&[i as f64, 0.0]))
            .chain((0..n_b).map(|i| Instance::from_values(&[100.0 + i as f64, 1.0])))
            .collect();
        Dataset::new(
            "two",
            vec![Attribute::numeric("x"), Attribute::nominal("class", vec!["a", "b"])],
            None,
            instances,
        )
        .unwrap()
    }

    #[test]
    fn test_splits_partition_the_data() {
        let data = two_class(14, 6);
        let splits = CrossValidator::new(4, 1).splits(&data).unwrap();
        assert_eq!(splits.len(), 4);

        let mut all: Vec<usize> = splits.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
        assert!(splits.iter().all(|s| s.len() == 5));
    }

    #[test]
    fn test_splits_are_stratified() {
        let data = two_class(10, 10);
        let splits = CrossValidator::new(5, 9).splits(&data).unwrap();
        for split in &splits {
            let b = split.iter().filter(|&&i| data.class_value(i) == 1).count();
            assert_eq!(b, 2);
        }
    }

    #[test]
    fn test_same_seed_same_splits() {
        let data = two_class(12, 8);
        let a = CrossValidator::new(5, 3).splits(&data).unwrap();
        let b = CrossValidator::new(5, 3).splits(&data).unwrap();
        let c = CrossValidator::new(5, 4).splits(&data).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_more_folds_than_instances() {
        let data = two_class(2, 2);
        assert!(matches!(
            CrossValidator::new(10, 1).splits(&data),
            Err(SelectError::InvalidParameter(_))
        ));
        assert!(CrossValidator::new(1, 1).splits(&data).is_err());
    }

    #[test]
    fn test_run_scores_every_instance_once() {
        let data = two_class(10, 10);
        let score = CrossValidator::new(5, 1)
            .run(&data, || Algorithm::KNearestNeighbors { k: 1 }.build())
            .unwrap();
        assert_eq!(score.total, 20);
        assert_eq!(score.correct, 20);
    }
}
