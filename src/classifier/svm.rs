//! Linear support vector machine
//!
//! One binary SMO problem per pair of classes present in the training data;
//! prediction takes the majority of the pairwise votes, ties going to the lowest
//! class index.

use crate::classifier::{argmax, ensure_trainable, NumericEncoder};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use crate::kernel::{Kernel, LinearKernel};
use crate::solver::{SMOSolver, SmoConfig};
use log::debug;
use std::sync::Arc;

/// Decision function of one class pair: positive votes for `positive`
#[derive(Debug, Clone)]
struct PairModel {
    positive: usize,
    negative: usize,
    /// `(alpha_i * y_i, x_i)` per support vector
    support: Vec<(f64, Vec<f64>)>,
    bias: f64,
}

impl PairModel {
    fn decision<K: Kernel>(&self, kernel: &K, row: &[f64]) -> f64 {
        self.support
            .iter()
            .map(|(coef, sv)| coef * kernel.compute(sv, row))
            .sum::<f64>()
            + self.bias
    }
}

#[derive(Debug, Clone)]
pub struct SupportVectorMachine {
    config: SmoConfig,
    kernel: Arc<LinearKernel>,
    encoder: Option<NumericEncoder>,
    pairs: Vec<PairModel>,
    num_classes: usize,
    /// Answer when the training data held a single class
    only_class: Option<usize>,
}

impl SupportVectorMachine {
    pub fn new(c: f64, tolerance: f64) -> Self {
        Self {
            config: SmoConfig {
                c,
                tolerance,
                ..SmoConfig::default()
            },
            kernel: Arc::new(LinearKernel::new()),
            encoder: None,
            pairs: Vec::new(),
            num_classes: 0,
            only_class: None,
        }
    }
}

impl Classifier for SupportVectorMachine {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        let encoder = NumericEncoder::fit(data, "SVM")?;
        let (rows, labels) = encoder.encode_dataset(data);

        let present: Vec<usize> = data
            .class_counts()
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(class, _)| class)
            .collect();

        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let mut pairs = Vec::new();
        for (a, &positive) in present.iter().enumerate() {
            for &negative in &present[a + 1..] {
                let members: Vec<usize> = (0..rows.len())
                    .filter(|&i| labels[i] == positive || labels[i] == negative)
                    .collect();
                let pair_rows: Vec<Vec<f64>> = members.iter().map(|&i| rows[i].clone()).collect();
                let pair_labels: Vec<f64> = members
                    .iter()
                    .map(|&i| if labels[i] == positive { 1.0 } else { -1.0 })
                    .collect();

                let result = solver.solve(&pair_rows, &pair_labels)?;
                debug!(
                    "SVM pair {positive}/{negative}: {} support vectors after {} passes",
                    result.support_vectors.len(),
                    result.iterations
                );
                let support = result
                    .support_vectors
                    .iter()
                    .map(|&k| (result.alpha[k] * pair_labels[k], pair_rows[k].clone()))
                    .collect();
                pairs.push(PairModel {
                    positive,
                    negative,
                    support,
                    bias: result.b,
                });
            }
        }

        self.only_class = match present.as_slice() {
            [single] => Some(*single),
            _ => None,
        };
        self.num_classes = data.num_classes();
        self.encoder = Some(encoder);
        self.pairs = pairs;
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        let encoder = self.encoder.as_ref().ok_or(SelectError::NotTrained)?;
        if let Some(class) = self.only_class {
            return Ok(class);
        }

        let row = encoder.encode(instance);
        let mut votes = vec![0.0; self.num_classes];
        for pair in &self.pairs {
            if pair.decision(self.kernel.as_ref(), &row) > 0.0 {
                votes[pair.positive] += 1.0;
            } else {
                votes[pair.negative] += 1.0;
            }
        }
        Ok(argmax(&votes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_data;
    use crate::core::Attribute;

    #[test]
    fn test_one_vs_one_on_blobs() {
        let data = test_data::blobs();
        let mut svm = SupportVectorMachine::new(1.0, 1e-3);
        svm.fit(&data).unwrap();
        assert_eq!(svm.pairs.len(), 3);
        assert_eq!(svm.predict(&Instance::from_values(&[0.05, 0.05, 0.0])).unwrap(), 0);
        assert_eq!(svm.predict(&Instance::from_values(&[0.95, 0.05, 0.0])).unwrap(), 1);
        assert_eq!(svm.predict(&Instance::from_values(&[0.5, 0.95, 0.0])).unwrap(), 2);
    }

    #[test]
    fn test_single_class_training_set() {
        let data = Dataset::new(
            "one",
            vec![Attribute::numeric("x"), Attribute::nominal("class", vec!["a", "b"])],
            None,
            vec![
                Instance::from_values(&[0.0, 1.0]),
                Instance::from_values(&[1.0, 1.0]),
            ],
        )
        .unwrap();
        let mut svm = SupportVectorMachine::new(1.0, 1e-3);
        svm.fit(&data).unwrap();
        assert!(svm.pairs.is_empty());
        assert_eq!(svm.predict(&Instance::from_values(&[5.0, 0.0])).unwrap(), 1);
    }

    #[test]
    fn test_nominal_attributes_are_a_fit_error() {
        let mut svm = SupportVectorMachine::new(1.0, 1e-3);
        assert!(matches!(svm.fit(&test_data::weather()), Err(SelectError::Fit(_))));
    }
}
