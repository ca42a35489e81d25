//! Naive Bayes
//!
//! Nominal attributes use Laplace-smoothed frequency tables, numeric attributes a
//! per-class normal density whose standard deviation is floored at a sixth of the
//! attribute's observed precision.

use crate::classifier::{argmax, ensure_trainable};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use std::f64::consts::PI;

/// Default precision of a numeric attribute with fewer than two distinct values
const DEFAULT_PRECISION: f64 = 0.01;

#[derive(Debug, Clone)]
enum Estimator {
    /// `log P(value | class)` per class, per domain index
    Nominal(Vec<Vec<f64>>),
    /// `(mean, std)` per class
    Normal(Vec<(f64, f64)>),
}

impl Estimator {
    fn log_likelihood(&self, class: usize, value: f64) -> f64 {
        match self {
            Self::Nominal(tables) => tables[class]
                .get(value as usize)
                .copied()
                .unwrap_or(0.0),
            Self::Normal(params) => {
                let (mean, std) = params[class];
                let z = (value - mean) / std;
                -0.5 * z * z - std.ln() - 0.5 * (2.0 * PI).ln()
            }
        }
    }
}

/// Naive Bayes over mixed nominal and numeric attributes
#[derive(Debug, Clone, Default)]
pub struct NaiveBayes {
    log_priors: Vec<f64>,
    /// Indexed by attribute; `None` for the class
    estimators: Vec<Option<Estimator>>,
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    fn nominal_estimator(data: &Dataset, index: usize, num_classes: usize) -> Estimator {
        let width = data.attribute(index).num_values();
        let mut counts = vec![vec![1.0; width]; num_classes];
        for (row, instance) in data.instances().iter().enumerate() {
            if let Some(v) = instance.get(index) {
                counts[data.class_value(row)][v as usize] += 1.0;
            }
        }
        let tables = counts
            .into_iter()
            .map(|row| {
                let total: f64 = row.iter().sum();
                row.into_iter().map(|c| (c / total).ln()).collect()
            })
            .collect();
        Estimator::Nominal(tables)
    }

    fn normal_estimator(data: &Dataset, index: usize, num_classes: usize) -> Estimator {
        let mut values: Vec<f64> = data.instances().iter().filter_map(|i| i.get(index)).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        let precision = if values.len() > 1 {
            (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64
        } else {
            DEFAULT_PRECISION
        };
        let min_std = precision / 6.0;

        let moments = |rows: &mut dyn Iterator<Item = f64>| {
            let (n, sum, sq) = rows.fold((0usize, 0.0, 0.0), |(n, s, q), v| (n + 1, s + v, q + v * v));
            if n == 0 {
                return None;
            }
            let mean = sum / n as f64;
            let var = (sq / n as f64 - mean * mean).max(0.0);
            Some((mean, var.sqrt().max(min_std)))
        };

        let overall = moments(&mut data.instances().iter().filter_map(|i| i.get(index)))
            .unwrap_or((0.0, min_std));
        let params = (0..num_classes)
            .map(|class| {
                let mut rows = data
                    .instances()
                    .iter()
                    .enumerate()
                    .filter(|(row, _)| data.class_value(*row) == class)
                    .filter_map(|(_, i)| i.get(index));
                moments(&mut rows).unwrap_or(overall)
            })
            .collect();
        Estimator::Normal(params)
    }
}

impl Classifier for NaiveBayes {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        let num_classes = data.num_classes();
        let n = data.num_instances() as f64;

        self.log_priors = data
            .class_counts()
            .iter()
            .map(|&c| ((c as f64 + 1.0) / (n + num_classes as f64)).ln())
            .collect();

        self.estimators = (0..data.num_attributes())
            .map(|index| {
                if index == data.class_index() {
                    None
                } else if data.attribute(index).is_nominal() {
                    Some(Self::nominal_estimator(data, index, num_classes))
                } else {
                    Some(Self::normal_estimator(data, index, num_classes))
                }
            })
            .collect();

        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        if self.log_priors.is_empty() {
            return Err(SelectError::NotTrained);
        }

        let scores: Vec<f64> = (0..self.log_priors.len())
            .map(|class| {
                self.estimators
                    .iter()
                    .enumerate()
                    .filter_map(|(index, est)| Some((est.as_ref()?, instance.get(index)?)))
                    .map(|(est, value)| est.log_likelihood(class, value))
                    .sum::<f64>()
                    + self.log_priors[class]
            })
            .collect();

        Ok(argmax(&scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_data;

    #[test]
    fn test_nominal_attributes() {
        let data = test_data::weather();
        let mut nb = NaiveBayes::new();
        nb.fit(&data).unwrap();

        assert_eq!(nb.predict(&Instance::from_values(&[0.0, 0.0, 0.0])).unwrap(), 0);
        assert_eq!(nb.predict(&Instance::from_values(&[2.0, 1.0, 0.0])).unwrap(), 1);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let data = test_data::weather();
        let mut nb = NaiveBayes::new();
        nb.fit(&data).unwrap();

        // Only the priors remain: classes are balanced, so the lowest index wins
        let all_missing = Instance::missing(3);
        assert_eq!(nb.predict(&all_missing).unwrap(), 0);
    }

    #[test]
    fn test_numeric_attributes() {
        let data = test_data::blobs();
        let mut nb = NaiveBayes::new();
        nb.fit(&data).unwrap();

        assert_eq!(nb.predict(&Instance::from_values(&[0.9, 0.1, 0.0])).unwrap(), 1);
        assert_eq!(nb.predict(&Instance::from_values(&[0.5, 0.85, 0.0])).unwrap(), 2);
    }

    #[test]
    fn test_predict_before_fit() {
        let nb = NaiveBayes::new();
        assert!(matches!(
            nb.predict(&Instance::missing(3)),
            Err(SelectError::NotTrained)
        ));
    }
}
