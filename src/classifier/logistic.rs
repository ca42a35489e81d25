//! Multinomial logistic regression
//!
//! Softmax model with an L2 (ridge) penalty on the non-bias weights, fitted by
//! full-batch gradient descent with a fixed step of `1 / L`, where `L` bounds the
//! curvature of the loss on the training rows.

use crate::classifier::{argmax, ensure_trainable, NumericEncoder};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use log::debug;

/// Gradient norm below which training stops early
const GRADIENT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    ridge: f64,
    max_iterations: usize,
    encoder: Option<NumericEncoder>,
    /// Per class: bias followed by one weight per feature
    weights: Vec<Vec<f64>>,
}

impl LogisticRegression {
    pub fn new(ridge: f64, max_iterations: usize) -> Self {
        Self {
            ridge,
            max_iterations,
            encoder: None,
            weights: Vec::new(),
        }
    }

    fn scores(weights: &[Vec<f64>], row: &[f64]) -> Vec<f64> {
        weights
            .iter()
            .map(|w| w[0] + w[1..].iter().zip(row).map(|(a, b)| a * b).sum::<f64>())
            .collect()
    }

    fn softmax(mut scores: Vec<f64>) -> Vec<f64> {
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for s in scores.iter_mut() {
            *s = (*s - max).exp();
            total += *s;
        }
        for s in scores.iter_mut() {
            *s /= total;
        }
        scores
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        if self.ridge < 0.0 {
            return Err(SelectError::InvalidParameter(format!(
                "ridge must be non-negative, got {}",
                self.ridge
            )));
        }

        let encoder = NumericEncoder::fit(data, "logistic regression")?;
        let (rows, labels) = encoder.encode_dataset(data);
        let n = rows.len() as f64;
        let width = encoder.width() + 1;
        let num_classes = data.num_classes();

        let max_sq = rows
            .iter()
            .map(|r| 1.0 + r.iter().map(|v| v * v).sum::<f64>())
            .fold(0.0, f64::max);
        let step = 1.0 / (0.5 * max_sq + self.ridge);

        let mut weights = vec![vec![0.0; width]; num_classes];
        let mut iterations = 0;
        while iterations < self.max_iterations {
            let mut gradient = vec![vec![0.0; width]; num_classes];
            for (row, &label) in rows.iter().zip(&labels) {
                let probabilities = Self::softmax(Self::scores(&weights, row));
                for (class, p) in probabilities.iter().enumerate() {
                    let residual = (p - if class == label { 1.0 } else { 0.0 }) / n;
                    let g = &mut gradient[class];
                    g[0] += residual;
                    for (gj, xj) in g[1..].iter_mut().zip(row) {
                        *gj += residual * xj;
                    }
                }
            }

            let mut largest: f64 = 0.0;
            for (w, g) in weights.iter_mut().zip(gradient.iter_mut()) {
                for (gj, wj) in g[1..].iter_mut().zip(&w[1..]) {
                    *gj += self.ridge * wj;
                }
                for (wj, gj) in w.iter_mut().zip(g.iter()) {
                    *wj -= step * gj;
                    largest = largest.max(gj.abs());
                }
            }
            iterations += 1;

            if weights.iter().flatten().any(|w| !w.is_finite()) {
                return Err(SelectError::Fit(
                    "logistic regression diverged".to_string(),
                ));
            }
            if largest < GRADIENT_TOLERANCE {
                break;
            }
        }

        debug!("Logistic regression stopped after {iterations} iterations");
        self.encoder = Some(encoder);
        self.weights = weights;
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        let encoder = self.encoder.as_ref().ok_or(SelectError::NotTrained)?;
        let row = encoder.encode(instance);
        Ok(argmax(&Self::scores(&self.weights, &row)))
    }
}
