//! Multilayer perceptron
//!
//! One hidden layer of sigmoid units and one sigmoid output per class, trained
//! online by backpropagation with momentum. Inputs are rescaled to [-1, 1] from
//! the training ranges and the initial weights are drawn from a seeded ChaCha
//! stream, so a fixed seed gives a fixed network.

use crate::classifier::{argmax, ensure_trainable, HiddenLayer, NumericEncoder};
use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const INITIAL_WEIGHT: f64 = 0.05;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Fully connected layer; each row is `[bias, w_1, ..., w_n]`
#[derive(Debug, Clone)]
struct Layer {
    weights: Vec<Vec<f64>>,
    deltas: Vec<Vec<f64>>,
}

impl Layer {
    fn new(inputs: usize, outputs: usize, rng: &mut ChaCha8Rng) -> Self {
        let weights = (0..outputs)
            .map(|_| {
                (0..=inputs)
                    .map(|_| rng.gen_range(-INITIAL_WEIGHT..INITIAL_WEIGHT))
                    .collect()
            })
            .collect();
        Self {
            weights,
            deltas: vec![vec![0.0; inputs + 1]; outputs],
        }
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| sigmoid(w[0] + w[1..].iter().zip(input).map(|(a, b)| a * b).sum::<f64>()))
            .collect()
    }

    fn update(&mut self, input: &[f64], errors: &[f64], learning_rate: f64, momentum: f64) {
        for ((w, d), &err) in self.weights.iter_mut().zip(self.deltas.iter_mut()).zip(errors) {
            let inputs = std::iter::once(1.0).chain(input.iter().copied());
            for ((wj, dj), xj) in w.iter_mut().zip(d.iter_mut()).zip(inputs) {
                *dj = learning_rate * err * xj + momentum * *dj;
                *wj += *dj;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultilayerPerceptron {
    learning_rate: f64,
    momentum: f64,
    epochs: usize,
    hidden_units: HiddenLayer,
    seed: u64,
    encoder: Option<NumericEncoder>,
    /// `(min, max)` per input feature
    ranges: Vec<(f64, f64)>,
    hidden: Option<Layer>,
    output: Option<Layer>,
}

impl MultilayerPerceptron {
    pub fn new(
        learning_rate: f64,
        momentum: f64,
        epochs: usize,
        hidden_units: HiddenLayer,
        seed: u64,
    ) -> Self {
        Self {
            learning_rate,
            momentum,
            epochs,
            hidden_units,
            seed,
            encoder: None,
            ranges: Vec::new(),
            hidden: None,
            output: None,
        }
    }

    fn hidden_size(&self, inputs: usize, classes: usize) -> usize {
        match self.hidden_units {
            HiddenLayer::Auto => ((inputs + classes) / 2).max(1),
            HiddenLayer::Units(n) => n.max(1),
        }
    }

    fn scale(&self, row: Vec<f64>) -> Vec<f64> {
        row.into_iter()
            .zip(&self.ranges)
            .map(|(v, &(min, max))| {
                if max > min {
                    2.0 * (v - min) / (max - min) - 1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl Classifier for MultilayerPerceptron {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        ensure_trainable(data)?;
        if self.learning_rate <= 0.0 || !(0.0..1.0).contains(&self.momentum) {
            return Err(SelectError::InvalidParameter(format!(
                "learning rate {} / momentum {} out of range",
                self.learning_rate, self.momentum
            )));
        }

        let encoder = NumericEncoder::fit(data, "multilayer perceptron")?;
        let (rows, labels) = encoder.encode_dataset(data);
        let inputs = encoder.width();
        let classes = data.num_classes();

        self.ranges = (0..inputs)
            .map(|j| {
                rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                    (lo.min(r[j]), hi.max(r[j]))
                })
            })
            .collect();
        let rows: Vec<Vec<f64>> = rows.into_iter().map(|r| self.scale(r)).collect();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let units = self.hidden_size(inputs, classes);
        let mut hidden = Layer::new(inputs, units, &mut rng);
        let mut output = Layer::new(units, classes, &mut rng);

        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.shuffle(&mut rng);

        for _ in 0..self.epochs {
            for &i in &order {
                let h = hidden.forward(&rows[i]);
                let o = output.forward(&h);

                let output_errors: Vec<f64> = o
                    .iter()
                    .enumerate()
                    .map(|(k, &ok)| {
                        let target = if k == labels[i] { 1.0 } else { 0.0 };
                        ok * (1.0 - ok) * (target - ok)
                    })
                    .collect();
                let hidden_errors: Vec<f64> = h
                    .iter()
                    .enumerate()
                    .map(|(j, &hj)| {
                        let back: f64 = output
                            .weights
                            .iter()
                            .zip(&output_errors)
                            .map(|(w, e)| w[j + 1] * e)
                            .sum();
                        hj * (1.0 - hj) * back
                    })
                    .collect();

                output.update(&h, &output_errors, self.learning_rate, self.momentum);
                hidden.update(&rows[i], &hidden_errors, self.learning_rate, self.momentum);
            }

            if output.weights.iter().chain(&hidden.weights).flatten().any(|w| !w.is_finite()) {
                return Err(SelectError::Fit(
                    "multilayer perceptron weights diverged".to_string(),
                ));
            }
        }

        self.encoder = Some(encoder);
        self.hidden = Some(hidden);
        self.output = Some(output);
        Ok(())
    }

    fn predict(&self, instance: &Instance) -> Result<usize> {
        let (Some(encoder), Some(hidden), Some(output)) = (&self.encoder, &self.hidden, &self.output)
        else {
            return Err(SelectError::NotTrained);
        };
        let row = self.scale(encoder.encode(instance));
        Ok(argmax(&output.forward(&hidden.forward(&row))))
    }
}
