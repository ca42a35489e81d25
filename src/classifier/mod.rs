//! Classification algorithms
//!
//! Every family in the selection grid implements [`Classifier`]. An [`Algorithm`]
//! value names a family plus its hyperparameters and acts as the factory: the
//! registry calls [`Algorithm::build`] to get a fresh, unfit classifier for each
//! fold and for the final retrain.

pub mod decision_tree;
pub mod knn;
pub mod logistic;
pub mod mlp;
pub mod naive_bayes;
pub mod random_forest;
pub mod random_tree;
pub mod svm;
pub(crate) mod tree;

pub use self::decision_tree::DecisionTree;
pub use self::knn::KNearestNeighbors;
pub use self::logistic::LogisticRegression;
pub use self::mlp::MultilayerPerceptron;
pub use self::naive_bayes::NaiveBayes;
pub use self::random_forest::RandomForest;
pub use self::random_tree::RandomTree;
pub use self::svm::SupportVectorMachine;

use crate::core::{Classifier, Dataset, Instance, Result, SelectError};
use std::fmt;

/// Hidden layer sizing for the multilayer perceptron
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenLayer {
    /// `(inputs + classes) / 2`, at least one unit
    Auto,
    Units(usize),
}

/// An algorithm family with its hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    NaiveBayes,
    DecisionTree {
        confidence: f64,
        min_leaf: usize,
    },
    RandomForest {
        trees: usize,
        seed: u64,
    },
    RandomTree {
        seed: u64,
    },
    KNearestNeighbors {
        k: usize,
    },
    LogisticRegression {
        ridge: f64,
        max_iterations: usize,
    },
    MultilayerPerceptron {
        learning_rate: f64,
        momentum: f64,
        epochs: usize,
        hidden: HiddenLayer,
        seed: u64,
    },
    SupportVectorMachine {
        c: f64,
        tolerance: f64,
    },
}

impl Algorithm {
    /// A fresh, unfit classifier for this family and hyperparameters
    pub fn build(&self) -> Box<dyn Classifier> {
        match *self {
            Self::NaiveBayes => Box::new(NaiveBayes::new()),
            Self::DecisionTree {
                confidence,
                min_leaf,
            } => Box::new(DecisionTree::new(confidence, min_leaf)),
            Self::RandomForest { trees, seed } => Box::new(RandomForest::new(trees, seed)),
            Self::RandomTree { seed } => Box::new(RandomTree::new(seed)),
            Self::KNearestNeighbors { k } => Box::new(KNearestNeighbors::new(k)),
            Self::LogisticRegression {
                ridge,
                max_iterations,
            } => Box::new(LogisticRegression::new(ridge, max_iterations)),
            Self::MultilayerPerceptron {
                learning_rate,
                momentum,
                epochs,
                hidden,
                seed,
            } => Box::new(MultilayerPerceptron::new(
                learning_rate,
                momentum,
                epochs,
                hidden,
                seed,
            )),
            Self::SupportVectorMachine { c, tolerance } => {
                Box::new(SupportVectorMachine::new(c, tolerance))
            }
        }
    }

    /// Short family name
    pub fn family(&self) -> &'static str {
        match self {
            Self::NaiveBayes => "naive-bayes",
            Self::DecisionTree { .. } => "decision-tree",
            Self::RandomForest { .. } => "random-forest",
            Self::RandomTree { .. } => "random-tree",
            Self::KNearestNeighbors { .. } => "knn",
            Self::LogisticRegression { .. } => "logistic",
            Self::MultilayerPerceptron { .. } => "mlp",
            Self::SupportVectorMachine { .. } => "svm",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NaiveBayes => write!(f, "naive-bayes"),
            Self::DecisionTree {
                confidence,
                min_leaf,
            } => write!(f, "decision-tree(confidence={confidence}, min_leaf={min_leaf})"),
            Self::RandomForest { trees, seed } => {
                write!(f, "random-forest(trees={trees}, seed={seed})")
            }
            Self::RandomTree { seed } => write!(f, "random-tree(seed={seed})"),
            Self::KNearestNeighbors { k } => write!(f, "knn(k={k})"),
            Self::LogisticRegression {
                ridge,
                max_iterations,
            } => write!(f, "logistic(ridge={ridge}, iterations={max_iterations})"),
            Self::MultilayerPerceptron {
                learning_rate,
                momentum,
                epochs,
                ..
            } => write!(
                f,
                "mlp(learning_rate={learning_rate}, momentum={momentum}, epochs={epochs})"
            ),
            Self::SupportVectorMachine { c, .. } => write!(f, "svm(kernel=linear, c={c})"),
        }
    }
}

/// Reject empty training sets before any family-specific work
pub(crate) fn ensure_trainable(data: &Dataset) -> Result<()> {
    if data.is_empty() {
        return Err(SelectError::EmptyDataset);
    }
    Ok(())
}

/// Index of the largest value; ties go to the lowest index
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Dense encoding of the non-class attributes of an all-numeric dataset
///
/// Missing values are replaced with the training mean of their attribute.
#[derive(Debug, Clone)]
pub(crate) struct NumericEncoder {
    features: Vec<usize>,
    means: Vec<f64>,
}

impl NumericEncoder {
    pub fn fit(data: &Dataset, family: &str) -> Result<Self> {
        let features = data.non_class_indices();
        if let Some(&nominal) = features.iter().find(|&&i| data.attribute(i).is_nominal()) {
            return Err(SelectError::Fit(format!(
                "{family} needs numeric attributes, '{}' is nominal",
                data.attribute(nominal).name
            )));
        }

        let means = features
            .iter()
            .map(|&index| {
                let (sum, count) = data
                    .instances()
                    .iter()
                    .filter_map(|i| i.get(index))
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            })
            .collect();

        Ok(Self { features, means })
    }

    pub fn width(&self) -> usize {
        self.features.len()
    }

    pub fn encode(&self, instance: &Instance) -> Vec<f64> {
        self.features
            .iter()
            .zip(&self.means)
            .map(|(&index, &mean)| instance.get(index).unwrap_or(mean))
            .collect()
    }

    /// Encode every instance together with its class index
    pub fn encode_dataset(&self, data: &Dataset) -> (Vec<Vec<f64>>, Vec<usize>) {
        let rows = data.instances().iter().map(|i| self.encode(i)).collect();
        let labels = (0..data.num_instances()).map(|i| data.class_value(i)).collect();
        (rows, labels)
    }
}

#[cfg(test)]
pub(crate) mod test_data {
    use crate::core::{Attribute, Dataset, Instance};

    /// Two numeric features, three well separated classes
    pub fn blobs() -> Dataset {
        let centers = [(0.1, 0.1), (0.9, 0.1), (0.5, 0.9)];
        let offsets = [(-0.04, 0.02), (0.03, -0.03), (0.0, 0.04), (0.02, 0.01), (-0.02, -0.04)];
        let mut instances = Vec::new();
        for (class, (cx, cy)) in centers.iter().enumerate() {
            for (dx, dy) in offsets {
                instances.push(Instance::from_values(&[cx + dx, cy + dy, class as f64]));
            }
        }
        Dataset::new(
            "blobs",
            vec![
                Attribute::numeric("x"),
                Attribute::numeric("y"),
                Attribute::nominal("class", vec!["a", "b", "c"]),
            ],
            None,
            instances,
        )
        .unwrap()
    }

    /// Class is `outlook == sunny`, with a noise attribute
    pub fn weather() -> Dataset {
        let rows = [
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [2.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [2.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
        ];
        Dataset::new(
            "weather",
            vec![
                Attribute::nominal("outlook", vec!["sunny", "overcast", "rainy"]),
                Attribute::nominal("windy", vec!["false", "true"]),
                Attribute::nominal("play", vec!["no", "yes"]),
            ],
            None,
            rows.iter().map(|r| Instance::from_values(r)).collect(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), 1);
        assert_eq!(argmax(&[2.0]), 0);
    }

    #[test]
    fn test_numeric_encoder_fills_missing_with_mean() {
        let data = test_data::blobs();
        let encoder = NumericEncoder::fit(&data, "test").unwrap();
        assert_eq!(encoder.width(), 2);

        let xs: Vec<f64> = data.instances().iter().filter_map(|i| i.get(0)).collect();
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;

        let encoded = encoder.encode(&Instance::new(vec![None, Some(0.5), None]));
        assert_relative_eq!(encoded[0], mean, epsilon = 1e-9);
        assert_relative_eq!(encoded[0], 0.498, epsilon = 1e-9);
        assert_eq!(encoded[1], 0.5);
    }

    #[test]
    fn test_numeric_encoder_rejects_nominal() {
        let result = NumericEncoder::fit(&test_data::weather(), "test");
        assert!(matches!(result, Err(SelectError::Fit(_))));
    }

    #[test]
    fn test_every_family_fits_and_predicts() {
        let data = test_data::blobs();
        let algorithms = [
            Algorithm::NaiveBayes,
            Algorithm::DecisionTree {
                confidence: 0.25,
                min_leaf: 2,
            },
            Algorithm::RandomForest { trees: 10, seed: 1 },
            Algorithm::RandomTree { seed: 1 },
            Algorithm::KNearestNeighbors { k: 3 },
            Algorithm::LogisticRegression {
                ridge: 1e-8,
                max_iterations: 1000,
            },
            Algorithm::MultilayerPerceptron {
                learning_rate: 0.3,
                momentum: 0.2,
                epochs: 1000,
                hidden: HiddenLayer::Units(4),
                seed: 0,
            },
            Algorithm::SupportVectorMachine {
                c: 1.0,
                tolerance: 1e-3,
            },
        ];

        for algorithm in algorithms {
            let mut model = algorithm.build();
            model.fit(&data).unwrap();
            let predictions = model.predict_batch(data.instances()).unwrap();
            let correct = predictions
                .iter()
                .enumerate()
                .filter(|(i, &p)| p == data.class_value(*i))
                .count();
            assert!(correct >= 13, "{algorithm}: {correct}/15");
        }
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let empty = test_data::blobs().subset(&[]);
        for algorithm in [Algorithm::NaiveBayes, Algorithm::KNearestNeighbors { k: 3 }] {
            let mut model = algorithm.build();
            assert!(matches!(model.fit(&empty), Err(SelectError::EmptyDataset)));
        }
    }
}
