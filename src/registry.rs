//! The fixed candidate grid
//!
//! Each [`Candidate`] pairs a display name with an [`Algorithm`] factory, the
//! representation it trains on and a gate deciding whether it runs for a given
//! dataset. Registry order is significant: it is the order of results and the
//! tie-break order of selection.

use crate::classifier::{Algorithm, HiddenLayer};
use crate::core::{Classifier, Dataset, SelectorConfig};
use crate::representation::{RepresentationKind, RepresentationSet};

/// When a candidate takes part in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// Whenever its representation exists
    Always,
    /// Only with at least one nominal non-class attribute
    HasNominalAttributes,
}

/// One entry of the grid
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub algorithm: Algorithm,
    pub representation: RepresentationKind,
    pub applicability: Applicability,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        algorithm: Algorithm,
        representation: RepresentationKind,
        applicability: Applicability,
    ) -> Self {
        Self {
            name: name.into(),
            algorithm,
            representation,
            applicability,
        }
    }

    /// Whether the candidate runs for `dataset` given the derived representations
    pub fn is_applicable(&self, dataset: &Dataset, representations: &RepresentationSet) -> bool {
        let gate = match self.applicability {
            Applicability::Always => true,
            Applicability::HasNominalAttributes => dataset.has_nominal_attributes(),
        };
        gate && representations.get(self.representation).is_some()
    }

    /// A fresh, unfit classifier
    pub fn build(&self) -> Box<dyn Classifier> {
        self.algorithm.build()
    }
}

/// Ordered candidate grid
#[derive(Debug, Clone)]
pub struct Registry {
    candidates: Vec<Candidate>,
}

impl Registry {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// The ten-entry selection grid; randomized algorithms draw from `config.seed`
    pub fn default_grid(config: &SelectorConfig) -> Self {
        use Applicability::*;
        use RepresentationKind::*;

        let mlp = Algorithm::MultilayerPerceptron {
            learning_rate: 0.3,
            momentum: 0.2,
            epochs: 500,
            hidden: HiddenLayer::Auto,
            seed: config.seed,
        };

        Self::new(vec![
            Candidate::new(
                "Naive Bayes (Original)",
                Algorithm::NaiveBayes,
                Original,
                HasNominalAttributes,
            ),
            Candidate::new(
                "Naive Bayes (Discretized)",
                Algorithm::NaiveBayes,
                Discretized,
                Always,
            ),
            Candidate::new(
                "Decision Tree (Original)",
                Algorithm::DecisionTree {
                    confidence: 0.25,
                    min_leaf: 2,
                },
                Original,
                Always,
            ),
            Candidate::new(
                "Random Forest (Original)",
                Algorithm::RandomForest {
                    trees: 100,
                    seed: config.seed,
                },
                Original,
                Always,
            ),
            Candidate::new(
                "Random Tree (Original)",
                Algorithm::RandomTree { seed: config.seed },
                Original,
                Always,
            ),
            Candidate::new(
                "k-NN (K=3, Normalized)",
                Algorithm::KNearestNeighbors { k: 3 },
                NumericNormalized,
                Always,
            ),
            Candidate::new(
                "k-NN (K=5, Normalized)",
                Algorithm::KNearestNeighbors { k: 5 },
                NumericNormalized,
                Always,
            ),
            Candidate::new(
                "Logistic Regression (Normalized)",
                Algorithm::LogisticRegression {
                    ridge: 1e-8,
                    max_iterations: 1000,
                },
                NumericNormalized,
                Always,
            ),
            Candidate::new("Multilayer Perceptron (Normalized)", mlp, NumericNormalized, Always),
            Candidate::new(
                "SVM (Normalized)",
                Algorithm::SupportVectorMachine {
                    c: 1.0,
                    tolerance: 1e-3,
                },
                NumericNormalized,
                Always,
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Candidate> {
        self.candidates.get(slot)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Slots of the candidates that run for `dataset`, in registry order
    pub fn applicable_slots(&self, dataset: &Dataset, representations: &RepresentationSet) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_applicable(dataset, representations))
            .map(|(slot, _)| slot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attribute, Instance};

    fn dataset(attributes: Vec<Attribute>, rows: &[&[f64]]) -> Dataset {
        let instances = rows.iter().map(|r| Instance::from_values(r)).collect();
        Dataset::new("d", attributes, None, instances).unwrap()
    }

    fn mixed() -> Dataset {
        dataset(
            vec![
                Attribute::nominal("color", vec!["red", "blue"]),
                Attribute::numeric("size"),
                Attribute::nominal("class", vec!["a", "b"]),
            ],
            &[&[0.0, 1.0, 0.0], &[1.0, 2.0, 1.0], &[0.0, 3.0, 1.0]],
        )
    }

    #[test]
    fn test_default_grid_order() {
        let registry = Registry::default_grid(&SelectorConfig::default());
        assert_eq!(registry.len(), 10);
        let names: Vec<&str> = registry.candidates().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names[0], "Naive Bayes (Original)");
        assert_eq!(names[2], "Decision Tree (Original)");
        assert_eq!(names[9], "SVM (Normalized)");
        assert_eq!(
            registry.get(3).unwrap().algorithm,
            Algorithm::RandomForest { trees: 100, seed: 1 }
        );
    }

    #[test]
    fn test_mixed_dataset_runs_everything() {
        let data = mixed();
        let reps = RepresentationSet::derive(&data, &SelectorConfig::default());
        let registry = Registry::default_grid(&SelectorConfig::default());
        assert_eq!(registry.applicable_slots(&data, &reps), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_numeric_dataset_skips_nominal_naive_bayes() {
        let data = dataset(
            vec![Attribute::numeric("x"), Attribute::nominal("class", vec!["a", "b"])],
            &[&[0.0, 0.0], &[1.0, 1.0]],
        );
        let reps = RepresentationSet::derive(&data, &SelectorConfig::default());
        let slots = Registry::default_grid(&SelectorConfig::default()).applicable_slots(&data, &reps);
        assert_eq!(slots, (1..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_nominal_dataset_skips_discretized_naive_bayes() {
        let data = dataset(
            vec![
                Attribute::nominal("a", vec!["x", "y"]),
                Attribute::nominal("class", vec!["p", "n"]),
            ],
            &[&[0.0, 0.0], &[1.0, 1.0]],
        );
        let reps = RepresentationSet::derive(&data, &SelectorConfig::default());
        let slots = Registry::default_grid(&SelectorConfig::default()).applicable_slots(&data, &reps);
        assert!(!slots.contains(&1));
        assert_eq!(slots.len(), 9);
    }
}
