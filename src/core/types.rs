//! Core type definitions for attributes, instances and results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an attribute, carrying the label domain for nominal attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Continuous or integer valued
    Numeric,
    /// Categorical; the position of a label in `values` is its encoded index
    Nominal { values: Vec<String> },
}

/// A named column of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    /// Create a numeric attribute
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Create a nominal attribute with the given ordered domain
    pub fn nominal<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, AttributeKind::Numeric)
    }

    /// Domain labels (empty for numeric attributes)
    pub fn domain(&self) -> &[String] {
        match &self.kind {
            AttributeKind::Nominal { values } => values,
            AttributeKind::Numeric => &[],
        }
    }

    /// Number of domain labels (0 for numeric attributes)
    pub fn num_values(&self) -> usize {
        self.domain().len()
    }

    /// Encoded index of a domain label
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.domain().iter().position(|v| v == label)
    }
}

/// One row of a dataset: one slot per attribute, `None` marks a missing value
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    values: Vec<Option<f64>>,
}

impl Instance {
    /// Create an instance from explicit slots
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Create an instance with every slot present
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            values: values.iter().map(|&v| Some(v)).collect(),
        }
    }

    /// Create an instance with `len` missing slots
    pub fn missing(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, `None` when missing
    ///
    /// # Panics
    /// Panics if index >= len()
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values[index]
    }

    pub fn set(&mut self, index: usize, value: Option<f64>) {
        self.values[index] = value;
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.values[index].is_none()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// Cross-validated score of one grid candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Position of the candidate in the registry
    pub slot: usize,
    /// Display name of the candidate
    pub name: String,
    /// Percentage of correctly classified instances, 0..=100
    pub accuracy: f64,
    /// Instances correctly classified across all folds
    pub correct: usize,
    /// Instances in the representation the candidate was scored on
    pub total: usize,
    /// Diagnostic when fitting or scoring failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl EvaluationResult {
    /// Result of a successful evaluation
    pub fn scored(slot: usize, name: impl Into<String>, correct: usize, total: usize) -> Self {
        let accuracy = if total == 0 {
            0.0
        } else {
            100.0 * correct as f64 / total as f64
        };
        Self {
            slot,
            name: name.into(),
            accuracy,
            correct,
            total,
            failure: None,
        }
    }

    /// Zero-accuracy result recorded for a candidate that failed
    pub fn failed(
        slot: usize,
        name: impl Into<String>,
        total: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            slot,
            name: name.into(),
            accuracy: 0.0,
            correct: 0,
            total,
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2}% ({}/{})",
            self.name, self.accuracy, self.correct, self.total
        )
    }
}

/// Configuration for a selection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Number of cross-validation folds
    pub folds: usize,
    /// Seed for fold assignment
    pub seed: u64,
    /// Equal-width bins used by the discretized representation
    pub discretize_bins: usize,
    /// Evaluate candidates on the rayon pool
    pub parallel: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            seed: 1,
            discretize_bins: 10,
            parallel: false,
        }
    }
}
