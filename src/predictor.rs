//! Single-record inference against the selected model
//!
//! A [`TrainedModel`] is immutable once built. The [`Predictor`] holds the
//! active one as an `Arc` snapshot behind a read/write lock: a prediction clones
//! the `Arc` under the read lock and runs without holding it, and a finished run
//! swaps in its model under the write lock.

use crate::classifier::Algorithm;
use crate::core::{Attribute, Classifier, Dataset, Instance, Result, SelectError};
use crate::representation::Representation;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// The retrained winner of a run
pub struct TrainedModel {
    slot: usize,
    name: String,
    algorithm: Algorithm,
    accuracy: f64,
    representation: Arc<Representation>,
    schema: Vec<Attribute>,
    class_index: usize,
    classifier: Box<dyn Classifier>,
}

impl TrainedModel {
    pub fn new(
        slot: usize,
        name: String,
        algorithm: Algorithm,
        accuracy: f64,
        representation: Arc<Representation>,
        original: &Dataset,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            slot,
            name,
            algorithm,
            accuracy,
            representation,
            schema: original.attributes().to_vec(),
            class_index: original.class_index(),
            classifier,
        }
    }

    /// Registry slot of the candidate this model was built from
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// Cross-validated accuracy that won the selection
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn representation(&self) -> &Arc<Representation> {
        &self.representation
    }

    /// Non-class attributes of the original schema, in input order
    pub fn input_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.schema
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.class_index)
            .map(|(_, a)| a)
    }

    pub fn class_labels(&self) -> &[String] {
        self.schema[self.class_index].domain()
    }

    /// Build an original-schema instance from one value per non-class attribute
    ///
    /// `NaN` marks a missing value; nominal values are domain indices.
    pub fn raw_instance(&self, raw: &[f64]) -> Result<Instance> {
        let expected = self.schema.len() - 1;
        if raw.len() != expected {
            return Err(SelectError::SchemaMismatch {
                expected,
                actual: raw.len(),
            });
        }

        let mut instance = Instance::missing(self.schema.len());
        for (&value, (index, attr)) in raw.iter().zip(
            self.schema
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != self.class_index),
        ) {
            if value.is_nan() {
                continue;
            }
            if attr.is_nominal() {
                let in_domain = value.fract() == 0.0
                    && value >= 0.0
                    && (value as usize) < attr.num_values();
                if !in_domain {
                    return Err(SelectError::InvalidValue(format!(
                        "{value} is not a value index of nominal attribute '{}' ({} values)",
                        attr.name,
                        attr.num_values()
                    )));
                }
            } else if value.is_infinite() {
                return Err(SelectError::InvalidValue(format!(
                    "{value} is not a finite value for numeric attribute '{}'",
                    attr.name
                )));
            }
            instance.set(index, Some(value));
        }
        Ok(instance)
    }

    /// Predicted class index for a raw record
    pub fn predict(&self, raw: &[f64]) -> Result<usize> {
        let instance = self.raw_instance(raw)?;
        let encoded = self.representation.encode(&instance)?;
        self.classifier.predict(&encoded)
    }

    /// Predicted class label for a raw record
    pub fn predict_label(&self, raw: &[f64]) -> Result<String> {
        let class = self.predict(raw)?;
        self.class_labels()
            .get(class)
            .cloned()
            .ok_or_else(|| SelectError::InvalidValue(format!("class index {class} out of range")))
    }
}

impl fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedModel")
            .field("slot", &self.slot)
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("accuracy", &self.accuracy)
            .field("representation", &self.representation.kind())
            .finish_non_exhaustive()
    }
}

/// Active model slot: single writer, many readers
#[derive(Debug, Default)]
pub struct Predictor {
    active: RwLock<Option<Arc<TrainedModel>>>,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active model
    pub fn publish(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        *self.active.write() = Some(Arc::clone(&model));
        model
    }

    /// Snapshot of the active model
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.active.read().clone()
    }

    pub fn is_trained(&self) -> bool {
        self.active.read().is_some()
    }

    /// Predict the class label of a raw record with the active model
    pub fn predict(&self, raw: &[f64]) -> Result<String> {
        let model = self.current().ok_or(SelectError::NotTrained)?;
        model.predict_label(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::representation;

    fn mixed() -> Dataset {
        Dataset::new(
            "mixed",
            vec![
                Attribute::nominal("color", vec!["red", "blue"]),
                Attribute::numeric("size"),
                Attribute::nominal("class", vec!["small", "large"]),
            ],
            None,
            vec![
                Instance::from_values(&[0.0, 1.0, 0.0]),
                Instance::from_values(&[1.0, 2.0, 0.0]),
                Instance::from_values(&[0.0, 9.0, 1.0]),
                Instance::from_values(&[1.0, 10.0, 1.0]),
            ],
        )
        .unwrap()
    }

    fn model() -> TrainedModel {
        let data = mixed();
        let rep = Arc::new(representation::to_numeric_normalized(&data).unwrap());
        let algorithm = Algorithm::KNearestNeighbors { k: 1 };
        let mut classifier = algorithm.build();
        classifier.fit(rep.dataset()).unwrap();
        TrainedModel::new(5, "k-NN".to_string(), algorithm, 100.0, rep, &data, classifier)
    }

    #[test]
    fn test_not_trained() {
        let predictor = Predictor::new();
        assert!(!predictor.is_trained());
        assert!(matches!(predictor.predict(&[0.0, 1.0]), Err(SelectError::NotTrained)));
    }

    #[test]
    fn test_predict_reencodes_raw_values() {
        let predictor = Predictor::new();
        predictor.publish(model());
        assert!(predictor.is_trained());
        assert_eq!(predictor.predict(&[1.0, 9.5]).unwrap(), "large");
        assert_eq!(predictor.predict(&[0.0, 1.5]).unwrap(), "small");
        assert_eq!(predictor.predict(&[f64::NAN, 1.2]).unwrap(), "small");
    }

    #[test]
    fn test_schema_mismatch() {
        let predictor = Predictor::new();
        predictor.publish(model());
        assert!(matches!(
            predictor.predict(&[1.0]),
            Err(SelectError::SchemaMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let model = model();
        assert!(matches!(model.predict(&[2.0, 1.0]), Err(SelectError::InvalidValue(_))));
        assert!(matches!(model.predict(&[0.5, 1.0]), Err(SelectError::InvalidValue(_))));
        assert!(matches!(model.predict(&[-1.0, 1.0]), Err(SelectError::InvalidValue(_))));
        assert!(matches!(
            model.predict(&[0.0, f64::INFINITY]),
            Err(SelectError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let predictor = Predictor::new();
        let first = predictor.publish(model());
        let held = predictor.current().unwrap();
        predictor.publish(model());
        assert!(Arc::ptr_eq(&first, &held));
        assert!(!Arc::ptr_eq(&held, &predictor.current().unwrap()));
    }

    #[test]
    fn test_input_attributes_skip_class() {
        let model = model();
        let names: Vec<&str> = model.input_attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["color", "size"]);
        assert_eq!(model.class_labels(), &["small", "large"]);
    }
}
