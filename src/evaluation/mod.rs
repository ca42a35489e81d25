//! Candidate evaluation
//!
//! The [`Evaluator`] scores one candidate on its representation with
//! cross-validation and turns every failure into a zero-accuracy result, so one
//! misbehaving algorithm never aborts a run.

pub mod cross_validation;

pub use self::cross_validation::{CrossValidator, FoldScore};

use crate::core::{Classifier, Dataset, EvaluationResult, SelectorConfig};
use crate::registry::Candidate;
use crate::representation::Representation;
use log::{info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone)]
pub struct Evaluator {
    validator: CrossValidator,
}

impl Evaluator {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            validator: CrossValidator::new(config.folds, config.seed),
        }
    }

    /// Cross-validate the candidate in registry `slot`; never fails
    pub fn evaluate(
        &self,
        slot: usize,
        candidate: &Candidate,
        representation: &Representation,
    ) -> EvaluationResult {
        self.evaluate_with(slot, &candidate.name, representation.dataset(), || {
            candidate.build()
        })
    }

    /// Cross-validate classifiers from `build`, recording any error or panic
    pub(crate) fn evaluate_with<F>(
        &self,
        slot: usize,
        name: &str,
        data: &Dataset,
        build: F,
    ) -> EvaluationResult
    where
        F: Fn() -> Box<dyn Classifier>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.validator.run(data, &build)));

        let failure = match outcome {
            Ok(Ok(score)) => {
                let result = EvaluationResult::scored(slot, name, score.correct, score.total);
                info!("{result}");
                return result;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };

        warn!("Error running {name}: {failure}");
        EvaluationResult::failed(slot, name, data.num_instances(), failure)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Algorithm;
    use crate::core::{Attribute, Instance, Result};
    use crate::registry::Applicability;
    use crate::representation::RepresentationKind;

    fn data() -> Dataset {
        let instances = (0..20)
            .map(|i| Instance::from_values(&[i as f64, if i < 10 { 0.0 } else { 1.0 }]))
            .collect();
        Dataset::new(
            "line",
            vec![Attribute::numeric("x"), Attribute::nominal("class", vec!["lo", "hi"])],
            None,
            instances,
        )
        .unwrap()
    }

    fn candidate(algorithm: Algorithm) -> Candidate {
        Candidate::new("test", algorithm, RepresentationKind::Original, Applicability::Always)
    }

    #[test]
    fn test_scores_candidate() {
        let rep = Representation::original(&data());
        let result = Evaluator::new(&SelectorConfig::default()).evaluate(
            4,
            &candidate(Algorithm::KNearestNeighbors { k: 1 }),
            &rep,
        );
        assert_eq!(result.slot, 4);
        assert!(!result.is_failure());
        assert_eq!(result.total, 20);
        assert!(result.accuracy >= 90.0);
    }

    #[test]
    fn test_fit_error_becomes_zero_row() {
        let rep = Representation::original(&data());
        let result = Evaluator::new(&SelectorConfig::default()).evaluate(
            0,
            &candidate(Algorithm::KNearestNeighbors { k: 0 }),
            &rep,
        );
        assert!(result.is_failure());
        assert_eq!(result.accuracy, 0.0);
        assert_eq!(result.correct, 0);
        assert_eq!(result.total, 20);
    }

    #[test]
    fn test_too_many_folds_becomes_zero_row() {
        let rep = Representation::original(&data());
        let config = SelectorConfig {
            folds: 50,
            ..SelectorConfig::default()
        };
        let result =
            Evaluator::new(&config).evaluate(0, &candidate(Algorithm::NaiveBayes), &rep);
        assert!(result.is_failure());
        assert_eq!(result.total, 20);
    }

    struct Panicking;

    impl Classifier for Panicking {
        fn fit(&mut self, _data: &Dataset) -> Result<()> {
            panic!("boom");
        }

        fn predict(&self, _instance: &Instance) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_panic_is_contained() {
        let data = data();
        let result = Evaluator::new(&SelectorConfig::default()).evaluate_with(
            7,
            "panicking",
            &data,
            || Box::new(Panicking) as Box<dyn Classifier>,
        );

        assert_eq!(result.slot, 7);
        assert!(result.is_failure());
        assert_eq!(result.accuracy, 0.0);
        assert_eq!(result.correct, 0);
        assert_eq!(result.total, 20);
        assert_eq!(result.failure.as_deref(), Some("panicked: boom"));
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");
    }
}
