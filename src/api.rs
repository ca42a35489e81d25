//! High-level API for model selection
//!
//! [`SelectionEngine`] ties the pipeline together: it derives the
//! representations, cross-validates every applicable grid candidate, retrains
//! the winner on its whole representation and serves predictions from it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rselect::api::SelectionEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SelectionEngine::from_file("iris.arff")?
//!     .with_folds(10)
//!     .with_seed(1);
//!
//! for result in engine.run_all(|percent| eprintln!("{percent}%"))? {
//!     println!("{result}");
//! }
//!
//! println!("Best: {:?}", engine.best_candidate_name());
//! println!("Predicted: {}", engine.predict(&[5.1, 3.5, 1.4, 0.2])?);
//! # Ok(())
//! # }
//! ```

use crate::core::{Dataset, EvaluationResult, Result, SelectError, SelectorConfig};
use crate::data;
use crate::evaluation::Evaluator;
use crate::predictor::{Predictor, TrainedModel};
use crate::registry::Registry;
use crate::representation::RepresentationSet;
use crate::selector;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Model selection over one dataset, with builder-style configuration
pub struct SelectionEngine {
    dataset: Dataset,
    config: SelectorConfig,
    cancel: Option<Arc<AtomicBool>>,
    results: RwLock<Vec<EvaluationResult>>,
    predictor: Predictor,
}

impl SelectionEngine {
    /// Create an engine over a loaded dataset with default configuration
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            config: SelectorConfig::default(),
            cancel: None,
            results: RwLock::new(Vec::new()),
            predictor: Predictor::new(),
        }
    }

    /// Load an ARFF or CSV file and create an engine over it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(data::load_dataset(path)?))
    }

    /// Set the number of cross-validation folds
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.config.folds = folds;
        self
    }

    /// Set the seed for fold assignment and randomized algorithms
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the number of equal-width bins of the discretized representation
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.config.discretize_bins = bins;
        self
    }

    /// Evaluate candidates on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Flag checked between candidates; once set the run stops with `Cancelled`
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run the whole grid without progress reporting
    pub fn run(&self) -> Result<Vec<EvaluationResult>> {
        self.run_all(|_| {})
    }

    /// Evaluate the grid, select the winner and publish it for prediction
    ///
    /// `progress` is called once per grid slot with 10, 20, ..., 100 for the
    /// ten-entry grid. Results come back in registry order. A cancelled run or
    /// a failed retrain leaves the previous results and model untouched.
    pub fn run_all<F>(&self, progress: F) -> Result<Vec<EvaluationResult>>
    where
        F: FnMut(u8) + Send,
    {
        if self.dataset.is_empty() {
            return Err(SelectError::EmptyDataset);
        }

        let representations = RepresentationSet::derive(&self.dataset, &self.config);
        let registry = Registry::default_grid(&self.config);
        let evaluator = Evaluator::new(&self.config);
        let applicable = registry.applicable_slots(&self.dataset, &representations);

        info!(
            "Evaluating {} of {} candidates on '{}' ({} instances, {} folds)",
            applicable.len(),
            registry.len(),
            self.dataset.relation(),
            self.dataset.num_instances(),
            self.config.folds
        );

        let results = if self.config.parallel {
            self.evaluate_parallel(&registry, &representations, &evaluator, &applicable, progress)?
        } else {
            self.evaluate_sequential(&registry, &representations, &evaluator, &applicable, progress)?
        };

        self.finish(&results, |winner| {
            self.retrain(&registry, &representations, winner)
        })?;
        Ok(results)
    }

    /// Select the winner, retrain it and publish it with the run's results
    ///
    /// Results and model are replaced together; a failed retrain leaves both.
    fn finish<R>(&self, results: &[EvaluationResult], retrain: R) -> Result<()>
    where
        R: FnOnce(&EvaluationResult) -> Result<TrainedModel>,
    {
        match selector::select_best(results) {
            Some(best) => {
                let winner = &results[best];
                info!("Best: {winner}");
                let model = retrain(winner)?;
                let mut stored = self.results.write();
                self.predictor.publish(model);
                *stored = results.to_vec();
            }
            None => {
                warn!("No candidate produced a usable result, keeping the previous model");
                *self.results.write() = results.to_vec();
            }
        }
        Ok(())
    }

    fn evaluate_sequential<F>(
        &self,
        registry: &Registry,
        representations: &RepresentationSet,
        evaluator: &Evaluator,
        applicable: &[usize],
        mut progress: F,
    ) -> Result<Vec<EvaluationResult>>
    where
        F: FnMut(u8),
    {
        let total = registry.len();
        let mut results = Vec::with_capacity(applicable.len());

        for (slot, candidate) in registry.candidates().iter().enumerate() {
            if self.is_cancelled() {
                info!("Run cancelled before {}", candidate.name);
                return Err(SelectError::Cancelled);
            }

            match representations.get(candidate.representation) {
                Some(rep) if applicable.contains(&slot) => {
                    results.push(evaluator.evaluate(slot, candidate, rep));
                }
                _ => debug!("Skipping {}: not applicable", candidate.name),
            }
            progress(percent(slot + 1, total));
        }

        Ok(results)
    }

    fn evaluate_parallel<F>(
        &self,
        registry: &Registry,
        representations: &RepresentationSet,
        evaluator: &Evaluator,
        applicable: &[usize],
        progress: F,
    ) -> Result<Vec<EvaluationResult>>
    where
        F: FnMut(u8) + Send,
    {
        let total = registry.len();
        // (slots done, sink); ticks are issued under the lock so they stay ordered
        let ticker = Mutex::new((0usize, progress));
        let tick = || {
            let mut guard = ticker.lock();
            let (done, sink) = &mut *guard;
            *done += 1;
            sink(percent(*done, total));
        };

        for candidate in registry
            .candidates()
            .iter()
            .enumerate()
            .filter(|(slot, _)| !applicable.contains(slot))
            .map(|(_, c)| c)
        {
            debug!("Skipping {}: not applicable", candidate.name);
            tick();
        }

        let results: Vec<Option<EvaluationResult>> = applicable
            .par_iter()
            .map(|&slot| {
                if self.is_cancelled() {
                    return None;
                }
                let candidate = registry.get(slot)?;
                let rep = representations.get(candidate.representation)?;
                let result = evaluator.evaluate(slot, candidate, rep);
                tick();
                Some(result)
            })
            .collect();

        if self.is_cancelled() {
            info!("Run cancelled");
            return Err(SelectError::Cancelled);
        }
        Ok(results.into_iter().flatten().collect())
    }

    fn retrain(
        &self,
        registry: &Registry,
        representations: &RepresentationSet,
        winner: &EvaluationResult,
    ) -> Result<TrainedModel> {
        let missing = |reason: &str| SelectError::RetrainFailed {
            candidate: winner.name.clone(),
            reason: reason.to_string(),
        };
        let candidate = registry
            .get(winner.slot)
            .ok_or_else(|| missing("no registry entry for the winning slot"))?;
        let representation = representations
            .get(candidate.representation)
            .ok_or_else(|| missing("representation is no longer available"))?;

        selector::retrain(winner, candidate, Arc::clone(representation), &self.dataset)
    }

    /// Results of the last completed run, in registry order
    pub fn results(&self) -> Vec<EvaluationResult> {
        self.results.read().clone()
    }

    /// Display name of the active model's candidate
    pub fn best_candidate_name(&self) -> Option<String> {
        self.predictor.current().map(|m| m.name().to_string())
    }

    /// Snapshot of the active model
    pub fn best_model(&self) -> Option<Arc<TrainedModel>> {
        self.predictor.current()
    }

    pub fn is_trained(&self) -> bool {
        self.predictor.is_trained()
    }

    /// Predict the class label for one value per non-class attribute
    ///
    /// Values follow the original schema order; nominal values are domain
    /// indices and `NaN` is a missing value.
    pub fn predict(&self, raw: &[f64]) -> Result<String> {
        self.predictor.predict(raw)
    }

    /// Resolve textual values against the original schema, then predict
    pub fn predict_text<S: AsRef<str>>(&self, values: &[S]) -> Result<String> {
        let indices = self.dataset.non_class_indices();
        if values.len() != indices.len() {
            return Err(SelectError::SchemaMismatch {
                expected: indices.len(),
                actual: values.len(),
            });
        }
        let raw = indices
            .iter()
            .zip(values)
            .map(|(&index, text)| self.dataset.resolve_value(index, text.as_ref()))
            .collect::<Result<Vec<f64>>>()?;
        self.predict(&raw)
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        (done * 100 / total).min(100) as u8
    }
}
