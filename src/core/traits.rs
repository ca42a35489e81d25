//! Core traits for model selection

use crate::core::{Dataset, Instance, Result};
use std::path::Path;

/// A classification algorithm
///
/// Instances are built fresh and unfit by the registry; `fit` is called once per
/// instance and `predict` returns the encoded class of a record shaped like the
/// training data.
pub trait Classifier: Send + Sync {
    /// Fit on every instance of `data`
    fn fit(&mut self, data: &Dataset) -> Result<()>;

    /// Predict the class index of a single instance
    fn predict(&self, instance: &Instance) -> Result<usize>;

    /// Predict a batch of instances
    fn predict_batch(&self, instances: &[Instance]) -> Result<Vec<usize>> {
        instances.iter().map(|i| self.predict(i)).collect()
    }
}

/// Source of materialized datasets
pub trait DataSource {
    /// Load a dataset from `path`; malformed input is a `DataLoad` or `Parse` error
    fn load_dataset(&self, path: &Path) -> Result<Dataset>;
}
