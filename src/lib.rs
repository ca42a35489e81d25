//! Cross-validated model selection over a fixed grid of classifiers
//!
//! A dataset is loaded once, re-encoded into the representations the grid needs
//! (original, discretized, numeric-normalized), and every applicable candidate is
//! scored with stratified k-fold cross-validation. The most accurate candidate is
//! retrained on all data and answers predictions for raw records.

pub mod api;
pub mod cache;
pub mod classifier;
pub mod core;
pub mod data;
pub mod evaluation;
pub mod kernel;
pub mod predictor;
pub mod registry;
pub mod report;
pub mod representation;
pub mod selector;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::SelectionEngine;
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::classifier::{Algorithm, HiddenLayer};
pub use crate::core::dataset::Dataset;
pub use crate::core::error::{Result, SelectError};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{load_dataset, ArffLoader, CsvLoader};
pub use crate::evaluation::{CrossValidator, Evaluator};
pub use crate::kernel::{Kernel, LinearKernel};
pub use crate::predictor::{Predictor, TrainedModel};
pub use crate::registry::{Candidate, Registry};
pub use crate::report::RunReport;
pub use crate::representation::{Representation, RepresentationKind, RepresentationSet};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
