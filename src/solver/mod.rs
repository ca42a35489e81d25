//! SVM solver implementations
//!
//! Sequential Minimal Optimization (Platt, 1998) for the binary soft-margin dual.
//! Multi-class handling lives in the classifier that drives the solver.

pub mod smo;

pub use self::smo::*;

/// Settings for the SMO solver
#[derive(Debug, Clone)]
pub struct SmoConfig {
    /// Upper bound on every Lagrange multiplier
    pub c: f64,
    /// KKT violation tolerance
    pub tolerance: f64,
    /// Minimum alpha change that counts as progress
    pub epsilon: f64,
    /// Cap on outer passes over the training set
    pub max_iterations: usize,
}

impl Default for SmoConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 1e-3,
            epsilon: 1e-3,
            max_iterations: 10_000,
        }
    }
}

/// Solution of one binary problem
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub alpha: Vec<f64>,
    pub b: f64,
    /// Indices with a non-zero multiplier
    pub support_vectors: Vec<usize>,
    pub iterations: usize,
}
