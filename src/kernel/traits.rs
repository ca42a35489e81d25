//! Kernel trait definition

/// Kernel function trait
///
/// A kernel function K(x, y) over dense feature rows; it must satisfy Mercer's
/// condition to be valid for the SMO solver.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;
}
