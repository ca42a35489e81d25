//! Sequential Minimal Optimization (SMO) solver
//!
//! Solves the binary SVM dual by repeatedly optimizing pairs of Lagrange
//! multipliers. The decision function is `f(x) = sum_k alpha_k y_k K(x_k, x) + b`
//! and the error cache holds `E_k = f(x_k) - y_k`.

use crate::cache::KernelCache;
use crate::core::{Result, SelectError};
use crate::kernel::Kernel;
use crate::solver::{OptimizationResult, SmoConfig};
use std::sync::Arc;

/// Multipliers this close to a bound are snapped onto it
const BOUND_EPSILON: f64 = 1e-8;

/// SMO solver for binary SVM training
pub struct SMOSolver<K: Kernel> {
    kernel: Arc<K>,
    config: SmoConfig,
}

impl<K: Kernel> SMOSolver<K> {
    pub fn new(kernel: Arc<K>, config: SmoConfig) -> Self {
        Self { kernel, config }
    }

    pub fn config(&self) -> &SmoConfig {
        &self.config
    }

    /// Train on dense `rows` with labels in {-1, +1}
    pub fn solve(&self, rows: &[Vec<f64>], labels: &[f64]) -> Result<OptimizationResult> {
        if rows.is_empty() {
            return Err(SelectError::EmptyDataset);
        }
        if rows.len() != labels.len() {
            return Err(SelectError::InvalidParameter(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&y| y != 1.0 && y != -1.0) {
            return Err(SelectError::InvalidParameter(format!(
                "label {bad} is not -1 or +1"
            )));
        }
        if self.config.c.is_nan() || self.config.c <= 0.0 {
            return Err(SelectError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.config.c
            )));
        }

        let n = rows.len();
        let mut state = SmoState {
            kernel: self.kernel.as_ref(),
            config: &self.config,
            rows,
            labels,
            alpha: vec![0.0; n],
            errors: labels.iter().map(|y| -y).collect(),
            b: 0.0,
            cache: KernelCache::for_samples(n),
        };

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while (num_changed > 0 || examine_all) && iterations < self.config.max_iterations {
            num_changed = 0;
            for i in 0..n {
                if (examine_all || state.is_non_bound(i)) && state.examine_example(i) {
                    num_changed += 1;
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }
            iterations += 1;
        }

        if state.alpha.iter().chain([&state.b]).any(|v| !v.is_finite()) {
            return Err(SelectError::Fit(
                "SMO produced non-finite multipliers".to_string(),
            ));
        }

        let support_vectors = state
            .alpha
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 0.0)
            .map(|(i, _)| i)
            .collect();

        Ok(OptimizationResult {
            alpha: state.alpha,
            b: state.b,
            support_vectors,
            iterations,
        })
    }
}

struct SmoState<'a, K: Kernel> {
    kernel: &'a K,
    config: &'a SmoConfig,
    rows: &'a [Vec<f64>],
    labels: &'a [f64],
    alpha: Vec<f64>,
    errors: Vec<f64>,
    b: f64,
    cache: KernelCache,
}

impl<K: Kernel> SmoState<'_, K> {
    fn k(&mut self, i: usize, j: usize) -> f64 {
        let kernel = self.kernel;
        let rows = self.rows;
        self.cache
            .get_or_compute(i, j, || kernel.compute(&rows[i], &rows[j]))
    }

    fn is_non_bound(&self, i: usize) -> bool {
        self.alpha[i] > 0.0 && self.alpha[i] < self.config.c
    }

    /// Try to make progress with `j` as the second multiplier
    fn examine_example(&mut self, j: usize) -> bool {
        let y_j = self.labels[j];
        let e_j = self.errors[j];
        let r_j = e_j * y_j;
        let tol = self.config.tolerance;

        let violates =
            (r_j < -tol && self.alpha[j] < self.config.c) || (r_j > tol && self.alpha[j] > 0.0);
        if !violates {
            return false;
        }

        let n = self.alpha.len();

        // Second choice heuristic: maximum |E_i - E_j| among non-bound multipliers
        let mut best: Option<(usize, f64)> = None;
        for i in (0..n).filter(|&i| i != j && self.is_non_bound(i)) {
            let step = (self.errors[i] - e_j).abs();
            if best.map_or(true, |(_, s)| step > s) {
                best = Some((i, step));
            }
        }
        if let Some((i, _)) = best {
            if self.take_step(i, j) {
                return true;
            }
        }

        for i in 0..n {
            if i != j && self.is_non_bound(i) && self.take_step(i, j) {
                return true;
            }
        }
        for i in 0..n {
            if i != j && !self.is_non_bound(i) && self.take_step(i, j) {
                return true;
            }
        }
        false
    }

    fn take_step(&mut self, i: usize, j: usize) -> bool {
        let c = self.config.c;
        let (y_i, y_j) = (self.labels[i], self.labels[j]);
        let (alpha_i_old, alpha_j_old) = (self.alpha[i], self.alpha[j]);
        let (e_i, e_j) = (self.errors[i], self.errors[j]);
        let s = y_i * y_j;

        let (low, high) = if y_i != y_j {
            let diff = alpha_j_old - alpha_i_old;
            (0.0_f64.max(diff), c.min(c + diff))
        } else {
            let sum = alpha_i_old + alpha_j_old;
            (0.0_f64.max(sum - c), c.min(sum))
        };
        if low >= high {
            return false;
        }

        let k_ii = self.k(i, i);
        let k_ij = self.k(i, j);
        let k_jj = self.k(j, j);
        let eta = k_ii + k_jj - 2.0 * k_ij;
        if eta <= 0.0 {
            return false;
        }

        let mut alpha_j_new = (alpha_j_old + y_j * (e_i - e_j) / eta).clamp(low, high);
        if alpha_j_new < BOUND_EPSILON {
            alpha_j_new = 0.0;
        } else if alpha_j_new > c - BOUND_EPSILON {
            alpha_j_new = c;
        }

        let eps = self.config.epsilon;
        if (alpha_j_new - alpha_j_old).abs() < eps * (alpha_j_new + alpha_j_old + eps) {
            return false;
        }

        let mut alpha_i_new = alpha_i_old + s * (alpha_j_old - alpha_j_new);
        if alpha_i_new < BOUND_EPSILON {
            alpha_i_new = 0.0;
        } else if alpha_i_new > c - BOUND_EPSILON {
            alpha_i_new = c;
        }

        let delta_i = y_i * (alpha_i_new - alpha_i_old);
        let delta_j = y_j * (alpha_j_new - alpha_j_old);

        let b_i = self.b - e_i - delta_i * k_ii - delta_j * k_ij;
        let b_j = self.b - e_j - delta_i * k_ij - delta_j * k_jj;
        let b_new = if alpha_i_new > 0.0 && alpha_i_new < c {
            b_i
        } else if alpha_j_new > 0.0 && alpha_j_new < c {
            b_j
        } else {
            (b_i + b_j) / 2.0
        };
        let delta_b = b_new - self.b;

        self.alpha[i] = alpha_i_new;
        self.alpha[j] = alpha_j_new;
        self.b = b_new;

        for k in 0..self.alpha.len() {
            let k_ik = self.k(i, k);
            let k_jk = self.k(j, k);
            self.errors[k] += delta_i * k_ik + delta_j * k_jk + delta_b;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{dot_product, LinearKernel};

    fn solver() -> SMOSolver<LinearKernel> {
        SMOSolver::new(Arc::new(LinearKernel::new()), SmoConfig::default())
    }

    fn decision(result: &OptimizationResult, rows: &[Vec<f64>], labels: &[f64], x: &[f64]) -> f64 {
        result
            .support_vectors
            .iter()
            .map(|&k| result.alpha[k] * labels[k] * dot_product(&rows[k], x))
            .sum::<f64>()
            + result.b
    }

    #[test]
    fn test_smo_solver_empty_dataset() {
        let result = solver().solve(&[], &[]);
        assert!(matches!(result, Err(SelectError::EmptyDataset)));
    }

    #[test]
    fn test_smo_solver_invalid_labels() {
        let result = solver().solve(&[vec![1.0]], &[0.5]);
        assert!(matches!(result, Err(SelectError::InvalidParameter(_))));
    }

    #[test]
    fn test_separable_problem() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.2],
            vec![0.2, 0.1],
            vec![0.9, 1.0],
            vec![1.0, 0.8],
            vec![0.8, 0.9],
        ];
        let labels = vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
        let result = solver().solve(&rows, &labels).unwrap();

        assert!(!result.support_vectors.is_empty());
        for (row, &y) in rows.iter().zip(&labels) {
            assert!(decision(&result, &rows, &labels, row) * y > 0.0);
        }

        // Box constraint and equality constraint
        assert!(result.alpha.iter().all(|&a| (0.0..=1.0).contains(&a)));
        let balance: f64 = result.alpha.iter().zip(&labels).map(|(a, y)| a * y).sum();
        assert!(balance.abs() < 1e-6);
    }
}
