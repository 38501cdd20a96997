//! Multinomial logistic regression
//!
//! Softmax-link classifier over the three fetal-state classes, fit by
//! batch gradient descent on the L2-penalized multinomial negative
//! log-likelihood. Normal (class 0) is the fixed reference class: its
//! weight row and intercept are pinned at zero, so the remaining rows
//! model log-odds relative to it.

use crate::data::ClassLabel;
use crate::error::{Result, TriageError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

const N_CLASSES: usize = 3;

/// Multinomial (softmax) logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    /// Per-class weight rows (n_classes x n_features); row 0 is the
    /// reference class and stays zero.
    weights: Option<Array2<f64>>,
    /// Per-class intercepts; entry 0 stays zero.
    intercepts: Option<Array1<f64>>,
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
    l2_penalty: f64,
    is_fitted: bool,
}

impl Default for SoftmaxRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftmaxRegression {
    pub fn new() -> Self {
        Self {
            weights: None,
            intercepts: None,
            learning_rate: 0.2,
            max_iter: 10_000,
            tol: 1e-3,
            l2_penalty: 1e-2,
            is_fitted: false,
        }
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_l2_penalty(mut self, l2: f64) -> Self {
        self.l2_penalty = l2;
        self
    }

    /// Fit by gradient descent. Fails with [`TriageError::Convergence`] if
    /// the gradient norm never reaches `tol` within the iteration budget.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[ClassLabel]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(TriageError::Data(format!(
                "{} feature rows but {} labels",
                n_samples,
                y.len()
            )));
        }
        if n_samples == 0 {
            return Err(TriageError::EmptyDataset);
        }

        // One-hot targets
        let mut one_hot = Array2::zeros((n_samples, N_CLASSES));
        for (i, label) in y.iter().enumerate() {
            one_hot[[i, label.index()]] = 1.0;
        }

        let mut weights: Array2<f64> = Array2::zeros((N_CLASSES, n_features));
        let mut intercepts: Array1<f64> = Array1::zeros(N_CLASSES);
        let n = n_samples as f64;
        let mut converged = false;

        for _iter in 0..self.max_iter {
            let probs = softmax_rows(&(x.dot(&weights.t()) + &intercepts));

            // Gradient of the mean NLL plus the L2 term
            let residual = &probs - &one_hot;
            let mut grad_w = residual.t().dot(x) / n + &(self.l2_penalty * &weights);
            let mut grad_b = residual.sum_axis(Axis(0)) / n;
            // Reference class stays pinned
            grad_w.row_mut(0).fill(0.0);
            grad_b[0] = 0.0;

            let grad_norm = (grad_w.mapv(|g| g * g).sum() + grad_b.mapv(|g| g * g).sum()).sqrt();
            if grad_norm < self.tol {
                converged = true;
                break;
            }

            weights = weights - self.learning_rate * &grad_w;
            intercepts = intercepts - self.learning_rate * &grad_b;
        }

        if !converged {
            return Err(TriageError::Convergence {
                iterations: self.max_iter,
            });
        }

        self.weights = Some(weights);
        self.intercepts = Some(intercepts);
        self.is_fitted = true;
        Ok(self)
    }

    /// Intercept-only baseline: predicts the marginal class distribution of
    /// the training labels for every row. Closed form, no iteration.
    pub fn fit_null(&mut self, y: &[ClassLabel], n_features: usize) -> Result<&mut Self> {
        if y.is_empty() {
            return Err(TriageError::EmptyDataset);
        }
        let n = y.len() as f64;
        let mut counts = [0usize; N_CLASSES];
        for label in y {
            counts[label.index()] += 1;
        }
        // Log-odds relative to the reference class; a vanished class gets a
        // large negative offset instead of -inf.
        let p0 = (counts[0] as f64 / n).max(1e-12);
        let intercepts = Array1::from_iter(counts.iter().map(|&c| {
            let p = (c as f64 / n).max(1e-12);
            (p / p0).ln()
        }));

        self.weights = Some(Array2::zeros((N_CLASSES, n_features)));
        self.intercepts = Some(intercepts);
        self.is_fitted = true;
        Ok(self)
    }

    /// Per-class probability rows, each summing to 1.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (weights, intercepts) = self.fitted_params()?;
        if x.ncols() != weights.ncols() {
            return Err(TriageError::SchemaMismatch {
                expected: format!("{} features", weights.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(softmax_rows(&(x.dot(&weights.t()) + intercepts)))
    }

    /// Argmax class per row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<ClassLabel>> {
        let probs = self.predict_proba(x)?;
        Ok(probs
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (c, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = c;
                    }
                }
                ClassLabel::ALL[best]
            })
            .collect())
    }

    pub fn weights(&self) -> Option<&Array2<f64>> {
        self.weights.as_ref()
    }

    pub fn intercepts(&self) -> Option<&Array1<f64>> {
        self.intercepts.as_ref()
    }

    fn fitted_params(&self) -> Result<(&Array2<f64>, &Array1<f64>)> {
        match (self.is_fitted, &self.weights, &self.intercepts) {
            (true, Some(w), Some(b)) => Ok((w, b)),
            _ => Err(TriageError::Data("model not fitted".to_string())),
        }
    }
}

/// Row-wise softmax with max-subtraction for numerical stability.
fn softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    let mut out = logits.clone();
    for mut row in out.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|z| (z - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|e| e / sum);
    }
    out
}
