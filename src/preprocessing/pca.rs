//! Principal component analysis
//!
//! Fits an orthonormal rotation on standardized predictors via power
//! iteration with deflation on the covariance matrix. The fitted projection
//! is frozen: it can be applied to any dataset sharing the fit-time schema
//! (including held-out data) and is never refit or mutated afterwards.

use crate::data::Dataset;
use crate::error::{Result, TriageError};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const MAX_POWER_ITER: usize = 500;
const POWER_TOL: f64 = 1e-12;

/// Fits a [`PcaProjection`] on a standardized dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaReducer {
    /// Seed for the power-iteration start vectors.
    random_state: u64,
}

impl Default for PcaReducer {
    fn default() -> Self {
        Self { random_state: 42 }
    }
}

impl PcaReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Eigendecompose the covariance of the (already standardized)
    /// predictors. All components are extracted, ordered by descending
    /// explained variance.
    pub fn fit(&self, data: &Dataset) -> Result<PcaProjection> {
        let n = data.n_rows();
        let d = data.n_features();
        if n < 2 {
            return Err(TriageError::Data(
                "PCA requires at least 2 samples".to_string(),
            ));
        }
        if d < 1 {
            return Err(TriageError::Data(
                "PCA requires at least 1 feature".to_string(),
            ));
        }

        // Covariance of centered columns (inputs are standardized upstream,
        // but centering here keeps fit correct for any input).
        let means = data
            .features()
            .mean_axis(Axis(0))
            .ok_or_else(|| TriageError::Data("mean of empty axis".to_string()))?;
        let centered = data.features() - &means.clone().insert_axis(Axis(0));
        let cov = centered.t().dot(&centered) / (n as f64 - 1.0);

        let total_variance = cov.diag().sum().max(1e-12);
        let (eigenvalues, rotation) = power_iteration(&cov, d, self.random_state);

        let explained_variance_ratio: Vec<f64> = eigenvalues
            .iter()
            .map(|&ev| (ev / total_variance).max(0.0))
            .collect();

        Ok(PcaProjection {
            rotation,
            eigenvalues,
            explained_variance_ratio,
            schema: data.schema().to_vec(),
        })
    }
}

/// A fitted rotation: orthonormal component directions (columns) ordered by
/// descending explained variance, plus the fit-time column schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaProjection {
    /// d x d matrix; column `c` is the c-th principal direction.
    rotation: Array2<f64>,
    /// Raw variance captured per component.
    eigenvalues: Array1<f64>,
    /// Per-component share of total variance, in [0, 1].
    explained_variance_ratio: Vec<f64>,
    schema: Vec<String>,
}

impl PcaProjection {
    /// Project rows onto the top `k` directions. Works on any dataset with
    /// the fitted schema, including data never seen during `fit`.
    pub fn project(&self, data: &Dataset, k: usize) -> Result<Dataset> {
        if data.schema() != self.schema.as_slice() {
            return Err(TriageError::SchemaMismatch {
                expected: self.schema.join(", "),
                actual: data.schema().join(", "),
            });
        }
        let d = self.rotation.ncols();
        if k == 0 || k > d {
            return Err(TriageError::Data(format!(
                "cannot retain {} components of {} available",
                k, d
            )));
        }

        let top = self.rotation.slice(ndarray::s![.., ..k]);
        let projected = data.features().dot(&top);
        let schema = (1..=k).map(|c| format!("PC{c}")).collect();
        Dataset::new(projected, data.labels().to_vec(), schema)
    }

    pub fn n_components(&self) -> usize {
        self.rotation.ncols()
    }

    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }
}

/// Extract all `k` eigenpairs of a symmetric matrix by power iteration with
/// deflation, re-orthogonalizing each candidate against the components
/// already found to keep the basis orthonormal.
fn power_iteration(cov: &Array2<f64>, k: usize, seed: u64) -> (Array1<f64>, Array2<f64>) {
    let d = cov.nrows();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut work = cov.clone();
    let mut eigenvalues = Array1::zeros(k);
    let mut rotation = Array2::zeros((d, k));

    for component in 0..k {
        let mut v: Array1<f64> = Array1::from_iter((0..d).map(|_| rng.gen_range(-1.0..1.0)));
        normalize(&mut v);

        let mut eigenvalue = 0.0;
        for _ in 0..MAX_POWER_ITER {
            let mut w = work.dot(&v);
            // Gram-Schmidt against previously extracted directions
            for prev in 0..component {
                let prev_dir = rotation.column(prev);
                let proj = w.dot(&prev_dir);
                w = &w - &(&prev_dir * proj);
            }
            let new_eigenvalue = v.dot(&w);
            normalize(&mut w);

            let diff = (&w - &v).mapv(|x| x * x).sum().sqrt();
            v = w;
            eigenvalue = new_eigenvalue;
            if diff < POWER_TOL {
                break;
            }
        }

        eigenvalue = eigenvalue.max(0.0);
        eigenvalues[component] = eigenvalue;
        rotation.column_mut(component).assign(&v);

        // Deflate: work -= eigenvalue * v v^T
        for i in 0..d {
            for j in 0..d {
                work[[i, j]] -= eigenvalue * v[i] * v[j];
            }
        }
    }

    (eigenvalues, rotation)
}

fn normalize(v: &mut Array1<f64>) {
    let norm = v.dot(v).sqrt().max(1e-12);
    v.mapv_inplace(|x| x / norm);
}
