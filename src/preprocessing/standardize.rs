//! Per-column standardization
//!
//! Parameters are fit once on a reference set and reused verbatim for any
//! later transformation. Refitting on evaluation data would leak its
//! distribution into the pipeline, so `transform` never recomputes.

use crate::data::Dataset;
use crate::error::{Result, TriageError};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

const MIN_STD: f64 = 1e-12;

/// Fitted per-column (mean, standard deviation) parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardizer {
    means: Array1<f64>,
    stds: Array1<f64>,
    schema: Vec<String>,
}

impl Standardizer {
    /// Fit per-column mean and sample (n-1) standard deviation.
    pub fn fit(data: &Dataset) -> Result<Self> {
        if data.n_rows() < 2 {
            return Err(TriageError::Data(
                "standardizer needs at least 2 rows".to_string(),
            ));
        }

        let means = data
            .features()
            .mean_axis(Axis(0))
            .ok_or_else(|| TriageError::Data("mean of empty axis".to_string()))?;
        let stds = data.features().std_axis(Axis(0), 1.0);

        for (j, &sd) in stds.iter().enumerate() {
            if sd <= MIN_STD {
                return Err(TriageError::ZeroVariance {
                    column: data.schema()[j].clone(),
                });
            }
        }

        Ok(Self {
            means,
            stds,
            schema: data.schema().to_vec(),
        })
    }

    /// Apply `(x - mean) / sd` using the fitted parameters only.
    pub fn transform(&self, data: &Dataset) -> Result<Dataset> {
        if data.schema() != self.schema.as_slice() {
            return Err(TriageError::SchemaMismatch {
                expected: self.schema.join(", "),
                actual: data.schema().join(", "),
            });
        }

        let mut features = data.features().clone();
        for (j, mut column) in features.columns_mut().into_iter().enumerate() {
            let mean = self.means[j];
            let sd = self.stds[j];
            column.mapv_inplace(|x| (x - mean) / sd);
        }

        Dataset::new(features, data.labels().to_vec(), self.schema.clone())
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClassLabel;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn toy() -> Dataset {
        Dataset::new(
            array![[1.0, 100.0], [2.0, 150.0], [3.0, 200.0], [4.0, 250.0], [5.0, 300.0]],
            vec![ClassLabel::Normal; 5],
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_transform_zero_mean_unit_std() {
        let data = toy();
        let standardizer = Standardizer::fit(&data).unwrap();
        let scaled = standardizer.transform(&data).unwrap();

        for j in 0..scaled.n_features() {
            let column = scaled.features().column(j);
            let mean = column.mean().unwrap();
            let sd = column.std(1.0);
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(sd, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_frozen_parameters_on_new_data() {
        let train = toy();
        let standardizer = Standardizer::fit(&train).unwrap();

        let test = Dataset::new(
            array![[6.0, 350.0]],
            vec![ClassLabel::Suspect],
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap();
        let scaled = standardizer.transform(&test).unwrap();

        // (6 - 3) / std([1..5]) with the *train* parameters, not refit
        let expected = (6.0 - 3.0) / toy().features().column(0).std(1.0);
        assert_abs_diff_eq!(scaled.features()[[0, 0]], expected, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_variance_column() {
        let data = Dataset::new(
            array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]],
            vec![ClassLabel::Normal; 3],
            vec!["a".to_string(), "flat".to_string()],
        )
        .unwrap();
        let err = Standardizer::fit(&data).unwrap_err();
        match err {
            TriageError::ZeroVariance { column } => assert_eq!(column, "flat"),
            other => panic!("expected ZeroVariance, got {other}"),
        }
    }

    #[test]
    fn test_schema_mismatch() {
        let standardizer = Standardizer::fit(&toy()).unwrap();
        let other = Dataset::new(
            array![[1.0, 2.0]],
            vec![ClassLabel::Normal],
            vec!["x".to_string(), "y".to_string()],
        )
        .unwrap();
        let err = standardizer.transform(&other).unwrap_err();
        assert!(matches!(err, TriageError::SchemaMismatch { .. }));
    }
}
