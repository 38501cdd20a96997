//! End-to-end pipeline
//!
//! split -> balance(train) -> standardize + PCA (fit on balanced train)
//! -> softmax regression -> frozen transform of test -> confusion matrix
//! and pairwise ROC. Standardization parameters and the PCA projection are
//! fit once on the balanced training predictors and shared, read-only,
//! with the test-time path.

use crate::balance::ClassBalancer;
use crate::data::{ClassLabel, Dataset};
use crate::error::{Result, TriageError};
use crate::eval::{pairwise_roc, ClassStats, ConfusionMatrix, PairRoc};
use crate::model::SoftmaxRegression;
use crate::preprocessing::{PcaReducer, Standardizer};
use crate::split::train_test_split;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration for a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of rows assigned to training, strictly inside (0, 1).
    pub train_fraction: f64,
    /// Seed for splitting and resampling.
    pub seed: u64,
    /// Target minority-class probability for each pairwise sampler.
    pub minority_probability: f64,
    /// Number of principal components retained. An explicit choice: the
    /// elbow read-off is a human judgment, not detected automatically.
    pub n_components: usize,
    /// Gradient-descent step size for the softmax fit.
    pub learning_rate: f64,
    /// Iteration budget for the softmax fit.
    pub max_iter: usize,
    /// Gradient-norm stopping tolerance.
    pub tol: f64,
    /// L2 penalty on the softmax weights.
    pub l2_penalty: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            seed: 42,
            minority_probability: 0.47,
            n_components: 3,
            learning_rate: 0.2,
            max_iter: 10_000,
            tol: 1e-3,
            l2_penalty: 1e-2,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_minority_probability(mut self, p: f64) -> Self {
        self.minority_probability = p;
        self
    }

    pub fn with_n_components(mut self, k: usize) -> Self {
        self.n_components = k;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(TriageError::InvalidFraction {
                value: self.train_fraction,
            });
        }
        if !(self.minority_probability > 0.0 && self.minority_probability < 1.0) {
            return Err(TriageError::InvalidProbability {
                value: self.minority_probability,
            });
        }
        if self.n_components == 0 {
            return Err(TriageError::Data(
                "n_components must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-class metrics flattened for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairAuc {
    pub first: ClassLabel,
    pub second: ClassLabel,
    pub auc: f64,
}

/// Everything a run produces, serializable for external reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub class_order: Vec<ClassLabel>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub balanced_class_counts: [usize; 3],
    pub explained_variance_ratio: Vec<f64>,
    pub n_components: usize,
    pub confusion_counts: Vec<Vec<usize>>,
    pub accuracy: f64,
    pub no_information_rate: f64,
    pub accuracy_p_value: f64,
    pub class_stats: Vec<ClassStats>,
    pub null_model_accuracy: f64,
    pub pair_aucs: Vec<PairAuc>,
}

impl PipelineReport {
    /// Plain-text report block.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Triage pipeline report ===\n");
        out.push_str(&format!(
            "Rows: {} train / {} test\n",
            self.train_rows, self.test_rows
        ));
        out.push_str(&format!(
            "Balanced train: {} Normal / {} Suspect / {} Pathological\n",
            self.balanced_class_counts[0],
            self.balanced_class_counts[1],
            self.balanced_class_counts[2]
        ));
        out.push_str(&format!(
            "Components retained: {} (variance explained: {})\n",
            self.n_components,
            self.explained_variance_ratio
                .iter()
                .take(self.n_components)
                .map(|r| format!("{:.3}", r))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        out.push_str("\nConfusion matrix (rows = actual):\n");
        for (c, row) in self.confusion_counts.iter().enumerate() {
            out.push_str(&format!(
                "  {:<13}{}\n",
                self.class_order[c].name(),
                row.iter()
                    .map(|v| format!("{v:>6}"))
                    .collect::<Vec<_>>()
                    .join("")
            ));
        }
        out.push_str(&format!(
            "\nAccuracy: {:.4}  NIR: {:.4}  P(acc > NIR): {:.4}\n",
            self.accuracy, self.no_information_rate, self.accuracy_p_value
        ));
        out.push_str(&format!(
            "Null-model accuracy: {:.4}\n",
            self.null_model_accuracy
        ));
        out.push_str("\nPer-class (one-vs-rest):\n");
        for stats in &self.class_stats {
            out.push_str(&format!(
                "  {:<13} sens {:.4}  spec {:.4}  bal.acc {:.4}\n",
                stats.class.name(),
                stats.sensitivity,
                stats.specificity,
                stats.balanced_accuracy
            ));
        }
        out.push_str("\nPairwise AUC:\n");
        for pair in &self.pair_aucs {
            out.push_str(&format!(
                "  {} vs {:<13} {:.4}\n",
                pair.first.name(),
                pair.second.name(),
                pair.auc
            ));
        }
        out
    }
}

/// Runs the full resampling-and-evaluation workflow.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, data: &Dataset) -> Result<PipelineReport> {
        self.config.validate()?;
        if data.is_empty() {
            return Err(TriageError::EmptyDataset);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let split = train_test_split(data, self.config.train_fraction, &mut rng)?;
        log::info!(
            "split: {} train / {} test rows",
            split.train.n_rows(),
            split.test.n_rows()
        );

        let balanced = ClassBalancer::new()
            .with_minority_probability(self.config.minority_probability)
            .balance(&split.train, &mut rng)?;

        // All fitted parameters are frozen from here on
        let standardizer = Standardizer::fit(&balanced)?;
        let scaled_train = standardizer.transform(&balanced)?;
        let projection = PcaReducer::new()
            .with_random_state(self.config.seed)
            .fit(&scaled_train)?;
        let pca_train = projection.project(&scaled_train, self.config.n_components)?;
        log::info!(
            "PCA: retained {} of {} components ({:.1}% variance)",
            self.config.n_components,
            projection.n_components(),
            projection
                .explained_variance_ratio()
                .iter()
                .take(self.config.n_components)
                .sum::<f64>()
                * 100.0
        );

        let mut model = SoftmaxRegression::new()
            .with_learning_rate(self.config.learning_rate)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol)
            .with_l2_penalty(self.config.l2_penalty);
        model.fit(pca_train.features(), pca_train.labels())?;

        let mut null_model = SoftmaxRegression::new();
        null_model.fit_null(pca_train.labels(), self.config.n_components)?;

        // Test-time path reuses the frozen parameters, never refits
        let scaled_test = standardizer.transform(&split.test)?;
        let pca_test = projection.project(&scaled_test, self.config.n_components)?;

        let predicted = model.predict(pca_test.features())?;
        let probabilities = model.predict_proba(pca_test.features())?;
        let null_predicted = null_model.predict(pca_test.features())?;

        let matrix =
            ConfusionMatrix::from_labels(pca_test.labels(), &predicted, &ClassLabel::ALL)?;
        let null_correct = null_predicted
            .iter()
            .zip(pca_test.labels())
            .filter(|(p, t)| p == t)
            .count();

        let pair_curves = pairwise_roc(pca_test.labels(), &probabilities, &ClassLabel::ALL)?;
        let pair_aucs = pair_curves
            .iter()
            .map(|p: &PairRoc| PairAuc {
                first: p.pair.0,
                second: p.pair.1,
                auc: p.curve.auc,
            })
            .collect();

        let report = PipelineReport {
            class_order: ClassLabel::ALL.to_vec(),
            train_rows: split.train.n_rows(),
            test_rows: split.test.n_rows(),
            balanced_class_counts: balanced.class_counts(),
            explained_variance_ratio: projection.explained_variance_ratio().to_vec(),
            n_components: self.config.n_components,
            confusion_counts: matrix.counts().to_vec(),
            accuracy: matrix.accuracy(),
            no_information_rate: matrix.no_information_rate(),
            accuracy_p_value: matrix.accuracy_p_value()?,
            class_stats: matrix.class_stats(),
            null_model_accuracy: null_correct as f64 / pca_test.n_rows() as f64,
            pair_aucs,
        };
        log::info!(
            "evaluation: accuracy {:.4} (NIR {:.4}, p {:.4})",
            report.accuracy,
            report.no_information_rate,
            report.accuracy_p_value
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let bad = PipelineConfig::new().with_train_fraction(1.0);
        assert!(matches!(
            Pipeline::new(bad).run(&empty()).unwrap_err(),
            TriageError::InvalidFraction { .. }
        ));

        let bad = PipelineConfig::new().with_minority_probability(0.0);
        assert!(matches!(
            Pipeline::new(bad).run(&empty()).unwrap_err(),
            TriageError::InvalidProbability { .. }
        ));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = Pipeline::new(PipelineConfig::new())
            .run(&empty())
            .unwrap_err();
        assert!(matches!(err, TriageError::EmptyDataset));
    }

    fn empty() -> Dataset {
        Dataset::new(
            ndarray::Array2::zeros((0, 2)),
            vec![],
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap()
    }
}
