//! Confusion-matrix evaluation
//!
//! Square table of (actual, predicted) counts with the derived multi-class
//! statistics: overall accuracy, no-information rate with its one-sided
//! exact binomial test, and per-class one-vs-rest sensitivity/specificity.

use crate::data::ClassLabel;
use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, DiscreteCDF};

/// One-vs-rest statistics for a single class.
///
/// A class with zero actual occurrences has undefined sensitivity, reported
/// as NaN rather than a divide-by-zero crash.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassStats {
    pub class: ClassLabel,
    pub sensitivity: f64,
    pub specificity: f64,
    pub balanced_accuracy: f64,
}

/// Multi-class confusion matrix, rows = actual, columns = predicted, both
/// in the supplied class order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
    class_order: Vec<ClassLabel>,
}

impl ConfusionMatrix {
    /// Tally actual/predicted label pairs. `class_order` must cover every
    /// label observed on either side.
    pub fn from_labels(
        actual: &[ClassLabel],
        predicted: &[ClassLabel],
        class_order: &[ClassLabel],
    ) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(TriageError::Data(format!(
                "{} actual labels but {} predicted",
                actual.len(),
                predicted.len()
            )));
        }
        if actual.is_empty() {
            return Err(TriageError::EmptyDataset);
        }

        let position = |label: ClassLabel| -> Result<usize> {
            class_order
                .iter()
                .position(|c| *c == label)
                .ok_or_else(|| TriageError::UnknownLabel {
                    label: label.name().to_string(),
                })
        };

        let k = class_order.len();
        let mut counts = vec![vec![0usize; k]; k];
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            counts[position(a)?][position(p)?] += 1;
        }

        Ok(Self {
            counts,
            class_order: class_order.to_vec(),
        })
    }

    /// Build directly from a count table (rows = actual).
    pub fn from_counts(counts: Vec<Vec<usize>>, class_order: &[ClassLabel]) -> Result<Self> {
        let k = class_order.len();
        if counts.len() != k || counts.iter().any(|row| row.len() != k) {
            return Err(TriageError::Data(format!(
                "confusion counts must be {k}x{k}"
            )));
        }
        Ok(Self {
            counts,
            class_order: class_order.to_vec(),
        })
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn class_order(&self) -> &[ClassLabel] {
        &self.class_order
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// trace / total.
    pub fn accuracy(&self) -> f64 {
        let trace: usize = (0..self.counts.len()).map(|i| self.counts[i][i]).sum();
        trace as f64 / self.total() as f64
    }

    /// Accuracy attainable by always predicting the most frequent actual
    /// class.
    pub fn no_information_rate(&self) -> f64 {
        let max_actual = self
            .counts
            .iter()
            .map(|row| row.iter().sum::<usize>())
            .max()
            .unwrap_or(0);
        max_actual as f64 / self.total() as f64
    }

    /// One-sided exact binomial test of H0: accuracy == NIR against
    /// H1: accuracy > NIR. Returns P[X >= correct] for X ~ Bin(total, NIR).
    pub fn accuracy_p_value(&self) -> Result<f64> {
        let total = self.total();
        let correct: usize = (0..self.counts.len()).map(|i| self.counts[i][i]).sum();
        let nir = self.no_information_rate();

        let dist = Binomial::new(nir, total as u64)
            .map_err(|e| TriageError::Data(format!("binomial test: {e}")))?;
        let p = if correct == 0 {
            1.0
        } else {
            dist.sf(correct as u64 - 1)
        };
        Ok(p.clamp(0.0, 1.0))
    }

    /// One-vs-rest statistics per class, in class order.
    pub fn class_stats(&self) -> Vec<ClassStats> {
        let total = self.total();
        let k = self.counts.len();
        (0..k)
            .map(|c| {
                let tp = self.counts[c][c];
                let actual_c: usize = self.counts[c].iter().sum();
                let predicted_c: usize = (0..k).map(|i| self.counts[i][c]).sum();
                let fn_ = actual_c - tp;
                let fp = predicted_c - tp;
                let tn = total - tp - fn_ - fp;

                let sensitivity = if tp + fn_ > 0 {
                    tp as f64 / (tp + fn_) as f64
                } else {
                    f64::NAN
                };
                let specificity = if tn + fp > 0 {
                    tn as f64 / (tn + fp) as f64
                } else {
                    f64::NAN
                };

                ClassStats {
                    class: self.class_order[c],
                    sensitivity,
                    specificity,
                    balanced_accuracy: (sensitivity + specificity) / 2.0,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// The documented worked example: rows = actual N/S/P, columns =
    /// predicted in the same order.
    fn worked_example() -> ConfusionMatrix {
        ConfusionMatrix::from_counts(
            vec![vec![270, 40, 19], vec![8, 47, 4], vec![2, 2, 34]],
            &ClassLabel::ALL,
        )
        .unwrap()
    }

    #[test]
    fn test_worked_example_accuracy() {
        let matrix = worked_example();
        assert_eq!(matrix.total(), 426);
        assert_abs_diff_eq!(
            matrix.accuracy(),
            (270.0 + 47.0 + 34.0) / 426.0,
            epsilon = 1e-12
        );
        assert!((matrix.accuracy() - 0.8239).abs() < 5e-4);
    }

    #[test]
    fn test_worked_example_nir_and_p_value() {
        let matrix = worked_example();
        // 329 of 426 actuals are Normal
        assert_abs_diff_eq!(matrix.no_information_rate(), 329.0 / 426.0, epsilon = 1e-12);
        // accuracy 0.824 > NIR 0.772 with n = 426: clearly significant
        let p = matrix.accuracy_p_value().unwrap();
        assert!(p < 0.01, "p = {p}");
    }

    #[test]
    fn test_marginal_sums() {
        let actual = vec![
            ClassLabel::Normal,
            ClassLabel::Normal,
            ClassLabel::Suspect,
            ClassLabel::Pathological,
            ClassLabel::Suspect,
        ];
        let predicted = vec![
            ClassLabel::Normal,
            ClassLabel::Suspect,
            ClassLabel::Suspect,
            ClassLabel::Pathological,
            ClassLabel::Normal,
        ];
        let matrix =
            ConfusionMatrix::from_labels(&actual, &predicted, &ClassLabel::ALL).unwrap();

        assert_eq!(matrix.total(), 5);
        for (c, class) in ClassLabel::ALL.iter().enumerate() {
            let row_sum: usize = matrix.counts()[c].iter().sum();
            let col_sum: usize = (0..3).map(|i| matrix.counts()[i][c]).sum();
            assert_eq!(row_sum, actual.iter().filter(|l| *l == class).count());
            assert_eq!(col_sum, predicted.iter().filter(|l| *l == class).count());
        }
    }

    #[test]
    fn test_perfect_classifier() {
        let labels = vec![
            ClassLabel::Normal,
            ClassLabel::Suspect,
            ClassLabel::Pathological,
            ClassLabel::Normal,
            ClassLabel::Suspect,
            ClassLabel::Pathological,
        ];
        let matrix = ConfusionMatrix::from_labels(&labels, &labels, &ClassLabel::ALL).unwrap();

        assert_abs_diff_eq!(matrix.accuracy(), 1.0, epsilon = 1e-12);
        for stats in matrix.class_stats() {
            assert_abs_diff_eq!(stats.sensitivity, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(stats.specificity, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(stats.balanced_accuracy, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_absent_class_yields_nan_sensitivity() {
        let actual = vec![ClassLabel::Normal, ClassLabel::Suspect];
        let predicted = vec![ClassLabel::Normal, ClassLabel::Suspect];
        let matrix =
            ConfusionMatrix::from_labels(&actual, &predicted, &ClassLabel::ALL).unwrap();

        let stats = matrix.class_stats();
        assert!(stats[ClassLabel::Pathological.index()].sensitivity.is_nan());
        assert!(!stats[ClassLabel::Normal.index()].sensitivity.is_nan());
    }

    #[test]
    fn test_unknown_label() {
        let actual = vec![ClassLabel::Pathological];
        let predicted = vec![ClassLabel::Pathological];
        // class order restricted to two classes: Pathological is unknown
        let order = [ClassLabel::Normal, ClassLabel::Suspect];
        let err = ConfusionMatrix::from_labels(&actual, &predicted, &order).unwrap_err();
        assert!(matches!(err, TriageError::UnknownLabel { .. }));
    }

    #[test]
    fn test_length_mismatch() {
        let err = ConfusionMatrix::from_labels(
            &[ClassLabel::Normal],
            &[ClassLabel::Normal, ClassLabel::Suspect],
            &ClassLabel::ALL,
        )
        .unwrap_err();
        assert!(matches!(err, TriageError::Data(_)));
    }

    #[test]
    fn test_sensitivity_specificity_one_vs_rest() {
        let matrix = worked_example();
        let stats = matrix.class_stats();

        // Normal: TP 270, FN 59, FP 10, TN 87
        assert_abs_diff_eq!(stats[0].sensitivity, 270.0 / 329.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats[0].specificity, 87.0 / 97.0, epsilon = 1e-12);
        // Suspect: TP 47, FN 12, FP 42, TN 325
        assert_abs_diff_eq!(stats[1].sensitivity, 47.0 / 59.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats[1].specificity, 325.0 / 367.0, epsilon = 1e-12);
        // Balanced accuracy is the mean of the two
        assert_abs_diff_eq!(
            stats[2].balanced_accuracy,
            (stats[2].sensitivity + stats[2].specificity) / 2.0,
            epsilon = 1e-12
        );
    }
}
