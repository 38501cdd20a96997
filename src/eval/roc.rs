//! ROC curves and AUC
//!
//! Binary threshold-sweep ROC with trapezoidal AUC, lifted to the
//! multi-class setting by evaluating one curve per unordered class pair
//! from the predicted class probabilities.

use crate::data::ClassLabel;
use crate::error::{Result, TriageError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A single point on a ROC curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RocPoint {
    /// Score threshold at which this point is computed.
    pub threshold: f64,
    /// False positive rate: FP / (FP + TN).
    pub fpr: f64,
    /// True positive rate: TP / (TP + FN).
    pub tpr: f64,
}

/// ROC curve with its AUC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    /// Points from (0, 0) upward, ascending in FPR (ties ascending in TPR).
    pub points: Vec<RocPoint>,
    /// Area under the curve, trapezoidal rule, in [0, 1].
    pub auc: f64,
}

/// ROC curve and AUC for one unordered class pair. The first class of the
/// pair is the positive class whose predicted probability is the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRoc {
    pub pair: (ClassLabel, ClassLabel),
    pub curve: RocCurve,
}

/// Compute a binary ROC curve from scores and labels.
///
/// Sweeps all distinct score values as thresholds, walking in descending
/// score order and collapsing tied scores into a single point; the curve
/// therefore ascends in FPR with ties ascending in TPR. AUC is trapezoidal.
pub fn roc_curve(scores: &[f64], labels: &[bool]) -> Result<RocCurve> {
    if scores.is_empty() {
        return Err(TriageError::Data("empty ROC input".to_string()));
    }
    if scores.len() != labels.len() {
        return Err(TriageError::Data(format!(
            "{} scores but {} labels",
            scores.len(),
            labels.len()
        )));
    }

    let total_pos = labels.iter().filter(|&&l| l).count();
    let total_neg = labels.len() - total_pos;
    if total_pos == 0 {
        return Err(TriageError::Data("no positive samples".to_string()));
    }
    if total_neg == 0 {
        return Err(TriageError::Data("no negative samples".to_string()));
    }

    // Descending score; ties put negatives first (pessimistic)
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| labels[a].cmp(&labels[b]))
    });

    let p = total_pos as f64;
    let n = total_neg as f64;

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < indices.len() {
        let current_score = scores[indices[i]];
        while i < indices.len() && scores[indices[i]] == current_score {
            if labels[indices[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            threshold: current_score,
            fpr: fp as f64 / n,
            tpr: tp as f64 / p,
        });
    }

    let auc = trapezoidal_auc(&points);
    Ok(RocCurve { points, auc })
}

/// One ROC curve per unordered class pair.
///
/// For pair (A, B) with A earlier in `class_order`, only rows whose actual
/// label is A or B are considered; the score is the predicted probability
/// of A and A is the positive class. Pairs where one class is absent from
/// the restricted rows are skipped with a warning: their ROC is undefined.
pub fn pairwise_roc(
    actual: &[ClassLabel],
    probabilities: &Array2<f64>,
    class_order: &[ClassLabel],
) -> Result<Vec<PairRoc>> {
    if actual.len() != probabilities.nrows() {
        return Err(TriageError::Data(format!(
            "{} labels but {} probability rows",
            actual.len(),
            probabilities.nrows()
        )));
    }
    if probabilities.ncols() != class_order.len() {
        return Err(TriageError::Data(format!(
            "{} probability columns but {} classes",
            probabilities.ncols(),
            class_order.len()
        )));
    }
    for label in actual {
        if !class_order.contains(label) {
            return Err(TriageError::UnknownLabel {
                label: label.name().to_string(),
            });
        }
    }

    let mut results = Vec::new();
    for a in 0..class_order.len() {
        for b in (a + 1)..class_order.len() {
            let (class_a, class_b) = (class_order[a], class_order[b]);
            let mut scores = Vec::new();
            let mut labels = Vec::new();
            for (i, &label) in actual.iter().enumerate() {
                if label == class_a || label == class_b {
                    scores.push(probabilities[[i, a]]);
                    labels.push(label == class_a);
                }
            }

            match roc_curve(&scores, &labels) {
                Ok(curve) => results.push(PairRoc {
                    pair: (class_a, class_b),
                    curve,
                }),
                Err(err) => {
                    log::warn!(
                        "skipping ROC for pair {}/{}: {}",
                        class_a,
                        class_b,
                        err
                    );
                }
            }
        }
    }
    Ok(results)
}

/// Sum of trapezoids between consecutive curve points.
fn trapezoidal_auc(points: &[RocPoint]) -> f64 {
    let mut auc = 0.0;
    for pair in points.windows(2) {
        auc += (pair[1].fpr - pair[0].fpr).abs() * (pair[1].tpr + pair[0].tpr) / 2.0;
    }
    auc
}
