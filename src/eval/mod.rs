//! Model evaluation
//!
//! Multi-class confusion-matrix statistics and pairwise ROC/AUC.

mod confusion;
mod roc;

pub use confusion::{ClassStats, ConfusionMatrix};
pub use roc::{pairwise_roc, roc_curve, PairRoc, RocCurve, RocPoint};
