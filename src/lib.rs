//! # ctg-triage
//!
//! Exploratory modeling workflow for three-class cardiotocography triage:
//! deterministic train/test splitting, pairwise over/under-sampling to
//! rebalance the minority classes, standardization and PCA fit on the
//! balanced training rows only, multinomial (softmax) logistic regression,
//! and evaluation with multi-class confusion statistics and pairwise
//! ROC/AUC.
//!
//! ## Quick start
//!
//! ```no_run
//! use ctg_triage::data::CsvLoader;
//! use ctg_triage::pipeline::{Pipeline, PipelineConfig};
//!
//! # fn main() -> ctg_triage::Result<()> {
//! let data = CsvLoader::new().load("ctg.csv")?;
//! let report = Pipeline::new(PipelineConfig::default()).run(&data)?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```

pub mod balance;
pub mod data;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod split;

pub use error::{Result, TriageError};

/// Commonly used types.
pub mod prelude {
    pub use crate::balance::{ClassBalancer, PairSampler};
    pub use crate::data::{ClassLabel, CsvLoader, Dataset};
    pub use crate::error::{Result, TriageError};
    pub use crate::eval::{pairwise_roc, roc_curve, ClassStats, ConfusionMatrix};
    pub use crate::model::SoftmaxRegression;
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineReport};
    pub use crate::preprocessing::{PcaProjection, PcaReducer, Standardizer};
    pub use crate::split::{train_test_split, TrainTestSplit};
}
