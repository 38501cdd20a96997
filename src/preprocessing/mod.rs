//! Predictor preprocessing
//!
//! Standardization and PCA. Both fit on the balanced training predictors
//! and are applied, frozen, to held-out data.

mod pca;
mod standardize;

pub use pca::{PcaProjection, PcaReducer};
pub use standardize::Standardizer;
