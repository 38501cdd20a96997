//! Classifier models

mod softmax;

pub use softmax::SoftmaxRegression;
