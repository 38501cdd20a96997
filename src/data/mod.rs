//! Dataset types
//!
//! An owned, rectangular feature matrix with one categorical response per
//! row. The response is the typed [`ClassLabel`] enum; the 1/2/3 codes from
//! the input file are mapped once, at load time.

mod loader;

pub use loader::CsvLoader;

use crate::error::{Result, TriageError};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fetal-state class of a cardiotocography recording.
///
/// `Normal` is the majority class by domain convention. The declaration
/// order here is the canonical class order used by the splitter, balancer
/// and evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassLabel {
    Normal,
    Suspect,
    Pathological,
}

impl ClassLabel {
    /// All classes in canonical order.
    pub const ALL: [ClassLabel; 3] = [
        ClassLabel::Normal,
        ClassLabel::Suspect,
        ClassLabel::Pathological,
    ];

    /// Map a 1/2/3 response code to a label.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ClassLabel::Normal),
            2 => Some(ClassLabel::Suspect),
            3 => Some(ClassLabel::Pathological),
            _ => None,
        }
    }

    /// The 1/2/3 response code.
    pub fn code(&self) -> u8 {
        match self {
            ClassLabel::Normal => 1,
            ClassLabel::Suspect => 2,
            ClassLabel::Pathological => 3,
        }
    }

    /// Position in [`ClassLabel::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ClassLabel::Normal => 0,
            ClassLabel::Suspect => 1,
            ClassLabel::Pathological => 2,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ClassLabel::Normal => "Normal",
            ClassLabel::Suspect => "Suspect",
            ClassLabel::Pathological => "Pathological",
        }
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered sequence of observations sharing a common predictor schema.
///
/// Immutable once built; every transformation stage produces a fresh owned
/// `Dataset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Vec<ClassLabel>,
    schema: Vec<String>,
}

impl Dataset {
    /// Build a dataset, validating that rows, labels and schema agree.
    pub fn new(features: Array2<f64>, labels: Vec<ClassLabel>, schema: Vec<String>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(TriageError::Data(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        if features.ncols() != schema.len() {
            return Err(TriageError::Data(format!(
                "{} feature columns but {} schema names",
                features.ncols(),
                schema.len()
            )));
        }
        Ok(Self {
            features,
            labels,
            schema,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &[ClassLabel] {
        &self.labels
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Per-class row counts in canonical class order.
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// The most frequent label (first in canonical order wins ties).
    pub fn majority_class(&self) -> Option<ClassLabel> {
        if self.is_empty() {
            return None;
        }
        let counts = self.class_counts();
        let best = ClassLabel::ALL
            .iter()
            .copied()
            .max_by_key(|c| counts[c.index()])?;
        // max_by_key keeps the last max; scan forward to honor canonical order
        let best_count = counts[best.index()];
        ClassLabel::ALL
            .iter()
            .copied()
            .find(|c| counts[c.index()] == best_count)
    }

    /// Fresh owned copy of the given rows, in the given order.
    /// Indices may repeat (used by with-replacement resampling).
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut features = Array2::zeros((indices.len(), self.n_features()));
        let mut labels = Vec::with_capacity(indices.len());
        for (out, &idx) in indices.iter().enumerate() {
            if idx >= self.n_rows() {
                return Err(TriageError::Data(format!(
                    "row index {} out of bounds for {} rows",
                    idx,
                    self.n_rows()
                )));
            }
            features.row_mut(out).assign(&self.features.row(idx));
            labels.push(self.labels[idx]);
        }
        Self::new(features, labels, self.schema.clone())
    }

    /// Indices of rows whose label is in `wanted`, in original order.
    pub fn indices_of(&self, wanted: &[ClassLabel]) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| wanted.contains(l))
            .map(|(i, _)| i)
            .collect()
    }

    /// Subset of rows whose label is in `wanted`, in original order.
    pub fn filter_by_labels(&self, wanted: &[ClassLabel]) -> Result<Self> {
        self.select_rows(&self.indices_of(wanted))
    }

    /// Vertically stack datasets sharing a schema into one owned dataset.
    pub fn vstack(parts: &[&Dataset]) -> Result<Self> {
        let first = parts
            .first()
            .ok_or_else(|| TriageError::Data("vstack of zero datasets".to_string()))?;
        for part in &parts[1..] {
            if part.schema != first.schema {
                return Err(TriageError::SchemaMismatch {
                    expected: first.schema.join(", "),
                    actual: part.schema.join(", "),
                });
            }
        }
        let views: Vec<_> = parts.iter().map(|p| p.features.view()).collect();
        let features = ndarray::concatenate(Axis(0), &views)
            .map_err(|e| TriageError::Data(e.to_string()))?;
        let labels = parts.iter().flat_map(|p| p.labels.iter().copied()).collect();
        Self::new(features, labels, first.schema.clone())
    }
}
