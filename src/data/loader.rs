//! CSV loading for the triage dataset
//!
//! Expects a header row, N numeric predictor columns and one response
//! column holding the 1/2/3 class codes.

use crate::data::{ClassLabel, Dataset};
use crate::error::{Result, TriageError};
use ndarray::Array2;
use std::path::Path;

/// Loader for delimited text files.
pub struct CsvLoader {
    response_column: String,
    delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self {
            response_column: "NSP".to_string(),
            delimiter: b',',
        }
    }

    /// Name of the categorical response column (default `NSP`).
    pub fn with_response_column(mut self, name: &str) -> Self {
        self.response_column = name.to_string();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a CSV file into a [`Dataset`].
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_path(path.as_ref())
            .map_err(|e| TriageError::Data(e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| TriageError::Data(e.to_string()))?
            .clone();

        let response_idx = headers
            .iter()
            .position(|h| h == self.response_column)
            .ok_or_else(|| {
                TriageError::Data(format!(
                    "response column {} not found in header",
                    self.response_column
                ))
            })?;

        let schema: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != response_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows: Vec<f64> = Vec::new();
        let mut labels: Vec<ClassLabel> = Vec::new();

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| TriageError::Data(e.to_string()))?;
            if record.len() != headers.len() {
                return Err(TriageError::Data(format!(
                    "row {}: expected {} fields, got {}",
                    row_idx + 1,
                    headers.len(),
                    record.len()
                )));
            }
            for (col_idx, field) in record.iter().enumerate() {
                if col_idx == response_idx {
                    let code: u8 = field.trim().parse().map_err(|_| {
                        TriageError::Data(format!(
                            "row {}: response value {:?} is not an integer code",
                            row_idx + 1,
                            field
                        ))
                    })?;
                    let label = ClassLabel::from_code(code).ok_or_else(|| {
                        TriageError::Data(format!(
                            "row {}: response code {} is not one of 1/2/3",
                            row_idx + 1,
                            code
                        ))
                    })?;
                    labels.push(label);
                } else {
                    let value: f64 = field.trim().parse().map_err(|_| {
                        TriageError::Data(format!(
                            "row {}, column {}: {:?} is not numeric",
                            row_idx + 1,
                            headers.get(col_idx).unwrap_or(""),
                            field
                        ))
                    })?;
                    rows.push(value);
                }
            }
        }

        if labels.is_empty() {
            return Err(TriageError::EmptyDataset);
        }

        let features = Array2::from_shape_vec((labels.len(), schema.len()), rows)
            .map_err(|e| TriageError::Data(e.to_string()))?;
        Dataset::new(features, labels, schema)
    }
}
