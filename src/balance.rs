//! Class-imbalance correction
//!
//! Combined over/under-sampling for the three-class response. Each
//! non-majority class gets its own pairwise subset against the majority
//! class; the subsets are rebalanced independently and merged so the
//! shared majority rows are counted once.

use crate::data::{ClassLabel, Dataset};
use crate::error::{Result, TriageError};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Combined over/under-sampling over a two-class subset.
///
/// Draws a new sample of `n_target` rows in which the minority class holds
/// roughly the configured probability: minority rows are drawn uniformly
/// with replacement (oversampling), majority rows are a strict subset drawn
/// without replacement (undersampling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSampler {
    minority_probability: f64,
    n_target: Option<usize>,
}

impl Default for PairSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl PairSampler {
    pub fn new() -> Self {
        Self {
            minority_probability: 0.47,
            n_target: None,
        }
    }

    /// Target minority-class probability in the output (default 0.47).
    pub fn with_minority_probability(mut self, p: f64) -> Self {
        self.minority_probability = p;
        self
    }

    /// Target output size (default: the subset's own size).
    pub fn with_n_target(mut self, n: usize) -> Self {
        self.n_target = Some(n);
        self
    }

    /// Resample `subset`, which must contain rows of both classes.
    pub fn resample(
        &self,
        subset: &Dataset,
        minority: ClassLabel,
        majority: ClassLabel,
        rng: &mut ChaCha8Rng,
    ) -> Result<Dataset> {
        let p = self.minority_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(TriageError::InvalidProbability { value: p });
        }

        let minority_pool = subset.indices_of(&[minority]);
        let majority_pool = subset.indices_of(&[majority]);
        if minority_pool.is_empty() {
            return Err(TriageError::DegenerateSubset {
                class: minority.name().to_string(),
            });
        }
        if majority_pool.is_empty() {
            return Err(TriageError::DegenerateSubset {
                class: majority.name().to_string(),
            });
        }

        let n_target = self.n_target.unwrap_or(subset.n_rows());
        let n_minority = ((p * n_target as f64).round() as usize).min(n_target);
        let wanted_majority = n_target - n_minority;
        // Undersampling never duplicates: cap at availability.
        let n_majority = wanted_majority.min(majority_pool.len());
        if n_majority < wanted_majority {
            log::debug!(
                "majority class {} has only {} rows, wanted {}; output shrinks to {}",
                majority,
                majority_pool.len(),
                wanted_majority,
                n_minority + n_majority
            );
        }

        // Oversample minority with replacement
        let mut picked: Vec<usize> = (0..n_minority)
            .map(|_| minority_pool[rng.gen_range(0..minority_pool.len())])
            .collect();

        // Undersample majority: shuffle the pool, take a strict subset
        let mut shuffled = majority_pool.clone();
        shuffled.shuffle(rng);
        picked.extend(shuffled.into_iter().take(n_majority));

        subset.select_rows(&picked)
    }
}

/// Corrects the three-class imbalance via pairwise rebalanced subsets.
///
/// For every non-majority class `Ck`, the subset {majority, Ck} of the
/// training rows is rebalanced by a [`PairSampler`]; the output is the
/// union of the `Ck` rows from each rebalanced subset plus the majority
/// rows from the first one (the majority pool is shared, so taking it from
/// every subset would double-count it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassBalancer {
    minority_probability: f64,
    majority: Option<ClassLabel>,
}

impl Default for ClassBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassBalancer {
    pub fn new() -> Self {
        Self {
            minority_probability: 0.47,
            majority: None,
        }
    }

    /// Target minority probability handed to each pairwise sampler.
    pub fn with_minority_probability(mut self, p: f64) -> Self {
        self.minority_probability = p;
        self
    }

    /// Fix the majority class instead of using the most frequent label.
    pub fn with_majority(mut self, majority: ClassLabel) -> Self {
        self.majority = Some(majority);
        self
    }

    /// Produce a fresh, rebalanced training set.
    pub fn balance(&self, train: &Dataset, rng: &mut ChaCha8Rng) -> Result<Dataset> {
        if train.is_empty() {
            return Err(TriageError::EmptyDataset);
        }
        if !(self.minority_probability > 0.0 && self.minority_probability < 1.0) {
            return Err(TriageError::InvalidProbability {
                value: self.minority_probability,
            });
        }

        let majority = match self.majority {
            Some(m) => m,
            None => train.majority_class().ok_or(TriageError::EmptyDataset)?,
        };

        let sampler = PairSampler::new().with_minority_probability(self.minority_probability);

        let mut minority_parts: Vec<Dataset> = Vec::new();
        let mut majority_part: Option<Dataset> = None;

        for minority in ClassLabel::ALL.iter().copied().filter(|c| *c != majority) {
            let subset = train.filter_by_labels(&[majority, minority])?;
            let balanced = sampler.resample(&subset, minority, majority, rng)?;
            log::debug!(
                "pairwise subset {}/{}: {} rows in, {} rows out",
                majority,
                minority,
                subset.n_rows(),
                balanced.n_rows()
            );

            minority_parts.push(balanced.filter_by_labels(&[minority])?);
            if majority_part.is_none() {
                majority_part = Some(balanced.filter_by_labels(&[majority])?);
            }
        }

        let majority_part =
            majority_part.ok_or_else(|| TriageError::Data("no minority classes".to_string()))?;
        let mut parts: Vec<&Dataset> = vec![&majority_part];
        parts.extend(minority_parts.iter());
        let merged = Dataset::vstack(&parts)?;

        let counts = merged.class_counts();
        if counts.iter().any(|&c| c == 0) {
            return Err(TriageError::Data(
                "balanced training set lost a class".to_string(),
            ));
        }
        log::info!(
            "balanced training set: {} rows ({} Normal / {} Suspect / {} Pathological)",
            merged.n_rows(),
            counts[0],
            counts[1],
            counts[2]
        );
        Ok(merged)
    }
}
