//! Trained codebook.

use subseq_dtw::{DtwError, FeatureSequence, euclidean_distances};

use crate::distortion::Distortion;
use crate::error::VqError;
use crate::label::CodewordIndex;

/// Result of LBG codebook training.
#[derive(Debug, Clone)]
pub struct Codebook {
    /// One frame per codeword, in the same dimensionality as the training data.
    pub codewords: FeatureSequence,
    /// Nearest codeword for each training frame.
    pub assignments: Vec<CodewordIndex>,
    /// Total squared distance from each training frame to its codeword.
    pub distortion: Distortion,
    /// Whether every splitting stage reached the stability threshold before
    /// its iteration cap.
    pub converged: bool,
    /// Iterations performed, summed over all stages.
    pub iterations: usize,
}

impl Codebook {
    /// Return the number of codewords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    /// Return true if the codebook has no codewords.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    /// Return the number of training frames assigned to each codeword.
    #[must_use]
    pub fn cell_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.codewords.len()];
        for idx in &self.assignments {
            sizes[idx.index()] += 1;
        }
        sizes
    }

    /// Return the indices of training frames assigned to `codeword`.
    #[must_use]
    pub fn members(&self, codeword: CodewordIndex) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c == codeword).then_some(i))
            .collect()
    }

    /// Map every frame of `frames` to its nearest codeword. Ties go to the
    /// lower codeword index.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`VqError::Dtw`] | `frames` has a different dimensionality than the codebook |
    pub fn quantize(&self, frames: &FeatureSequence) -> Result<Vec<CodewordIndex>, VqError> {
        if frames.dim() != self.codewords.dim() {
            return Err(DtwError::ShapeMismatch {
                query_dim: frames.dim(),
                reference_dim: self.codewords.dim(),
            }
            .into());
        }
        if frames.is_empty() {
            return Ok(Vec::new());
        }
        let d = euclidean_distances(frames, &self.codewords)?;
        Ok((0..d.rows())
            .filter_map(|i| d.argmin_row(i))
            .map(|(j, _)| CodewordIndex::new(j))
            .collect())
    }
}
