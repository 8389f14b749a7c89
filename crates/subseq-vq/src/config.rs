//! Configuration builder for LBG codebook training.

use subseq_dtw::FeatureSequence;

use crate::error::VqError;
use crate::result::Codebook;

/// Configuration for LBG (splitting k-means) codebook training.
///
/// Construct via [`CodebookConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `max_iter`      | 100     |
/// | `split_epsilon` | 1e-6    |
/// | `stability`     | 0.95    |
/// | `seed`          | 42      |
#[derive(Debug, Clone)]
pub struct CodebookConfig {
    pub(crate) n_codewords: usize,
    pub(crate) max_iter: usize,
    pub(crate) split_epsilon: f64,
    pub(crate) stability: f64,
    pub(crate) seed: u64,
}

impl CodebookConfig {
    /// Create a configuration that trains `n_codewords` codewords.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`VqError::InvalidCodebookSize`] | `n_codewords` is zero |
    pub fn new(n_codewords: usize) -> Result<Self, VqError> {
        if n_codewords == 0 {
            return Err(VqError::InvalidCodebookSize { n_codewords });
        }
        Ok(Self {
            n_codewords,
            max_iter: 100,
            split_epsilon: 1e-6,
            stability: 0.95,
            seed: 42,
        })
    }

    /// Set the iteration cap for each splitting stage.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the offset applied to every coordinate when a codeword is split
    /// into `c - ε` and `c + ε`.
    #[must_use]
    pub fn with_split_epsilon(mut self, split_epsilon: f64) -> Self {
        self.split_epsilon = split_epsilon;
        self
    }

    /// Set the fraction of frames that must keep their codeword between two
    /// iterations for a stage to count as converged.
    #[must_use]
    pub fn with_stability(mut self, stability: f64) -> Self {
        self.stability = stability;
        self
    }

    /// Set the random seed used to re-seed empty cells.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the target codebook size.
    #[must_use]
    pub fn n_codewords(&self) -> usize {
        self.n_codewords
    }

    /// Return the iteration cap per stage.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the split offset.
    #[must_use]
    pub fn split_epsilon(&self) -> f64 {
        self.split_epsilon
    }

    /// Return the stability threshold.
    #[must_use]
    pub fn stability(&self) -> f64 {
        self.stability
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a codebook over the frames of `frames`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`VqError::TooFewFrames`] | `frames.len() < n_codewords` |
    /// | [`VqError::Dtw`] | A codeword update produced a non-finite value |
    pub fn train(&self, frames: &FeatureSequence) -> Result<Codebook, VqError> {
        let n = frames.len();
        if n < self.n_codewords {
            return Err(VqError::TooFewFrames {
                n_frames: n,
                n_codewords: self.n_codewords,
            });
        }
        crate::lbg::train(frames, self)
    }
}
