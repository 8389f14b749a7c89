use subseq_dtw::DtwError;

/// Errors from codebook training and quantization.
#[derive(Debug, thiserror::Error)]
pub enum VqError {
    /// Returned when the requested codebook size is zero.
    #[error("codebook must hold at least 1 codeword, got {n_codewords}")]
    InvalidCodebookSize {
        /// The invalid codebook size provided.
        n_codewords: usize,
    },

    /// Returned when fewer frames are provided than requested codewords.
    #[error("need at least {n_codewords} frames to train {n_codewords} codewords, got {n_frames}")]
    TooFewFrames {
        /// Number of frames provided.
        n_frames: usize,
        /// Requested number of codewords.
        n_codewords: usize,
    },

    /// Wraps a feature or distance error raised while assigning frames.
    #[error("distance computation failed: {0}")]
    Dtw(#[from] DtwError),
}
