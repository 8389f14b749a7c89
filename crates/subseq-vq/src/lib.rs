//! Vector-quantization codebooks for feature frames.
//!
//! Trains an LBG codebook (k-means with codeword splitting) over the frames
//! of a feature sequence, using the same Euclidean frame distance as the
//! alignment pipeline.

mod config;
mod distortion;
mod error;
mod label;
mod lbg;
mod result;

pub use config::CodebookConfig;
pub use distortion::Distortion;
pub use error::VqError;
pub use label::CodewordIndex;
pub use result::Codebook;
