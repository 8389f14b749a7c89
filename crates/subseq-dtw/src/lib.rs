//! Subsequence dynamic time warping over multi-dimensional feature sequences.
//!
//! Pure math library with zero I/O. Finds the contiguous stretch of a long
//! reference sequence that best matches a short query under DTW, with the
//! start and end of the match both free. The pipeline is a Euclidean frame
//! distance matrix, an accumulated-cost recurrence with back-pointers, and a
//! traceback from the cheapest endpoint in the last query row.

mod accumulate;
mod cost;
mod distance;
mod error;
mod matrix;
mod path;
mod preprocess;
mod reconstruct;
mod sequence;
pub mod synth;

pub use accumulate::AccumulatedCost;
pub use cost::AlignmentCost;
pub use distance::euclidean_distances;
pub use error::{DtwError, PreprocessError, SequenceRole};
pub use matrix::{BackPointers, CostMatrix};
pub use path::{AlignmentPath, Cell, Move, ReferenceSpan};
pub use preprocess::normalize_frames;
pub use reconstruct::{Alignment, align};
pub use sequence::FeatureSequence;
