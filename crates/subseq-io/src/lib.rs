//! File I/O, validation, and serialization for subsequence alignment experiments.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ExperimentName, FrameLayout};
pub use error::IoError;
pub use reader::FeatureReader;
pub use writer::{FeatureWriter, ResultWriter};
