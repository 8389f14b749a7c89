//! Accumulated alignment cost newtype.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative accumulated alignment cost: the sum of frame distances
/// along an alignment path.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct AlignmentCost(f64);

impl AlignmentCost {
    pub(crate) fn new(value: f64) -> Self {
        debug_assert!(value >= 0.0, "alignment cost must be non-negative");
        Self(value)
    }

    /// Return the raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return the cost divided by the number of path cells.
    #[must_use]
    pub fn per_step(self, path_len: usize) -> f64 {
        if path_len == 0 {
            return 0.0;
        }
        self.0 / path_len as f64
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for AlignmentCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
