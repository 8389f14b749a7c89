//! Error types for feature validation, alignment, and preprocessing.

use std::fmt;

/// Which of the two alignment inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceRole {
    /// The short sequence being searched for.
    Query,
    /// The long sequence being searched in.
    Reference,
}

impl fmt::Display for SequenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Reference => f.write_str("reference"),
        }
    }
}

/// Errors from feature sequence validation and subsequence alignment.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when a feature sequence is declared with zero dimensions.
    #[error("feature dimensionality must be at least 1")]
    ZeroDimension,

    /// Returned when the flat value buffer does not divide into whole frames,
    /// or when frames of differing widths are combined.
    #[error("frame {frame} has {got} values, expected {expected}")]
    RaggedFrames {
        /// Index of the first frame with the wrong width.
        frame: usize,
        /// Width of the first frame (the sequence dimensionality).
        expected: usize,
        /// Width actually found.
        got: usize,
    },

    /// Returned when a feature value is NaN or infinite.
    #[error("non-finite feature value at frame {frame}, dimension {dim}")]
    NonFiniteValue {
        /// Frame index of the offending value.
        frame: usize,
        /// Dimension index of the offending value.
        dim: usize,
    },

    /// Returned when query and reference frames have different dimensionality.
    #[error("query frames have {query_dim} dimensions but reference frames have {reference_dim}")]
    ShapeMismatch {
        /// Dimensionality of the query frames.
        query_dim: usize,
        /// Dimensionality of the reference frames.
        reference_dim: usize,
    },

    /// Returned when a sequence has no frames.
    #[error("{role} sequence must contain at least one frame")]
    EmptySequence {
        /// Which input was empty.
        role: SequenceRole,
    },

    /// Returned when a cost matrix does not have the shape the caller declared.
    #[error("cost matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    DimensionMismatch {
        /// Declared number of rows (query length).
        expected_rows: usize,
        /// Declared number of columns (reference length).
        expected_cols: usize,
        /// Actual number of rows.
        rows: usize,
        /// Actual number of columns.
        cols: usize,
    },

    /// Returned when a flat buffer does not hold exactly `rows * cols` entries.
    #[error("buffer of {len} entries cannot form a {rows}x{cols} matrix")]
    BufferLength {
        /// Requested number of rows.
        rows: usize,
        /// Requested number of columns.
        cols: usize,
        /// Actual buffer length.
        len: usize,
    },

    /// Returned when a caller-supplied cost is negative or non-finite.
    #[error("invalid cost {value} at ({row}, {col}): costs must be finite and non-negative")]
    InvalidCost {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when the distance between two finite frames is too large to
    /// represent as an `f64`.
    #[error("distance between query frame {row} and reference frame {col} overflows f64")]
    DistanceOverflow {
        /// Query frame index.
        row: usize,
        /// Reference frame index.
        col: usize,
    },

    /// Returned when an accumulated path cost is too large to represent as
    /// an `f64`.
    #[error("accumulated cost at ({row}, {col}) overflows f64")]
    CostOverflow {
        /// Row of the first overflowing cell.
        row: usize,
        /// Column of the first overflowing cell.
        col: usize,
    },

    /// Returned when back-pointer traceback does not reach row 0 within
    /// `limit` steps. Indicates a corrupted back-pointer grid.
    #[error("backtracking exceeded {limit} steps without reaching the first query frame")]
    BacktrackOverrun {
        /// Maximum number of path cells permitted (`n_query + n_reference`).
        limit: usize,
    },

    /// Returned when a back-pointer names a cell that is not an up, diagonal,
    /// or left neighbour of the cell that holds it.
    #[error("back-pointer at ({row}, {col}) does not name an adjacent predecessor")]
    CorruptBackPointer {
        /// Row of the cell holding the bad pointer.
        row: usize,
        /// Column of the cell holding the bad pointer.
        col: usize,
    },
}

/// Errors from feature preprocessing.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// Returned when a frame has zero variance and cannot be standardized.
    #[error("frame {frame} is constant (all {dim} values equal {value})")]
    ConstantFrame {
        /// Index of the constant frame.
        frame: usize,
        /// Number of values in the frame.
        dim: usize,
        /// The repeated value.
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_names_role() {
        let err = DtwError::EmptySequence {
            role: SequenceRole::Reference,
        };
        assert_eq!(err.to_string(), "reference sequence must contain at least one frame");
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = DtwError::DimensionMismatch {
            expected_rows: 3,
            expected_cols: 4,
            rows: 3,
            cols: 5,
        };
        assert_eq!(err.to_string(), "cost matrix is 3x5, expected 3x4");
    }
}
