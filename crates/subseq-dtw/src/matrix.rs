//! Dense row-major matrices for pairwise and accumulated costs.

use std::ops::Index;

use crate::error::DtwError;
use crate::path::Cell;

/// Dense `rows x cols` matrix of non-negative costs.
///
/// Stored as a flat arena indexed `row * cols + col`. Rows correspond to
/// query frames and columns to reference frames.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Create a matrix from row-major data, validating shape and values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::BufferLength`] | `data.len() != rows * cols` |
    /// | [`DtwError::InvalidCost`] | Any entry is negative, NaN, or infinite |
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, DtwError> {
        if data.len() != rows * cols {
            return Err(DtwError::BufferLength {
                rows,
                cols,
                len: data.len(),
            });
        }
        if let Some(index) = data.iter().position(|&v| !v.is_finite() || v < 0.0) {
            return Err(DtwError::InvalidCost {
                row: index / cols,
                col: index % cols,
                value: data[index],
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a matrix without validation. For internal use where every entry
    /// is produced by this crate.
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Return the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Return `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Return the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows` or `col >= cols`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows, "row index {row} out of bounds for {} rows", self.rows);
        assert!(col < self.cols, "column index {col} out of bounds for {} columns", self.cols);
        self.data[row * self.cols + col]
    }

    /// Return row `row` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows`.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // `max(1)` keeps `chunks_exact` valid for a 0-column matrix, which has no data.
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Return the row-major flat buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Return the column of the first minimum in `row`, with its value.
    ///
    /// Returns `None` for a matrix with no columns.
    #[must_use]
    pub fn argmin_row(&self, row: usize) -> Option<(usize, f64)> {
        self.row(row)
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (j, v)| match best {
                Some((_, b)) if b <= v => best,
                _ => Some((j, v)),
            })
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(col < self.cols, "column index {col} out of bounds for {} columns", self.cols);
        &self.data[row * self.cols + col]
    }
}

/// Dense grid recording, for every cell, the predecessor that produced its
/// accumulated cost. First-row cells point at themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackPointers {
    rows: usize,
    cols: usize,
    data: Vec<Cell>,
}

impl BackPointers {
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<Cell>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Return `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Return the predecessor recorded for `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` lies outside the grid.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Cell {
        assert!(
            cell.row < self.rows && cell.col < self.cols,
            "cell {cell} out of bounds for {}x{} grid",
            self.rows,
            self.cols
        );
        self.data[cell.row * self.cols + cell.col]
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, cell: Cell, predecessor: Cell) {
        self.data[cell.row * self.cols + cell.col] = predecessor;
    }
}
