//! Accumulated-cost recurrence for subsequence DTW.

use tracing::{debug, instrument};

use crate::error::DtwError;
use crate::matrix::{BackPointers, CostMatrix};
use crate::path::Cell;

/// Accumulated-cost matrix `S` and back-pointer grid produced by a single
/// row-major sweep over a distance matrix.
///
/// `S[i][j]` is the minimum cost of any path that starts anywhere in query
/// row 0, consumes query frames `0..=i`, and ends at reference frame `j`.
#[derive(Debug, Clone)]
pub struct AccumulatedCost {
    cost: CostMatrix,
    back_pointers: BackPointers,
}

impl AccumulatedCost {
    /// Run the recurrence over `distances`, which must be `n_query x n_reference`.
    ///
    /// Boundary rules:
    /// - row 0: `S[0][j] = d[0][j]`, back-pointer to itself (free start);
    /// - column 0: `S[i][0] = S[i-1][0] + d[i][0]`, back-pointer up;
    /// - interior: `S[i][j] = d[i][j] + min(S[up], S[diag], S[left])`, where
    ///   ties resolve to up, then diagonal, then left.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | `distances.shape() != (n_query, n_reference)` |
    /// | [`DtwError::CostOverflow`] | An accumulated cost exceeds `f64::MAX` |
    #[instrument(skip(distances))]
    pub fn compute(
        distances: &CostMatrix,
        n_query: usize,
        n_reference: usize,
    ) -> Result<Self, DtwError> {
        let (rows, cols) = distances.shape();
        if (rows, cols) != (n_query, n_reference) {
            return Err(DtwError::DimensionMismatch {
                expected_rows: n_query,
                expected_cols: n_reference,
                rows,
                cols,
            });
        }

        let d = distances.as_slice();
        let mut s = vec![0.0; rows * cols];
        let mut bp = vec![Cell::new(0, 0); rows * cols];

        if rows > 0 {
            s[..cols].copy_from_slice(&d[..cols]);
            for (j, p) in bp[..cols].iter_mut().enumerate() {
                *p = Cell::new(0, j);
            }
        }

        for i in 1..rows {
            let cur = i * cols;
            let prev = (i - 1) * cols;

            if cols > 0 {
                s[cur] = s[prev] + d[cur];
                bp[cur] = Cell::new(i - 1, 0);
            }

            for j in 1..cols {
                let up = s[prev + j];
                let diag = s[prev + j - 1];
                let left = s[cur + j - 1];

                // Ordered comparison: the first of (up, diag, left) holding the
                // minimum wins.
                let (best, from) = if up <= diag && up <= left {
                    (up, Cell::new(i - 1, j))
                } else if diag <= left {
                    (diag, Cell::new(i - 1, j - 1))
                } else {
                    (left, Cell::new(i, j - 1))
                };

                s[cur + j] = d[cur + j] + best;
                bp[cur + j] = from;
            }
        }

        if let Some(index) = s.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::CostOverflow {
                row: index / cols,
                col: index % cols,
            });
        }

        debug!(rows, cols, "accumulated cost computed");
        Ok(Self {
            cost: CostMatrix::from_raw(rows, cols, s),
            back_pointers: BackPointers::from_raw(rows, cols, bp),
        })
    }

    /// Return the accumulated-cost matrix `S`.
    #[must_use]
    pub fn cost(&self) -> &CostMatrix {
        &self.cost
    }

    /// Return the back-pointer grid.
    #[must_use]
    pub fn back_pointers(&self) -> &BackPointers {
        &self.back_pointers
    }

    /// Return the predecessor recorded for `cell`. First-row cells return themselves.
    ///
    /// # Panics
    ///
    /// Panics if `cell` lies outside the grid.
    #[must_use]
    pub fn predecessor(&self, cell: Cell) -> Cell {
        self.back_pointers.get(cell)
    }

    /// Return the column of the first minimum in the final query row and the
    /// accumulated cost there. `None` only for an empty matrix.
    #[must_use]
    pub fn best_end(&self) -> Option<(usize, f64)> {
        let rows = self.cost.rows();
        if rows == 0 {
            return None;
        }
        self.cost.argmin_row(rows - 1)
    }

    /// Return `(n_query, n_reference)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.cost.shape()
    }

    #[cfg(test)]
    pub(crate) fn back_pointers_mut(&mut self) -> &mut BackPointers {
        &mut self.back_pointers
    }
}
