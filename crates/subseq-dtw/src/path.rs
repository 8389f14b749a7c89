//! Alignment path types.

use std::fmt;

/// A cell of the alignment grid: query frame `row` matched to reference frame `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Query frame index.
    pub row: usize,
    /// Reference frame index.
    pub col: usize,
}

impl Cell {
    /// Create a cell at `(row, col)`.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One forward step between consecutive path cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Next query frame, same reference frame: `(1, 0)`.
    Down,
    /// Next query frame and next reference frame: `(1, 1)`.
    Diagonal,
    /// Same query frame, next reference frame: `(0, 1)`.
    Right,
}

impl Move {
    /// Classify the step from `from` to `to`, or `None` if it is not one of
    /// the three legal moves.
    #[must_use]
    pub fn between(from: Cell, to: Cell) -> Option<Self> {
        let dr = to.row.checked_sub(from.row)?;
        let dc = to.col.checked_sub(from.col)?;
        match (dr, dc) {
            (1, 0) => Some(Self::Down),
            (1, 1) => Some(Self::Diagonal),
            (0, 1) => Some(Self::Right),
            _ => None,
        }
    }
}

/// Inclusive span of reference frames covered by an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSpan {
    /// First matched reference frame.
    pub start: usize,
    /// Last matched reference frame (inclusive).
    pub end: usize,
}

impl ReferenceSpan {
    /// Return the number of reference frames in the span.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`: a span covers at least one frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ReferenceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Ordered cells from the first query frame to the last.
///
/// Consecutive cells are always related by a [`Move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPath(Vec<Cell>);

impl AlignmentPath {
    pub(crate) fn new(cells: Vec<Cell>) -> Self {
        debug_assert!(!cells.is_empty(), "alignment path must not be empty");
        Self(cells)
    }

    /// Return the path cells as a slice.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Return the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the first cell (in query row 0).
    #[must_use]
    pub fn first(&self) -> Option<Cell> {
        self.0.first().copied()
    }

    /// Return the last cell (in the final query row).
    #[must_use]
    pub fn last(&self) -> Option<Cell> {
        self.0.last().copied()
    }

    /// Iterate over the moves between consecutive cells. Yields `None` for a
    /// pair that is not a legal move.
    pub fn moves(&self) -> impl Iterator<Item = Option<Move>> + '_ {
        self.0.windows(2).map(|w| Move::between(w[0], w[1]))
    }
}

impl<'a> IntoIterator for &'a AlignmentPath {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
