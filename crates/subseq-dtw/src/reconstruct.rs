//! Back-pointer traceback from the best free endpoint.

use tracing::{debug, info, instrument, warn};

use crate::accumulate::AccumulatedCost;
use crate::cost::AlignmentCost;
use crate::distance::euclidean_distances;
use crate::error::{DtwError, SequenceRole};
use crate::path::{AlignmentPath, Cell, Move, ReferenceSpan};
use crate::sequence::FeatureSequence;

/// Result of a subsequence alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Cells from query row 0 to the final query row.
    pub path: AlignmentPath,
    /// Accumulated cost at the path's endpoint, `S[n_query - 1][end]`.
    pub cost: AlignmentCost,
    /// Reference frames spanned by the path.
    pub span: ReferenceSpan,
}

impl Alignment {
    /// Return the accumulated cost divided by the number of path cells.
    ///
    /// Comparable across queries of different lengths.
    #[must_use]
    pub fn normalized_cost(&self) -> f64 {
        self.cost.per_step(self.path.len())
    }
}

/// Find the reference subsequence that best matches `query`.
///
/// Builds the frame distance matrix, runs the accumulated-cost recurrence,
/// and reconstructs the path from the cheapest endpoint.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::ShapeMismatch`] | Query and reference dimensionality differ |
/// | [`DtwError::EmptySequence`] | Either sequence has no frames |
/// | [`DtwError::DistanceOverflow`] | A frame distance exceeds `f64::MAX` |
/// | [`DtwError::CostOverflow`] | An accumulated cost exceeds `f64::MAX` |
/// | [`DtwError::CorruptBackPointer`] | Internal fault during traceback |
/// | [`DtwError::BacktrackOverrun`] | Internal fault during traceback |
#[instrument(skip_all, fields(n_query = query.len(), n_reference = reference.len()))]
pub fn align(query: &FeatureSequence, reference: &FeatureSequence) -> Result<Alignment, DtwError> {
    let distances = euclidean_distances(query, reference)?;
    let accumulated = AccumulatedCost::compute(&distances, query.len(), reference.len())?;
    let alignment = accumulated.reconstruct()?;
    info!(
        cost = alignment.cost.value(),
        start = alignment.span.start,
        end = alignment.span.end,
        "subsequence aligned"
    );
    Ok(alignment)
}

impl AccumulatedCost {
    /// Reconstruct the optimal alignment path.
    ///
    /// Picks the lowest-index column with minimum cost in the final query row,
    /// then follows back-pointers until a cell in query row 0 is reached. The
    /// walk is capped at `n_query + n_reference` cells.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | The matrix has no rows or no columns |
    /// | [`DtwError::CorruptBackPointer`] | A back-pointer is not an up, diagonal, or left neighbour |
    /// | [`DtwError::BacktrackOverrun`] | Row 0 is not reached within the step cap |
    #[instrument(skip(self), fields(shape = ?self.shape()))]
    pub fn reconstruct(&self) -> Result<Alignment, DtwError> {
        let (n_query, n_reference) = self.shape();
        self.trace(n_query + n_reference)
    }

    /// Traceback with an explicit cap on the number of path cells.
    pub(crate) fn trace(&self, limit: usize) -> Result<Alignment, DtwError> {
        let (n_query, _) = self.shape();
        let Some((end_col, end_cost)) = self.best_end() else {
            let role = if n_query == 0 {
                SequenceRole::Query
            } else {
                SequenceRole::Reference
            };
            return Err(DtwError::EmptySequence { role });
        };

        let mut cell = Cell::new(n_query - 1, end_col);
        let mut cells = vec![cell];

        while cell.row > 0 {
            let prev = self.predecessor(cell);
            if Move::between(prev, cell).is_none() {
                return Err(DtwError::CorruptBackPointer {
                    row: cell.row,
                    col: cell.col,
                });
            }
            cells.push(prev);
            cell = prev;
            if cells.len() > limit {
                warn!(limit, "backtracking did not reach the first query frame");
                return Err(DtwError::BacktrackOverrun { limit });
            }
        }

        cells.reverse();
        let span = ReferenceSpan {
            start: cells[0].col,
            end: end_col,
        };
        debug!(path_len = cells.len(), %span, cost = end_cost, "alignment reconstructed");

        Ok(Alignment {
            path: AlignmentPath::new(cells),
            cost: AlignmentCost::new(end_cost),
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CostMatrix;

    fn accumulate(rows: usize, cols: usize, data: Vec<f64>) -> AccumulatedCost {
        let d = CostMatrix::from_vec(rows, cols, data).unwrap();
        AccumulatedCost::compute(&d, rows, cols).unwrap()
    }

    #[test]
    fn hand_computed_path() {
        // d:
        // 1 0 2
        // 2 1 0
        // 0 3 1
        let acc = accumulate(3, 3, vec![1.0, 0.0, 2.0, 2.0, 1.0, 0.0, 0.0, 3.0, 1.0]);
        let alignment = acc.reconstruct().unwrap();
        assert_eq!(
            alignment.path.cells(),
            &[Cell::new(0, 1), Cell::new(1, 2), Cell::new(2, 2)]
        );
        assert_eq!(alignment.cost.value(), 1.0);
        assert_eq!(alignment.span, ReferenceSpan { start: 1, end: 2 });
        assert!((alignment.normalized_cost() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_query_frame_picks_best_column() {
        let acc = accumulate(1, 4, vec![3.0, 1.0, 0.5, 0.5]);
        let alignment = acc.reconstruct().unwrap();
        assert_eq!(alignment.path.cells(), &[Cell::new(0, 2)]);
        assert_eq!(alignment.span, ReferenceSpan { start: 2, end: 2 });
    }

    #[test]
    fn single_reference_frame_walks_straight_down() {
        let acc = accumulate(3, 1, vec![1.0, 2.0, 3.0]);
        let alignment = acc.reconstruct().unwrap();
        assert_eq!(
            alignment.path.cells(),
            &[Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)]
        );
        assert_eq!(alignment.cost.value(), 6.0);
    }

    #[test]
    fn first_minimum_endpoint_wins() {
        let acc = accumulate(
            2,
            4,
            vec![
                0.0, 9.0, 9.0, 9.0, //
                9.0, 0.0, 0.0, 0.0,
            ],
        );
        // S row 1: 9, 0, 0, 0 → column 1
        let alignment = acc.reconstruct().unwrap();
        assert_eq!(alignment.path.cells(), &[Cell::new(0, 0), Cell::new(1, 1)]);
    }

    #[test]
    fn path_takes_right_moves_within_a_row() {
        let acc = accumulate(
            2,
            4,
            vec![
                0.0, 9.0, 9.0, 9.0, //
                9.0, 1.0, 1.0, 0.0,
            ],
        );
        // S row 1: 9, 1, 2, 2  → first minimum at column 1
        let alignment = acc.reconstruct().unwrap();
        assert_eq!(alignment.span, ReferenceSpan { start: 0, end: 1 });

        let acc = accumulate(
            3,
            3,
            vec![
                0.0, 9.0, 9.0, //
                0.0, 0.0, 0.0, //
                9.0, 9.0, 0.0,
            ],
        );
        // S row 1: 0, 0 (diag ties left → diag), 0 (left)
        // S row 2: 9, 9, 0 (up)
        let alignment = acc.reconstruct().unwrap();
        assert_eq!(
            alignment.path.cells(),
            &[Cell::new(0, 0), Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 2)]
        );
        let moves: Vec<_> = alignment.path.moves().map(Option::unwrap).collect();
        assert_eq!(moves, vec![Move::Diagonal, Move::Right, Move::Down]);
    }

    #[test]
    fn self_loop_is_reported_as_corrupt() {
        let mut acc = accumulate(2, 2, vec![0.0; 4]);
        acc.back_pointers_mut().set(Cell::new(1, 0), Cell::new(1, 0));
        acc.back_pointers_mut().set(Cell::new(1, 1), Cell::new(1, 0));
        let err = acc.reconstruct().unwrap_err();
        assert!(matches!(err, DtwError::CorruptBackPointer { row: 1, col: 0 }));
    }

    #[test]
    fn non_adjacent_pointer_is_reported_as_corrupt() {
        let mut acc = accumulate(3, 3, vec![0.0; 9]);
        // Final-row minimum is column 0; point it two rows up.
        acc.back_pointers_mut().set(Cell::new(2, 0), Cell::new(0, 0));
        let err = acc.reconstruct().unwrap_err();
        assert!(matches!(err, DtwError::CorruptBackPointer { row: 2, col: 0 }));
    }

    #[test]
    fn walk_longer_than_cap_is_reported_as_overrun() {
        // A legal walk never exceeds n_query + n_reference cells, so exercise
        // the guard with a tighter cap: this walk needs 3 cells.
        let acc = accumulate(3, 3, vec![0.0; 9]);
        assert_eq!(acc.trace(3).unwrap().path.len(), 3);
        let err = acc.trace(2).unwrap_err();
        assert!(matches!(err, DtwError::BacktrackOverrun { limit: 2 }));
    }

    #[test]
    fn align_finds_embedded_query() {
        let reference = FeatureSequence::from_frames(vec![
            vec![5.0, 5.0],
            vec![0.0, 1.0],
            vec![1.0, 2.0],
            vec![2.0, 3.0],
            vec![-4.0, 8.0],
        ])
        .unwrap();
        let query = reference.slice(1..4);
        let alignment = align(&query, &reference).unwrap();
        assert_eq!(alignment.span, ReferenceSpan { start: 1, end: 3 });
        assert_eq!(alignment.cost.value(), 0.0);
        assert_eq!(
            alignment.path.cells(),
            &[Cell::new(0, 1), Cell::new(1, 2), Cell::new(2, 3)]
        );
    }

    #[test]
    fn align_propagates_shape_mismatch() {
        let q = FeatureSequence::from_frames(vec![vec![1.0]]).unwrap();
        let r = FeatureSequence::from_frames(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(align(&q, &r), Err(DtwError::ShapeMismatch { .. })));
    }

    #[test]
    fn align_scores_distant_huge_frames() {
        let q = FeatureSequence::from_frames(vec![vec![1e200]]).unwrap();
        let r = FeatureSequence::from_frames(vec![vec![5e199]]).unwrap();
        let alignment = align(&q, &r).unwrap();
        assert!((alignment.cost.value() / 5e199 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_matrix_has_no_alignment() {
        let d = CostMatrix::from_vec(2, 0, vec![]).unwrap();
        let acc = AccumulatedCost::compute(&d, 2, 0).unwrap();
        assert!(matches!(
            acc.reconstruct(),
            Err(DtwError::EmptySequence { role: SequenceRole::Reference })
        ));
    }
}
