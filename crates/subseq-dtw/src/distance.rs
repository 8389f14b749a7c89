//! Pairwise Euclidean distances between query and reference frames.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::{DtwError, SequenceRole};
use crate::matrix::CostMatrix;
use crate::sequence::FeatureSequence;

/// Compute `d[i][j] = ||query[i] - reference[j]||₂` for every frame pair.
///
/// Uses the expansion `||a - b||² = ||a||² + ||b||² - 2·a·b` with the frame
/// norms computed once per sequence. Squared distances that fall below zero
/// through floating-point cancellation are clamped to zero before the square
/// root. When the expansion overflows (frames with magnitudes near `1e154`
/// or beyond), the cell is recomputed directly from the rescaled difference.
/// Output rows are filled in parallel; each row is independent, so the
/// result is identical to a sequential sweep.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::ShapeMismatch`] | Query and reference dimensionality differ |
/// | [`DtwError::EmptySequence`] | Either sequence has no frames |
/// | [`DtwError::DistanceOverflow`] | A frame distance exceeds `f64::MAX` |
#[instrument(skip_all, fields(n_query = query.len(), n_reference = reference.len(), dim = query.dim()))]
pub fn euclidean_distances(
    query: &FeatureSequence,
    reference: &FeatureSequence,
) -> Result<CostMatrix, DtwError> {
    if query.dim() != reference.dim() {
        return Err(DtwError::ShapeMismatch {
            query_dim: query.dim(),
            reference_dim: reference.dim(),
        });
    }
    if query.is_empty() {
        return Err(DtwError::EmptySequence {
            role: SequenceRole::Query,
        });
    }
    if reference.is_empty() {
        return Err(DtwError::EmptySequence {
            role: SequenceRole::Reference,
        });
    }

    let n_query = query.len();
    let n_reference = reference.len();

    let query_norms = squared_norms(query);
    let reference_norms = squared_norms(reference);

    let mut data = vec![0.0; n_query * n_reference];
    data.par_chunks_mut(n_reference)
        .enumerate()
        .try_for_each(|(i, out_row)| {
            let q = query.frame(i);
            let q_norm = query_norms[i];
            for (j, ((out, r), &r_norm)) in out_row
                .iter_mut()
                .zip(reference.frames())
                .zip(&reference_norms)
                .enumerate()
            {
                let sq = q_norm + r_norm - 2.0 * dot(q, r);
                let dist = if sq.is_finite() {
                    sq.max(0.0).sqrt()
                } else {
                    scaled_distance(q, r)
                };
                if !dist.is_finite() {
                    return Err(DtwError::DistanceOverflow { row: i, col: j });
                }
                *out = dist;
            }
            Ok(())
        })?;

    debug!("distance matrix built");
    Ok(CostMatrix::from_raw(n_query, n_reference, data))
}

/// Squared Euclidean norm of every frame.
fn squared_norms(seq: &FeatureSequence) -> Vec<f64> {
    seq.frames().map(|f| dot(f, f)).collect()
}

/// Direct distance with every difference divided by the largest one, so the
/// squares cannot overflow. Infinite if a single difference already is.
fn scaled_distance(a: &[f64], b: &[f64]) -> f64 {
    let scale = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| ((x - y) / scale).powi(2))
        .sum();
    scale * sum.sqrt()
}

/// Dot product shared by the norm and cross terms, so that identical frames
/// cancel to exactly zero.
#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
