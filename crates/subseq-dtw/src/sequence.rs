//! Feature sequence types with validation guarantees.

use std::ops::{Index, Range};

use crate::error::DtwError;

/// Owned, validated sequence of `D`-dimensional feature frames.
///
/// Frames are stored row-major in a single flat buffer: frame `i` occupies
/// `values[i * dim..(i + 1) * dim]`. Every value is finite and `dim >= 1`.
/// A sequence may hold zero frames; alignment rejects such inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSequence {
    values: Vec<f64>,
    dim: usize,
}

impl FeatureSequence {
    /// Create a sequence from a row-major flat buffer of `len * dim` values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroDimension`] | `dim` is zero |
    /// | [`DtwError::RaggedFrames`] | `values.len()` is not a multiple of `dim` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>, dim: usize) -> Result<Self, DtwError> {
        if dim == 0 {
            return Err(DtwError::ZeroDimension);
        }
        let remainder = values.len() % dim;
        if remainder != 0 {
            return Err(DtwError::RaggedFrames {
                frame: values.len() / dim,
                expected: dim,
                got: remainder,
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue {
                frame: index / dim,
                dim: index % dim,
            });
        }
        Ok(Self { values, dim })
    }

    /// Create a sequence from one vector per frame. The dimensionality is
    /// taken from the first frame.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroDimension`] | `frames` is empty or the first frame is empty |
    /// | [`DtwError::RaggedFrames`] | A frame's width differs from the first |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_frames(frames: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let dim = frames.first().map_or(0, Vec::len);
        if dim == 0 {
            return Err(DtwError::ZeroDimension);
        }
        if let Some((frame, f)) = frames.iter().enumerate().find(|(_, f)| f.len() != dim) {
            return Err(DtwError::RaggedFrames {
                frame,
                expected: dim,
                got: f.len(),
            });
        }
        Self::new(frames.into_iter().flatten().collect(), dim)
    }

    /// Create a sequence from a coefficient-major buffer: `dim` rows of
    /// `values.len() / dim` samples each, where column `t` is frame `t`.
    ///
    /// This is the layout MFCC extractors commonly emit (coefficients × frames).
    ///
    /// # Errors
    ///
    /// Same as [`FeatureSequence::new`].
    pub fn from_coefficient_major(values: Vec<f64>, dim: usize) -> Result<Self, DtwError> {
        let source = Self::new(values, dim)?;
        let n_frames = source.values.len() / dim;
        let mut frames = vec![0.0; source.values.len()];
        for (d, row) in source.values.chunks_exact(n_frames.max(1)).enumerate() {
            for (t, &v) in row.iter().enumerate() {
                frames[t * dim + d] = v;
            }
        }
        Ok(Self { values: frames, dim })
    }

    /// Wrap a buffer the caller already knows to be valid.
    pub(crate) fn from_parts_unchecked(values: Vec<f64>, dim: usize) -> Self {
        debug_assert!(dim > 0 && values.len() % dim == 0);
        debug_assert!(values.iter().all(|v| v.is_finite()));
        Self { values, dim }
    }

    /// Return the number of frames (the sequence's time length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return true if the sequence has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the number of values per frame.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return frame `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn frame(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate over frames in time order.
    pub fn frames(&self) -> std::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.dim)
    }

    /// Return the row-major flat buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Copy frames `range` into a new sequence of the same dimensionality.
    ///
    /// # Panics
    ///
    /// Panics if `range.end > len()` or `range.start > range.end`.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "frame range {range:?} out of bounds for sequence of length {}",
            self.len()
        );
        Self {
            values: self.values[range.start * self.dim..range.end * self.dim].to_vec(),
            dim: self.dim,
        }
    }
}

impl Index<usize> for FeatureSequence {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        self.frame(index)
    }
}
