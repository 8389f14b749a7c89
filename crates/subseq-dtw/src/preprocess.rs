//! Feature preprocessing: per-frame standardization.

use crate::error::PreprocessError;
use crate::sequence::FeatureSequence;

/// Standardize every frame to zero mean and unit variance across its values.
///
/// Uses population standard deviation (divides by `dim`, not `dim - 1`).
/// This puts frames of different loudness on a common scale before distances
/// are taken.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PreprocessError::ConstantFrame`] | A frame has zero variance |
#[must_use = "returns a new normalized sequence; the original is unchanged"]
pub fn normalize_frames(seq: &FeatureSequence) -> Result<FeatureSequence, PreprocessError> {
    let dim = seq.dim();
    let n = dim as f64;
    let mut out = Vec::with_capacity(seq.as_slice().len());

    for (frame_idx, frame) in seq.frames().enumerate() {
        let mut scale = 1.0;
        let (mut mean, mut std) = moments(frame, scale, n);
        if !(mean.is_finite() && std.is_finite()) {
            // Sums of values near f64::MAX overflow; standardize the frame
            // divided by its peak instead.
            scale = frame.iter().fold(0.0, |m, &x| f64::max(m, x.abs()));
            (mean, std) = moments(frame, scale, n);
        }
        if std == 0.0 {
            return Err(PreprocessError::ConstantFrame {
                frame: frame_idx,
                dim,
                value: frame[0],
            });
        }
        out.extend(frame.iter().map(|&x| (x / scale - mean) / std));
    }

    // Standardized finite values with std > 0 are finite, and the shape is unchanged.
    Ok(FeatureSequence::from_parts_unchecked(out, dim))
}

/// Population mean and standard deviation of `frame / scale`.
fn moments(frame: &[f64], scale: f64, n: f64) -> (f64, f64) {
    let mean = frame.iter().map(|&x| x / scale).sum::<f64>() / n;
    let variance = frame
        .iter()
        .map(|&x| (x / scale - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(frames: Vec<Vec<f64>>) -> FeatureSequence {
        FeatureSequence::from_frames(frames).unwrap()
    }

    #[test]
    fn frames_have_zero_mean() {
        let s = seq(vec![vec![1.0, 2.0, 3.0, 4.0], vec![-10.0, 0.0, 5.0, 100.0]]);
        let normalized = normalize_frames(&s).unwrap();
        for frame in normalized.frames() {
            let mean = frame.iter().sum::<f64>() / frame.len() as f64;
            assert!(mean.abs() < 1e-10, "mean was {mean}");
        }
    }

    #[test]
    fn frames_have_unit_variance() {
        let s = seq(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![0.5, 0.25, 8.0, -3.0, 1.0]]);
        let normalized = normalize_frames(&s).unwrap();
        for frame in normalized.frames() {
            let n = frame.len() as f64;
            let mean = frame.iter().sum::<f64>() / n;
            let variance = frame.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
            assert!((variance - 1.0).abs() < 1e-10, "variance was {variance}");
        }
    }

    #[test]
    fn preserves_shape() {
        let s = seq(vec![vec![1.0, 3.0], vec![2.0, 8.0], vec![0.0, -1.0]]);
        let normalized = normalize_frames(&s).unwrap();
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized.dim(), 2);
        // Two-value frames standardize to (-1, 1) or (1, -1).
        assert_eq!(normalized.frame(0), &[-1.0, 1.0]);
        assert_eq!(normalized.frame(2), &[1.0, -1.0]);
    }

    #[test]
    fn constant_frame_error() {
        let s = seq(vec![vec![1.0, 2.0], vec![7.0, 7.0]]);
        let result = normalize_frames(&s);
        assert!(
            matches!(
                result,
                Err(PreprocessError::ConstantFrame { frame: 1, dim: 2, value: 7.0 })
            ),
            "expected ConstantFrame error, got {result:?}"
        );
    }

    #[test]
    fn frames_near_f64_max_normalize() {
        let s = seq(vec![vec![1e308, 1e308, -1e308], vec![-1.5e308, 0.0, 1.5e308]]);
        let normalized = normalize_frames(&s).unwrap();
        assert!(normalized.as_slice().iter().all(|v| v.is_finite()));

        let small = normalize_frames(&seq(vec![vec![1.0, 1.0, -1.0], vec![-1.0, 0.0, 1.0]])).unwrap();
        for (x, y) in normalized.as_slice().iter().zip(small.as_slice()) {
            assert!((x - y).abs() < 1e-12, "{x} vs {y}");
        }
    }

    #[test]
    fn scale_invariant() {
        let a = seq(vec![vec![1.0, 2.0, 4.0]]);
        let b = seq(vec![vec![10.0, 20.0, 40.0]]);
        let na = normalize_frames(&a).unwrap();
        let nb = normalize_frames(&b).unwrap();
        for (x, y) in na.as_slice().iter().zip(nb.as_slice()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
