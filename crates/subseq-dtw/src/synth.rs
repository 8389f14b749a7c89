//! Seeded synthetic feature sequences for tests, benches, and the CLI.
//!
//! All generators use [`ChaCha8Rng`] so that a seed reproduces the same
//! sequence on every platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::debug;

use crate::error::DtwError;
use crate::sequence::FeatureSequence;

/// Builder for a sampled sine wave with optional Gaussian perturbation.
///
/// | Parameter | Default |
/// |---|---|
/// | `n_samples` | 100 |
/// | `frequency_hz` | 50.0 |
/// | `perturbation` | 0.0 |
/// | `dims` | 1 |
///
/// Samples lie on `linspace(0, 1, n_samples)`. Every dimension carries the
/// same sine value plus independent noise drawn from `N(0, perturbation²)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SineWave {
    n_samples: usize,
    frequency_hz: f64,
    perturbation: f64,
    dims: usize,
}

impl Default for SineWave {
    fn default() -> Self {
        Self {
            n_samples: 100,
            frequency_hz: 50.0,
            perturbation: 0.0,
            dims: 1,
        }
    }
}

impl SineWave {
    /// Create a builder with the defaults listed above.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of frames.
    #[must_use]
    pub fn with_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Set the sine frequency in cycles per unit time.
    #[must_use]
    pub fn with_frequency(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Set the noise standard deviation. The sign is ignored.
    #[must_use]
    pub fn with_perturbation(mut self, perturbation: f64) -> Self {
        self.perturbation = perturbation.abs();
        self
    }

    /// Set the number of values per frame.
    #[must_use]
    pub fn with_dims(mut self, dims: usize) -> Self {
        self.dims = dims;
        self
    }

    /// Sample the wave.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroDimension`] | `dims` is zero |
    /// | [`DtwError::NonFiniteValue`] | The frequency or perturbation is not finite |
    pub fn generate(&self, seed: u64) -> Result<FeatureSequence, DtwError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let step = if self.n_samples > 1 {
            1.0 / (self.n_samples - 1) as f64
        } else {
            0.0
        };

        let mut values = Vec::with_capacity(self.n_samples * self.dims);
        for i in 0..self.n_samples {
            let t = i as f64 * step;
            let base = (2.0 * std::f64::consts::PI * self.frequency_hz * t).sin();
            for _ in 0..self.dims {
                let noise: f64 = rng.sample(StandardNormal);
                values.push(base + self.perturbation * noise);
            }
        }

        debug!(
            n_samples = self.n_samples,
            dims = self.dims,
            frequency_hz = self.frequency_hz,
            perturbation = self.perturbation,
            "sine wave generated"
        );
        FeatureSequence::new(values, self.dims)
    }
}

/// Generate `n_frames` frames of i.i.d. standard normal values.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::ZeroDimension`] | `dim` is zero |
pub fn gaussian_sequence(n_frames: usize, dim: usize, seed: u64) -> Result<FeatureSequence, DtwError> {
    if dim == 0 {
        return Err(DtwError::ZeroDimension);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let values = (0..n_frames * dim)
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    FeatureSequence::new(values, dim)
}

/// Generate `n_per_cluster` unit-variance frames around each of `centers`.
///
/// Frames are grouped by cluster in the order of `centers`. Returns the
/// sequence together with the index of the generating center for each frame.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::ZeroDimension`] | `centers` is empty or the first center is empty |
/// | [`DtwError::RaggedFrames`] | A center's width differs from the first |
/// | [`DtwError::NonFiniteValue`] | A center holds NaN or infinity |
pub fn gaussian_mixture(
    n_per_cluster: usize,
    centers: &[Vec<f64>],
    seed: u64,
) -> Result<(FeatureSequence, Vec<usize>), DtwError> {
    let dim = centers.first().map_or(0, Vec::len);
    if dim == 0 {
        return Err(DtwError::ZeroDimension);
    }
    if let Some((frame, c)) = centers.iter().enumerate().find(|(_, c)| c.len() != dim) {
        return Err(DtwError::RaggedFrames {
            frame,
            expected: dim,
            got: c.len(),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut values = Vec::with_capacity(centers.len() * n_per_cluster * dim);
    let mut labels = Vec::with_capacity(centers.len() * n_per_cluster);
    for (label, center) in centers.iter().enumerate() {
        for _ in 0..n_per_cluster {
            for &mu in center {
                let z: f64 = rng.sample(StandardNormal);
                values.push(mu + z);
            }
            labels.push(label);
        }
    }

    let seq = FeatureSequence::new(values, dim)?;
    Ok((seq, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noiseless_sine_matches_formula() {
        let seq = SineWave::new().with_samples(11).with_frequency(1.0).generate(0).unwrap();
        assert_eq!(seq.len(), 11);
        assert_eq!(seq.dim(), 1);
        for (i, frame) in seq.frames().enumerate() {
            let t = i as f64 / 10.0;
            let want = (2.0 * std::f64::consts::PI * t).sin();
            assert!((frame[0] - want).abs() < 1e-12);
        }
    }

    #[test]
    fn sine_defaults() {
        let seq = SineWave::default().generate(7).unwrap();
        assert_eq!(seq.len(), 100);
        assert_eq!(seq.dim(), 1);
    }

    #[test]
    fn sine_dims_share_the_base_wave() {
        let seq = SineWave::new().with_dims(3).generate(1).unwrap();
        for frame in seq.frames() {
            assert_eq!(frame[0], frame[1]);
            assert_eq!(frame[1], frame[2]);
        }
    }

    #[test]
    fn perturbation_adds_noise_deterministically() {
        let wave = SineWave::new().with_dims(2).with_perturbation(0.1);
        let a = wave.generate(42).unwrap();
        let b = wave.generate(42).unwrap();
        let c = wave.generate(43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.frames().any(|f| f[0] != f[1]));
    }

    #[test]
    fn single_sample_sits_at_zero() {
        let seq = SineWave::new().with_samples(1).generate(0).unwrap();
        assert_eq!(seq.frame(0), &[0.0]);
    }

    #[test]
    fn zero_dims_rejected() {
        assert!(matches!(
            SineWave::new().with_dims(0).generate(0),
            Err(DtwError::ZeroDimension)
        ));
        assert!(matches!(gaussian_sequence(4, 0, 0), Err(DtwError::ZeroDimension)));
    }

    #[test]
    fn gaussian_sequence_shape_and_seed() {
        let a = gaussian_sequence(20, 5, 3).unwrap();
        assert_eq!(a.len(), 20);
        assert_eq!(a.dim(), 5);
        assert_eq!(a, gaussian_sequence(20, 5, 3).unwrap());
    }

    #[test]
    fn mixture_clusters_sit_near_centers() {
        let centers = vec![vec![-10.0, -10.0], vec![10.0, 10.0]];
        let (seq, labels) = gaussian_mixture(200, &centers, 9).unwrap();
        assert_eq!(seq.len(), 400);
        assert_eq!(labels.len(), 400);
        for (label, center) in centers.iter().enumerate() {
            let members: Vec<&[f64]> = seq
                .frames()
                .zip(&labels)
                .filter(|&(_, &l)| l == label)
                .map(|(f, _)| f)
                .collect();
            assert_eq!(members.len(), 200);
            for d in 0..2 {
                let mean = members.iter().map(|f| f[d]).sum::<f64>() / 200.0;
                assert!((mean - center[d]).abs() < 0.5, "mean {mean} far from {}", center[d]);
            }
        }
    }

    #[test]
    fn mixture_rejects_ragged_centers() {
        let centers = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(
            gaussian_mixture(3, &centers, 0),
            Err(DtwError::RaggedFrames { frame: 1, expected: 2, got: 1 })
        ));
    }
}
