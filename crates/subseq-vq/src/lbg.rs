//! LBG codebook training: k-means stages separated by codeword splits.
//!
//! Training starts from a single codeword at the global mean. Each stage runs
//! the assign/update loop until the share of frames that keep their codeword
//! exceeds the stability threshold, then every codeword (or, on the last
//! stage, the worst ones) is split in two until the target size is reached.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use subseq_dtw::{FeatureSequence, euclidean_distances};

use crate::config::CodebookConfig;
use crate::distortion::Distortion;
use crate::error::VqError;
use crate::label::CodewordIndex;
use crate::result::Codebook;

/// Standard deviation of the noise added to the global mean when an empty
/// cell is re-seeded.
const RESEED_NOISE: f64 = 1e-2;

// ── assign ────────────────────────────────────────────────────────────────────

/// Nearest codeword index and distance for every frame.
///
/// Ties go to the lower codeword index.
pub(crate) fn assign(
    frames: &FeatureSequence,
    codewords: &FeatureSequence,
) -> Result<Vec<(usize, f64)>, VqError> {
    let d = euclidean_distances(frames, codewords)?;
    let nearest = (0..d.rows())
        .into_par_iter()
        .map(|i| d.argmin_row(i).unwrap_or((0, 0.0)))
        .collect();
    Ok(nearest)
}

// ── update ────────────────────────────────────────────────────────────────────

/// Recompute each codeword as the mean of its cell. An empty cell is
/// re-seeded at `global_mean` plus small Gaussian noise.
pub(crate) fn update(
    frames: &FeatureSequence,
    labels: &[usize],
    k: usize,
    global_mean: &[f64],
    rng: &mut ChaCha8Rng,
) -> Vec<f64> {
    let dim = frames.dim();
    let mut sums = vec![0.0; k * dim];
    let mut counts = vec![0usize; k];
    for (frame, &label) in frames.frames().zip(labels) {
        counts[label] += 1;
        for (s, &v) in sums[label * dim..(label + 1) * dim].iter_mut().zip(frame) {
            *s += v;
        }
    }

    for (c, &count) in counts.iter().enumerate() {
        let cell = &mut sums[c * dim..(c + 1) * dim];
        if count == 0 {
            for (s, &mu) in cell.iter_mut().zip(global_mean) {
                let z: f64 = rng.sample(StandardNormal);
                *s = mu + RESEED_NOISE * z;
            }
            debug!(codeword = c, "re-seeded empty cell");
        } else {
            let n = count as f64;
            for s in cell.iter_mut() {
                *s /= n;
            }
        }
    }
    sums
}

// ── split ─────────────────────────────────────────────────────────────────────

/// Split codewords in place and return the new codebook size.
///
/// Codeword `c` becomes `c - ε` at its own index and `c + ε` appended at the
/// end. When doubling would overshoot `target`, only the `target - k`
/// codewords with the highest cell distortion are split (ties favour the
/// lower index).
pub(crate) fn split(
    codewords: &mut Vec<f64>,
    dim: usize,
    target: usize,
    cell_distortion: &[f64],
    epsilon: f64,
) -> usize {
    let k = codewords.len() / dim;
    let n_split = k.min(target.saturating_sub(k));

    let mut chosen: Vec<usize> = (0..k).collect();
    if n_split < k {
        chosen.sort_by(|&a, &b| cell_distortion[b].total_cmp(&cell_distortion[a]));
        chosen.truncate(n_split);
        chosen.sort_unstable();
    }

    for &c in &chosen {
        let plus: Vec<f64> = codewords[c * dim..(c + 1) * dim]
            .iter()
            .map(|v| v + epsilon)
            .collect();
        for v in &mut codewords[c * dim..(c + 1) * dim] {
            *v -= epsilon;
        }
        codewords.extend(plus);
    }
    k + chosen.len()
}

// ── stage ─────────────────────────────────────────────────────────────────────

/// Run the assign/update loop for a fixed codebook size.
///
/// `labels` carries the previous assignment in and the last assignment out.
/// Returns the iteration count and whether the stability threshold was met.
fn run_stage(
    frames: &FeatureSequence,
    codewords: &mut Vec<f64>,
    labels: &mut [usize],
    global_mean: &[f64],
    config: &CodebookConfig,
    rng: &mut ChaCha8Rng,
) -> Result<(usize, bool), VqError> {
    let dim = frames.dim();
    let k = codewords.len() / dim;
    let n = frames.len() as f64;

    for iteration in 1..=config.max_iter {
        let book = FeatureSequence::new(codewords.clone(), dim)?;
        let nearest = assign(frames, &book)?;

        let mut unchanged = 0usize;
        for (label, &(new, _)) in labels.iter_mut().zip(&nearest) {
            if *label == new {
                unchanged += 1;
            }
            *label = new;
        }
        *codewords = update(frames, labels, k, global_mean, rng);

        let stable_share = unchanged as f64 / n;
        debug!(k, iteration, stable_share, "iteration complete");
        if stable_share > config.stability {
            return Ok((iteration, true));
        }
    }
    Ok((config.max_iter, false))
}

// ── train ─────────────────────────────────────────────────────────────────────

/// Train a codebook of `config.n_codewords` codewords over `frames`.
///
/// The caller has already checked that there are at least as many frames as
/// codewords.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`VqError::Dtw`] | A codeword update produced a non-finite value |
#[instrument(skip(frames, config), fields(n_frames = frames.len(), dim = frames.dim(), n_codewords = config.n_codewords))]
pub(crate) fn train(frames: &FeatureSequence, config: &CodebookConfig) -> Result<Codebook, VqError> {
    let dim = frames.dim();
    let n = frames.len();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut global_mean = vec![0.0; dim];
    for frame in frames.frames() {
        for (m, &v) in global_mean.iter_mut().zip(frame) {
            *m += v;
        }
    }
    for m in &mut global_mean {
        *m /= n as f64;
    }

    let mut codewords = global_mean.clone();
    let mut labels = vec![0usize; n];
    let mut iterations = 0usize;
    let mut converged = true;

    loop {
        let k = codewords.len() / dim;
        let (stage_iterations, stable) = run_stage(
            frames,
            &mut codewords,
            &mut labels,
            &global_mean,
            config,
            &mut rng,
        )?;
        iterations += stage_iterations;
        converged &= stable;
        info!(k, iterations = stage_iterations, stable, "stage complete");

        if k >= config.n_codewords {
            break;
        }

        let book = FeatureSequence::new(codewords.clone(), dim)?;
        let mut cell_distortion = vec![0.0; k];
        for (c, dist) in assign(frames, &book)? {
            cell_distortion[c] += dist * dist;
        }
        let new_k = split(
            &mut codewords,
            dim,
            config.n_codewords,
            &cell_distortion,
            config.split_epsilon,
        );
        debug!(from = k, to = new_k, "codebook split");
    }

    let codewords = FeatureSequence::new(codewords, dim)?;
    let nearest = assign(frames, &codewords)?;
    let distortion: f64 = nearest.iter().map(|&(_, d)| d * d).sum();
    let assignments = nearest
        .into_iter()
        .map(|(c, _)| CodewordIndex::new(c))
        .collect();

    info!(
        n_codewords = codewords.len(),
        iterations,
        distortion,
        converged,
        "codebook trained"
    );

    Ok(Codebook {
        codewords,
        assignments,
        distortion: Distortion::new(distortion),
        converged,
        iterations,
    })
}
