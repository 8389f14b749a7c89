//! End-to-end alignment scenarios on synthetic feature sequences.

use subseq_dtw::synth::{SineWave, gaussian_sequence};
use subseq_dtw::{FeatureSequence, ReferenceSpan, align, normalize_frames};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Plain double-loop subsequence DTW cost, independent of the library's
/// distance builder and recurrence.
fn naive_subsequence_cost(query: &FeatureSequence, reference: &FeatureSequence) -> f64 {
    let (nq, nr) = (query.len(), reference.len());
    let dist = |i: usize, j: usize| -> f64 {
        query
            .frame(i)
            .iter()
            .zip(reference.frame(j))
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    };

    let mut s = vec![vec![0.0; nr]; nq];
    for j in 0..nr {
        s[0][j] = dist(0, j);
    }
    for i in 1..nq {
        s[i][0] = s[i - 1][0] + dist(i, 0);
        for j in 1..nr {
            s[i][j] = dist(i, j) + s[i - 1][j].min(s[i - 1][j - 1]).min(s[i][j - 1]);
        }
    }
    s[nq - 1].iter().copied().fold(f64::INFINITY, f64::min)
}

fn add(a: &FeatureSequence, b: &FeatureSequence, scale: f64) -> FeatureSequence {
    let values = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| x + scale * y)
        .collect();
    FeatureSequence::new(values, a.dim()).expect("finite sum")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn exact_subslice_is_recovered() {
    let reference = gaussian_sequence(30, 5, 11).unwrap();
    let query = reference.slice(5..15);

    let alignment = align(&query, &reference).unwrap();

    assert_eq!(alignment.span, ReferenceSpan { start: 5, end: 14 });
    assert_eq!(alignment.cost.value(), 0.0);
    assert_eq!(alignment.path.len(), 10);
    for (k, cell) in alignment.path.cells().iter().enumerate() {
        assert_eq!((cell.row, cell.col), (k, k + 5));
    }
    assert_eq!(alignment.normalized_cost(), 0.0);
}

#[test]
fn random_pair_matches_naive_dp() {
    let query = gaussian_sequence(10, 5, 1).unwrap();
    let reference = gaussian_sequence(20, 5, 2).unwrap();

    let alignment = align(&query, &reference).unwrap();

    let len = alignment.path.len();
    assert!((10..=29).contains(&len), "path length {len} out of range");
    let naive = naive_subsequence_cost(&query, &reference);
    assert!(
        (alignment.cost.value() - naive).abs() < 1e-9,
        "cost {} vs naive {naive}",
        alignment.cost.value()
    );
    assert!(alignment.span.start <= alignment.span.end);
    assert!(alignment.span.end < reference.len());
}

#[test]
fn noisy_subslice_is_located() {
    let reference = gaussian_sequence(40, 4, 21).unwrap();
    let noise = gaussian_sequence(10, 4, 22).unwrap();
    let query = add(&reference.slice(10..20), &noise, 0.01);

    let alignment = align(&query, &reference).unwrap();

    assert_eq!(alignment.span, ReferenceSpan { start: 10, end: 19 });
    assert!(alignment.normalized_cost() < 0.1);
}

#[test]
fn time_stretched_query_aligns_with_down_moves() {
    let reference = gaussian_sequence(25, 3, 5).unwrap();
    let frames: Vec<Vec<f64>> = (5..10)
        .flat_map(|j| {
            let f = reference.frame(j).to_vec();
            [f.clone(), f]
        })
        .collect();
    let query = FeatureSequence::from_frames(frames).unwrap();

    let alignment = align(&query, &reference).unwrap();

    assert_eq!(alignment.span, ReferenceSpan { start: 5, end: 9 });
    assert_eq!(alignment.cost.value(), 0.0);
    assert_eq!(alignment.path.len(), 10);
}

#[test]
fn query_equal_to_reference_spans_everything() {
    let reference = gaussian_sequence(12, 2, 8).unwrap();
    let alignment = align(&reference, &reference).unwrap();
    assert_eq!(alignment.span, ReferenceSpan { start: 0, end: 11 });
    assert_eq!(alignment.cost.value(), 0.0);
}

#[test]
fn normalization_removes_per_frame_gain() {
    let reference = gaussian_sequence(30, 6, 31).unwrap();
    let loud: Vec<f64> = reference.slice(8..16).as_slice().iter().map(|v| 3.0 * v + 1.5).collect();
    let query = FeatureSequence::new(loud, 6).unwrap();

    let raw = align(&query, &reference).unwrap();
    assert!(raw.cost.value() > 0.0);

    let nq = normalize_frames(&query).unwrap();
    let nr = normalize_frames(&reference).unwrap();
    let normalized = align(&nq, &nr).unwrap();
    assert_eq!(normalized.span, ReferenceSpan { start: 8, end: 15 });
    assert!(normalized.normalized_cost() < 1e-5);
}

#[test]
fn noisy_sine_reference_is_deterministic() {
    let reference = SineWave::new().with_dims(3).with_perturbation(0.05).generate(42).unwrap();
    let query = SineWave::new()
        .with_samples(20)
        .with_dims(3)
        .with_perturbation(0.05)
        .generate(7)
        .unwrap();

    let a = align(&query, &reference).unwrap();
    let b = align(&query, &reference).unwrap();
    assert_eq!(a, b);
    assert!(a.path.len() >= query.len());
}
