use std::cmp::Ordering;
use std::fmt;

/// Sum of squared Euclidean distances from each frame to its codeword.
///
/// Lower distortion indicates a tighter codebook.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distortion(f64);

impl Distortion {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw distortion value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return the distortion averaged over `n_frames`.
    #[must_use]
    pub fn per_frame(self, n_frames: usize) -> f64 {
        if n_frames == 0 {
            return 0.0;
        }
        self.0 / n_frames as f64
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Distortion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::Distortion;

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Distortion::new(1.5)), "1.500000");
    }

    #[test]
    fn total_cmp_ordering() {
        let a = Distortion::new(1.0);
        let b = Distortion::new(2.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(a.total_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn per_frame_average() {
        assert_eq!(Distortion::new(6.0).per_frame(4), 1.5);
        assert_eq!(Distortion::new(6.0).per_frame(0), 0.0);
    }
}
