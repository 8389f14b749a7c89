use std::fmt;

/// Index of a codeword in a trained codebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodewordIndex(usize);

impl CodewordIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based codeword index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CodewordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CodewordIndex;

    #[test]
    fn roundtrip() {
        assert_eq!(CodewordIndex::new(7).index(), 7);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", CodewordIndex::new(3)), "3");
    }
}
