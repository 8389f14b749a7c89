//! CSV feature-sequence reader with full input validation.

use std::path::{Path, PathBuf};

use subseq_dtw::FeatureSequence;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::FrameLayout;

/// Reads a feature sequence from a CSV file.
///
/// Expected CSV format:
/// - Header row required (column names are ignored)
/// - Every cell is a finite float, every row has as many columns as the header
/// - [`FrameLayout::FramePerRow`] (default): one row per frame
/// - [`FrameLayout::FramePerColumn`]: one row per coefficient, one column per frame
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`IoError::Sequence`] | Parsed values do not form a valid feature sequence |
pub struct FeatureReader {
    path: PathBuf,
    layout: FrameLayout,
}

impl FeatureReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            layout: FrameLayout::default(),
        }
    }

    /// Set the frame layout of the file.
    #[must_use]
    pub fn with_layout(mut self, layout: FrameLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Read and validate the CSV file, returning a [`FeatureSequence`].
    #[instrument(skip(self), fields(path = %self.path.display(), layout = %self.layout))]
    pub fn read(&self) -> Result<FeatureSequence, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets short or long rows through to the
        // InconsistentRowLength check below.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        let mut values = Vec::new();
        let mut n_rows = 0usize;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            for (col_index, raw) in record.iter().enumerate() {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    })?;
                values.push(value);
            }
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let sequence = match self.layout {
            FrameLayout::FramePerRow => FeatureSequence::new(values, expected_cols),
            FrameLayout::FramePerColumn => FeatureSequence::from_coefficient_major(values, n_rows),
        }
        .map_err(|e| IoError::Sequence {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            n_frames = sequence.len(),
            dim = sequence.dim(),
            "feature sequence loaded"
        );
        Ok(sequence)
    }
}
