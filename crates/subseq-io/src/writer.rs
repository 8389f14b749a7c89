//! JSON and CSV writers for alignment, cost-matrix, codebook, and feature outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use subseq_dtw::{Alignment, CostMatrix, FeatureSequence};
use subseq_vq::Codebook;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes a feature sequence as CSV, one frame per row.
///
/// The header row is `d0,d1,...` with one column per coefficient, so the
/// output reads back with the default [`FrameLayout`](crate::FrameLayout).
pub struct FeatureWriter {
    path: PathBuf,
}

impl FeatureWriter {
    /// Create a writer targeting `path`. Nothing is written until [`FeatureWriter::write`].
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write `sequence` to the target path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | The file cannot be created |
    /// | [`IoError::CsvWrite`] | A record cannot be written |
    #[instrument(skip_all, fields(path = %self.path.display(), n_frames = sequence.len()))]
    pub fn write(&self, sequence: &FeatureSequence) -> Result<(), IoError> {
        let header = (0..sequence.dim()).map(|d| format!("d{d}"));
        write_rows(&self.path, header, sequence.frames())?;
        debug!("feature sequence written");
        Ok(())
    }
}

/// Writes experiment artifacts into an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_alignment.json`,
/// `{experiment}_cost.csv`, `{experiment}_codebook.json`, and
/// `{experiment}_features.csv`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write an alignment to `{experiment}_alignment.json` and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be serialized |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_alignment(
        &self,
        query_frames: usize,
        reference_frames: usize,
        alignment: &Alignment,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("alignment.json");

        let artifact = AlignmentArtifact {
            experiment: self.experiment.as_str(),
            query_frames,
            reference_frames,
            cost: alignment.cost.value(),
            normalized_cost: alignment.normalized_cost(),
            span: SpanEntry {
                start: alignment.span.start,
                end: alignment.span.end,
            },
            path_length: alignment.path.len(),
            path: alignment.path.cells().iter().map(|c| [c.row, c.col]).collect(),
        };

        write_json(&path, &artifact)?;
        info!(path = %path.display(), "alignment written");
        Ok(path)
    }

    /// Write a cost matrix to `{experiment}_cost.csv`, one row per query
    /// frame, and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | The file cannot be created |
    /// | [`IoError::CsvWrite`] | A record cannot be written |
    #[instrument(skip_all, fields(shape = ?matrix.shape()))]
    pub fn write_cost_matrix(&self, matrix: &CostMatrix) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("cost.csv");
        let header = (0..matrix.cols()).map(|j| format!("r{j}"));
        write_rows(&path, header, matrix.iter_rows())?;
        info!(path = %path.display(), "cost matrix written");
        Ok(path)
    }

    /// Write a trained codebook to `{experiment}_codebook.json` and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be serialized |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_codebook(&self, codebook: &Codebook) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("codebook.json");

        let artifact = CodebookArtifact {
            experiment: self.experiment.as_str(),
            n_codewords: codebook.len(),
            dim: codebook.codewords.dim(),
            distortion: codebook.distortion.value(),
            converged: codebook.converged,
            iterations: codebook.iterations,
            codewords: codebook.codewords.frames().collect(),
            cell_sizes: codebook.cell_sizes(),
            assignments: codebook.assignments.iter().map(|c| c.index()).collect(),
        };

        write_json(&path, &artifact)?;
        info!(path = %path.display(), "codebook written");
        Ok(path)
    }

    /// Write a feature sequence to `{experiment}_features.csv` and return its path.
    ///
    /// # Errors
    ///
    /// Same as [`FeatureWriter::write`].
    pub fn write_features(&self, sequence: &FeatureSequence) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("features.csv");
        FeatureWriter::new(&path).write(sequence)?;
        info!(path = %path.display(), "features written");
        Ok(path)
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }
}

fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_rows<'a, H, R>(path: &Path, header: H, rows: R) -> Result<(), IoError>
where
    H: Iterator<Item = String>,
    R: Iterator<Item = &'a [f64]>,
{
    let csv_err = |e: csv::Error| IoError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = fs::File::create(path).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(header).map_err(csv_err)?;
    for row in rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct AlignmentArtifact<'a> {
    experiment: &'a str,
    query_frames: usize,
    reference_frames: usize,
    cost: f64,
    normalized_cost: f64,
    span: SpanEntry,
    path_length: usize,
    path: Vec<[usize; 2]>,
}

#[derive(Serialize)]
struct SpanEntry {
    start: usize,
    end: usize,
}

#[derive(Serialize)]
struct CodebookArtifact<'a> {
    experiment: &'a str,
    n_codewords: usize,
    dim: usize,
    distortion: f64,
    converged: bool,
    iterations: usize,
    codewords: Vec<&'a [f64]>,
    cell_sizes: Vec<usize>,
    assignments: Vec<usize>,
}
