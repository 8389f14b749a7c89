use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use subseq_dtw::synth::{SineWave, gaussian_sequence};
use subseq_dtw::{AccumulatedCost, FeatureSequence, euclidean_distances, normalize_frames};
use subseq_io::{ExperimentName, FeatureReader, FrameLayout, ResultWriter};
use subseq_vq::CodebookConfig;

#[derive(Parser)]
#[command(name = "subseq")]
#[command(about = "Subsequence DTW alignment and vector quantization of feature sequences")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the best-matching span of a query inside a reference
    Align {
        /// Path to the query feature CSV
        #[arg(long)]
        query: PathBuf,

        /// Path to the reference feature CSV
        #[arg(long)]
        reference: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Z-normalize every frame of both sequences before aligning
        #[arg(long, default_value_t = false)]
        normalize: bool,

        /// Frame layout of both inputs: "frame-per-row" or "frame-per-column"
        #[arg(long, default_value = "frame-per-row")]
        layout: String,

        /// Also write the accumulated-cost matrix as CSV
        #[arg(long, default_value_t = false)]
        dump_cost: bool,
    },

    /// Generate a synthetic feature sequence
    Synth {
        /// Signal kind: "sine" or "gaussian"
        #[arg(long, default_value = "sine")]
        kind: String,

        /// Number of frames to generate
        #[arg(long, default_value_t = 100)]
        frames: usize,

        /// Coefficients per frame
        #[arg(long, default_value_t = 1)]
        dims: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Standard deviation of the Gaussian noise added to the sine
        #[arg(long, default_value_t = 0.0)]
        perturbation: f64,

        /// Sine frequency in cycles over the sampled interval
        #[arg(long, default_value_t = 50.0)]
        frequency: f64,
    },

    /// Train an LBG codebook over the frames of a feature CSV
    Quantize {
        /// Path to the input feature CSV
        #[arg(long)]
        data: PathBuf,

        /// Number of codewords
        #[arg(long)]
        codewords: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Maximum assign/update iterations per splitting stage
        #[arg(long, default_value_t = 100)]
        max_iter: usize,

        /// Fraction of unchanged assignments that ends a stage
        #[arg(long, default_value_t = 0.95)]
        stability: f64,

        /// Frame layout of the input: "frame-per-row" or "frame-per-column"
        #[arg(long, default_value = "frame-per-row")]
        layout: String,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AlignOutput {
    experiment: String,
    query_frames: usize,
    reference_frames: usize,
    dim: usize,
    span_start: usize,
    span_end: usize,
    cost: f64,
    normalized_cost: f64,
    path_length: usize,
}

#[derive(Serialize)]
struct SynthOutput {
    experiment: String,
    kind: String,
    frames: usize,
    dims: usize,
    seed: u64,
}

#[derive(Serialize)]
struct QuantizeOutput {
    experiment: String,
    n_frames: usize,
    n_codewords: usize,
    distortion: f64,
    distortion_per_frame: f64,
    converged: bool,
    iterations: usize,
    cell_sizes: Vec<usize>,
}

fn parse_layout(s: &str) -> Result<FrameLayout> {
    match s {
        "frame-per-row" => Ok(FrameLayout::FramePerRow),
        "frame-per-column" => Ok(FrameLayout::FramePerColumn),
        other => anyhow::bail!(
            "unknown layout: {other} (expected frame-per-row or frame-per-column)"
        ),
    }
}

fn read_features(path: &Path, layout: FrameLayout, what: &str) -> Result<FeatureSequence> {
    let sequence = FeatureReader::new(path)
        .with_layout(layout)
        .read()
        .with_context(|| format!("failed to read {what} CSV"))?;
    info!(what, n_frames = sequence.len(), dim = sequence.dim(), "features loaded");
    Ok(sequence)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Align {
            query,
            reference,
            experiment,
            output_dir,
            normalize,
            layout,
            dump_cost,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let layout = parse_layout(&layout)?;

            // 1. Read both sequences
            let mut query = read_features(&query, layout, "query")?;
            let mut reference = read_features(&reference, layout, "reference")?;

            // 2. Optional per-frame normalization
            if normalize {
                query = normalize_frames(&query).context("failed to normalize query")?;
                reference =
                    normalize_frames(&reference).context("failed to normalize reference")?;
                info!("z-normalized both sequences");
            }

            // 3. Align
            let distances =
                euclidean_distances(&query, &reference).context("distance computation failed")?;
            let accumulated = AccumulatedCost::compute(&distances, query.len(), reference.len())
                .context("cost accumulation failed")?;
            let alignment = accumulated
                .reconstruct()
                .context("path reconstruction failed")?;

            // 4. Write artifacts
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_alignment(query.len(), reference.len(), &alignment)?;
            if dump_cost {
                writer.write_cost_matrix(accumulated.cost())?;
            }

            // 5. Print summary
            let output = AlignOutput {
                experiment,
                query_frames: query.len(),
                reference_frames: reference.len(),
                dim: query.dim(),
                span_start: alignment.span.start,
                span_end: alignment.span.end,
                cost: alignment.cost.value(),
                normalized_cost: alignment.normalized_cost(),
                path_length: alignment.path.len(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Synth {
            kind,
            frames,
            dims,
            experiment,
            output_dir,
            perturbation,
            frequency,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            let sequence = match kind.as_str() {
                "sine" => SineWave::new()
                    .with_samples(frames)
                    .with_dims(dims)
                    .with_frequency(frequency)
                    .with_perturbation(perturbation)
                    .generate(cli.seed),
                "gaussian" => gaussian_sequence(frames, dims, cli.seed),
                other => anyhow::bail!("unknown signal kind: {other} (expected sine or gaussian)"),
            }
            .context("signal generation failed")?;
            info!(n_frames = sequence.len(), dim = sequence.dim(), "signal generated");

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_features(&sequence)?;

            let output = SynthOutput {
                experiment,
                kind,
                frames: sequence.len(),
                dims: sequence.dim(),
                seed: cli.seed,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Quantize {
            data,
            codewords,
            experiment,
            output_dir,
            max_iter,
            stability,
            layout,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let layout = parse_layout(&layout)?;

            let frames = read_features(&data, layout, "data")?;

            let config = CodebookConfig::new(codewords)?
                .with_max_iter(max_iter)
                .with_stability(stability)
                .with_seed(cli.seed);
            let codebook = config.train(&frames).context("codebook training failed")?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_codebook(&codebook)?;

            let output = QuantizeOutput {
                experiment,
                n_frames: frames.len(),
                n_codewords: codebook.len(),
                distortion: codebook.distortion.value(),
                distortion_per_frame: codebook.distortion.per_frame(frames.len()),
                converged: codebook.converged,
                iterations: codebook.iterations,
                cell_sizes: codebook.cell_sizes(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
