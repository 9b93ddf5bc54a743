//! Spectator camera anomaly scanner.
//!
//! # Usage
//!
//! ```bash
//! # Batch scan a directory tree
//! ghostwatch scan demos --output output.txt --jobs 8
//!
//! # Analyze a single recording
//! ghostwatch analyze demos/scrim.gwj --sample-every 10
//!
//! # Print the default detection config
//! ghostwatch config > detection.ron
//! ```
//!
//! Reports go to the results file (scan) or stdout (analyze). Logs go to
//! stderr and honor `RUST_LOG`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ghost_core::decoder::DecoderRegistry;
use ghost_runner::{
    analyze_file, default_config_ron, resolve_detection_config, run_batch, AppendFileSink,
    BatchConfig, RunnerError,
};

#[derive(Parser)]
#[command(name = "ghostwatch")]
#[command(about = "Detects suspicious spectator camera behavior in match recordings")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every recording under a directory
    Scan {
        /// Directory to scan recursively
        #[arg(default_value = "demos")]
        dir: PathBuf,

        /// Results file, appended to
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        /// Detection config (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        jobs: usize,

        /// Classify only every Nth tick
        #[arg(long)]
        sample_every: Option<u64>,

        /// Write a JSON summary of the run
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Analyze a single recording and print its report
    Analyze {
        /// Recording to analyze
        file: PathBuf,

        /// Detection config (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Classify only every Nth tick
        #[arg(long)]
        sample_every: Option<u64>,
    },

    /// Print the default detection config
    Config,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Scan {
            dir,
            output,
            config,
            jobs,
            sample_every,
            summary,
        } => cmd_scan(dir, output, config, jobs, sample_every, summary),
        Commands::Analyze {
            file,
            config,
            sample_every,
        } => cmd_analyze(file, config, sample_every),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn cmd_scan(
    dir: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    jobs: usize,
    sample_every: Option<u64>,
    summary: Option<PathBuf>,
) -> Result<(), RunnerError> {
    let detection = resolve_detection_config(config.as_deref(), sample_every)?;
    let batch_config = BatchConfig::new(dir).with_jobs(jobs).with_detection(detection);
    let registry = DecoderRegistry::with_defaults();
    let sink = AppendFileSink::new(&output);

    let results = run_batch(batch_config, &registry, &sink)?;

    tracing::info!(
        "{} findings in {} of {} recordings, written to {}",
        results.total_findings(),
        results.flagged_files().count(),
        results.files.len(),
        output.display()
    );
    for failed in &results.errors {
        tracing::warn!("Not analyzed: {} ({})", failed.path.display(), failed.message);
    }

    if let Some(path) = summary {
        results.save(&path).map_err(|e| RunnerError::Summary {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::info!("Summary saved to {}", path.display());
    }
    Ok(())
}

fn cmd_analyze(
    file: PathBuf,
    config: Option<PathBuf>,
    sample_every: Option<u64>,
) -> Result<(), RunnerError> {
    let detection = resolve_detection_config(config.as_deref(), sample_every)?;
    let registry = DecoderRegistry::with_defaults();
    let result = analyze_file(&file, &registry, &detection)?;

    let stats = result.outcome.stats;
    tracing::debug!(
        "{} ticks seen, {} sampled, {} rounds, {} decode errors",
        stats.ticks_seen,
        stats.ticks_sampled,
        stats.rounds,
        stats.decode_errors
    );
    print!("{}", result.outcome.report.render());
    Ok(())
}

fn cmd_config() -> Result<(), RunnerError> {
    println!("{}", default_config_ron()?);
    Ok(())
}
