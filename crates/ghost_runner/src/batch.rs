//! Batch recording analysis.
//!
//! Scans a directory tree and analyzes every recognized recording in
//! parallel using rayon. Each worker owns its analyzer state; the only
//! shared resource is the results sink.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use ghost_core::analysis::{analyze_stream, AnalysisOutcome};
use ghost_core::config::DetectionConfig;
use ghost_core::decoder::DecoderRegistry;
use ghost_core::error::GhostError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RunnerError;
use crate::scan::discover;
use crate::sink::ResultsSink;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory tree to scan
    pub root: PathBuf,
    /// Worker threads (0 = use rayon default)
    pub jobs: usize,
    /// Detection thresholds and cadence
    pub detection: DetectionConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("demos"),
            jobs: 0,
            detection: DetectionConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for a scan root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set worker count
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set detection config
    pub fn with_detection(mut self, detection: DetectionConfig) -> Self {
        self.detection = detection;
        self
    }
}

/// One analyzed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Recording path
    pub path: PathBuf,
    /// Size on disk
    pub size_bytes: u64,
    /// Findings and counters
    pub outcome: AnalysisOutcome,
}

/// A recording that could not be analyzed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileError {
    /// Recording path
    pub path: PathBuf,
    /// Error message
    pub message: String,
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Analyzed recordings, in scan order
    pub files: Vec<FileResult>,
    /// Files without a registered decoder
    pub skipped: Vec<PathBuf>,
    /// Recordings that failed to open
    pub errors: Vec<FileError>,
    /// Total runtime
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Total findings across all files
    pub fn total_findings(&self) -> usize {
        self.files
            .iter()
            .map(|f| f.outcome.report.finding_count())
            .sum()
    }

    /// Files with at least one finding
    pub fn flagged_files(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| !f.outcome.report.is_clean())
    }

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total recordings
    pub total: u32,
    completed: AtomicU32,
    flagged: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            flagged: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished recording
    pub fn record_completion(&self, flagged: bool) -> u32 {
        if flagged {
            self.flagged.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Recordings with findings so far
    pub fn flagged(&self) -> u32 {
        self.flagged.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        self.current() as f64 / self.total.max(1) as f64 * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_file = elapsed.as_secs_f64() / completed as f64;
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_file * remaining as f64)
    }
}

/// Analyze a single recording.
///
/// The decoder is dropped, and the file closed, before this returns.
pub fn analyze_file(
    path: &Path,
    registry: &DecoderRegistry,
    detection: &DetectionConfig,
) -> Result<FileResult, GhostError> {
    let size_bytes = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            debug!("Could not stat {}: {}", path.display(), e);
            0
        }
    };
    info!("Analyzing file: {} ({} bytes)", path.display(), size_bytes);

    let mut decoder = registry.open(path)?;
    let outcome = analyze_stream(&mut decoder, path.display().to_string(), detection)?;
    drop(decoder);

    if let Some(reason) = &outcome.aborted {
        warn!("Stream for {} ended early: {}", path.display(), reason);
    }
    info!(
        "Finished file: {} ({} findings)",
        path.display(),
        outcome.report.finding_count()
    );

    Ok(FileResult {
        path: path.to_path_buf(),
        size_bytes,
        outcome,
    })
}

/// Run a batch over every recording under `config.root`.
///
/// Open failures are recorded per file and the batch continues. A sink
/// failure stops the run.
pub fn run_batch(
    config: BatchConfig,
    registry: &DecoderRegistry,
    sink: &dyn ResultsSink,
) -> Result<BatchResults, RunnerError> {
    config.detection.validate()?;
    let start = Instant::now();

    let plan = discover(&config.root, registry)?;
    for path in &plan.skipped {
        info!("Ignoring file: {}", path.display());
    }

    info!(
        "Starting batch run: {} recordings under {}",
        plan.units.len(),
        config.root.display()
    );

    let progress = BatchProgress::new(u32::try_from(plan.units.len()).unwrap_or(u32::MAX));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| RunnerError::WorkerPool(e.to_string()))?;

    let results: Vec<Result<FileResult, FileError>> = pool.install(|| {
        plan.units
            .par_iter()
            .map(|path| -> Result<Result<FileResult, FileError>, RunnerError> {
                match analyze_file(path, registry, &config.detection) {
                    Ok(result) => {
                        sink.append(&result.outcome.report.render())?;
                        let completed =
                            progress.record_completion(!result.outcome.report.is_clean());
                        if completed % 10 == 0 {
                            debug!(
                                "Progress: {}/{} ({:.1}%, eta {}s)",
                                completed,
                                progress.total,
                                progress.percentage(),
                                progress.eta().as_secs()
                            );
                        }
                        Ok(Ok(result))
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        progress.record_completion(false);
                        Ok(Err(FileError {
                            path: path.clone(),
                            message: e.to_string(),
                        }))
                    }
                }
            })
            .collect::<Result<Vec<_>, RunnerError>>()
    })?;

    let (files, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let files: Vec<FileResult> = files.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<FileError> = errors.into_iter().filter_map(Result::err).collect();
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} analyzed, {} flagged, {} skipped, {} failed in {:.1}s",
        files.len(),
        progress.flagged(),
        plan.skipped.len(),
        errors.len(),
        duration_seconds
    );

    Ok(BatchResults {
        config,
        files,
        skipped: plan.skipped,
        errors,
        duration_seconds,
    })
}
