//! Batch scanner for spectator camera recordings.
//!
//! Walks a directory of recordings, analyzes each one on a rayon worker
//! and appends every file's report block to a single results file.
//!
//! # Example
//!
//! ```bash
//! # Scan everything under demos/ into output.txt
//! cargo run -p ghost_runner -- scan demos --output output.txt
//!
//! # Sample every 10th tick with a custom config and a JSON summary
//! cargo run -p ghost_runner -- scan demos --config detection.ron \
//!     --sample-every 10 --summary results/summary.json
//!
//! # Analyze one recording, report on stdout
//! cargo run -p ghost_runner -- analyze demos/scrim.gwr
//! ```

pub mod batch;
pub mod error;
pub mod scan;
pub mod settings;
pub mod sink;

pub use batch::{analyze_file, run_batch, BatchConfig, BatchResults, FileError, FileResult};
pub use error::RunnerError;
pub use scan::{discover, ScanPlan};
pub use settings::{default_config_ron, load_detection_config, resolve_detection_config};
pub use sink::{AppendFileSink, MemorySink, ResultsSink};
