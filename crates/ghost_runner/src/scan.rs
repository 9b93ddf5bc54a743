//! Recording discovery.

use std::path::{Path, PathBuf};

use ghost_core::decoder::DecoderRegistry;
use serde::{Deserialize, Serialize};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::RunnerError;

/// Files found under a scan root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPlan {
    /// Recordings with a registered decoder, in path order.
    pub units: Vec<PathBuf>,
    /// Files without a registered decoder.
    pub skipped: Vec<PathBuf>,
}

/// Walk `root` recursively and sort files into units of work and skips.
///
/// Unreadable directory entries are logged and ignored.
pub fn discover(root: &Path, registry: &DecoderRegistry) -> Result<ScanPlan, RunnerError> {
    if !root.exists() {
        return Err(RunnerError::ScanRootMissing(root.display().to_string()));
    }

    let mut plan = ScanPlan::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if registry.recognizes(&path) {
            plan.units.push(path);
        } else {
            plan.skipped.push(path);
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("week1/day2");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a.gwr"), b"").unwrap();
        std::fs::write(nested.join("b.gwj"), b"").unwrap();
        std::fs::write(nested.join("notes.txt"), b"").unwrap();

        let plan = discover(dir.path(), &DecoderRegistry::with_defaults()).unwrap();
        assert_eq!(
            plan.units,
            vec![dir.path().join("a.gwr"), nested.join("b.gwj")]
        );
        assert_eq!(plan.skipped, vec![nested.join("notes.txt")]);
    }

    #[test]
    fn test_missing_root() {
        let result = discover(Path::new("/nonexistent/demos"), &DecoderRegistry::with_defaults());
        assert!(matches!(result, Err(RunnerError::ScanRootMissing(_))));
    }
}
