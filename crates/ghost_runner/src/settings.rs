//! Detection config loading.
//!
//! Configs are RON files holding a [`DetectionConfig`]. Missing fields fall
//! back to the reference defaults:
//!
//! ```ron
//! (
//!     sample_every: 10,
//!     static_min_occurrences: 40,
//! )
//! ```

use std::path::Path;

use ghost_core::config::DetectionConfig;
use ron::ser::PrettyConfig;

use crate::error::RunnerError;

/// Load and validate a detection config from a RON file.
pub fn load_detection_config<P: AsRef<Path>>(path: P) -> Result<DetectionConfig, RunnerError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RunnerError::ConfigNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| RunnerError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    let config: DetectionConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective config: file (or defaults) then CLI overrides.
pub fn resolve_detection_config(
    path: Option<&Path>,
    sample_every: Option<u64>,
) -> Result<DetectionConfig, RunnerError> {
    let mut config = match path {
        Some(path) => load_detection_config(path)?,
        None => DetectionConfig::default(),
    };
    if let Some(n) = sample_every {
        config.sample_every = n;
    }
    config.validate()?;
    Ok(config)
}

/// The default config rendered as RON.
pub fn default_config_ron() -> Result<String, RunnerError> {
    Ok(ron::ser::to_string_pretty(
        &DetectionConfig::default(),
        PrettyConfig::default(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detection.ron");
        std::fs::write(&path, "(sample_every: 10, static_min_occurrences: 40)").unwrap();

        let config = load_detection_config(&path).unwrap();
        assert_eq!(config.sample_every, 10);
        assert_eq!(config.static_min_occurrences, 40);
        assert_eq!(config.follow_round_min_events, 200);
    }

    #[test]
    fn test_missing_config() {
        assert!(matches!(
            load_detection_config("/nonexistent/detection.ron"),
            Err(RunnerError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_config_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detection.ron");
        std::fs::write(&path, "(sample_every: 0)").unwrap();
        assert!(matches!(
            load_detection_config(&path),
            Err(RunnerError::Detection(_))
        ));
    }

    #[test]
    fn test_cli_override() {
        let config = resolve_detection_config(None, Some(10)).unwrap();
        assert_eq!(config.sample_every, 10);
        assert!(resolve_detection_config(None, Some(0)).is_err());
    }

    #[test]
    fn test_default_ron_parses_back() {
        let text = default_config_ron().unwrap();
        let parsed: DetectionConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, DetectionConfig::default());
    }
}
