//! Configuration loading from freightq.toml.
//!
//! Every field is optional; anything omitted keeps the built-in default,
//! which reproduces the stock data layout and destination list. Relative
//! paths resolve against the directory holding the config.
//!
//! ## Example
//!
//! ```toml
//! freight-costs = "data/freight_costs.csv"
//! distances = "data/distances.csv"
//! historical-quotes = "output/historical_quotes.csv"
//! projected-quotes = "output/projected_quotes.csv"
//! target-destinations = [1501303, 3548500]
//! horizon = 26
//!
//! [trainer]
//! seed = 7
//! n-iter = 20
//! cv-folds = 5
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::quotes::DEFAULT_HORIZON_WEEKS;
use crate::training::TrainerConfig;

pub const CONFIG_FILE: &str = "freightq.toml";

/// Destinations quoted by default during expansion.
pub const DEFAULT_TARGET_DESTINATIONS: &[i64] = &[
    1501303, 1506807, 3205309, 3548500, 4118204, 4207304, 4216206, 4315602,
];

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    /// Freight-cost table (training input).
    pub freight_costs: PathBuf,

    /// Distance table (lane distances and the origin universe).
    pub distances: PathBuf,

    /// Where expanded quotes are written.
    pub historical_quotes: PathBuf,

    /// Where projected quotes are written.
    pub projected_quotes: PathBuf,

    pub target_destinations: Vec<i64>,

    /// Projection horizon in weeks.
    pub horizon: usize,

    pub trainer: TrainerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            freight_costs: PathBuf::from("data/freight_costs.csv"),
            distances: PathBuf::from("data/distances.csv"),
            historical_quotes: PathBuf::from("output/historical_quotes.csv"),
            projected_quotes: PathBuf::from("output/projected_quotes.csv"),
            target_destinations: DEFAULT_TARGET_DESTINATIONS.to_vec(),
            horizon: DEFAULT_HORIZON_WEEKS,
            trainer: TrainerConfig::default(),
        }
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    freight_costs: Option<PathBuf>,
    distances: Option<PathBuf>,
    historical_quotes: Option<PathBuf>,
    projected_quotes: Option<PathBuf>,
    target_destinations: Option<Vec<i64>>,
    horizon: Option<usize>,
    trainer: Option<TrainerConfig>,
}

impl Config {
    /// Load configuration for a working directory.
    ///
    /// Search order:
    /// 1. freightq.toml in directory
    /// 2. Default config if not found
    ///
    /// Either way, relative paths are resolved against `directory`.
    pub fn load(directory: &Path) -> Result<Self> {
        let candidate = directory.join(CONFIG_FILE);
        if candidate.is_file() {
            return Self::from_file(&candidate);
        }
        Ok(Self::default().rooted(directory))
    }

    /// Load an explicit config file. Unlike [`Config::load`], a missing file
    /// is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_raw(raw, path.to_path_buf());
        config.trainer.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.rooted(base))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        let defaults = Self::default();
        Self {
            source: Some(source),
            freight_costs: raw.freight_costs.unwrap_or(defaults.freight_costs),
            distances: raw.distances.unwrap_or(defaults.distances),
            historical_quotes: raw.historical_quotes.unwrap_or(defaults.historical_quotes),
            projected_quotes: raw.projected_quotes.unwrap_or(defaults.projected_quotes),
            target_destinations: raw
                .target_destinations
                .unwrap_or(defaults.target_destinations),
            horizon: raw.horizon.unwrap_or(defaults.horizon),
            trainer: raw.trainer.unwrap_or(defaults.trainer),
        }
    }

    /// Resolve relative data paths against `base`.
    pub fn rooted(mut self, base: &Path) -> Self {
        for path in [
            &mut self.freight_costs,
            &mut self.distances,
            &mut self.historical_quotes,
            &mut self.projected_quotes,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref source) = self.source {
            lines.push(format!("   Config: {}", source.display()));
        } else {
            lines.push("   Config: (defaults)".to_string());
        }

        lines.push(format!("   Freight costs: {}", self.freight_costs.display()));
        lines.push(format!("   Distances: {}", self.distances.display()));
        lines.push(format!(
            "   Outputs: {}, {}",
            self.historical_quotes.display(),
            self.projected_quotes.display()
        ));

        let targets: Vec<String> = self
            .target_destinations
            .iter()
            .map(|d| d.to_string())
            .collect();
        if targets.len() <= 3 {
            lines.push(format!("   Targets: {}", targets.join(", ")));
        } else {
            lines.push(format!(
                "   Targets: {}, ... (+{} more)",
                targets[..2].join(", "),
                targets.len() - 2
            ));
        }

        lines.push(format!(
            "   Horizon: {} weeks, seed {}, {} candidates × {} folds",
            self.horizon, self.trainer.seed, self.trainer.n_iter, self.trainer.cv_folds
        ));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_match_stock_layout() {
        let config = Config::default();
        assert_eq!(config.freight_costs, PathBuf::from("data/freight_costs.csv"));
        assert_eq!(config.target_destinations.len(), 8);
        assert_eq!(config.horizon, 52);
        assert_eq!(config.trainer.seed, 42);
    }

    #[test]
    fn test_load_without_file_roots_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.source.is_none());
        assert_eq!(config.distances, dir.path().join("data/distances.csv"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
target-destinations = [10, 20]
horizon = 4

[trainer]
seed = 7
n-iter = 3
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(config.target_destinations, vec![10, 20]);
        assert_eq!(config.horizon, 4);
        assert_eq!(config.trainer.seed, 7);
        assert_eq!(config.trainer.n_iter, 3);
        assert_eq!(config.trainer.cv_folds, 3);
        assert_eq!(
            config.freight_costs,
            dir.path().join("data/freight_costs.csv")
        );
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("elsewhere.csv");
        let config = Config {
            distances: absolute.clone(),
            ..Config::default()
        }
        .rooted(Path::new("/somewhere/else"));
        assert_eq!(config.distances, absolute);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "horizon = \"soon\"").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "freight-cost = \"typo.csv\"").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_trainer_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[trainer]\ncv-folds = 1\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_display_summary() {
        let summary = Config::default().display_summary();
        assert!(summary.contains("(defaults)"));
        assert!(summary.contains("+6 more"));
    }
}
