//! Engine configuration: percentile ladder, pairable roster, role categories.
//!
//! Configuration is read from a TOML file. When no file is given the default
//! location under the user's config directory is tried, then the built-in
//! defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Percentiles excluded from gap matrices (the distribution's extremes).
const MATRIX_EXCLUDED: [u32; 2] = [0, 100];

/// Display category for the gap matrix, e.g. "Healers".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCategory {
    pub name: String,
    #[serde(default)]
    pub jobs: Vec<String>,
}

impl RoleCategory {
    fn new(name: &str, jobs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            jobs: jobs.iter().map(|j| j.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered percentile buckets present in the dataset.
    pub percentile_ladder: Vec<u32>,
    /// Jobs that may appear in composite "A+B" / "A (x2)" identifiers.
    pub pairable_jobs: Vec<String>,
    /// Gap-matrix categories in display order.
    #[serde(rename = "category")]
    pub role_categories: Vec<RoleCategory>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percentile_ladder: vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 95, 99, 100],
            pairable_jobs: ["White Mage", "Scholar", "Astrologian", "Sage"]
                .iter()
                .map(|j| j.to_string())
                .collect(),
            role_categories: vec![
                RoleCategory::new("Tanks", &["Paladin", "Warrior", "Dark Knight", "Gunbreaker"]),
                RoleCategory::new("Healers", &["White Mage", "Scholar", "Astrologian", "Sage"]),
                RoleCategory::new("Melee DPS", &["Monk", "Dragoon", "Ninja", "Samurai", "Reaper", "Viper"]),
                RoleCategory::new("Physical Ranged DPS", &["Bard", "Machinist", "Dancer"]),
                RoleCategory::new(
                    "Magical Ranged DPS",
                    &["Black Mage", "Summoner", "Red Mage", "Pictomancer"],
                ),
            ],
        }
    }
}

impl EngineConfig {
    /// Ladder used for gap matrices: the configured ladder without 0 and 100.
    pub fn matrix_ladder(&self) -> Vec<u32> {
        self.percentile_ladder
            .iter()
            .copied()
            .filter(|p| !MATRIX_EXCLUDED.contains(p))
            .collect()
    }

    /// Lowest configured percentile, the one snapshots hide by default.
    pub fn lowest_percentile(&self) -> Option<u32> {
        self.percentile_ladder.first().copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.percentile_ladder.is_empty() {
            return Err(ConfigError::Invalid("percentile_ladder is empty".into()));
        }
        if self.percentile_ladder.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(format!(
                "percentile_ladder must be strictly ascending: {:?}",
                self.percentile_ladder
            )));
        }
        if let Some(cat) = self.role_categories.iter().find(|c| c.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "category with jobs {:?} has an empty name",
                cat.jobs
            )));
        }
        Ok(())
    }
}

/// Load and validate a single TOML config file
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: EngineConfig = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

/// Save a config to a TOML file
pub fn save_config(path: &Path, config: &EngineConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write(path, contents).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Get the default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("jobstat").join("config.toml"))
}

/// Resolve configuration from an explicit path, the default path, or built-ins.
///
/// An explicit path must load. A broken file at the default location is
/// logged and ignored.
pub fn load_or_default(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    if let Some(path) = default_config_path().filter(|p| p.exists()) {
        match load_config(&path) {
            Ok(config) => return Ok(config),
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable default config"),
        }
    }

    Ok(EngineConfig::default())
}

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}
