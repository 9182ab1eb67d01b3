use crate::error::{Result, ScoutError};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the project-management API. `/search` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a query settles.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum fuzzy distance (0.0 = identical only, 1.0 = anything).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Queries shorter than this (in characters) never reach the API.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Expected match position within a key.
    #[serde(default)]
    pub location: usize,
    /// Characters of drift from `location` that cost a full 1.0 of distance.
    #[serde(default = "default_distance")]
    pub distance: usize,
    #[serde(default)]
    pub ignore_location: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            threshold: default_threshold(),
            min_query_len: default_min_query_len(),
            location: 0,
            distance: default_distance(),
            ignore_location: false,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Upper bound for the debounce quiet period.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

// -- Defaults --

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_threshold() -> f64 {
    0.3
}
fn default_min_query_len() -> usize {
    2
}
fn default_distance() -> usize {
    100
}

impl ScoutConfig {
    /// Load configuration with three-layer TOML merge:
    /// 1. ~/.config/scout/config.toml (global)
    /// 2. .scout/config.toml (project)
    /// 3. .scout/config.local.toml (local, gitignored)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Layer 1: Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        // Layer 2: Project config
        if let Some(dir) = project_dir {
            let project_config = dir.join(".scout").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            // Layer 3: Local config (gitignored)
            let local_config = dir.join(".scout").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Load with defaults only (no files).
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchConfig::default(),
        }
    }

    /// Render the resolved configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Validate config values, clamping out-of-range values and logging warnings.
    /// Lenient: values are fixed rather than the config rejected.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.api.base_url.trim().is_empty() {
            warnings.push(format!(
                "api.base_url is empty, using {}",
                default_base_url()
            ));
            self.api.base_url = default_base_url();
        }
        let trimmed = self.api.base_url.trim_end_matches('/');
        if trimmed.len() != self.api.base_url.len() {
            self.api.base_url = trimmed.to_string();
        }

        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs = 0, setting to 1".to_string());
            self.api.timeout_secs = 1;
        }
        if self.api.connect_timeout_secs == 0 {
            warnings.push("api.connect_timeout_secs = 0, setting to 1".to_string());
            self.api.connect_timeout_secs = 1;
        }

        let threshold = self.search.threshold;
        if threshold.is_nan() {
            warnings.push(format!(
                "search.threshold is NaN, using {}",
                default_threshold()
            ));
            self.search.threshold = default_threshold();
        } else if !(0.0..=1.0).contains(&threshold) {
            warnings.push(format!(
                "search.threshold = {threshold} out of range [0.0, 1.0], clamping"
            ));
            self.search.threshold = threshold.clamp(0.0, 1.0);
        }

        if self.search.min_query_len == 0 {
            warnings.push("search.min_query_len = 0, setting to 1".to_string());
            self.search.min_query_len = 1;
        }

        if self.search.debounce_ms > MAX_DEBOUNCE_MS {
            warnings.push(format!(
                "search.debounce_ms = {} exceeds {MAX_DEBOUNCE_MS}, clamping",
                self.search.debounce_ms
            ));
            self.search.debounce_ms = MAX_DEBOUNCE_MS;
        }

        // Log warnings via tracing (if subscriber is set up)
        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("scout").join("config.toml"))
}
