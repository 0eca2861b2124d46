//! Serializable run configuration.
//!
//! Every field has a default, so a TOML file only needs the values it
//! overrides. CLI flags are applied on top of whatever the file provides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::RunParams;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters of one pricing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Requested Monte Carlo paths (capped at simulation time).
    pub paths: usize,
    pub seed: u64,
    /// Constant pairwise correlation between basket names.
    pub rho: f64,
    /// Flat continuously-compounded SOFR zero rate.
    pub sofr_flat: f64,
    /// Notional in millions, recorded in the request and manifest.
    pub v_millions: f64,
    pub greeks: bool,
    pub min_names: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            paths: 10_000,
            seed: 42,
            rho: 0.8,
            sofr_flat: 0.0366,
            v_millions: 400.0,
            greeks: true,
            min_names: 50,
        }
    }
}

impl RunConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths == 0 {
            return Err(ConfigError::Invalid("paths must be at least 1".into()));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(ConfigError::Invalid(format!(
                "rho must be in [-1, 1] (got {})",
                self.rho
            )));
        }
        if !self.sofr_flat.is_finite() {
            return Err(ConfigError::Invalid("sofr_flat must be finite".into()));
        }
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs share a run id.
    pub fn run_id(&self) -> RunId {
        // Fields are plain numbers and bools, so serialization cannot fail;
        // the Debug form is a stable fallback all the same.
        let canonical = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }

    pub fn run_params(&self) -> RunParams {
        RunParams {
            paths: self.paths,
            seed: self.seed,
            rho: self.rho,
            rate: self.sofr_flat,
        }
    }
}
