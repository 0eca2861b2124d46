//! Run manifest: provenance record written next to the pricing artifacts.
//!
//! Records when the run happened, BLAKE3 digests of every input file, the
//! engine version, the parameters and the headline premium.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, RunId};
use crate::data_loader::{write_json, IoError};

pub const MANIFEST_FILE: &str = "run_manifest.json";

/// Input files of a run. Any of them may be absent.
#[derive(Debug, Clone, Default)]
pub struct ManifestInputs<'a> {
    pub basket_csv: Option<&'a Path>,
    pub market_csv: Option<&'a Path>,
    pub trade_json: Option<&'a Path>,
    pub market_json: Option<&'a Path>,
    pub pricing_request_json: Option<&'a Path>,
}

/// Hex digests of the inputs; `None` when the file was not supplied or does
/// not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDigests {
    pub basket_csv: Option<String>,
    pub market_csv: Option<String>,
    pub trade_json: Option<String>,
    pub market_json: Option<String>,
    pub pricing_request_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub run_id: RunId,
    pub blake3: InputDigests,
    pub package_versions: BTreeMap<String, String>,
    pub parameters: RunConfig,
    pub summary: String,
}

/// BLAKE3 hex digest of a file, `None` if it does not exist.
pub fn hash_file(path: &Path) -> Result<Option<String>, IoError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(blake3::hash(&bytes).to_hex().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(IoError::Fs {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn digest(path: Option<&Path>) -> Result<Option<String>, IoError> {
    match path {
        Some(p) => hash_file(p),
        None => Ok(None),
    }
}

impl RunManifest {
    pub fn new(
        inputs: &ManifestInputs<'_>,
        config: &RunConfig,
        premium_rate: f64,
    ) -> Result<Self, IoError> {
        let blake3 = InputDigests {
            basket_csv: digest(inputs.basket_csv)?,
            market_csv: digest(inputs.market_csv)?,
            trade_json: digest(inputs.trade_json)?,
            market_json: digest(inputs.market_json)?,
            pricing_request_json: digest(inputs.pricing_request_json)?,
        };

        let mut package_versions = BTreeMap::new();
        package_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );

        Ok(Self {
            timestamp: Utc::now().to_rfc3339(),
            run_id: config.run_id(),
            blake3,
            package_versions,
            parameters: config.clone(),
            summary: format!("premium_rate={premium_rate}"),
        })
    }
}

/// Build the manifest and write it to `outdir/run_manifest.json`.
pub fn write_manifest(
    outdir: &Path,
    inputs: &ManifestInputs<'_>,
    config: &RunConfig,
    premium_rate: f64,
) -> Result<PathBuf, IoError> {
    let manifest = RunManifest::new(inputs, config, premium_rate)?;
    let path = outdir.join(MANIFEST_FILE);
    write_json(&path, &manifest)?;
    Ok(path)
}
