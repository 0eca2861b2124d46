//! File-to-file workflows behind the CLI commands.
//!
//! - `build_trade_file` / `build_market_file`: CSV in, JSON out
//! - `price_files`: trade + market JSON in, pricing artifacts and manifest out
//! - `run_all`: both builders, the pricing request, then `price_files`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use volnote_core::domain::{MarketModel, TradeModel};
use volnote_core::ValidationError;

use crate::builders::{build_market, build_trade, TradeDates};
use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::data_loader::{read_basket_csv, read_json, read_market_csv, write_json, IoError};
use crate::export::{
    write_pricing_outputs, OutputPaths, DIAGNOSTICS_FILE, GREEKS_FILE, PRICING_RESULT_FILE,
};
use crate::manifest::{write_manifest, ManifestInputs, MANIFEST_FILE};
use crate::pricing::{price_note, NoteValuation, PricingError};

pub const TRADE_FILE: &str = "trade.json";
pub const MARKET_FILE: &str = "market.json";
pub const PRICING_REQUEST_FILE: &str = "pricing_request.json";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("refusing to overwrite existing files {existing:?} (pass --overwrite)")]
    WouldOverwrite { existing: Vec<String> },
}

/// What `run_all` asked the pricer to do, written as `pricing_request.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub trade: PathBuf,
    pub market: PathBuf,
    pub outdir: PathBuf,
    #[serde(flatten)]
    pub config: RunConfig,
}

/// Everything a pricing workflow produced.
#[derive(Debug, Clone)]
pub struct PricingReport {
    pub valuation: NoteValuation,
    pub outputs: OutputPaths,
    pub manifest: PathBuf,
}

/// Basket CSV → validated `trade.json`.
pub fn build_trade_file(
    basket_csv: &Path,
    out: &Path,
    dates: TradeDates,
    min_names: usize,
) -> Result<TradeModel, PipelineError> {
    let rows = read_basket_csv(basket_csv)?;
    let trade = build_trade(&rows, dates, min_names)?;
    write_json(out, &trade)?;
    info!(names = trade.basket_size(), out = %out.display(), "trade written");
    Ok(trade)
}

/// Market CSV → `market.json`.
pub fn build_market_file(
    market_csv: &Path,
    out: &Path,
    zero_rate: f64,
    rho: f64,
) -> Result<MarketModel, PipelineError> {
    let rows = read_market_csv(market_csv)?;
    let market = build_market(&rows, zero_rate, rho);
    write_json(out, &market)?;
    info!(equities = market.equities.len(), out = %out.display(), "market written");
    Ok(market)
}

/// Price a trade/market JSON pair and write artifacts plus manifest into `outdir`.
pub fn price_files(
    trade_json: &Path,
    market_json: &Path,
    outdir: &Path,
    config: &RunConfig,
    cancel: &CancelToken,
) -> Result<PricingReport, PipelineError> {
    let inputs = ManifestInputs {
        trade_json: Some(trade_json),
        market_json: Some(market_json),
        ..ManifestInputs::default()
    };
    price_with_inputs(&inputs, trade_json, market_json, outdir, config, cancel)
}

fn price_with_inputs(
    inputs: &ManifestInputs<'_>,
    trade_json: &Path,
    market_json: &Path,
    outdir: &Path,
    config: &RunConfig,
    cancel: &CancelToken,
) -> Result<PricingReport, PipelineError> {
    let trade: TradeModel = read_json(trade_json)?;
    let market: MarketModel = read_json(market_json)?;

    let valuation = price_note(
        &trade,
        &market,
        &config.run_params(),
        config.min_names,
        config.greeks,
        cancel,
    )?;

    let outputs = write_pricing_outputs(
        outdir,
        &valuation.result,
        &valuation.diagnostics,
        valuation.greeks.as_deref(),
    )?;
    let manifest = write_manifest(outdir, inputs, config, valuation.result.premium_rate)?;

    info!(
        premium_rate = valuation.result.premium_rate,
        stderr_rate = valuation.result.stderr_rate,
        effective_paths = valuation.diagnostics.effective_paths,
        effective_steps = valuation.diagnostics.effective_steps,
        outdir = %outdir.display(),
        "pricing complete"
    );

    Ok(PricingReport {
        valuation,
        outputs,
        manifest,
    })
}

/// Files `run_all` writes into its output directory.
pub fn run_all_outputs(greeks: bool) -> Vec<&'static str> {
    let mut files = vec![
        TRADE_FILE,
        MARKET_FILE,
        PRICING_REQUEST_FILE,
        PRICING_RESULT_FILE,
        DIAGNOSTICS_FILE,
        MANIFEST_FILE,
    ];
    if greeks {
        files.push(GREEKS_FILE);
    }
    files
}

/// Full workflow from the two input CSVs.
///
/// Without `overwrite`, fails before writing anything if any output file
/// already exists in `outdir`.
pub fn run_all(
    basket_csv: &Path,
    market_csv: &Path,
    outdir: &Path,
    config: &RunConfig,
    overwrite: bool,
    cancel: &CancelToken,
) -> Result<PricingReport, PipelineError> {
    if !overwrite {
        let existing: Vec<String> = run_all_outputs(config.greeks)
            .into_iter()
            .filter(|f| outdir.join(f).exists())
            .map(str::to_string)
            .collect();
        if !existing.is_empty() {
            return Err(PipelineError::WouldOverwrite { existing });
        }
    }

    let trade_path = outdir.join(TRADE_FILE);
    let market_path = outdir.join(MARKET_FILE);
    let request_path = outdir.join(PRICING_REQUEST_FILE);

    build_trade_file(basket_csv, &trade_path, TradeDates::default(), config.min_names)?;
    build_market_file(market_csv, &market_path, config.sofr_flat, config.rho)?;

    let request = PricingRequest {
        trade: trade_path.clone(),
        market: market_path.clone(),
        outdir: outdir.to_path_buf(),
        config: config.clone(),
    };
    write_json(&request_path, &request)?;

    let inputs = ManifestInputs {
        basket_csv: Some(basket_csv),
        market_csv: Some(market_csv),
        trade_json: Some(&trade_path),
        market_json: Some(&market_path),
        pricing_request_json: Some(&request_path),
    };
    price_with_inputs(&inputs, &trade_path, &market_path, outdir, config, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeks_file_only_guarded_when_requested() {
        assert!(!run_all_outputs(false).contains(&GREEKS_FILE));
        assert!(run_all_outputs(true).contains(&GREEKS_FILE));
        assert_eq!(run_all_outputs(true).len(), 7);
    }

    #[test]
    fn request_flattens_config() {
        let request = PricingRequest {
            trade: "out/trade.json".into(),
            market: "out/market.json".into(),
            outdir: "out".into(),
            config: RunConfig::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["paths"], 10_000);
        assert_eq!(json["sofr_flat"], 0.0366);
        assert_eq!(json["trade"], "out/trade.json");

        let back: PricingRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
