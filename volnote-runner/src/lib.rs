//! volnote runner: pricing orchestration, greeks, I/O and run artifacts.
//!
//! This crate builds on `volnote-core` to provide:
//! - Pricing engine (parallel paths, ordered reduction, diagnostics)
//! - Greeks engine (bump-and-reprice on common random numbers)
//! - Run configuration with TOML loading and content-hashed run ids
//! - Basket/market CSV loading and trade/market builders
//! - Pricing artifacts and the run manifest
//! - File-to-file pipelines behind the CLI commands

pub mod builders;
pub mod cancel;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod greeks;
pub mod manifest;
pub mod pipeline;
pub mod pricing;

pub use builders::{build_market, build_trade, TradeDates};
pub use cancel::CancelToken;
pub use config::{ConfigError, RunConfig, RunId};
pub use data_loader::{
    normalize_rate_col, read_basket_csv, read_json, read_market_csv, write_csv, write_json,
    BasketRow, IoError, MarketRow,
};
pub use export::{write_pricing_outputs, OutputPaths};
pub use greeks::{compute_greeks, GreeksReport};
pub use manifest::{hash_file, write_manifest, InputDigests, ManifestInputs, RunManifest};
pub use pipeline::{
    build_market_file, build_trade_file, price_files, run_all, PipelineError, PricingReport,
    PricingRequest,
};
pub use pricing::{price_note, run_pricing, NoteValuation, PricingError, RunParams, Valuation};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn cancel_token_is_send_sync() {
        assert_send::<CancelToken>();
        assert_sync::<CancelToken>();
    }

    #[test]
    fn results_are_send_sync() {
        assert_send::<Valuation>();
        assert_sync::<Valuation>();
        assert_send::<NoteValuation>();
        assert_sync::<NoteValuation>();
        assert_send::<GreeksReport>();
        assert_sync::<GreeksReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<RunParams>();
        assert_sync::<RunParams>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<PricingError>();
        assert_sync::<PricingError>();
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }
}
