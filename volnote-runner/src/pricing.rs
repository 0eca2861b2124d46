//! Pricing engine: simulate basket paths, run the vol-target overlay,
//! discount the terminal call payoff, aggregate.
//!
//! Two entry points:
//! - `run_pricing()`: prices one market scenario, optionally on a caller-supplied
//!   random field. Used by the greeks engine.
//! - `price_note()`: the validated boundary. Applies the run parameters to the
//!   market, validates, prices, and optionally computes greeks.
//!
//! Paths are simulated in parallel on the rayon pool. Per-path summaries are
//! collected in path order and reduced sequentially, so the aggregate is
//! bit-identical for any number of threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use volnote_core::domain::{
    GreekRow, MarketModel, PriceConfig, PricingResult, RunDiagnostics, TradeModel,
};
use volnote_core::{
    compute_horizon, validate_strategy, validate_trade_market, AssetDynamics, BasketSimulator, RandomField,
    StrategyEvolver, ValidationError,
};

use crate::cancel::CancelToken;
use crate::greeks::compute_greeks;

/// Errors from a pricing run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("at least one path is required")]
    NoPaths,
    #[error("run cancelled")]
    Cancelled,
}

/// Caller-controlled run parameters.
///
/// `rho` and `rate` replace the correlation and zero rate of the market
/// snapshot for this run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub paths: usize,
    pub seed: u64,
    pub rho: f64,
    pub rate: f64,
}

impl RunParams {
    /// Copy of `market` carrying this run's correlation and rate.
    pub fn scenario_market(&self, market: &MarketModel) -> MarketModel {
        market.with_rho(self.rho).with_zero_rate(self.rate)
    }
}

/// Premium and diagnostics of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub result: PricingResult,
    pub diagnostics: RunDiagnostics,
}

/// Output of `price_note()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteValuation {
    pub result: PricingResult,
    pub diagnostics: RunDiagnostics,
    pub greeks: Option<Vec<GreekRow>>,
}

/// Per-path contribution to the aggregates.
#[derive(Debug, Clone, Copy)]
struct PathSummary {
    pv: f64,
    exposure_sum: f64,
    exposure_min: f64,
    exposure_max: f64,
    sigma_sum: f64,
}

/// Validated boundary: apply run parameters, check inputs, price, and
/// optionally compute greeks on a shared random field.
pub fn price_note(
    trade: &TradeModel,
    market: &MarketModel,
    params: &RunParams,
    min_names: usize,
    with_greeks: bool,
    cancel: &CancelToken,
) -> Result<NoteValuation, PricingError> {
    let market = params.scenario_market(market);
    validate_trade_market(trade, &market, min_names)?;
    if cancel.is_cancelled() {
        return Err(PricingError::Cancelled);
    }

    info!(
        names = trade.basket_size(),
        paths = params.paths,
        seed = params.seed,
        rho = params.rho,
        rate = params.rate,
        greeks = with_greeks,
        "pricing note"
    );

    if with_greeks {
        let report = compute_greeks(trade, &market, params.paths, params.seed, true, cancel)?;
        Ok(NoteValuation {
            result: report.base.result,
            diagnostics: report.base.diagnostics,
            greeks: Some(report.rows),
        })
    } else {
        let base = run_pricing(trade, &market, params.paths, params.seed, None)?;
        Ok(NoteValuation {
            result: base.result,
            diagnostics: base.diagnostics,
            greeks: None,
        })
    }
}

/// Price one market scenario.
///
/// Correlation and rate are read from `market`. When `field` is `None` a field
/// is drawn from `seed` with the capped grid dimensions; a supplied field must
/// already have exactly those dimensions.
///
/// Overlay parameters are checked here as well, so direct callers that skip
/// `price_note` get a validation error instead of a malformed window.
///
/// # Panics
/// If a supplied field's dimensions differ from the capped grid.
pub fn run_pricing(
    trade: &TradeModel,
    market: &MarketModel,
    paths: usize,
    seed: u64,
    field: Option<&RandomField>,
) -> Result<Valuation, PricingError> {
    if paths == 0 {
        return Err(PricingError::NoPaths);
    }
    validate_strategy(&trade.strategy)?;

    let assets = resolve_assets(trade, market)?;
    let horizon = compute_horizon(trade.initial_valuation_date, trade.valuation_date);
    if horizon.years <= 0.0 {
        return Err(ValidationError::EmptyHorizon {
            initial: trade.initial_valuation_date,
            valuation: trade.valuation_date,
        }
        .into());
    }
    let grid = horizon.grid(paths);

    let owned;
    let field = match field {
        Some(f) => {
            assert_eq!(
                f.dims(),
                (grid.paths, grid.steps, assets.len()),
                "random field dimensions do not match the capped simulation grid"
            );
            f
        }
        None => {
            owned = RandomField::generate(grid.paths, grid.steps, assets.len(), seed);
            &owned
        }
    };

    let rate = market.zero_rate();
    let rho = market.rho();
    let simulator = BasketSimulator::new(&trade.weights(), &assets, rate, rho, grid.steps, grid.dt);
    let evolver = StrategyEvolver::new(trade.strategy, trade.initial_strategy_value, rate, grid.dt);
    let discount = market.rates.discount_curve.discount_factor(horizon.years);

    let summaries: Vec<PathSummary> = (0..grid.paths)
        .into_par_iter()
        .map(|p| {
            let basket = simulator.simulate_path(field.path(p));
            let path = evolver.evolve(&basket);
            let payoff = (path.final_level() / trade.initial_strategy_value - trade.strike).max(0.0);
            PathSummary {
                pv: discount * payoff,
                exposure_sum: path.exposure.iter().sum(),
                exposure_min: path.exposure.iter().copied().fold(f64::INFINITY, f64::min),
                exposure_max: path.exposure.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                sigma_sum: path.sigma_hat.iter().sum(),
            }
        })
        .collect();

    let (premium_rate, stderr_rate) = mean_and_stderr(&summaries);
    let observations = (grid.paths * grid.steps) as f64;
    let diagnostics = RunDiagnostics {
        avg_exposure: summaries.iter().map(|s| s.exposure_sum).sum::<f64>() / observations,
        min_exposure: summaries.iter().map(|s| s.exposure_min).fold(f64::INFINITY, f64::min),
        max_exposure: summaries.iter().map(|s| s.exposure_max).fold(f64::NEG_INFINITY, f64::max),
        avg_sigma_hat: summaries.iter().map(|s| s.sigma_sum).sum::<f64>() / observations,
        effective_paths: grid.paths,
        effective_steps: grid.steps,
    };

    let config = PriceConfig {
        paths,
        effective_paths: grid.paths,
        seed,
        rho,
        rate,
        target_vol: trade.strategy.target_vol,
        lookback_bd: trade.strategy.lookback_bd,
        step_cap: trade.strategy.exposure_step_cap,
        steps: horizon.steps,
        effective_steps: grid.steps,
        t_years: horizon.years,
    };

    debug!(
        effective_paths = grid.paths,
        effective_steps = grid.steps,
        premium_rate,
        stderr_rate,
        "scenario priced"
    );

    Ok(Valuation {
        result: PricingResult::new(premium_rate, stderr_rate, config),
        diagnostics,
    })
}

/// Market inputs in basket order. Every basket ticker must be quoted.
fn resolve_assets(
    trade: &TradeModel,
    market: &MarketModel,
) -> Result<Vec<AssetDynamics>, ValidationError> {
    trade
        .basket
        .iter()
        .map(|w| {
            market
                .equity(&w.ticker)
                .map(|e| AssetDynamics {
                    spot: e.spot,
                    vol: e.atm_vol,
                    div_yield: e.div_yield,
                })
                .ok_or_else(|| ValidationError::MissingMarketData(w.ticker.clone()))
        })
        .collect()
}

/// Sample mean and standard error (Bessel-corrected) of the discounted payoffs.
fn mean_and_stderr(summaries: &[PathSummary]) -> (f64, f64) {
    let n = summaries.len() as f64;
    let mean = summaries.iter().map(|s| s.pv).sum::<f64>() / n;
    if summaries.len() < 2 {
        return (mean, 0.0);
    }
    let var = summaries
        .iter()
        .map(|s| (s.pv - mean) * (s.pv - mean))
        .sum::<f64>()
        / (n - 1.0);
    (mean, var.sqrt() / n.sqrt())
}
