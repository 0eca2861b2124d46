//! Greeks engine: bump-and-reprice on common random numbers.
//!
//! One random field is drawn for the capped grid and shared read-only by the
//! base run and every bumped scenario, so finite differences measure the bump
//! and not sampling noise. Scenarios are independent market copies and are
//! priced in parallel.

use rayon::prelude::*;
use tracing::debug;

use volnote_core::domain::{GreekRow, MarketModel, TradeModel};
use volnote_core::policy::{DELTA_BUMP_REL, RHO_BUMP_ABS, VEGA_BUMP_ABS};
use volnote_core::{compute_horizon, scenario_seed, RandomField};

use crate::cancel::CancelToken;
use crate::pricing::{run_pricing, PricingError, Valuation};

/// Base valuation plus one row per sensitivity.
#[derive(Debug, Clone, PartialEq)]
pub struct GreeksReport {
    pub base: Valuation,
    /// `DELTA_<ticker>` in market-equity order, then `VEGA`, then `RHO`.
    pub rows: Vec<GreekRow>,
}

/// One bumped market and how to turn its premium into a greek.
struct Scenario {
    label: String,
    market: MarketModel,
    bump: f64,
}

impl Scenario {
    fn row(&self, bumped: f64, base: f64) -> GreekRow {
        let value = (bumped - base) / self.bump;
        GreekRow {
            name: self.label.clone(),
            value,
        }
    }
}

fn scenarios(market: &MarketModel) -> Vec<Scenario> {
    let mut out: Vec<Scenario> = market
        .equities
        .iter()
        .enumerate()
        .map(|(i, e)| Scenario {
            label: GreekRow::delta(&e.ticker, 0.0).name,
            market: market.with_spot_bumped(i, DELTA_BUMP_REL),
            bump: DELTA_BUMP_REL,
        })
        .collect();
    out.push(Scenario {
        label: GreekRow::vega(0.0).name,
        market: market.with_vols_shifted(VEGA_BUMP_ABS),
        bump: VEGA_BUMP_ABS,
    });
    out.push(Scenario {
        label: GreekRow::rho(0.0).name,
        market: market.with_zero_rate(market.zero_rate() + RHO_BUMP_ABS),
        bump: RHO_BUMP_ABS,
    });
    out
}

/// Base premium and finite-difference greeks.
///
/// With `use_crn` every scenario reuses the base field. Without it each
/// scenario draws its own field from a seed derived from `(seed, label)`, which
/// is independent of the order scenarios happen to run in.
///
/// The cancel token is checked before the base run and before each scenario.
pub fn compute_greeks(
    trade: &TradeModel,
    market: &MarketModel,
    paths: usize,
    seed: u64,
    use_crn: bool,
    cancel: &CancelToken,
) -> Result<GreeksReport, PricingError> {
    if paths == 0 {
        return Err(PricingError::NoPaths);
    }
    if cancel.is_cancelled() {
        return Err(PricingError::Cancelled);
    }

    let grid = compute_horizon(trade.initial_valuation_date, trade.valuation_date).grid(paths);
    let assets = trade.basket_size();
    let field = RandomField::generate(grid.paths, grid.steps, assets, seed);

    let base = run_pricing(trade, market, paths, seed, Some(&field))?;
    let base_premium = base.result.premium_rate;

    let rows = scenarios(market)
        .into_par_iter()
        .map(|scenario| {
            if cancel.is_cancelled() {
                return Err(PricingError::Cancelled);
            }
            let bumped = if use_crn {
                run_pricing(trade, &scenario.market, paths, seed, Some(&field))?
            } else {
                let own_seed = scenario_seed(seed, &scenario.label);
                run_pricing(trade, &scenario.market, paths, own_seed, None)?
            };
            let row = scenario.row(bumped.result.premium_rate, base_premium);
            debug!(greek = %row.name, value = row.value, "scenario repriced");
            Ok(row)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GreeksReport { base, rows })
}
