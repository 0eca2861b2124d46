//! Boundary checks on trade and market inputs.
//!
//! Every check here runs before any simulation starts. A failure is reported
//! to the caller and never retried.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::{MarketModel, StrategyParams, TradeModel, WeightItem};
use crate::policy::{LARGE_BASKET_MAX_WEIGHT, LARGE_BASKET_NAMES, WEIGHT_SUM_TOLERANCE};

/// Input rejected before pricing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("basket is empty")]
    EmptyBasket,
    #[error("trade weights must sum to 1 (got {sum})")]
    WeightSum { sum: f64 },
    #[error("weight {weight} of {ticker} exceeds the {cap} cap for baskets of {names} names")]
    WeightCap {
        ticker: String,
        weight: f64,
        cap: f64,
        names: usize,
    },
    #[error("basket holds {count} names, at least {min_names} required")]
    TooFewNames { count: usize, min_names: usize },
    #[error("missing market data for ticker {0}")]
    MissingMarketData(String),
    #[error("invalid spot/vol for {ticker}: spot={spot}, vol={vol}")]
    InvalidSpotOrVol { ticker: String, spot: f64, vol: f64 },
    #[error("invalid strategy parameters: {0}")]
    InvalidStrategy(String),
    #[error("valuation date {valuation} is not after initial valuation date {initial}")]
    EmptyHorizon {
        initial: chrono::NaiveDate,
        valuation: chrono::NaiveDate,
    },
}

/// Weight rules shared by the trade builder and the pricing boundary:
/// sum to 1, per-name cap on large baskets, minimum basket size.
pub fn validate_basket(basket: &[WeightItem], min_names: usize) -> Result<(), ValidationError> {
    if basket.is_empty() {
        return Err(ValidationError::EmptyBasket);
    }

    let sum: f64 = basket.iter().map(|w| w.weight).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ValidationError::WeightSum { sum });
    }

    if basket.len() >= LARGE_BASKET_NAMES {
        if let Some(w) = basket.iter().find(|w| w.weight > LARGE_BASKET_MAX_WEIGHT) {
            return Err(ValidationError::WeightCap {
                ticker: w.ticker.clone(),
                weight: w.weight,
                cap: LARGE_BASKET_MAX_WEIGHT,
                names: basket.len(),
            });
        }
    }

    if basket.len() < min_names {
        return Err(ValidationError::TooFewNames {
            count: basket.len(),
            min_names,
        });
    }

    Ok(())
}

/// Overlay parameters: positive target vol, non-empty window, cap in (0, 1].
pub fn validate_strategy(params: &StrategyParams) -> Result<(), ValidationError> {
    if !(params.target_vol > 0.0) {
        return Err(ValidationError::InvalidStrategy(format!(
            "target_vol must be > 0 (got {})",
            params.target_vol
        )));
    }
    if params.lookback_bd == 0 {
        return Err(ValidationError::InvalidStrategy(
            "lookback_bd must be at least 1".to_string(),
        ));
    }
    if !(params.exposure_step_cap > 0.0 && params.exposure_step_cap <= 1.0) {
        return Err(ValidationError::InvalidStrategy(format!(
            "exposure_step_cap must be in (0, 1] (got {})",
            params.exposure_step_cap
        )));
    }
    Ok(())
}

/// Full pre-pricing check of a trade against the market it will be priced on.
pub fn validate_trade_market(
    trade: &TradeModel,
    market: &MarketModel,
    min_names: usize,
) -> Result<(), ValidationError> {
    validate_basket(&trade.basket, min_names)?;
    validate_strategy(&trade.strategy)?;

    let known: HashSet<&str> = market.equities.iter().map(|e| e.ticker.as_str()).collect();
    if let Some(missing) = trade.tickers().find(|t| !known.contains(t)) {
        return Err(ValidationError::MissingMarketData(missing.to_string()));
    }

    // NaN fails `> 0.0` as well.
    if let Some(e) = market
        .equities
        .iter()
        .find(|e| !(e.spot > 0.0) || !(e.atm_vol > 0.0))
    {
        return Err(ValidationError::InvalidSpotOrVol {
            ticker: e.ticker.clone(),
            spot: e.spot,
            vol: e.atm_vol,
        });
    }

    if trade.valuation_date <= trade.initial_valuation_date {
        return Err(ValidationError::EmptyHorizon {
            initial: trade.initial_valuation_date,
            valuation: trade.valuation_date,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EquityMarketItem;
    use chrono::NaiveDate;

    fn basket(weights: &[f64]) -> Vec<WeightItem> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| WeightItem::new(format!("T{i:03}"), w))
            .collect()
    }

    fn trade(weights: &[f64]) -> TradeModel {
        TradeModel {
            trade_date: NaiveDate::from_ymd_opt(2026, 2, 21).unwrap(),
            initial_valuation_date: NaiveDate::from_ymd_opt(2026, 2, 23).unwrap(),
            valuation_date: NaiveDate::from_ymd_opt(2031, 1, 21).unwrap(),
            strike: 1.0,
            initial_strategy_value: 100.0,
            strategy: StrategyParams::default(),
            notional_millions: Default::default(),
            basket: basket(weights),
        }
    }

    fn market_for(trade: &TradeModel) -> MarketModel {
        MarketModel::new(
            trade
                .tickers()
                .map(|t| EquityMarketItem::new(t, 100.0, 0.2, 0.0))
                .collect(),
            0.8,
            0.0366,
        )
    }

    #[test]
    fn accepts_balanced_small_basket() {
        let t = trade(&[0.5, 0.5]);
        assert_eq!(validate_trade_market(&t, &market_for(&t), 2), Ok(()));
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = validate_basket(&basket(&[0.5, 0.4]), 2).unwrap_err();
        assert!(matches!(err, ValidationError::WeightSum { .. }));
    }

    #[test]
    fn tolerates_round_off_in_weight_sum() {
        let w = 1.0 / 3.0;
        assert!(validate_basket(&basket(&[w, w, w]), 3).is_ok());
    }

    #[test]
    fn caps_single_name_weight_in_large_basket() {
        let mut weights = vec![0.9 / 49.0; 49];
        weights.push(0.1);
        let err = validate_basket(&basket(&weights), 50).unwrap_err();
        match err {
            ValidationError::WeightCap { ticker, weight, .. } => {
                assert_eq!(ticker, "T049");
                assert_eq!(weight, 0.1);
            }
            other => panic!("expected WeightCap, got {other:?}"),
        }
    }

    #[test]
    fn cap_does_not_apply_below_fifty_names() {
        assert!(validate_basket(&basket(&[0.6, 0.4]), 2).is_ok());
    }

    #[test]
    fn rejects_basket_below_minimum() {
        let err = validate_basket(&basket(&[0.5, 0.5]), 50).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooFewNames {
                count: 2,
                min_names: 50
            }
        );
    }

    #[test]
    fn rejects_missing_market_ticker() {
        let t = trade(&[0.5, 0.5]);
        let mut m = market_for(&t);
        m.equities.pop();
        let err = validate_trade_market(&t, &m, 2).unwrap_err();
        assert_eq!(err, ValidationError::MissingMarketData("T001".into()));
    }

    #[test]
    fn rejects_non_positive_spot_or_vol() {
        let t = trade(&[0.5, 0.5]);
        let mut m = market_for(&t);
        m.equities[0].atm_vol = 0.0;
        assert!(matches!(
            validate_trade_market(&t, &m, 2),
            Err(ValidationError::InvalidSpotOrVol { .. })
        ));

        let mut m = market_for(&t);
        m.equities[1].spot = -1.0;
        assert!(matches!(
            validate_trade_market(&t, &m, 2),
            Err(ValidationError::InvalidSpotOrVol { .. })
        ));
    }

    #[test]
    fn rejects_degenerate_strategy_params() {
        let mut t = trade(&[0.5, 0.5]);
        let m = market_for(&t);
        t.strategy.lookback_bd = 0;
        assert!(matches!(
            validate_trade_market(&t, &m, 2),
            Err(ValidationError::InvalidStrategy(_))
        ));

        t.strategy = StrategyParams {
            exposure_step_cap: 1.5,
            ..StrategyParams::default()
        };
        assert!(matches!(
            validate_trade_market(&t, &m, 2),
            Err(ValidationError::InvalidStrategy(_))
        ));
    }

    #[test]
    fn rejects_inverted_dates() {
        let mut t = trade(&[0.5, 0.5]);
        t.valuation_date = t.initial_valuation_date;
        let m = market_for(&t);
        assert!(matches!(
            validate_trade_market(&t, &m, 2),
            Err(ValidationError::EmptyHorizon { .. })
        ));
    }
}
