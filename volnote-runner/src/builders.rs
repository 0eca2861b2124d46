//! Trade and market construction from parsed input rows.

use chrono::{Days, NaiveDate};
use tracing::warn;

use volnote_core::domain::{
    EquityMarketItem, MarketModel, NotionalRange, StrategyParams, TradeModel, WeightItem,
};
use volnote_core::{validate_basket, ValidationError};

use crate::data_loader::{normalize_rate_col, BasketRow, MarketRow};

/// Calendar days between trade date and initial valuation date.
///
/// Stands in for a New York business-day calendar.
const SETTLEMENT_LAG_DAYS: u64 = 2;

/// Dates of a new trade. `None` takes the default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TradeDates {
    pub trade_date: Option<NaiveDate>,
    pub valuation_date: Option<NaiveDate>,
}

impl TradeDates {
    pub fn default_trade_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 21).unwrap_or_default()
    }

    pub fn default_valuation_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2031, 1, 21).unwrap_or_default()
    }

    /// `(trade_date, initial_valuation_date, valuation_date)`.
    pub fn resolve(&self) -> (NaiveDate, NaiveDate, NaiveDate) {
        let trade_date = self.trade_date.unwrap_or_else(Self::default_trade_date);
        let initial = trade_date
            .checked_add_days(Days::new(SETTLEMENT_LAG_DAYS))
            .unwrap_or(trade_date);
        let valuation = self
            .valuation_date
            .unwrap_or_else(Self::default_valuation_date);
        (trade_date, initial, valuation)
    }
}

/// Build a trade from basket rows after checking the weight rules.
pub fn build_trade(
    rows: &[BasketRow],
    dates: TradeDates,
    min_names: usize,
) -> Result<TradeModel, ValidationError> {
    let basket: Vec<WeightItem> = rows
        .iter()
        .map(|r| {
            let item = WeightItem::new(r.ticker.clone(), r.weight);
            match &r.name {
                Some(name) => item.with_name(name.clone()),
                None => item,
            }
        })
        .collect();
    validate_basket(&basket, min_names)?;

    let (trade_date, initial_valuation_date, valuation_date) = dates.resolve();
    warn!(
        %trade_date,
        %initial_valuation_date,
        "initial valuation date is trade date + {SETTLEMENT_LAG_DAYS} calendar days (business-day calendar placeholder)"
    );

    Ok(TradeModel {
        trade_date,
        initial_valuation_date,
        valuation_date,
        strike: 1.0,
        initial_strategy_value: 100.0,
        strategy: StrategyParams::default(),
        notional_millions: NotionalRange::default(),
        basket,
    })
}

/// Build a market snapshot. Vol and dividend columns given in percent are
/// scaled to decimals.
pub fn build_market(rows: &[MarketRow], zero_rate: f64, rho: f64) -> MarketModel {
    let equities = rows
        .iter()
        .map(|r| {
            EquityMarketItem::new(
                r.ticker.clone(),
                r.spot,
                normalize_rate_col(r.atm_vol),
                normalize_rate_col(r.div_yield),
            )
        })
        .collect();
    MarketModel::new(equities, rho, zero_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(weights: &[f64]) -> Vec<BasketRow> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| BasketRow {
                ticker: format!("N{i}"),
                weight,
                name: (i == 0).then(|| "First".to_string()),
            })
            .collect()
    }

    #[test]
    fn default_dates() {
        let (trade, initial, valuation) = TradeDates::default().resolve();
        assert_eq!(trade, NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());
        assert_eq!(initial, NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
        assert_eq!(valuation, NaiveDate::from_ymd_opt(2031, 1, 21).unwrap());
    }

    #[test]
    fn trade_carries_fixed_terms_and_names() {
        let t = build_trade(&rows(&[0.25, 0.75]), TradeDates::default(), 2).unwrap();
        assert_eq!(t.strike, 1.0);
        assert_eq!(t.initial_strategy_value, 100.0);
        assert_eq!(t.strategy, StrategyParams::default());
        assert_eq!(t.notional_millions, NotionalRange { min: 300.0, max: 500.0 });
        assert_eq!(t.basket[0].name.as_deref(), Some("First"));
        assert_eq!(t.basket[1].name, None);
    }

    #[test]
    fn explicit_dates_are_kept() {
        let dates = TradeDates {
            trade_date: NaiveDate::from_ymd_opt(2025, 12, 30),
            valuation_date: NaiveDate::from_ymd_opt(2027, 6, 30),
        };
        let t = build_trade(&rows(&[1.0]), dates, 1).unwrap();
        assert_eq!(t.initial_valuation_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(t.valuation_date, NaiveDate::from_ymd_opt(2027, 6, 30).unwrap());
    }

    #[test]
    fn trade_rejects_bad_weights() {
        assert!(matches!(
            build_trade(&rows(&[0.5, 0.4]), TradeDates::default(), 2),
            Err(ValidationError::WeightSum { .. })
        ));
        assert!(matches!(
            build_trade(&rows(&[0.5, 0.5]), TradeDates::default(), 50),
            Err(ValidationError::TooFewNames { .. })
        ));
    }

    #[test]
    fn market_scales_percent_columns() {
        let m = build_market(
            &[
                MarketRow {
                    ticker: "AAA".into(),
                    spot: 100.0,
                    atm_vol: 25.0,
                    div_yield: 1.5,
                },
                MarketRow {
                    ticker: "BBB".into(),
                    spot: 40.0,
                    atm_vol: 0.3,
                    div_yield: 3.0,
                },
            ],
            0.0366,
            0.8,
        );
        assert_eq!(m.equities[0].atm_vol, 0.25);
        assert_eq!(m.equities[0].div_yield, 1.5);
        assert_eq!(m.equities[1].atm_vol, 0.3);
        assert_eq!(m.equities[1].div_yield, 0.03);
        assert_eq!(m.zero_rate(), 0.0366);
        assert_eq!(m.rho(), 0.8);
        assert_eq!(m.rates.discount_curve.day_count, "ACT/365F");
    }
}
