use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One basket constituent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightItem {
    pub ticker: String,
    pub weight: f64,
    /// Display name, carried through for reporting only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WeightItem {
    pub fn new(ticker: impl Into<String>, weight: f64) -> Self {
        Self {
            ticker: ticker.into(),
            weight,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Parameters of the volatility-target overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Annualized volatility the overlay aims for.
    pub target_vol: f64,
    /// Rolling window length in business-day steps.
    pub lookback_bd: usize,
    /// Largest allowed change of the exposure fraction in one step.
    pub exposure_step_cap: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            target_vol: 0.10,
            lookback_bd: 40,
            exposure_step_cap: 0.20,
        }
    }
}

/// Notional bounds of the note, in millions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotionalRange {
    pub min: f64,
    pub max: f64,
}

impl Default for NotionalRange {
    fn default() -> Self {
        Self {
            min: 300.0,
            max: 500.0,
        }
    }
}

/// The note being priced: dates, payoff terms, overlay parameters, basket.
///
/// Built once (by a builder or by deserialization) and only ever borrowed by
/// the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeModel {
    pub trade_date: NaiveDate,
    pub initial_valuation_date: NaiveDate,
    pub valuation_date: NaiveDate,
    /// Call strike on the index performance ratio.
    pub strike: f64,
    pub initial_strategy_value: f64,
    pub strategy: StrategyParams,
    #[serde(rename = "V_millions_range", alias = "notional_millions", default)]
    pub notional_millions: NotionalRange,
    #[serde(rename = "initial_ec_weights", alias = "basket")]
    pub basket: Vec<WeightItem>,
}

impl TradeModel {
    pub fn weights(&self) -> Vec<f64> {
        self.basket.iter().map(|w| w.weight).collect()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.basket.iter().map(|w| w.ticker.as_str())
    }

    pub fn basket_size(&self) -> usize {
        self.basket.len()
    }
}
