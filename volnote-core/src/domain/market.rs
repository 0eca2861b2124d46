use serde::{Deserialize, Serialize};

/// Market inputs of a single underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityMarketItem {
    pub ticker: String,
    pub spot: f64,
    pub atm_vol: f64,
    #[serde(default)]
    pub div_yield: f64,
}

impl EquityMarketItem {
    pub fn new(ticker: impl Into<String>, spot: f64, atm_vol: f64, div_yield: f64) -> Self {
        Self {
            ticker: ticker.into(),
            spot,
            atm_vol,
            div_yield,
        }
    }

    pub fn with_spot(&self, spot: f64) -> Self {
        Self {
            spot,
            ..self.clone()
        }
    }

    pub fn with_atm_vol(&self, atm_vol: f64) -> Self {
        Self {
            atm_vol,
            ..self.clone()
        }
    }
}

/// Flat cross-asset correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationModel {
    #[serde(rename = "type", default = "default_correlation_kind")]
    pub kind: String,
    pub rho: f64,
}

fn default_correlation_kind() -> String {
    "constant_cross_asset".to_string()
}

impl Default for CorrelationModel {
    fn default() -> Self {
        Self {
            kind: default_correlation_kind(),
            rho: 0.8,
        }
    }
}

/// Flat continuously-compounded zero curve (ACT/365F).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatZeroCurve {
    #[serde(rename = "type", default = "default_curve_kind")]
    pub kind: String,
    pub zero_rate: f64,
    #[serde(default = "default_day_count")]
    pub day_count: String,
    #[serde(default = "default_compounding")]
    pub compounding: String,
}

fn default_curve_kind() -> String {
    "flat_zero_rate".to_string()
}

fn default_day_count() -> String {
    "ACT/365F".to_string()
}

fn default_compounding() -> String {
    "continuous".to_string()
}

impl FlatZeroCurve {
    pub fn flat(zero_rate: f64) -> Self {
        Self {
            kind: default_curve_kind(),
            zero_rate,
            day_count: default_day_count(),
            compounding: default_compounding(),
        }
    }

    /// Discount factor to `years`.
    pub fn discount_factor(&self, years: f64) -> f64 {
        (-self.zero_rate * years).exp()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesModel {
    #[serde(rename = "sofr_ois_curve", alias = "discount_curve")]
    pub discount_curve: FlatZeroCurve,
}

/// Market snapshot: one entry per underlying, flat correlation, flat rate.
///
/// Scenarios are built with the `with_*` constructors, which return modified
/// copies and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketModel {
    pub equities: Vec<EquityMarketItem>,
    #[serde(default)]
    pub correlation: CorrelationModel,
    pub rates: RatesModel,
}

impl MarketModel {
    pub fn new(equities: Vec<EquityMarketItem>, rho: f64, zero_rate: f64) -> Self {
        Self {
            equities,
            correlation: CorrelationModel {
                rho,
                ..CorrelationModel::default()
            },
            rates: RatesModel {
                discount_curve: FlatZeroCurve::flat(zero_rate),
            },
        }
    }

    pub fn equity(&self, ticker: &str) -> Option<&EquityMarketItem> {
        self.equities.iter().find(|e| e.ticker == ticker)
    }

    pub fn rho(&self) -> f64 {
        self.correlation.rho
    }

    pub fn zero_rate(&self) -> f64 {
        self.rates.discount_curve.zero_rate
    }

    /// Copy with the equity at `index` having its spot scaled by `1 + rel`.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn with_spot_bumped(&self, index: usize, rel: f64) -> Self {
        let mut equities = self.equities.clone();
        let bumped = equities[index].spot * (1.0 + rel);
        equities[index] = equities[index].with_spot(bumped);
        Self {
            equities,
            ..self.clone()
        }
    }

    /// Copy with every equity vol shifted by `shift` (absolute).
    pub fn with_vols_shifted(&self, shift: f64) -> Self {
        Self {
            equities: self
                .equities
                .iter()
                .map(|e| e.with_atm_vol(e.atm_vol + shift))
                .collect(),
            ..self.clone()
        }
    }

    pub fn with_rho(&self, rho: f64) -> Self {
        let mut market = self.clone();
        market.correlation.rho = rho;
        market
    }

    pub fn with_zero_rate(&self, zero_rate: f64) -> Self {
        let mut market = self.clone();
        market.rates.discount_curve.zero_rate = zero_rate;
        market
    }
}
