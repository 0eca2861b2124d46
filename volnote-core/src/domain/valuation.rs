use serde::{Deserialize, Serialize};

/// Parameters a pricing run actually used.
///
/// `paths` and `steps` are what the caller asked for; `effective_*` are what
/// was simulated after the resource caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceConfig {
    pub paths: usize,
    pub effective_paths: usize,
    pub seed: u64,
    pub rho: f64,
    #[serde(rename = "r", alias = "rate")]
    pub rate: f64,
    pub target_vol: f64,
    pub lookback_bd: usize,
    pub step_cap: f64,
    pub steps: usize,
    pub effective_steps: usize,
    #[serde(rename = "T_years", alias = "t_years")]
    pub t_years: f64,
}

/// Premium and Monte Carlo standard error of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub premium_rate: f64,
    pub premium_per_100: f64,
    pub stderr_rate: f64,
    pub stderr_per_100: f64,
    pub config: PriceConfig,
}

impl PricingResult {
    pub fn new(premium_rate: f64, stderr_rate: f64, config: PriceConfig) -> Self {
        Self {
            premium_rate,
            premium_per_100: premium_rate * 100.0,
            stderr_rate,
            stderr_per_100: stderr_rate * 100.0,
            config,
        }
    }
}

/// Exposure and realized-vol summary over every path and step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub avg_exposure: f64,
    pub min_exposure: f64,
    pub max_exposure: f64,
    pub avg_sigma_hat: f64,
    pub effective_paths: usize,
    pub effective_steps: usize,
}

/// One finite-difference sensitivity, e.g. `DELTA_AAPL`, `VEGA`, `RHO`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreekRow {
    pub name: String,
    pub value: f64,
}

impl GreekRow {
    pub fn delta(ticker: &str, value: f64) -> Self {
        Self {
            name: format!("DELTA_{ticker}"),
            value,
        }
    }

    pub fn vega(value: f64) -> Self {
        Self {
            name: "VEGA".to_string(),
            value,
        }
    }

    pub fn rho(value: f64) -> Self {
        Self {
            name: "RHO".to_string(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PriceConfig {
        PriceConfig {
            paths: 1000,
            effective_paths: 1000,
            seed: 42,
            rho: 0.8,
            rate: 0.0366,
            target_vol: 0.1,
            lookback_bd: 40,
            step_cap: 0.2,
            steps: 1238,
            effective_steps: 252,
            t_years: 4.91,
        }
    }

    #[test]
    fn result_json_uses_short_rate_and_horizon_keys() {
        let json = serde_json::to_value(PricingResult::new(0.25, 0.01, config())).unwrap();
        assert_eq!(json["config"]["r"], 0.0366);
        assert_eq!(json["config"]["T_years"], 4.91);
        assert!(json["config"].get("rate").is_none());
        assert!(json["config"].get("t_years").is_none());
        assert_eq!(json["premium_per_100"], 25.0);
    }
}
