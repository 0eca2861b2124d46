//! Volatility-target strategy index.
//!
//! The index allocates a fraction `a(t)` to the basket and the rest to cash.
//! The target fraction is `min(1, target_vol / vol_hat)` where `vol_hat` is the
//! annualized sample volatility of the last `lookback_bd` basket log-returns.
//! The fraction may move by at most `exposure_step_cap` per step and always
//! stays within [0, 1].
//!
//! The rolling window keeps a running sum and sum of squares, so each step
//! costs O(1) regardless of the lookback length.

use std::collections::VecDeque;

use crate::domain::StrategyParams;
use crate::policy::{INITIAL_EXPOSURE, TRADING_DAYS_PER_YEAR, VOL_FLOOR};

/// Fixed-capacity window of log-returns with incremental moments.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
}

impl RollingWindow {
    /// # Panics
    /// If `capacity` is zero. `validate_strategy` rejects such parameters.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "lookback window must hold at least one value");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Add `x`, evicting the oldest value once over capacity.
    pub fn push(&mut self, x: f64) {
        self.values.push_back(x);
        self.sum += x;
        self.sum_sq += x * x;
        if self.values.len() > self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bessel-corrected variance from the running moments, or `None` with
    /// fewer than two observations. May be slightly negative from round-off.
    pub fn sample_variance(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let count = n as f64;
        let mean = self.sum / count;
        Some((self.sum_sq - count * mean * mean) / (count - 1.0))
    }

    /// Annualized realized vol; `fallback` until two observations exist.
    pub fn realized_vol(&self, fallback: f64) -> f64 {
        match self.sample_variance() {
            None => fallback,
            Some(var) => var.max(0.0).sqrt() * TRADING_DAYS_PER_YEAR.sqrt(),
        }
    }
}

/// Rate-limited move from `previous` toward `target`, then clamped to [0, 1].
pub fn next_exposure(target: f64, previous: f64, step_cap: f64) -> f64 {
    let stepped = target.max(previous - step_cap).min(previous + step_cap);
    stepped.clamp(0.0, 1.0)
}

/// Index, exposure and vol estimate of one path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPath {
    /// `steps + 1` index levels, starting at the initial strategy value.
    pub index: Vec<f64>,
    /// `steps` exposure fractions, one per rebalancing step.
    pub exposure: Vec<f64>,
    /// `steps` realized-vol estimates that drove the exposure.
    pub sigma_hat: Vec<f64>,
}

impl StrategyPath {
    pub fn final_level(&self) -> f64 {
        self.index.last().copied().unwrap_or(f64::NAN)
    }
}

/// Turns basket paths into strategy index paths.
#[derive(Debug, Clone, Copy)]
pub struct StrategyEvolver {
    params: StrategyParams,
    initial_value: f64,
    cash_return: f64,
}

impl StrategyEvolver {
    /// `rate * dt` is the per-step cash return.
    pub fn new(params: StrategyParams, initial_value: f64, rate: f64, dt: f64) -> Self {
        Self {
            params,
            initial_value,
            cash_return: rate * dt,
        }
    }

    pub fn evolve(&self, basket: &[f64]) -> StrategyPath {
        let steps = basket.len().saturating_sub(1);
        let target_vol = self.params.target_vol;
        let cap = self.params.exposure_step_cap;

        let mut index = Vec::with_capacity(steps + 1);
        let mut exposure = Vec::with_capacity(steps);
        let mut sigma_hat = Vec::with_capacity(steps);
        let mut window = RollingWindow::new(self.params.lookback_bd);

        let mut level = self.initial_value;
        let mut previous = INITIAL_EXPOSURE;
        index.push(level);

        for pair in basket.windows(2) {
            let (b_t, b_next) = (pair[0], pair[1]);
            window.push((b_next / b_t).ln());

            let vol_hat = window.realized_vol(target_vol);
            let target = (target_vol / vol_hat.max(VOL_FLOOR)).min(1.0);
            let a = next_exposure(target, previous, cap);

            let basket_return = b_next / b_t - 1.0;
            level *= 1.0 + a * basket_return + (1.0 - a) * self.cash_return;

            index.push(level);
            exposure.push(a);
            sigma_hat.push(vol_hat);
            previous = a;
        }

        StrategyPath {
            index,
            exposure,
            sigma_hat,
        }
    }
}
