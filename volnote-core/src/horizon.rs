//! Valuation horizon and the capped simulation grid.
//!
//! Day count is a fixed ACT/365F year fraction and steps are
//! `round(years * 252)`; no holiday calendar is involved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::policy::{DAY_COUNT_BASIS, MAX_PATHS, MAX_STEPS, TRADING_DAYS_PER_YEAR};

/// Horizon between initial valuation and final valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub years: f64,
    /// Requested step count before the resource cap.
    pub steps: usize,
}

pub fn compute_horizon(initial_valuation_date: NaiveDate, valuation_date: NaiveDate) -> Horizon {
    let days = (valuation_date - initial_valuation_date).num_days();
    let years = days as f64 / DAY_COUNT_BASIS;
    let steps = (years * TRADING_DAYS_PER_YEAR).round().max(1.0) as usize;
    Horizon { years, steps }
}

/// The grid a run actually simulates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationGrid {
    pub paths: usize,
    pub steps: usize,
    /// Year fraction per step, computed from the capped step count.
    pub dt: f64,
}

impl Horizon {
    /// Apply the path and step caps. `dt` always spans the whole horizon, so a
    /// capped run takes fewer, longer steps.
    pub fn grid(&self, requested_paths: usize) -> SimulationGrid {
        let steps = self.steps.clamp(1, MAX_STEPS);
        SimulationGrid {
            paths: requested_paths.min(MAX_PATHS),
            steps,
            dt: self.years / steps as f64,
        }
    }
}
