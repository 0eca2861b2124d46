//! Numeric policy constants.
//!
//! Every cap, floor, tolerance and bump size the engine applies lives here so
//! it can be referenced by tests and documentation instead of appearing as an
//! inline literal.

/// Hard upper bound on simulated paths, regardless of the requested count.
pub const MAX_PATHS: usize = 1000;

/// Hard upper bound on simulated time steps, regardless of the horizon.
pub const MAX_STEPS: usize = 252;

/// Business days per year, used for step counts and vol annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar-day basis of the ACT/365F year fraction.
pub const DAY_COUNT_BASIS: f64 = 365.0;

/// Floor applied to the realized-vol estimate before dividing by it.
pub const VOL_FLOOR: f64 = 1e-12;

/// Exposure fraction held before the first rebalancing step.
pub const INITIAL_EXPOSURE: f64 = 1.0;

/// Allowed deviation of the basket weight sum from 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Basket size from which the per-name weight cap applies.
pub const LARGE_BASKET_NAMES: usize = 50;

/// Maximum single-name weight in a large basket.
pub const LARGE_BASKET_MAX_WEIGHT: f64 = 0.07;

/// Relative spot bump for per-name delta.
pub const DELTA_BUMP_REL: f64 = 0.01;

/// Absolute vol bump for vega (applied to every name at once).
pub const VEGA_BUMP_ABS: f64 = 0.01;

/// Absolute bump of the flat zero rate for rho.
pub const RHO_BUMP_ABS: f64 = 0.0001;
