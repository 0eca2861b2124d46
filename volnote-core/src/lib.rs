//! volnote core: domain types and the simulation kernels of the note pricer.
//!
//! This crate contains the numerical heart of the engine:
//! - Domain types (trade, basket weights, market snapshot, pricing results)
//! - Boundary validation of trade/market inputs
//! - Horizon and the capped simulation grid
//! - Seeded random field of standard normals
//! - Constant-correlation Cholesky factorization
//! - Correlated GBM basket path simulation
//! - Volatility-target strategy index evolution
//!
//! Orchestration (pricing aggregation, greeks, I/O) lives in `volnote-runner`.

pub mod correlation;
pub mod domain;
pub mod horizon;
pub mod policy;
pub mod rng;
pub mod simulation;
pub mod strategy;
pub mod validation;

pub use correlation::{cholesky, constant_correlation, CholeskyFactor};
pub use horizon::{compute_horizon, Horizon, SimulationGrid};
pub use rng::{scenario_seed, RandomField};
pub use simulation::{basket_level, AssetDynamics, BasketSimulator};
pub use strategy::{next_exposure, RollingWindow, StrategyEvolver, StrategyPath};
pub use validation::{validate_basket, validate_strategy, validate_trade_market, ValidationError};
