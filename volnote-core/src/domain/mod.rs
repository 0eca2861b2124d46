//! Domain types for volnote

pub mod market;
pub mod trade;
pub mod valuation;

pub use market::{CorrelationModel, EquityMarketItem, FlatZeroCurve, MarketModel, RatesModel};
pub use trade::{NotionalRange, StrategyParams, TradeModel, WeightItem};
pub use valuation::{GreekRow, PriceConfig, PricingResult, RunDiagnostics};
