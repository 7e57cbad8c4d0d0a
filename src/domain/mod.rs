//! Core domain types and analytics.

pub mod ohlcv;
pub mod error;
pub mod indicator;
pub mod enricher;
pub mod strategy;
pub mod backtest;
pub mod stats;
pub mod risk;
pub mod simulation;
pub mod period;
pub mod comparison;
pub mod analysis;
pub mod sentiment;
pub mod quotes;
pub mod config_validation;
