//! Core domain types and logic.

pub mod ohlcv;
pub mod error;
pub mod window;
pub mod signal;
pub mod position;
pub mod broker;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod batch;
pub mod config_validation;
