//! Core domain types and logic.

pub mod error;
pub mod params;
pub mod context;
pub mod price_series;
pub mod reference_price;
pub mod schedule;
pub mod sizing;
pub mod strategy;
pub mod registry;
pub mod metrics;
pub mod backtest;
pub mod comparison;
pub mod jobs;
pub mod calculator;
pub mod config_validation;
