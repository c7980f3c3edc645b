//! Batch calculation jobs read from an INI job configuration.
//!
//! ```ini
//! [defaults]
//! base_amount = 10000
//! asymmetric_coefficient = 2.0
//! strategy = aavc_static
//! lookback_days = 365
//!
//! [data]
//! price_dir = data
//!
//! [stock.AAPL]
//! reference_price = 150.0
//! ```

use super::error::AavcError;
use super::sizing::DEFAULT_ASYMMETRIC_COEFFICIENT;
use crate::ports::config_port::ConfigPort;

pub const DEFAULTS_SECTION: &str = "defaults";
pub const DATA_SECTION: &str = "data";
pub const STOCK_SECTION_PREFIX: &str = "stock.";

pub const DEFAULT_STRATEGY: &str = "aavc_static";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const DEFAULT_PRICE_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationJob {
    pub ticker: String,
    pub base_amount: f64,
    pub reference_price: Option<f64>,
    pub asymmetric_coefficient: f64,
    pub strategy: String,
}

/// Ticker named by a `stock.<TICKER>` section, upper-cased.
pub fn stock_ticker(section: &str) -> Option<String> {
    let prefix = section.get(..STOCK_SECTION_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(STOCK_SECTION_PREFIX) {
        return None;
    }
    let ticker = section[STOCK_SECTION_PREFIX.len()..].trim();
    if ticker.is_empty() {
        None
    } else {
        Some(ticker.to_uppercase())
    }
}

/// Stock sections sorted by ticker.
pub fn stock_sections(config: &dyn ConfigPort) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = config
        .sections()
        .into_iter()
        .filter_map(|s| stock_ticker(&s).map(|t| (t, s)))
        .collect();
    sections.sort();
    sections
}

/// Parse an optional numeric key, rejecting values that are present but
/// not numbers.
pub(crate) fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, AavcError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AavcError::config_invalid(section, key, format!("'{}' is not a number", raw))),
    }
}

fn stock_or_default(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, AavcError> {
    match optional_number(config, section, key)? {
        Some(v) => Ok(Some(v)),
        None => optional_number(config, DEFAULTS_SECTION, key),
    }
}

pub fn lookback_days(config: &dyn ConfigPort) -> i64 {
    config.get_int(DEFAULTS_SECTION, "lookback_days", DEFAULT_LOOKBACK_DAYS)
}

pub fn price_dir(config: &dyn ConfigPort) -> String {
    config
        .get_string(DATA_SECTION, "price_dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PRICE_DIR.to_string())
}

/// One job per `stock.*` section, with per-stock keys overriding
/// `[defaults]`.
pub fn prepare_calculation_jobs(config: &dyn ConfigPort) -> Result<Vec<CalculationJob>, AavcError> {
    let default_strategy = config
        .get_string(DEFAULTS_SECTION, "strategy")
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string());

    stock_sections(config)
        .into_iter()
        .map(|(ticker, section)| {
            let base_amount = stock_or_default(config, &section, "base_amount")?.ok_or_else(|| {
                AavcError::ConfigMissing {
                    section: DEFAULTS_SECTION.to_string(),
                    key: "base_amount".to_string(),
                }
            })?;
            let asymmetric_coefficient = stock_or_default(config, &section, "asymmetric_coefficient")?
                .unwrap_or(DEFAULT_ASYMMETRIC_COEFFICIENT);
            let reference_price = optional_number(config, &section, "reference_price")?;
            let strategy = config
                .get_string(&section, "strategy")
                .unwrap_or_else(|| default_strategy.clone());

            Ok(CalculationJob {
                ticker,
                base_amount,
                reference_price,
                asymmetric_coefficient,
                strategy,
            })
        })
        .collect()
}
