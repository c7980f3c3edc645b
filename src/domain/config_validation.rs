//! Job configuration validation.
//!
//! Validates a job config before any prices are fetched.

use crate::domain::error::AavcError;
use crate::domain::jobs::{
    optional_number, prepare_calculation_jobs, stock_sections, DEFAULTS_SECTION,
};
use crate::domain::registry::StrategyRegistry;
use crate::ports::config_port::ConfigPort;

pub fn validate_job_config(
    config: &dyn ConfigPort,
    registry: &StrategyRegistry,
) -> Result<(), AavcError> {
    validate_stock_sections(config)?;
    validate_lookback_days(config)?;
    validate_section(config, DEFAULTS_SECTION, registry)?;
    for (_, section) in stock_sections(config) {
        validate_section(config, &section, registry)?;
    }
    prepare_calculation_jobs(config)?;
    Ok(())
}

fn validate_stock_sections(config: &dyn ConfigPort) -> Result<(), AavcError> {
    if stock_sections(config).is_empty() {
        return Err(AavcError::config_invalid(
            "stock.<TICKER>",
            "section",
            "at least one stock section is required",
        ));
    }
    Ok(())
}

fn validate_lookback_days(config: &dyn ConfigPort) -> Result<(), AavcError> {
    let Some(raw) = config.get_string(DEFAULTS_SECTION, "lookback_days") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if days > 0 => Ok(()),
        _ => Err(AavcError::config_invalid(
            DEFAULTS_SECTION,
            "lookback_days",
            "lookback_days must be a positive integer",
        )),
    }
}

fn validate_section(
    config: &dyn ConfigPort,
    section: &str,
    registry: &StrategyRegistry,
) -> Result<(), AavcError> {
    if let Some(v) = optional_number(config, section, "base_amount")? {
        if v <= 0.0 {
            return Err(AavcError::config_invalid(
                section,
                "base_amount",
                "base_amount must be positive",
            ));
        }
    }
    if let Some(v) = optional_number(config, section, "asymmetric_coefficient")? {
        if v < 0.0 {
            return Err(AavcError::config_invalid(
                section,
                "asymmetric_coefficient",
                "asymmetric_coefficient must be non-negative",
            ));
        }
    }
    if let Some(v) = optional_number(config, section, "reference_price")? {
        if v <= 0.0 {
            return Err(AavcError::config_invalid(
                section,
                "reference_price",
                "reference_price must be positive",
            ));
        }
    }
    if let Some(name) = config.get_string(section, "strategy") {
        if !registry.contains(&name) {
            return Err(AavcError::config_invalid(
                section,
                "strategy",
                format!("unknown strategy '{}'", name),
            ));
        }
    }
    Ok(())
}
