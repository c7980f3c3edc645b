//! Single-ticker "how much today?" calculation.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use super::context::StrategyContext;
use super::error::AavcError;
use super::jobs::CalculationJob;
use super::params::{InvestmentFrequency, StrategyParameters};
use super::price_series::PriceSeries;
use super::registry::StrategyRegistry;
use super::strategy::Strategy;
use crate::ports::price_port::PricePort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationOutcome {
    pub amount: f64,
    /// Reference price behind `amount`, when the strategy uses one.
    pub reference_price: Option<f64>,
}

/// Result of running one [`CalculationJob`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub strategy: String,
    pub base_amount: f64,
    pub current_price: f64,
    pub reference_price: Option<f64>,
    pub calculated_investment: f64,
}

/// Amount for the last period of `series`.
///
/// Earlier periods are replayed through a fresh context first, so stateful
/// reference policies end up exactly where a backtest would leave them.
pub fn calculate_latest(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    params: &StrategyParameters,
) -> CalculationOutcome {
    let prices = series.prices();
    let dates = series.dates();
    let mut ctx = StrategyContext::new();
    let mut amount = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        amount = strategy.calculate_investment(price, &prices[..=i], &dates[..=i], params, &mut ctx);
    }

    CalculationOutcome {
        amount,
        reference_price: ctx.last_reference,
    }
}

/// Parameters for a job: the job's values on top of the strategy defaults,
/// always sized daily so the final period is never calendar-gated.
pub fn job_parameters(strategy: &dyn Strategy, job: &CalculationJob) -> StrategyParameters {
    let mut base = StrategyParameters::new()
        .with("base_amount", job.base_amount)
        .with("initial_amount", job.base_amount)
        .with("asymmetric_coefficient", job.asymmetric_coefficient)
        .with(
            "investment_frequency",
            InvestmentFrequency::Daily.to_string().as_str(),
        );
    if let Some(reference) = job.reference_price {
        base.insert("ref_price", reference);
    }
    StrategyParameters::resolve(
        &strategy.metadata().parameters,
        &base,
        &StrategyParameters::new(),
    )
}

/// Fetch `lookback_days` of prices ending at `end_date` and size today's
/// investment for `job`.
pub fn run_job(
    registry: &StrategyRegistry,
    port: &dyn PricePort,
    job: &CalculationJob,
    end_date: NaiveDate,
    lookback_days: i64,
) -> Result<CalculationRecord, AavcError> {
    let strategy = registry
        .get(&job.strategy)
        .ok_or_else(|| AavcError::UnknownStrategy {
            name: job.strategy.clone(),
        })?;
    let params = job_parameters(strategy.as_ref(), job);
    strategy.validate_parameters(&params)?;

    let start_date = end_date - Duration::days(lookback_days.max(1));
    let series = port.fetch_prices(&job.ticker, start_date, end_date)?;
    let (Some(date), Some(current_price)) = (series.last_date(), series.last_price()) else {
        return Err(AavcError::TickerNotFound {
            ticker: job.ticker.clone(),
            start: start_date,
            end: end_date,
        });
    };

    let outcome = calculate_latest(strategy.as_ref(), &series, &params);
    debug!(
        ticker = %job.ticker,
        strategy = %job.strategy,
        periods = series.len(),
        amount = outcome.amount,
        "calculated investment"
    );

    Ok(CalculationRecord {
        date,
        ticker: job.ticker.clone(),
        strategy: job.strategy.clone(),
        base_amount: job.base_amount,
        current_price,
        reference_price: outcome.reference_price,
        calculated_investment: outcome.amount,
    })
}
