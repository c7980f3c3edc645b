//! Performance metrics over a simulated portfolio-value history.
//!
//! Percentages are expressed in percent (10.0 = 10%). Any ratio whose
//! denominator can be zero degrades to 0 instead of producing NaN or inf.

use chrono::NaiveDate;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl Metrics {
    pub fn compute(
        portfolio_values: &[f64],
        total_invested: f64,
        dates: &[NaiveDate],
        risk_free_rate: f64,
    ) -> Self {
        let final_value = portfolio_values.last().copied().unwrap_or(0.0);
        let returns = daily_returns(portfolio_values);

        Metrics {
            total_return: total_return_pct(final_value, total_invested),
            annualized_return: annualized_return_pct(
                final_value,
                total_invested,
                dates.first().copied(),
                dates.last().copied(),
            ),
            max_drawdown: max_drawdown_pct(portfolio_values),
            volatility: volatility_pct(&returns),
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

pub fn total_return_pct(final_value: f64, total_invested: f64) -> f64 {
    if total_invested <= 0.0 {
        return 0.0;
    }
    finite_or_zero((final_value / total_invested - 1.0) * 100.0)
}

pub fn annualized_return_pct(
    final_value: f64,
    total_invested: f64,
    first: Option<NaiveDate>,
    last: Option<NaiveDate>,
) -> f64 {
    let (Some(first), Some(last)) = (first, last) else {
        return 0.0;
    };
    let years = (last - first).num_days() as f64 / DAYS_PER_YEAR;
    if years <= 0.0 || total_invested <= 0.0 || final_value <= 0.0 {
        return 0.0;
    }
    finite_or_zero(((final_value / total_invested).powf(1.0 / years) - 1.0) * 100.0)
}

/// Largest peak-to-trough decline, tracked against a running peak.
pub fn max_drawdown_pct(portfolio_values: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for &value in portfolio_values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    finite_or_zero(max_dd * 100.0)
}

/// Simple period-over-period returns, skipping periods whose previous value
/// is not positive (nothing invested yet).
pub fn daily_returns(portfolio_values: &[f64]) -> Vec<f64> {
    portfolio_values
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Population mean and standard deviation.
///
/// A deviation within rounding noise of the mean is reported as exactly 0,
/// so identical values never yield a tiny non-zero spread.
fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev <= f64::EPSILON * mean.abs().max(1.0) {
        (mean, 0.0)
    } else {
        (mean, stddev)
    }
}

pub fn volatility_pct(returns: &[f64]) -> f64 {
    let (_, stddev) = mean_and_stddev(returns);
    finite_or_zero(stddev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Annualized Sharpe ratio of daily returns against `risk_free_rate / 252`.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let (mean, stddev) = mean_and_stddev(&excess);
    if stddev <= 0.0 {
        return 0.0;
    }
    finite_or_zero(mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
}
