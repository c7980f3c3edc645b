//! Single-strategy simulation over a price series.

use chrono::NaiveDate;
use tracing::debug;

use super::context::StrategyContext;
use super::metrics::Metrics;
use super::params::StrategyParameters;
use super::price_series::PriceSeries;
use super::strategy::Strategy;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Annual risk-free rate used for the Sharpe ratio.
    pub risk_free_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: String,
    pub final_value: f64,
    pub total_invested: f64,
    pub shares_owned: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub portfolio_values: Vec<f64>,
    pub investments: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub parameters: StrategyParameters,
}

impl BacktestResult {
    pub fn metrics(&self) -> Metrics {
        Metrics {
            total_return: self.total_return,
            annualized_return: self.annualized_return,
            max_drawdown: self.max_drawdown,
            volatility: self.volatility,
            sharpe_ratio: self.sharpe_ratio,
        }
    }

    /// Number of periods with a positive investment.
    pub fn investment_count(&self) -> usize {
        self.investments.iter().filter(|&&a| a > 0.0).count()
    }
}

/// Replay `series` through `strategy` with a fresh context.
///
/// Each period sees only the history up to and including itself. Positive
/// amounts buy `amount / price` shares.
pub fn run_simulation(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    params: &StrategyParameters,
    config: &SimulationConfig,
) -> BacktestResult {
    let prices = series.prices();
    let dates = series.dates();
    let mut ctx = StrategyContext::new();

    let mut shares_owned = 0.0_f64;
    let mut total_invested = 0.0_f64;
    let mut portfolio_values = Vec::with_capacity(prices.len());
    let mut investments = Vec::with_capacity(prices.len());

    for (i, &price) in prices.iter().enumerate() {
        let amount = strategy.calculate_investment(
            price,
            &prices[..=i],
            &dates[..=i],
            params,
            &mut ctx,
        );
        let amount = if amount.is_finite() && amount > 0.0 {
            amount
        } else {
            0.0
        };
        if amount > 0.0 {
            shares_owned += amount / price;
            total_invested += amount;
        }
        investments.push(amount);
        portfolio_values.push(shares_owned * price);
    }

    let final_value = portfolio_values.last().copied().unwrap_or(0.0);
    let metrics = Metrics::compute(
        &portfolio_values,
        total_invested,
        dates,
        config.risk_free_rate,
    );

    debug!(
        strategy = strategy.name(),
        ticker = series.ticker(),
        periods = prices.len(),
        total_invested,
        final_value,
        "simulation finished"
    );

    BacktestResult {
        strategy: strategy.name().to_string(),
        final_value,
        total_invested,
        shares_owned,
        total_return: metrics.total_return,
        annualized_return: metrics.annualized_return,
        max_drawdown: metrics.max_drawdown,
        volatility: metrics.volatility,
        sharpe_ratio: metrics.sharpe_ratio,
        portfolio_values,
        investments,
        dates: dates.to_vec(),
        parameters: params.clone(),
    }
}
