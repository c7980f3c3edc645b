//! Multi-strategy comparison over one ticker's price series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use super::backtest::{run_simulation, BacktestResult, SimulationConfig};
use super::error::AavcError;
use super::params::StrategyParameters;
use super::price_series::PriceSeries;
use super::registry::StrategyRegistry;
use super::strategy::Strategy;
use crate::ports::price_port::PricePort;

/// Strategies compared when the caller names none.
pub const DEFAULT_STRATEGIES: &[&str] = &[
    "aavc_static",
    "aavc_dynamic",
    "aavc_highest_reset",
    "dca",
    "buy_and_hold",
];

/// Per-strategy parameter overrides, keyed by strategy name.
pub type StrategyOverrides = BTreeMap<String, StrategyParameters>;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub best_performer: String,
    pub worst_performer: String,
    pub best_sharpe: String,
    pub lowest_drawdown: String,
}

/// Strategy names ordered best-first for each metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub total_return: Vec<String>,
    pub annualized_return: Vec<String>,
    pub sharpe_ratio: Vec<String>,
    pub max_drawdown: Vec<String>,
    pub volatility: Vec<String>,
}

/// Symmetric pairwise correlation of portfolio-value histories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub ticker: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// One result per strategy, in request order.
    pub results: Vec<BacktestResult>,
    pub summary: ComparisonSummary,
    pub rankings: Rankings,
    pub correlation: CorrelationMatrix,
}

impl ComparisonResult {
    pub fn result(&self, strategy: &str) -> Option<&BacktestResult> {
        self.results.iter().find(|r| r.strategy == strategy)
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.results.iter().map(|r| r.strategy.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base_parameters: StrategyParameters,
    pub overrides: StrategyOverrides,
    /// Empty means [`DEFAULT_STRATEGIES`].
    pub strategies: Vec<String>,
    pub config: SimulationConfig,
}

/// Fetch prices through `port` and compare the requested strategies.
pub fn compare_ticker(
    port: &dyn PricePort,
    registry: &StrategyRegistry,
    request: &ComparisonRequest,
) -> Result<ComparisonResult, AavcError> {
    // Resolve names before touching the data source.
    let names = requested_names(&request.strategies);
    let prepared = prepare(registry, &names, &request.base_parameters, &request.overrides)?;

    let series = port.fetch_prices(&request.ticker, request.start_date, request.end_date)?;
    Ok(compare_prepared(&prepared, &series, &request.config))
}

fn requested_names(strategies: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if strategies.is_empty() {
        names.extend(DEFAULT_STRATEGIES.iter().map(|s| s.to_string()));
    } else {
        for name in strategies {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

/// Look up every strategy and validate its resolved parameters.
///
/// Fails on the first unknown name or invalid parameter set, so no
/// simulation runs unless all of them can.
fn prepare(
    registry: &StrategyRegistry,
    names: &[String],
    base: &StrategyParameters,
    overrides: &StrategyOverrides,
) -> Result<Vec<(Box<dyn Strategy>, StrategyParameters)>, AavcError> {
    let empty = StrategyParameters::new();
    names
        .iter()
        .map(|name| {
            let strategy = registry
                .get(name)
                .ok_or_else(|| AavcError::UnknownStrategy { name: name.clone() })?;
            let params = StrategyParameters::resolve(
                &strategy.metadata().parameters,
                base,
                overrides.get(name).unwrap_or(&empty),
            );
            strategy.validate_parameters(&params)?;
            Ok((strategy, params))
        })
        .collect()
}

/// Simulate each requested strategy against the same series.
pub fn run_comparison(
    registry: &StrategyRegistry,
    series: &PriceSeries,
    base_parameters: &StrategyParameters,
    overrides: &StrategyOverrides,
    strategies: &[String],
    config: &SimulationConfig,
) -> Result<ComparisonResult, AavcError> {
    let names = requested_names(strategies);
    let prepared = prepare(registry, &names, base_parameters, overrides)?;
    Ok(compare_prepared(&prepared, series, config))
}

fn compare_prepared(
    prepared: &[(Box<dyn Strategy>, StrategyParameters)],
    series: &PriceSeries,
    config: &SimulationConfig,
) -> ComparisonResult {
    info!(
        ticker = series.ticker(),
        strategies = prepared.len(),
        periods = series.len(),
        "running comparison"
    );

    let results: Vec<BacktestResult> = prepared
        .iter()
        .map(|(strategy, params)| run_simulation(strategy.as_ref(), series, params, config))
        .collect();

    let rankings = rank(&results);
    let summary = ComparisonSummary {
        best_performer: first_or_empty(&rankings.total_return),
        worst_performer: rankings.total_return.last().cloned().unwrap_or_default(),
        best_sharpe: first_or_empty(&rankings.sharpe_ratio),
        lowest_drawdown: first_or_empty(&rankings.max_drawdown),
    };
    let correlation = correlation_matrix(&results);

    ComparisonResult {
        ticker: series.ticker().to_string(),
        start_date: series.first_date(),
        end_date: series.last_date(),
        results,
        summary,
        rankings,
        correlation,
    }
}

fn first_or_empty(names: &[String]) -> String {
    names.first().cloned().unwrap_or_default()
}

fn ranked_by(
    results: &[BacktestResult],
    metric: impl Fn(&BacktestResult) -> f64,
    higher_is_better: bool,
) -> Vec<String> {
    let mut order: Vec<&BacktestResult> = results.iter().collect();
    order.sort_by(|a, b| {
        let ord = metric(a).total_cmp(&metric(b));
        if higher_is_better { ord.reverse() } else { ord }
    });
    order.into_iter().map(|r| r.strategy.clone()).collect()
}

fn rank(results: &[BacktestResult]) -> Rankings {
    Rankings {
        total_return: ranked_by(results, |r| r.total_return, true),
        annualized_return: ranked_by(results, |r| r.annualized_return, true),
        sharpe_ratio: ranked_by(results, |r| r.sharpe_ratio, true),
        max_drawdown: ranked_by(results, |r| r.max_drawdown, false),
        volatility: ranked_by(results, |r| r.volatility, false),
    }
}

/// Pearson correlation over the common prefix of `a` and `b`.
///
/// Returns 0 with fewer than two shared points or when either side is
/// constant.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a <= 0.0 || var_b <= 0.0 {
        return 0.0;
    }
    let r = cov / (var_a.sqrt() * var_b.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

fn correlation_matrix(results: &[BacktestResult]) -> CorrelationMatrix {
    let n = results.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson_correlation(
                &results[i].portfolio_values,
                &results[j].portfolio_values,
            );
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        names: results.iter().map(|r| r.strategy.clone()).collect(),
        values,
    }
}
