//! Markdown comparison report implementing ReportPort.

use crate::domain::backtest::BacktestResult;
use crate::domain::comparison::ComparisonResult;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReport;

fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}

fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Index of the best value; ties go to the first strategy.
fn best_index(values: &[f64], higher_is_better: bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        best = match best {
            None => Some(i),
            Some(b) if higher_is_better && v > values[b] => Some(i),
            Some(b) if !higher_is_better && v < values[b] => Some(i),
            keep => keep,
        };
    }
    best
}

fn metric_row(
    label: &str,
    results: &[BacktestResult],
    metric: impl Fn(&BacktestResult) -> f64,
    format: fn(f64) -> String,
    higher_is_better: Option<bool>,
) -> String {
    let values: Vec<f64> = results.iter().map(&metric).collect();
    let best = higher_is_better.and_then(|h| best_index(&values, h));

    let mut row = format!("| {} |", label);
    for (i, &v) in values.iter().enumerate() {
        let cell = format(v);
        if Some(i) == best {
            row.push_str(&format!(" **{}** |", cell));
        } else {
            row.push_str(&format!(" {} |", cell));
        }
    }
    row.push('\n');
    row
}

pub fn format_metrics_table(results: &[BacktestResult]) -> String {
    if results.is_empty() {
        return "No strategies were run.\n".to_string();
    }

    let mut out = String::from("| Metric |");
    for r in results {
        out.push_str(&format!(" {} |", r.strategy));
    }
    out.push_str("\n|:--|");
    for _ in results {
        out.push_str("--:|");
    }
    out.push('\n');

    out.push_str(&metric_row("Final Value", results, |r| r.final_value, format_amount, Some(true)));
    out.push_str(&metric_row(
        "Total Invested",
        results,
        |r| r.total_invested,
        format_amount,
        None,
    ));
    out.push_str(&metric_row("Total Return", results, |r| r.total_return, format_pct, Some(true)));
    out.push_str(&metric_row(
        "Ann. Return",
        results,
        |r| r.annualized_return,
        format_pct,
        Some(true),
    ));
    out.push_str(&metric_row("Max Drawdown", results, |r| r.max_drawdown, format_pct, Some(false)));
    out.push_str(&metric_row("Volatility", results, |r| r.volatility, format_pct, Some(false)));
    out.push_str(&metric_row("Sharpe Ratio", results, |r| r.sharpe_ratio, format_ratio, Some(true)));
    out
}

pub fn format_correlation_table(result: &ComparisonResult) -> String {
    let matrix = &result.correlation;
    if matrix.names.is_empty() {
        return String::new();
    }

    let mut out = String::from("| |");
    for name in &matrix.names {
        out.push_str(&format!(" {} |", name));
    }
    out.push_str("\n|:--|");
    for _ in &matrix.names {
        out.push_str("--:|");
    }
    out.push('\n');

    for (name, row) in matrix.names.iter().zip(&matrix.values) {
        out.push_str(&format!("| {} |", name));
        for v in row {
            out.push_str(&format!(" {:.2} |", v));
        }
        out.push('\n');
    }
    out
}

impl ReportPort for MarkdownReport {
    fn render(&self, result: &ComparisonResult) -> String {
        let mut out = format!(
            "## Backtest Result: {} ({} to {})\n\n",
            result.ticker,
            format_date(result.start_date),
            format_date(result.end_date)
        );
        out.push_str(&format_metrics_table(&result.results));

        if !result.results.is_empty() {
            let s = &result.summary;
            out.push_str("\n### Summary\n\n");
            out.push_str(&format!("- Best performer: {}\n", s.best_performer));
            out.push_str(&format!("- Worst performer: {}\n", s.worst_performer));
            out.push_str(&format!("- Best Sharpe ratio: {}\n", s.best_sharpe));
            out.push_str(&format!("- Lowest drawdown: {}\n", s.lowest_drawdown));

            out.push_str("\n### Correlation\n\n");
            out.push_str(&format_correlation_table(result));
        }
        out
    }
}
