//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_recorder::{CsvRecorder, DEFAULT_LOG_FILE};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::markdown_report::MarkdownReport;
use crate::domain::backtest::{SimulationConfig, DEFAULT_RISK_FREE_RATE};
use crate::domain::calculator::{run_job, CalculationRecord};
use crate::domain::comparison::{compare_ticker, ComparisonRequest, StrategyOverrides};
use crate::domain::config_validation::validate_job_config;
use crate::domain::error::AavcError;
use crate::domain::jobs::{
    lookback_days, prepare_calculation_jobs, price_dir, CalculationJob, DEFAULT_LOOKBACK_DAYS,
    DEFAULT_PRICE_DIR, DEFAULT_STRATEGY,
};
use crate::domain::params::{ParamValue, StrategyParameters};
use crate::domain::registry::{build_registry, StrategyRegistry};
use crate::domain::sizing::DEFAULT_ASYMMETRIC_COEFFICIENT;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "aavc",
    about = "Adaptive value-averaging calculator and strategy backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Calculate today's investment amount for a ticker or a job config
    Calc {
        #[arg(short, long, conflicts_with = "config", required_unless_present = "config")]
        ticker: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Base investment amount (required with --ticker)
        #[arg(short, long)]
        amount: Option<f64>,
        /// Reference price; defaults to the oldest price in the lookback window
        #[arg(short, long)]
        ref_price: Option<f64>,
        #[arg(long, default_value_t = DEFAULT_ASYMMETRIC_COEFFICIENT)]
        asymmetric_coefficient: f64,
        #[arg(short, long, default_value = DEFAULT_STRATEGY)]
        strategy: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Last date to consider (YYYY-MM-DD); defaults to today
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        lookback_days: Option<i64>,
        #[arg(long, default_value = DEFAULT_LOG_FILE)]
        log_file: PathBuf,
    },
    /// Compare strategies over a historical period
    Backtest {
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
        #[arg(short, long)]
        amount: f64,
        #[arg(long)]
        ref_price: Option<f64>,
        #[arg(long)]
        asymmetric_coefficient: Option<f64>,
        /// Comma-separated strategy names; defaults to the built-in set
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,
        /// Per-strategy override, e.g. aavc_ma.window_size=50
        #[arg(long = "set", value_name = "STRATEGY.KEY=VALUE")]
        overrides: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_RISK_FREE_RATE)]
        risk_free_rate: f64,
        #[arg(long, default_value = DEFAULT_PRICE_DIR)]
        data_dir: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List registered strategies and their parameters
    ListStrategies,
    /// Validate a job configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let registry = build_registry();
    match cli.command {
        Command::Calc {
            ticker,
            config,
            amount,
            ref_price,
            asymmetric_coefficient,
            strategy,
            data_dir,
            end_date,
            lookback_days,
            log_file,
        } => {
            let end_date = end_date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let recorder = CsvRecorder::new(&log_file);
            match (ticker, config) {
                (_, Some(config)) => run_calc_config(
                    &registry,
                    &config,
                    data_dir.as_deref(),
                    end_date,
                    lookback_days,
                    &recorder,
                ),
                (Some(ticker), None) => {
                    let Some(base_amount) = amount else {
                        eprintln!("error: --amount is required when --ticker is specified");
                        return ExitCode::from(2);
                    };
                    let job = CalculationJob {
                        ticker: ticker.to_uppercase(),
                        base_amount,
                        reference_price: ref_price,
                        asymmetric_coefficient,
                        strategy,
                    };
                    let port = CsvPriceAdapter::new(
                        data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_PRICE_DIR)),
                    );
                    run_calc_jobs(
                        &registry,
                        &port,
                        &[job],
                        end_date,
                        lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS),
                        &recorder,
                    )
                }
                (None, None) => {
                    eprintln!("error: one of --ticker or --config is required");
                    ExitCode::from(2)
                }
            }
        }
        Command::Backtest {
            ticker,
            start_date,
            end_date,
            amount,
            ref_price,
            asymmetric_coefficient,
            strategies,
            overrides,
            risk_free_rate,
            data_dir,
            output,
        } => {
            let overrides = match build_overrides(&overrides) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            let request = ComparisonRequest {
                ticker: ticker.to_uppercase(),
                start_date,
                end_date,
                base_parameters: base_parameters(amount, ref_price, asymmetric_coefficient),
                overrides,
                strategies,
                config: SimulationConfig { risk_free_rate },
            };
            let port = CsvPriceAdapter::new(data_dir);
            run_backtest(&registry, &port, &request, output.as_deref())
        }
        Command::ListStrategies => run_list_strategies(&registry),
        Command::Validate { config } => run_validate(&registry, &config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Global parameters shared by every strategy in a comparison.
pub fn base_parameters(
    amount: f64,
    ref_price: Option<f64>,
    asymmetric_coefficient: Option<f64>,
) -> StrategyParameters {
    let mut params = StrategyParameters::new().with("base_amount", amount);
    if let Some(r) = ref_price {
        params.insert("ref_price", r);
    }
    if let Some(k) = asymmetric_coefficient {
        params.insert("asymmetric_coefficient", k);
    }
    params
}

/// Parse one `strategy.key=value` override.
pub fn parse_override(raw: &str) -> Result<(String, String, ParamValue), AavcError> {
    let invalid = |reason: &str| AavcError::config_invalid("--set", raw, reason);
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid("expected STRATEGY.KEY=VALUE"))?;
    let (strategy, key) = target
        .trim()
        .split_once('.')
        .ok_or_else(|| invalid("expected STRATEGY.KEY=VALUE"))?;
    if strategy.is_empty() || key.is_empty() {
        return Err(invalid("strategy and key must be non-empty"));
    }
    Ok((
        strategy.to_string(),
        key.to_string(),
        ParamValue::parse(value.trim()),
    ))
}

pub fn build_overrides(raw: &[String]) -> Result<StrategyOverrides, AavcError> {
    let mut overrides = StrategyOverrides::new();
    for item in raw {
        let (strategy, key, value) = parse_override(item)?;
        overrides.entry(strategy).or_default().insert(&key, value);
    }
    Ok(overrides)
}

fn run_calc_config(
    registry: &StrategyRegistry,
    config_path: &Path,
    data_dir: Option<&Path>,
    end_date: NaiveDate,
    lookback_override: Option<i64>,
    recorder: &CsvRecorder,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_job_config(&adapter, registry) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let jobs = match prepare_calculation_jobs(&adapter) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let dir = data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(price_dir(&adapter)));
    let port = CsvPriceAdapter::new(dir);
    let lookback = lookback_override.unwrap_or_else(|| lookback_days(&adapter));
    run_calc_jobs(registry, &port, &jobs, end_date, lookback, recorder)
}

/// Run each job independently; failures are reported and skipped.
///
/// Exits non-zero only when no job succeeded.
pub fn run_calc_jobs(
    registry: &StrategyRegistry,
    port: &dyn PricePort,
    jobs: &[CalculationJob],
    end_date: NaiveDate,
    lookback_days: i64,
    recorder: &CsvRecorder,
) -> ExitCode {
    let mut first_error: Option<AavcError> = None;
    let mut succeeded = 0usize;

    for job in jobs {
        match run_job(registry, port, job, end_date, lookback_days) {
            Ok(record) => {
                if let Err(e) = recorder.record(&record) {
                    warn!(ticker = %job.ticker, "{e}");
                    eprintln!("warning: {e}");
                }
                println!("{}", format_calc_result(&record));
                succeeded += 1;
            }
            Err(e) => {
                eprintln!("error for {}: {e}; skipping", job.ticker);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if succeeded == 0 => (&e).into(),
        _ => ExitCode::SUCCESS,
    }
}

pub fn format_calc_result(record: &CalculationRecord) -> String {
    let reference = record
        .reference_price
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "--- Calculation Result ---\n\
         Ticker: {}\n\
         Date: {}\n\
         Strategy: {}\n\
         Current Price: {:.2}\n\
         Reference Price: {}\n\
         Investment Amount: {:.0}\n\
         --------------------------",
        record.ticker,
        record.date.format("%Y-%m-%d"),
        record.strategy,
        record.current_price,
        reference,
        record.calculated_investment
    )
}

pub fn run_backtest(
    registry: &StrategyRegistry,
    port: &dyn PricePort,
    request: &ComparisonRequest,
    output: Option<&Path>,
) -> ExitCode {
    eprintln!(
        "Running backtest: {} from {} to {}",
        request.ticker, request.start_date, request.end_date
    );
    let result = match compare_ticker(port, registry, request) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let report = MarkdownReport;
    println!("{}", report.render(&result));

    if let Some(path) = output {
        let Some(path_str) = path.to_str() else {
            eprintln!("error: output path is not valid UTF-8");
            return ExitCode::from(1);
        };
        if let Err(e) = report.write(&result, path_str) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("Report written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_list_strategies(registry: &StrategyRegistry) -> ExitCode {
    for name in registry.list_names() {
        let Some(meta) = registry.get_metadata(&name) else {
            continue;
        };
        println!("{} (v{}, {})", meta.name, meta.version, meta.category);
        println!("  {}", meta.description);
        for (key, spec) in &meta.parameters {
            let default = spec
                .default
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string());
            println!(
                "    {:<28} {:<6} default={:<10} {}",
                key,
                spec.kind.to_string(),
                default,
                spec.description
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(registry: &StrategyRegistry, config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_job_config(&adapter, registry) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    match prepare_calculation_jobs(&adapter) {
        Ok(jobs) => {
            for job in &jobs {
                let reference = job
                    .reference_price
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "oldest".to_string());
                eprintln!(
                    "  {}: base_amount={} reference={} k={} strategy={}",
                    job.ticker, job.base_amount, reference, job.asymmetric_coefficient, job.strategy
                );
            }
            eprintln!("\nConfiguration is valid: {} job(s).", jobs.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
