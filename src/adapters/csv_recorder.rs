//! Append-only CSV log of calculated investments.

use crate::domain::calculator::CalculationRecord;
use crate::domain::error::AavcError;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "investment_log.csv";

#[derive(Debug, Serialize)]
struct LogRow<'a> {
    date: String,
    ticker: &'a str,
    strategy: &'a str,
    base_amount: f64,
    reference_price: Option<f64>,
    calculated_investment: f64,
}

impl<'a> From<&'a CalculationRecord> for LogRow<'a> {
    fn from(record: &'a CalculationRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            ticker: &record.ticker,
            strategy: &record.strategy,
            base_amount: record.base_amount,
            reference_price: record.reference_price,
            calculated_investment: record.calculated_investment,
        }
    }
}

pub struct CsvRecorder {
    path: PathBuf,
}

impl CsvRecorder {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first when the file is new or
    /// empty.
    pub fn record(&self, record: &CalculationRecord) -> Result<(), AavcError> {
        let log_err = |reason: String| AavcError::LogWrite {
            path: self.path.display().to_string(),
            reason,
        };

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| log_err(e.to_string()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(LogRow::from(record))
            .map_err(|e| log_err(e.to_string()))?;
        writer.flush().map_err(|e| log_err(e.to_string()))?;
        Ok(())
    }
}
