//! CSV file price adapter.
//!
//! Reads `<base_path>/<TICKER>.csv`. The header must name a `date`
//! (YYYY-MM-DD) and a `close` column, case-insensitively; any other
//! columns are ignored.

use crate::domain::error::AavcError;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AavcError> {
        let not_found = || AavcError::TickerNotFound {
            ticker: ticker.to_string(),
            start: start_date,
            end: end_date,
        };
        let fetch_err = |reason: String| AavcError::DataFetch {
            ticker: ticker.to_string(),
            reason,
        };

        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(fetch_err(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| fetch_err(format!("CSV header error: {}", e)))?
            .clone();
        let date_idx =
            column(&headers, "date").ok_or_else(|| fetch_err("missing date column".into()))?;
        let close_idx =
            column(&headers, "close").ok_or_else(|| fetch_err("missing close column".into()))?;

        // Later rows win on duplicate dates.
        let mut closes: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| fetch_err(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_idx)
                .ok_or_else(|| fetch_err("missing date value".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| fetch_err(format!("invalid date format: {}", e)))?;

            if date < start_date || date > end_date {
                continue;
            }

            let close: f64 = record
                .get(close_idx)
                .ok_or_else(|| fetch_err("missing close value".into()))?
                .trim()
                .parse()
                .map_err(|e| fetch_err(format!("invalid close value: {}", e)))?;

            closes.insert(date, close);
        }

        if closes.is_empty() {
            return Err(not_found());
        }

        let points = closes
            .into_iter()
            .map(|(date, close)| PricePoint { date, close })
            .collect();
        PriceSeries::new(ticker, points)
    }
}
