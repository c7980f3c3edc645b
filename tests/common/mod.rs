#![allow(dead_code)]

use aavc::domain::error::AavcError;
use aavc::domain::price_series::PriceSeries;
use aavc::ports::price_port::PricePort;
use chrono::{Duration, NaiveDate};
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockPricePort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.data.insert(series.ticker().to_string(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AavcError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AavcError::DataFetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(ticker)
            .cloned()
            .ok_or_else(|| AavcError::TickerNotFound {
                ticker: ticker.to_string(),
                start: start_date,
                end: end_date,
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting at `start`.
pub fn daily_series(ticker: &str, start: NaiveDate, prices: &[f64]) -> PriceSeries {
    let dates = (0..prices.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    PriceSeries::from_parallel(ticker, prices.to_vec(), dates).unwrap()
}

/// One price on the first day of each consecutive month.
pub fn monthly_series(ticker: &str, year: i32, prices: &[f64]) -> PriceSeries {
    let dates = (0..prices.len())
        .map(|i| date(year + (i / 12) as i32, (i % 12) as u32 + 1, 1))
        .collect();
    PriceSeries::from_parallel(ticker, prices.to_vec(), dates).unwrap()
}

/// CSV text in the `date,close` layout the file adapter reads.
pub fn series_csv(series: &PriceSeries) -> String {
    let mut out = String::from("date,close\n");
    for (d, p) in series.dates().iter().zip(series.prices()) {
        out.push_str(&format!("{},{}\n", d.format("%Y-%m-%d"), p));
    }
    out
}
