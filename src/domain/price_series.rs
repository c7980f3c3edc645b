//! Daily closing-price series.

use chrono::NaiveDate;

use super::error::AavcError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ascending, duplicate-free (date, close) sequence for one ticker.
///
/// Calendar gaps from non-trading days are kept as-is. The series is
/// immutable once built; strategies only ever see slices of it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    prices: Vec<f64>,
    dates: Vec<NaiveDate>,
}

impl PriceSeries {
    pub fn new(ticker: &str, points: Vec<PricePoint>) -> Result<Self, AavcError> {
        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) =
            points.into_iter().map(|p| (p.date, p.close)).unzip();
        Self::from_parallel(ticker, prices, dates)
    }

    /// Build from the parallel `(prices, dates)` shape price sources return.
    pub fn from_parallel(
        ticker: &str,
        prices: Vec<f64>,
        dates: Vec<NaiveDate>,
    ) -> Result<Self, AavcError> {
        let fail = |reason: String| AavcError::DataFetch {
            ticker: ticker.to_string(),
            reason,
        };

        if prices.len() != dates.len() {
            return Err(fail(format!(
                "{} prices but {} dates",
                prices.len(),
                dates.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(fail(format!(
                "dates not strictly ascending: {} followed by {}",
                w[0], w[1]
            )));
        }
        if let Some((i, p)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(fail(format!("invalid close {} on {}", p, dates[i])));
        }

        Ok(Self {
            ticker: ticker.to_string(),
            prices,
            dates,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    pub fn point(&self, index: usize) -> Option<PricePoint> {
        Some(PricePoint {
            date: *self.dates.get(index)?,
            close: *self.prices.get(index)?,
        })
    }
}
