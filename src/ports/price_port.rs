//! Price retrieval port trait.

use crate::domain::error::AavcError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

pub trait PricePort {
    /// Daily closes for `ticker` within `[start_date, end_date]`, ascending.
    ///
    /// Fails with [`AavcError::TickerNotFound`] when the range holds no data
    /// and [`AavcError::DataFetch`] for any other retrieval problem.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AavcError>;
}
