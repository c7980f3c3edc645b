//! Investment-day gating.
//!
//! Month boundaries are detected by looking back only: a period starts a
//! new month when its calendar month (year and month) differs from the
//! immediately preceding period's. No decision ever looks ahead.

use chrono::{Datelike, NaiveDate};

use super::params::InvestmentFrequency;

/// Whether the last date in `date_history` is an investment day.
///
/// Monthly runs invest on the first observed trading day of each calendar
/// month; the very first period always qualifies. An empty history never
/// does.
pub fn is_investment_day(date_history: &[NaiveDate], frequency: InvestmentFrequency) -> bool {
    let Some(&current) = date_history.last() else {
        return false;
    };
    match frequency {
        InvestmentFrequency::Daily => true,
        InvestmentFrequency::Monthly => match date_history.len() {
            1 => true,
            n => !same_month(current, date_history[n - 2]),
        },
    }
}

/// Index of the most recent earlier period in a different calendar month
/// than the last period, i.e. the previous month's last observed close.
pub fn previous_month_close_index(date_history: &[NaiveDate]) -> Option<usize> {
    let (&current, earlier) = date_history.split_last()?;
    earlier.iter().rposition(|&d| !same_month(d, current))
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
