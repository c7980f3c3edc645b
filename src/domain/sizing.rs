//! AAVC investment-amount formula.
//!
//! amount = base * (1 + k * deviation * (1 + volatility / 0.01)),
//! clamped to `[0, base * max_investment_multiplier]`, where
//! deviation = (reference - current) / reference and volatility is the mean
//! absolute day-over-day change across the supplied history.

pub const DEFAULT_ASYMMETRIC_COEFFICIENT: f64 = 2.0;
pub const DEFAULT_MAX_INVESTMENT_MULTIPLIER: f64 = 3.0;

/// Volatility level that maps to an adjustment factor of 2.
const BASELINE_VOLATILITY: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingInputs {
    pub base_amount: f64,
    pub reference_price: f64,
    pub current_price: f64,
    pub asymmetric_coefficient: f64,
    pub max_investment_multiplier: f64,
}

impl SizingInputs {
    pub fn new(base_amount: f64, reference_price: f64, current_price: f64) -> Self {
        Self {
            base_amount,
            reference_price,
            current_price,
            asymmetric_coefficient: DEFAULT_ASYMMETRIC_COEFFICIENT,
            max_investment_multiplier: DEFAULT_MAX_INVESTMENT_MULTIPLIER,
        }
    }

    pub fn ceiling(&self) -> f64 {
        self.base_amount * self.max_investment_multiplier
    }
}

/// Mean absolute day-over-day percentage change; 0 with fewer than 2 points.
///
/// A zero previous price contributes no change rather than a non-finite one.
pub fn trailing_volatility(price_history: &[f64]) -> f64 {
    if price_history.len() < 2 {
        return 0.0;
    }
    let changes: f64 = price_history
        .windows(2)
        .map(|w| {
            if w[0] != 0.0 {
                ((w[1] - w[0]) / w[0]).abs()
            } else {
                0.0
            }
        })
        .sum();
    changes / (price_history.len() - 1) as f64
}

/// (reference - current) / reference; 0 when reference is 0.
pub fn deviation_rate(reference_price: f64, current_price: f64) -> f64 {
    if reference_price == 0.0 {
        0.0
    } else {
        (reference_price - current_price) / reference_price
    }
}

pub fn volatility_adjustment(volatility: f64) -> f64 {
    1.0 + volatility / BASELINE_VOLATILITY
}

/// Compute the clamped AAVC amount for one investment period.
pub fn aavc_amount(inputs: &SizingInputs, price_history: &[f64]) -> f64 {
    let volatility = trailing_volatility(price_history);
    let deviation = deviation_rate(inputs.reference_price, inputs.current_price);
    let adjusted_rate =
        inputs.asymmetric_coefficient * deviation * volatility_adjustment(volatility);
    let raw = inputs.base_amount * (1.0 + adjusted_rate);

    if !raw.is_finite() || raw < 0.0 {
        return 0.0;
    }
    raw.min(inputs.ceiling())
}
