//! Reference-price policies feeding the AAVC sizing formula.
//!
//! Each policy answers "what is fair value this period?" given the current
//! price, the price history up to and including the current period, the
//! resolved parameters, and the run's [`StrategyContext`].

use super::context::StrategyContext;
use super::params::StrategyParameters;

pub const DEFAULT_RESET_THRESHOLD: f64 = 2.0;
pub const DEFAULT_DYNAMIC_RESET_FACTOR: f64 = 0.8;
pub const DEFAULT_WINDOW_SIZE: usize = 200;
pub const DEFAULT_HIGHEST_RESET_FACTOR: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePricePolicy {
    /// `ref_price` if given, else the oldest price in history.
    Static,
    /// Ratchets the reference up to `current * ref_price_reset_factor` once
    /// price exceeds `reference * ref_price_reset_threshold`.
    DynamicReset,
    /// Mean of the trailing `window_size` prices; oldest price until the
    /// window fills.
    MovingAverage,
    /// `running_max * reset_factor`, recomputed on each new running maximum.
    HighestPriceReset,
    /// `max(history) * reset_factor`, recomputed from scratch every call.
    HighestInHistory,
}

impl ReferencePricePolicy {
    pub fn compute(
        self,
        current_price: f64,
        history: &[f64],
        params: &StrategyParameters,
        ctx: &mut StrategyContext,
    ) -> f64 {
        let oldest = history.first().copied().unwrap_or(current_price);
        match self {
            ReferencePricePolicy::Static => match params.get_f64("ref_price") {
                Some(fixed) => fixed,
                None => history.first().copied().unwrap_or(0.0),
            },
            ReferencePricePolicy::DynamicReset => {
                let threshold =
                    params.f64_or("ref_price_reset_threshold", DEFAULT_RESET_THRESHOLD);
                let factor = params.f64_or("ref_price_reset_factor", DEFAULT_DYNAMIC_RESET_FACTOR);

                let mut reference = ctx
                    .effective_reference
                    .or_else(|| params.get_f64("ref_price"))
                    .unwrap_or(oldest);
                if current_price > reference * threshold {
                    reference = current_price * factor;
                }
                ctx.effective_reference = Some(reference);
                reference
            }
            ReferencePricePolicy::MovingAverage => {
                let window = params
                    .get_i64("window_size")
                    .map(|w| w.max(1) as usize)
                    .unwrap_or(DEFAULT_WINDOW_SIZE);
                if history.len() < window {
                    return oldest;
                }
                let tail = &history[history.len() - window..];
                tail.iter().sum::<f64>() / window as f64
            }
            ReferencePricePolicy::HighestPriceReset => {
                let factor = params.f64_or("reset_factor", DEFAULT_HIGHEST_RESET_FACTOR);

                let (mut highest, mut reference) = match (ctx.highest_seen, ctx.effective_reference)
                {
                    (Some(h), Some(r)) => (h, r),
                    _ => (oldest, oldest * factor),
                };
                if current_price > highest {
                    highest = current_price;
                    reference = highest * factor;
                }
                ctx.highest_seen = Some(highest);
                ctx.effective_reference = Some(reference);
                reference
            }
            ReferencePricePolicy::HighestInHistory => {
                let factor = params.f64_or("reset_factor", DEFAULT_HIGHEST_RESET_FACTOR);
                history
                    .iter()
                    .copied()
                    .reduce(f64::max)
                    .map_or(0.0, |max| max * factor)
            }
        }
    }
}
