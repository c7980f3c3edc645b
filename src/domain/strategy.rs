//! Strategy interface, metadata, and the built-in strategies.

use chrono::NaiveDate;

use super::context::StrategyContext;
use super::error::AavcError;
use super::params::{InvestmentFrequency, ParamSchema, ParamSpec, StrategyParameters};
use super::reference_price::ReferencePricePolicy;
use super::schedule::{is_investment_day, previous_month_close_index};
use super::sizing::{aavc_amount, SizingInputs};

/// Immutable descriptor used for discovery and default resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub category: String,
    pub parameters: ParamSchema,
}

impl StrategyMetadata {
    pub fn new(name: &str, description: &str, version: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            version: version.to_string(),
            category: category.to_string(),
            parameters: ParamSchema::new(),
        }
    }

    pub fn param(mut self, name: &str, spec: ParamSpec) -> Self {
        self.parameters.insert(name.to_string(), spec);
        self
    }

    pub fn recognizes(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn default_parameters(&self) -> StrategyParameters {
        StrategyParameters::resolve(
            &self.parameters,
            &StrategyParameters::new(),
            &StrategyParameters::new(),
        )
    }
}

/// Uniform interface every strategy implements.
///
/// Strategies hold no run state of their own; anything that must persist
/// across periods lives in the [`StrategyContext`] the caller owns.
pub trait Strategy: Send + Sync {
    fn metadata(&self) -> &StrategyMetadata;

    /// Amount to invest for the last period of the supplied history.
    ///
    /// `price_history` and `date_history` run up to and including the
    /// current period. The result is always finite and non-negative.
    fn calculate_investment(
        &self,
        current_price: f64,
        price_history: &[f64],
        date_history: &[NaiveDate],
        params: &StrategyParameters,
        ctx: &mut StrategyContext,
    ) -> f64;

    fn validate_parameters(&self, params: &StrategyParameters) -> Result<(), AavcError> {
        let meta = self.metadata();
        params.check_kinds(&meta.name, &meta.parameters)
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }
}

fn frequency(params: &StrategyParameters) -> InvestmentFrequency {
    params
        .get_str("investment_frequency")
        .and_then(|s| s.parse().ok())
        .unwrap_or(InvestmentFrequency::Monthly)
}

/// Shared range checks for the parameters the built-in strategies declare.
fn validate_ranges(meta: &StrategyMetadata, params: &StrategyParameters) -> Result<(), AavcError> {
    params.check_kinds(&meta.name, &meta.parameters)?;

    let fail = |reason: String| Err(AavcError::invalid_params(&meta.name, reason));
    let positive = |key: &str| params.get_f64(key).is_none_or(|v| v.is_finite() && v > 0.0);

    for key in [
        "base_amount",
        "initial_amount",
        "ref_price",
        "ref_price_reset_threshold",
        "ref_price_reset_factor",
        "reset_factor",
    ] {
        if meta.recognizes(key) && !positive(key) {
            return fail(format!("{} must be positive", key));
        }
    }
    if let Some(k) = params.get_f64("asymmetric_coefficient") {
        if !k.is_finite() || k < 0.0 {
            return fail("asymmetric_coefficient must be non-negative".to_string());
        }
    }
    if let Some(m) = params.get_f64("max_investment_multiplier") {
        if !m.is_finite() || m < 1.0 {
            return fail("max_investment_multiplier must be at least 1".to_string());
        }
    }
    if let Some(w) = params.get_i64("window_size") {
        if w < 1 {
            return fail("window_size must be at least 1".to_string());
        }
    }
    if let Some(d) = params.get_f64("drop_percentage") {
        if !(d > 0.0 && d < 1.0) {
            return fail("drop_percentage must be between 0 and 1".to_string());
        }
    }
    if let Some(f) = params.get_str("investment_frequency") {
        if let Err(reason) = f.parse::<InvestmentFrequency>() {
            return fail(reason);
        }
    }
    Ok(())
}

fn aavc_metadata(name: &str, description: &str, version: &str) -> StrategyMetadata {
    StrategyMetadata::new(name, description, version, "value_averaging")
        .param("base_amount", ParamSpec::float(5000.0, "Base investment amount"))
        .param(
            "asymmetric_coefficient",
            ParamSpec::float(2.0, "Asymmetry coefficient applied to price deviation"),
        )
        .param(
            "max_investment_multiplier",
            ParamSpec::float(3.0, "Cap on the amount as a multiple of base_amount"),
        )
        .param(
            "investment_frequency",
            ParamSpec::text("monthly", "Investment frequency (daily/monthly)"),
        )
}

/// AAVC sizing driven by a pluggable reference-price policy.
#[derive(Debug, Clone)]
pub struct AavcStrategy {
    policy: ReferencePricePolicy,
    metadata: StrategyMetadata,
}

impl AavcStrategy {
    pub fn static_reference() -> Self {
        Self {
            policy: ReferencePricePolicy::Static,
            metadata: aavc_metadata(
                "aavc_static",
                "AAVC with Static Reference Price Strategy",
                "1.0",
            )
            .param(
                "ref_price",
                ParamSpec::optional_float("Fixed reference price (defaults to the first price)"),
            ),
        }
    }

    pub fn dynamic_reset() -> Self {
        Self {
            policy: ReferencePricePolicy::DynamicReset,
            metadata: aavc_metadata(
                "aavc_dynamic",
                "AAVC with Dynamic Reference Price Reset Strategy",
                "2.0",
            )
            .param(
                "ref_price",
                ParamSpec::optional_float("Initial reference price (defaults to the first price)"),
            )
            .param(
                "ref_price_reset_threshold",
                ParamSpec::float(2.0, "Reset once price exceeds reference times this"),
            )
            .param(
                "ref_price_reset_factor",
                ParamSpec::float(0.8, "New reference as a fraction of the current price"),
            ),
        }
    }

    pub fn moving_average() -> Self {
        Self {
            policy: ReferencePricePolicy::MovingAverage,
            metadata: aavc_metadata(
                "aavc_ma",
                "AAVC with Moving Average Reference Price Strategy",
                "1.0",
            )
            .param(
                "window_size",
                ParamSpec::int(200, "Moving average window in periods"),
            ),
        }
    }

    pub fn highest_reset() -> Self {
        Self {
            policy: ReferencePricePolicy::HighestPriceReset,
            metadata: aavc_metadata(
                "aavc_highest_reset",
                "AAVC with Reference Price Reset on New Highest Price",
                "1.0",
            )
            .param(
                "reset_factor",
                ParamSpec::float(0.85, "Reference as a fraction of the running high"),
            ),
        }
    }

    pub fn highest_in_history() -> Self {
        Self {
            policy: ReferencePricePolicy::HighestInHistory,
            metadata: aavc_metadata(
                "aavc_highest_in_history",
                "AAVC with Reference Price based on Highest Price in Current History",
                "1.0",
            )
            .param(
                "reset_factor",
                ParamSpec::float(0.85, "Reference as a fraction of the history high"),
            ),
        }
    }

    pub fn policy(&self) -> ReferencePricePolicy {
        self.policy
    }
}

impl Strategy for AavcStrategy {
    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn calculate_investment(
        &self,
        current_price: f64,
        price_history: &[f64],
        date_history: &[NaiveDate],
        params: &StrategyParameters,
        ctx: &mut StrategyContext,
    ) -> f64 {
        if !is_investment_day(date_history, frequency(params)) || price_history.is_empty() {
            return 0.0;
        }

        let reference_price = self
            .policy
            .compute(current_price, price_history, params, ctx);
        ctx.last_reference = Some(reference_price);

        let inputs = SizingInputs {
            base_amount: params.f64_or("base_amount", 5000.0),
            reference_price,
            current_price,
            asymmetric_coefficient: params.f64_or("asymmetric_coefficient", 2.0),
            max_investment_multiplier: params.f64_or("max_investment_multiplier", 3.0),
        };
        aavc_amount(&inputs, price_history)
    }

    fn validate_parameters(&self, params: &StrategyParameters) -> Result<(), AavcError> {
        validate_ranges(&self.metadata, params)
    }
}

/// Dollar-cost averaging: a fixed amount on every investment day.
#[derive(Debug, Clone)]
pub struct DcaStrategy {
    metadata: StrategyMetadata,
}

impl Default for DcaStrategy {
    fn default() -> Self {
        Self {
            metadata: StrategyMetadata::new(
                "dca",
                "Dollar Cost Averaging Strategy",
                "1.0",
                "systematic",
            )
            .param("base_amount", ParamSpec::float(5000.0, "Amount per investment"))
            .param(
                "investment_frequency",
                ParamSpec::text("monthly", "Investment frequency (daily/monthly)"),
            ),
        }
    }
}

impl Strategy for DcaStrategy {
    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn calculate_investment(
        &self,
        _current_price: f64,
        _price_history: &[f64],
        date_history: &[NaiveDate],
        params: &StrategyParameters,
        _ctx: &mut StrategyContext,
    ) -> f64 {
        if is_investment_day(date_history, frequency(params)) {
            params.f64_or("base_amount", 5000.0)
        } else {
            0.0
        }
    }

    fn validate_parameters(&self, params: &StrategyParameters) -> Result<(), AavcError> {
        validate_ranges(&self.metadata, params)
    }
}

/// Single lump investment on the first period.
#[derive(Debug, Clone)]
pub struct BuyAndHoldStrategy {
    metadata: StrategyMetadata,
}

impl Default for BuyAndHoldStrategy {
    fn default() -> Self {
        Self {
            metadata: StrategyMetadata::new(
                "buy_and_hold",
                "Buy and Hold Strategy",
                "1.0",
                "passive",
            )
            .param(
                "initial_amount",
                ParamSpec::float(100_000.0, "Lump sum invested on the first period"),
            ),
        }
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn calculate_investment(
        &self,
        _current_price: f64,
        price_history: &[f64],
        _date_history: &[NaiveDate],
        params: &StrategyParameters,
        _ctx: &mut StrategyContext,
    ) -> f64 {
        if price_history.len() == 1 {
            params.f64_or("initial_amount", 100_000.0)
        } else {
            0.0
        }
    }

    fn validate_parameters(&self, params: &StrategyParameters) -> Result<(), AavcError> {
        validate_ranges(&self.metadata, params)
    }
}

/// Lump-sum purchase when price has dropped a given fraction below the
/// previous month's close.
///
/// Monthly runs judge the month that just ended: on the first trading day
/// of a new month, that month's last close is compared with the close of
/// the month before it. Daily runs compare the current price with the
/// previous month's close every period.
#[derive(Debug, Clone)]
pub struct ThresholdDropStrategy {
    metadata: StrategyMetadata,
}

impl Default for ThresholdDropStrategy {
    fn default() -> Self {
        Self {
            metadata: StrategyMetadata::new(
                "minus_five_percent_rule",
                "Buy a lump sum when price drops by a percentage from previous month's close.",
                "1.2",
                "event_driven",
            )
            .param("base_amount", ParamSpec::float(10_000.0, "Lump sum to invest"))
            .param(
                "drop_percentage",
                ParamSpec::float(0.05, "Drop threshold as a fraction (0.05 = 5%)"),
            )
            .param(
                "investment_frequency",
                ParamSpec::text("monthly", "Check frequency (daily/monthly)"),
            ),
        }
    }
}

impl Strategy for ThresholdDropStrategy {
    fn metadata(&self) -> &StrategyMetadata {
        &self.metadata
    }

    fn calculate_investment(
        &self,
        current_price: f64,
        price_history: &[f64],
        date_history: &[NaiveDate],
        params: &StrategyParameters,
        _ctx: &mut StrategyContext,
    ) -> f64 {
        let n = price_history.len().min(date_history.len());
        let freq = frequency(params);
        if n < 2 || !is_investment_day(&date_history[..n], freq) {
            return 0.0;
        }
        let (observed, window) = match freq {
            InvestmentFrequency::Daily => (current_price, n),
            InvestmentFrequency::Monthly => (price_history[n - 2], n - 1),
        };
        let Some(prev_close) = previous_month_close_index(&date_history[..window])
            .and_then(|i| price_history.get(i).copied())
        else {
            return 0.0;
        };
        if prev_close <= 0.0 {
            return 0.0;
        }

        let drop = params.f64_or("drop_percentage", 0.05);
        if (prev_close - observed) / prev_close >= drop {
            params.f64_or("base_amount", 10_000.0)
        } else {
            0.0
        }
    }

    fn validate_parameters(&self, params: &StrategyParameters) -> Result<(), AavcError> {
        validate_ranges(&self.metadata, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn jan_dates(n: u32) -> Vec<NaiveDate> {
        (1..=n).map(|i| d(2023, 1, i)).collect()
    }

    fn daily_params(base: f64) -> StrategyParameters {
        StrategyParameters::new()
            .with("base_amount", base)
            .with("asymmetric_coefficient", 2.0)
            .with("max_investment_multiplier", 3.0)
            .with("investment_frequency", "daily")
    }

    fn last_amount(
        strategy: &dyn Strategy,
        prices: &[f64],
        dates: &[NaiveDate],
        params: &StrategyParameters,
    ) -> f64 {
        let mut ctx = StrategyContext::new();
        let current = *prices.last().unwrap_or(&0.0);
        strategy.calculate_investment(current, prices, dates, params, &mut ctx)
    }

    mod aavc_static {
        use super::*;

        #[test]
        fn metadata() {
            let s = AavcStrategy::static_reference();
            assert_eq!(s.name(), "aavc_static");
            assert!(s.metadata().description.contains("Static Reference Price"));
            assert!(s.metadata().recognizes("base_amount"));
            assert!(s.metadata().recognizes("ref_price"));
            assert_eq!(s.metadata().category, "value_averaging");
        }

        #[test]
        fn price_increase_invests_less() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0).with("ref_price", 100.0);
            let amount = last_amount(&s, &[100.0, 105.0, 110.0], &jan_dates(3), &params);
            assert!(amount < 10_000.0);
            assert!(amount >= 0.0);
        }

        #[test]
        fn price_drop_invests_more() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0).with("ref_price", 100.0);
            let amount = last_amount(&s, &[100.0, 95.0, 90.0], &jan_dates(3), &params);
            assert!(amount > 10_000.0);
        }

        #[test]
        fn unchanged_price_invests_base() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0).with("ref_price", 100.0);
            let amount = last_amount(&s, &[100.0, 100.0, 100.0], &jan_dates(3), &params);
            assert_eq!(amount, 10_000.0);
        }

        #[test]
        fn steep_rally_floors_at_zero() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0).with("ref_price", 100.0);
            let amount = last_amount(&s, &[100.0, 150.0, 200.0], &jan_dates(3), &params);
            assert_eq!(amount, 0.0);
        }

        #[test]
        fn crash_caps_at_multiplier() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0).with("ref_price", 100.0);
            let amount = last_amount(&s, &[100.0, 50.0, 20.0], &jan_dates(3), &params);
            assert_eq!(amount, 30_000.0);
        }

        #[test]
        fn empty_history_invests_nothing() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0).with("ref_price", 100.0);
            let mut ctx = StrategyContext::new();
            assert_eq!(
                s.calculate_investment(100.0, &[], &[], &params, &mut ctx),
                0.0
            );
        }

        #[test]
        fn missing_ref_price_uses_first_price() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0);
            let mut ctx = StrategyContext::new();
            let amount = s.calculate_investment(
                105.0,
                &[95.0, 100.0, 105.0],
                &jan_dates(3),
                &params,
                &mut ctx,
            );
            assert!(amount < 10_000.0);
            assert_eq!(ctx.last_reference, Some(95.0));
        }

        #[test]
        fn monthly_gate_skips_mid_month_periods() {
            let s = AavcStrategy::static_reference();
            let params = daily_params(10_000.0)
                .with("ref_price", 100.0)
                .with("investment_frequency", "monthly");
            let amount = last_amount(&s, &[100.0, 50.0, 20.0], &jan_dates(3), &params);
            assert_eq!(amount, 0.0);
        }
    }

    mod aavc_highest_reset {
        use super::*;

        #[test]
        fn metadata() {
            let s = AavcStrategy::highest_reset();
            assert_eq!(s.name(), "aavc_highest_reset");
            assert!(s.metadata().recognizes("reset_factor"));
            assert_eq!(s.policy(), ReferencePricePolicy::HighestPriceReset);
        }

        #[test]
        fn monthly_feed_resets_only_at_new_high_on_investment_day() {
            let s = AavcStrategy::highest_reset();
            let params = daily_params(10_000.0)
                .with("reset_factor", 0.85)
                .with("investment_frequency", "monthly");
            let prices = [100.0, 105.0, 110.0];
            let dates = [d(2023, 1, 2), d(2023, 1, 3), d(2023, 2, 1)];
            let mut ctx = StrategyContext::new();

            let mut refs = Vec::new();
            for i in 0..prices.len() {
                s.calculate_investment(prices[i], &prices[..=i], &dates[..=i], &params, &mut ctx);
                refs.push(ctx.effective_reference.unwrap());
            }

            assert_relative_eq!(refs[0], 85.0, epsilon = 1e-9);
            assert_relative_eq!(refs[1], 85.0, epsilon = 1e-9);
            assert_relative_eq!(refs[2], 93.5, epsilon = 1e-9);
        }

        #[test]
        fn below_reference_invests_more_than_base() {
            let s = AavcStrategy::highest_reset();
            let params = daily_params(10_000.0).with("reset_factor", 0.85);
            let prices = [100.0, 90.0, 80.0];
            let dates = jan_dates(3);
            let mut ctx = StrategyContext::new();
            let mut amount = 0.0;
            for i in 0..prices.len() {
                amount =
                    s.calculate_investment(prices[i], &prices[..=i], &dates[..=i], &params, &mut ctx);
            }
            assert!(amount > 10_000.0);
        }

        #[test]
        fn new_high_above_reference_invests_less() {
            let s = AavcStrategy::highest_reset();
            let params = daily_params(10_000.0).with("reset_factor", 0.85);
            let amount = last_amount(&s, &[100.0, 105.0, 110.0], &jan_dates(3), &params);
            assert!(amount < 10_000.0);
            assert!(amount >= 0.0);
        }
    }

    mod aavc_highest_in_history {
        use super::*;

        #[test]
        fn metadata() {
            let s = AavcStrategy::highest_in_history();
            assert_eq!(s.name(), "aavc_highest_in_history");
            assert!(
                s.metadata()
                    .description
                    .contains("Highest Price in Current History")
            );
        }

        #[test]
        fn price_above_reference_invests_less() {
            let s = AavcStrategy::highest_in_history();
            let params = daily_params(10_000.0).with("reset_factor", 0.85);
            let mut ctx = StrategyContext::new();
            let amount = s.calculate_investment(
                110.0,
                &[100.0, 105.0, 110.0],
                &jan_dates(3),
                &params,
                &mut ctx,
            );
            assert!(amount < 10_000.0);
            assert_relative_eq!(ctx.last_reference.unwrap(), 93.5, epsilon = 1e-9);
        }
    }

    mod aavc_dynamic_and_ma {
        use super::*;

        #[test]
        fn dynamic_context_carries_reset_between_periods() {
            let s = AavcStrategy::dynamic_reset();
            let params = daily_params(1_000.0);
            let prices = [100.0, 250.0, 240.0];
            let dates = jan_dates(3);
            let mut ctx = StrategyContext::new();
            for i in 0..prices.len() {
                s.calculate_investment(prices[i], &prices[..=i], &dates[..=i], &params, &mut ctx);
            }
            assert_relative_eq!(ctx.effective_reference.unwrap(), 200.0, epsilon = 1e-9);
        }

        #[test]
        fn moving_average_uses_window() {
            let s = AavcStrategy::moving_average();
            let params = daily_params(1_000.0).with("window_size", 2i64);
            let mut ctx = StrategyContext::new();
            s.calculate_investment(
                30.0,
                &[10.0, 20.0, 30.0],
                &jan_dates(3),
                &params,
                &mut ctx,
            );
            assert_relative_eq!(ctx.last_reference.unwrap(), 25.0, epsilon = 1e-9);
        }
    }

    mod dca {
        use super::*;

        #[test]
        fn daily_invests_every_day() {
            let s = DcaStrategy::default();
            let params = StrategyParameters::new()
                .with("base_amount", 100.0)
                .with("investment_frequency", "daily");
            assert_eq!(last_amount(&s, &[1.0, 2.0], &jan_dates(2), &params), 100.0);
        }

        #[test]
        fn monthly_invests_on_first_day_of_month_only() {
            let s = DcaStrategy::default();
            let params = StrategyParameters::new().with("base_amount", 100.0);
            assert_eq!(last_amount(&s, &[1.0], &jan_dates(1), &params), 100.0);
            assert_eq!(last_amount(&s, &[1.0, 2.0], &jan_dates(2), &params), 0.0);
            let dates = [d(2023, 1, 31), d(2023, 2, 1)];
            assert_eq!(last_amount(&s, &[1.0, 2.0], &dates, &params), 100.0);
        }

        #[test]
        fn empty_dates_invest_nothing() {
            let s = DcaStrategy::default();
            let params = s.metadata().default_parameters();
            assert_eq!(last_amount(&s, &[], &[], &params), 0.0);
        }
    }

    mod buy_and_hold {
        use super::*;

        #[test]
        fn invests_only_on_first_period() {
            let s = BuyAndHoldStrategy::default();
            let params = StrategyParameters::new().with("initial_amount", 50_000.0);
            assert_eq!(last_amount(&s, &[100.0], &jan_dates(1), &params), 50_000.0);
            assert_eq!(
                last_amount(&s, &[100.0, 102.0], &jan_dates(2), &params),
                0.0
            );
        }

        #[test]
        fn default_initial_amount() {
            let s = BuyAndHoldStrategy::default();
            let params = s.metadata().default_parameters();
            assert_eq!(last_amount(&s, &[100.0], &jan_dates(1), &params), 100_000.0);
        }
    }

    mod threshold_drop {
        use super::*;

        fn params() -> StrategyParameters {
            StrategyParameters::new()
                .with("base_amount", 10_000.0)
                .with("drop_percentage", 0.05)
        }

        #[test]
        fn invests_on_new_month_after_monthly_drop() {
            let s = ThresholdDropStrategy::default();
            let prices = [100.0, 97.0, 94.0, 94.0];
            let dates = [d(2022, 12, 30), d(2023, 1, 30), d(2023, 1, 31), d(2023, 2, 1)];
            assert_eq!(last_amount(&s, &prices, &dates, &params()), 10_000.0);
        }

        #[test]
        fn skips_when_monthly_drop_is_below_threshold() {
            let s = ThresholdDropStrategy::default();
            let prices = [100.0, 96.0, 90.0];
            let dates = [d(2022, 12, 31), d(2023, 1, 31), d(2023, 2, 1)];
            assert_eq!(last_amount(&s, &prices, &dates, &params()), 0.0);
        }

        #[test]
        fn exact_threshold_triggers() {
            let s = ThresholdDropStrategy::default();
            let p = params().with("drop_percentage", 0.25);
            let prices = [100.0, 75.0, 75.0];
            let dates = [d(2022, 12, 31), d(2023, 1, 31), d(2023, 2, 1)];
            assert_eq!(last_amount(&s, &prices, &dates, &p), 10_000.0);
        }

        #[test]
        fn one_day_gap_across_month_boundary_is_not_a_monthly_drop() {
            let s = ThresholdDropStrategy::default();
            let prices = [100.0, 100.0, 50.0];
            let dates = [d(2022, 12, 31), d(2023, 1, 31), d(2023, 2, 1)];
            assert_eq!(last_amount(&s, &prices, &dates, &params()), 0.0);
        }

        #[test]
        fn gradual_decline_within_a_month_triggers_next_month() {
            let s = ThresholdDropStrategy::default();
            let mut dates = jan_dates(31);
            let mut prices = vec![100.0; 31];
            for day in 1..=28 {
                dates.push(d(2023, 2, day));
                prices.push(100.0 - 20.0 * day as f64 / 28.0);
            }
            dates.push(d(2023, 3, 1));
            prices.push(80.0);

            let p = params().with("investment_frequency", "monthly");
            assert_eq!(last_amount(&s, &prices, &dates, &p), 10_000.0);
            // No February day is a monthly check day that sees the decline.
            for n in 32..=59 {
                assert_eq!(last_amount(&s, &prices[..n], &dates[..n], &p), 0.0);
            }
        }

        #[test]
        fn first_month_has_no_earlier_close() {
            let s = ThresholdDropStrategy::default();
            let prices = [100.0, 50.0, 50.0];
            let dates = [d(2023, 1, 2), d(2023, 1, 31), d(2023, 2, 1)];
            assert_eq!(last_amount(&s, &prices, &dates, &params()), 0.0);
        }

        #[test]
        fn monthly_skips_mid_month_days() {
            let s = ThresholdDropStrategy::default();
            let prices = [100.0, 80.0, 80.0, 80.0];
            let dates = [d(2022, 12, 31), d(2023, 1, 31), d(2023, 2, 1), d(2023, 2, 2)];
            assert_eq!(last_amount(&s, &prices, &dates, &params()), 0.0);
        }

        #[test]
        fn daily_checks_every_day_against_previous_month() {
            let s = ThresholdDropStrategy::default();
            let p = params().with("investment_frequency", "daily");
            let prices = [100.0, 99.0, 90.0];
            let dates = [d(2023, 1, 31), d(2023, 2, 1), d(2023, 2, 2)];
            assert_eq!(last_amount(&s, &prices, &dates, &p), 10_000.0);
        }

        #[test]
        fn no_previous_month_invests_nothing() {
            let s = ThresholdDropStrategy::default();
            let p = params().with("investment_frequency", "daily");
            assert_eq!(last_amount(&s, &[100.0, 50.0], &jan_dates(2), &p), 0.0);
        }

        #[test]
        fn single_period_invests_nothing() {
            let s = ThresholdDropStrategy::default();
            assert_eq!(last_amount(&s, &[100.0], &jan_dates(1), &params()), 0.0);
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn defaults_are_valid_for_every_strategy() {
            let strategies: Vec<Box<dyn Strategy>> = vec![
                Box::new(AavcStrategy::static_reference()),
                Box::new(AavcStrategy::dynamic_reset()),
                Box::new(AavcStrategy::moving_average()),
                Box::new(AavcStrategy::highest_reset()),
                Box::new(AavcStrategy::highest_in_history()),
                Box::new(DcaStrategy::default()),
                Box::new(BuyAndHoldStrategy::default()),
                Box::new(ThresholdDropStrategy::default()),
            ];
            for s in strategies {
                let params = s.metadata().default_parameters();
                assert!(s.validate_parameters(&params).is_ok(), "{}", s.name());
            }
        }

        #[test]
        fn rejects_non_positive_base_amount() {
            let s = DcaStrategy::default();
            let params = StrategyParameters::new().with("base_amount", 0.0);
            let err = s.validate_parameters(&params).unwrap_err();
            assert!(matches!(err, AavcError::InvalidParameters { ref strategy, .. } if strategy == "dca"));
        }

        #[test]
        fn rejects_unknown_frequency() {
            let s = AavcStrategy::static_reference();
            let params = StrategyParameters::new().with("investment_frequency", "weekly");
            assert!(s.validate_parameters(&params).is_err());
        }

        #[test]
        fn rejects_multiplier_below_one() {
            let s = AavcStrategy::static_reference();
            let params = StrategyParameters::new().with("max_investment_multiplier", 0.5);
            assert!(s.validate_parameters(&params).is_err());
        }

        #[test]
        fn rejects_zero_window() {
            let s = AavcStrategy::moving_average();
            let params = StrategyParameters::new().with("window_size", 0i64);
            assert!(s.validate_parameters(&params).is_err());
        }

        #[test]
        fn rejects_drop_percentage_out_of_range() {
            let s = ThresholdDropStrategy::default();
            let params = StrategyParameters::new().with("drop_percentage", 1.5);
            assert!(s.validate_parameters(&params).is_err());
        }

        #[test]
        fn rejects_wrong_kind() {
            let s = AavcStrategy::static_reference();
            let params = StrategyParameters::new().with("ref_price", "high");
            assert!(s.validate_parameters(&params).is_err());
        }
    }
}
