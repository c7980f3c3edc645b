//! Name → factory mapping for strategies.
//!
//! Every lookup builds a fresh instance so no two runs ever share a
//! strategy object.

use std::collections::BTreeMap;

use super::strategy::{
    AavcStrategy, BuyAndHoldStrategy, DcaStrategy, Strategy, StrategyMetadata,
    ThresholdDropStrategy,
};

pub type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

#[derive(Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, factory: StrategyFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn get(&self, name: &str) -> Option<Box<dyn Strategy>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names in ascending order.
    pub fn list_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn get_metadata(&self, name: &str) -> Option<StrategyMetadata> {
        self.get(name).map(|s| s.metadata().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("names", &self.list_names())
            .finish()
    }
}

/// Wrap a constructor as a [`StrategyFactory`].
pub fn factory<S: Strategy + 'static>(make: fn() -> S) -> StrategyFactory {
    Box::new(move || -> Box<dyn Strategy> { Box::new(make()) })
}

/// Registry holding every built-in strategy.
pub fn build_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register("aavc_static", factory(AavcStrategy::static_reference));
    registry.register("aavc_dynamic", factory(AavcStrategy::dynamic_reset));
    registry.register("aavc_ma", factory(AavcStrategy::moving_average));
    registry.register("aavc_highest_reset", factory(AavcStrategy::highest_reset));
    registry.register(
        "aavc_highest_in_history",
        factory(AavcStrategy::highest_in_history),
    );
    registry.register("dca", factory(DcaStrategy::default));
    registry.register("buy_and_hold", factory(BuyAndHoldStrategy::default));
    registry.register(
        "minus_five_percent_rule",
        factory(ThresholdDropStrategy::default),
    );
    registry
}
