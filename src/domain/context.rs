//! Per-run mutable strategy state.

/// State carried across periods within one simulation run.
///
/// Every run starts from [`StrategyContext::new`]; contexts are never shared
/// between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyContext {
    /// Reference price currently in force for reset-based policies.
    pub effective_reference: Option<f64>,
    /// Highest price observed so far in this run.
    pub highest_seen: Option<f64>,
    /// Reference price used by the most recent sizing decision.
    pub last_reference: Option<f64>,
}

impl StrategyContext {
    pub fn new() -> Self {
        Self::default()
    }
}
