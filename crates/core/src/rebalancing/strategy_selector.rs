//! Choosing a strategy by name or investor profile.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::rebalancing::strategies::{
    HybridConfig, RebalancingStrategy, ThresholdConfig, TimeBasedConfig, HYBRID, THRESHOLD_BASED,
    TIME_BASED,
};

/// Cutoffs for the profile heuristic. All overridable; the defaults mirror
/// common private-investor guidance: small conservative portfolios trade on
/// a schedule, long-horizon stable ones get the hybrid treatment, aggressive
/// ones watch thresholds.
#[derive(Clone, Debug)]
pub struct SelectorConfig {
    /// Portfolios below this value count as small
    pub small_portfolio_cutoff: Decimal,
    /// Risk tolerance (1..=5) at or below which an investor is conservative
    pub conservative_risk_max: u8,
    /// Risk tolerance at or below which an investor is stability-minded
    pub stable_risk_max: u8,
    /// Investment horizon (months) from which a horizon counts as long
    pub long_horizon_months: u32,
    /// Risk tolerance at or above which an investor is aggressive
    pub aggressive_risk_min: u8,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            small_portfolio_cutoff: dec!(100_000_000),
            conservative_risk_max: 2,
            stable_risk_max: 3,
            long_horizon_months: 60,
            aggressive_risk_min: 4,
        }
    }
}

/// Resolves strategy names and recommends strategies for investor profiles.
#[derive(Clone, Debug, Default)]
pub struct StrategySelector {
    config: SelectorConfig,
}

impl StrategySelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Strategy for a given name, case-insensitive. Unknown or absent names
    /// fall back to the threshold default.
    pub fn by_name(&self, name: Option<&str>) -> RebalancingStrategy {
        match name.map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case(THRESHOLD_BASED) => {
                RebalancingStrategy::ThresholdBased(ThresholdConfig::default())
            }
            Some(name) if name.eq_ignore_ascii_case(TIME_BASED) => {
                RebalancingStrategy::TimeBased(TimeBasedConfig::default())
            }
            Some(name) if name.eq_ignore_ascii_case(HYBRID) => {
                RebalancingStrategy::Hybrid(HybridConfig::default())
            }
            Some(name) if !name.is_empty() => {
                debug!("unknown strategy '{}', using {}", name, THRESHOLD_BASED);
                RebalancingStrategy::ThresholdBased(ThresholdConfig::default())
            }
            _ => RebalancingStrategy::ThresholdBased(ThresholdConfig::default()),
        }
    }

    /// Strategy name suited to an investor profile.
    ///
    /// Small and conservative goes time-based (fewest decisions), long
    /// horizon with stable risk goes hybrid, aggressive goes threshold;
    /// everyone else gets the hybrid middle ground.
    pub fn recommend(
        &self,
        portfolio_value: Decimal,
        risk_tolerance: u8,
        horizon_months: u32,
    ) -> &'static str {
        let config = &self.config;
        let name = if portfolio_value < config.small_portfolio_cutoff
            && risk_tolerance <= config.conservative_risk_max
        {
            TIME_BASED
        } else if horizon_months >= config.long_horizon_months
            && risk_tolerance <= config.stable_risk_max
        {
            HYBRID
        } else if risk_tolerance >= config.aggressive_risk_min {
            THRESHOLD_BASED
        } else {
            HYBRID
        };

        debug!(
            "recommended {} for value {}, risk {}, horizon {} months",
            name, portfolio_value, risk_tolerance, horizon_months
        );
        name
    }
}
