//! Orchestration of validation, strategy selection, and analysis.

use std::collections::HashMap;

use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::ATTENTION_THRESHOLD;
use crate::errors::Result;
use crate::portfolio::allocation;
use crate::portfolio::portfolio_model::{Portfolio, TargetAllocation};
use crate::rebalancing::rebalancing_model::RebalancingRecommendation;
use crate::rebalancing::strategies::{
    HybridConfig, RebalancingStrategy, ThresholdConfig, TimeBasedConfig,
};
use crate::rebalancing::strategy_selector::StrategySelector;

/// Lightweight drift report without trade generation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickAnalysis {
    pub current_allocation: HashMap<String, Decimal>,
    pub target_allocation: HashMap<String, Decimal>,
    pub deviations: HashMap<String, Decimal>,
    pub max_deviation: Decimal,
    pub max_deviation_symbol: Option<String>,
    pub needs_attention: bool,
}

/// Catalog entry describing one strategy to an end user.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub pros: Vec<&'static str>,
    pub cons: Vec<&'static str>,
    pub suitable_for: &'static str,
    pub complexity: &'static str,
}

/// Front door of the rebalancing engine.
///
/// Every operation validates the target allocation before any strategy code
/// runs; a malformed target never reaches the math.
#[derive(Clone, Debug, Default)]
pub struct RebalancingService {
    selector: StrategySelector,
}

impl RebalancingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selector(selector: StrategySelector) -> Self {
        Self { selector }
    }

    /// Produce a full recommendation using the named strategy (or the
    /// default when no name is given).
    pub fn recommend(
        &self,
        portfolio: &Portfolio,
        target: &TargetAllocation,
        strategy_name: Option<&str>,
    ) -> Result<RebalancingRecommendation> {
        target.validate()?;
        let strategy = self.selector.by_name(strategy_name);
        let recommendation = strategy.generate_recommendation(portfolio, target);
        info!(
            "generated {} recommendation {} for portfolio {} (needed: {})",
            recommendation.strategy_name,
            recommendation.recommendation_id,
            portfolio.id,
            recommendation.rebalancing_needed
        );
        Ok(recommendation)
    }

    /// Whether the named strategy would rebalance right now.
    pub fn needs_rebalancing(
        &self,
        portfolio: &Portfolio,
        target: &TargetAllocation,
        strategy_name: Option<&str>,
    ) -> Result<bool> {
        target.validate()?;
        Ok(self
            .selector
            .by_name(strategy_name)
            .needs_rebalancing(portfolio, target))
    }

    /// Drift snapshot without generating trades.
    pub fn quick_analysis(
        &self,
        portfolio: &Portfolio,
        target: &TargetAllocation,
    ) -> Result<QuickAnalysis> {
        target.validate()?;

        let current = allocation::current_allocation(portfolio);
        let deviations = allocation::deviations(&current, target);
        let max_entry = allocation::max_deviation_entry(&deviations);
        let max_deviation = max_entry
            .as_ref()
            .map(|(_, d)| d.abs())
            .unwrap_or(Decimal::ZERO);

        Ok(QuickAnalysis {
            current_allocation: current,
            target_allocation: target.0.clone(),
            deviations,
            max_deviation,
            max_deviation_symbol: max_entry.map(|(symbol, _)| symbol),
            needs_attention: max_deviation > ATTENTION_THRESHOLD,
        })
    }

    /// Strategy name suited to an investor profile.
    pub fn recommend_strategy(
        &self,
        portfolio_value: Decimal,
        risk_tolerance: u8,
        horizon_months: u32,
    ) -> &'static str {
        self.selector
            .recommend(portfolio_value, risk_tolerance, horizon_months)
    }

    /// Catalog of the available strategies.
    pub fn strategy_infos(&self) -> Vec<StrategyInfo> {
        let threshold = RebalancingStrategy::ThresholdBased(ThresholdConfig::default());
        let time_based = RebalancingStrategy::TimeBased(TimeBasedConfig::default());
        let hybrid = RebalancingStrategy::Hybrid(HybridConfig::default());

        vec![
            StrategyInfo {
                name: threshold.name(),
                description: threshold.description(),
                pros: vec![
                    "Reacts to drift as soon as it matters",
                    "Keeps allocations tight in trending markets",
                ],
                cons: vec![
                    "Can trade often when markets chop",
                    "Needs deviation monitoring",
                ],
                suitable_for: "Investors who want tight tracking and accept more trades",
                complexity: "Low",
            },
            StrategyInfo {
                name: time_based.name(),
                description: time_based.description(),
                pros: vec![
                    "Predictable schedule, few decisions",
                    "Skips pointless trades in quiet periods",
                ],
                cons: vec![
                    "Large drift can sit unaddressed between reviews",
                ],
                suitable_for: "Hands-off investors with smaller portfolios",
                complexity: "Low",
            },
            StrategyInfo {
                name: hybrid.name(),
                description: hybrid.description(),
                pros: vec![
                    "Calm schedule with a safety valve for shocks",
                    "Balances trading cost against tracking",
                ],
                cons: vec![
                    "Two thresholds to understand and tune",
                ],
                suitable_for: "Long-horizon investors who want protection from sharp moves",
                complexity: "Medium",
            },
        ]
    }
}
