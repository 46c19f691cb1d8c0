//! Threshold-based rebalancing.
//!
//! Triggers as soon as any position drifts further from target than the
//! configured threshold. The default strategy: responsive, but can trade
//! often in choppy markets.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use crate::constants::DEFAULT_MIN_TRADE_AMOUNT;
use crate::errors::ValidationError;
use crate::portfolio::allocation;
use crate::portfolio::portfolio_model::{Portfolio, TargetAllocation};
use crate::rebalancing::rebalancing_model::RebalancingRecommendation;

use super::THRESHOLD_BASED;

/// Days until the drift is worth another look.
const REVIEW_INTERVAL_DAYS: i64 = 14;

#[derive(Clone, Debug)]
pub struct ThresholdConfig {
    /// Deviation (percentage points) that triggers a rebalance
    pub threshold: Decimal,
    /// Trades moving less money than this are dropped
    pub min_trade_amount: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold: dec!(5.0),
            min_trade_amount: DEFAULT_MIN_TRADE_AMOUNT,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.threshold < Decimal::ONE || self.threshold > Decimal::from(50) {
            return Err(ValidationError::InvalidStrategyConfig(format!(
                "threshold is {}, must be between 1 and 50",
                self.threshold
            )));
        }
        if self.min_trade_amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidStrategyConfig(
                "minimum trade amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn needs_rebalancing(
    config: &ThresholdConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> bool {
    let current = allocation::current_allocation(portfolio);
    let deviations = allocation::deviations(&current, target);
    allocation::max_abs_deviation(&deviations) > config.threshold
}

pub(crate) fn generate(
    config: &ThresholdConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> RebalancingRecommendation {
    let current = allocation::current_allocation(portfolio);
    let deviations = allocation::deviations(&current, target);
    let max_deviation = allocation::max_abs_deviation(&deviations);
    let total_deviation = super::total_deviation(&deviations);
    let needed = max_deviation > config.threshold;

    let mut actions = super::build_actions(
        portfolio,
        &current,
        &deviations,
        target,
        config.threshold,
        config.min_trade_amount,
    );
    // most drifted first, alphabetical on equal drift
    actions.sort_by(|a, b| {
        b.deviation
            .abs()
            .cmp(&a.deviation.abs())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let breached: Vec<String> = {
        let mut symbols: Vec<String> = deviations
            .iter()
            .filter(|(_, d)| d.abs() > config.threshold)
            .map(|(s, _)| s.clone())
            .collect();
        symbols.sort();
        symbols
    };

    let mut strategy_details = HashMap::new();
    strategy_details.insert("thresholdPercent".to_string(), json!(config.threshold));
    strategy_details.insert("maxDeviation".to_string(), json!(max_deviation));
    strategy_details.insert("breachedSymbols".to_string(), json!(breached));

    let notes = if needed {
        format!(
            "{} position(s) drifted more than {}% from target; largest deviation {}%",
            breached.len(),
            config.threshold,
            max_deviation
        )
    } else {
        format!(
            "All positions within the {}% threshold; largest deviation {}%",
            config.threshold, max_deviation
        )
    };

    let now = Utc::now();
    RebalancingRecommendation {
        recommendation_id: Uuid::new_v4().to_string(),
        portfolio_id: portfolio.id.clone(),
        strategy_name: THRESHOLD_BASED.to_string(),
        rebalancing_needed: needed,
        total_deviation_percent: total_deviation,
        current_allocation: current,
        target_allocation: target.0.clone(),
        deviations,
        estimated_transaction_cost: super::transaction_cost(&actions),
        tax_impact: super::tax_impact(portfolio, &actions),
        actions,
        created_at: now,
        next_review_date: now + Duration::days(REVIEW_INTERVAL_DAYS),
        strategy_details,
        priority: super::recommendation_priority(total_deviation),
        notes,
    }
}
