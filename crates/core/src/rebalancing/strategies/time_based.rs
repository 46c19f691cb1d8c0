//! Time-based rebalancing.
//!
//! Rebalances on a calendar schedule. A period with negligible drift is
//! skipped; trading for its own sake only burns commission.

use std::collections::HashMap;

use chrono::{Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use crate::constants::DEFAULT_MIN_TRADE_AMOUNT;
use crate::errors::ValidationError;
use crate::portfolio::allocation;
use crate::portfolio::portfolio_model::{Portfolio, TargetAllocation};
use crate::rebalancing::rebalancing_model::RebalancingRecommendation;

use super::TIME_BASED;

/// Scheduled runs are routine work, not urgent.
const SCHEDULED_RECOMMENDATION_PRIORITY: u8 = 3;
const SCHEDULED_ACTION_PRIORITY: u8 = 2;

#[derive(Clone, Debug)]
pub struct TimeBasedConfig {
    /// Months between scheduled rebalances
    pub period_months: u32,
    /// Skip the run entirely when no position drifts past this floor
    pub min_deviation: Decimal,
    /// Trades moving less money than this are dropped
    pub min_trade_amount: Decimal,
}

impl Default for TimeBasedConfig {
    fn default() -> Self {
        Self {
            period_months: 3,
            min_deviation: dec!(2.0),
            min_trade_amount: DEFAULT_MIN_TRADE_AMOUNT,
        }
    }
}

impl TimeBasedConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.period_months == 0 || self.period_months > 60 {
            return Err(ValidationError::InvalidStrategyConfig(format!(
                "period is {} months, must be between 1 and 60",
                self.period_months
            )));
        }
        if self.min_deviation < Decimal::ZERO || self.min_deviation > Decimal::TEN {
            return Err(ValidationError::InvalidStrategyConfig(format!(
                "minimum deviation is {}, must be between 0 and 10",
                self.min_deviation
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
    config: &TimeBasedConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> bool {
    let elapsed = super::months_between(portfolio.updated_at, Utc::now());
    if elapsed < i64::from(config.period_months) {
        return false;
    }
    let current = allocation::current_allocation(portfolio);
    let deviations = allocation::deviations(&current, target);
    allocation::max_abs_deviation(&deviations) > config.min_deviation
}

pub(crate) fn generate(
    config: &TimeBasedConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> RebalancingRecommendation {
    let now = Utc::now();
    let elapsed = super::months_between(portfolio.updated_at, now);
    let current = allocation::current_allocation(portfolio);
    let deviations = allocation::deviations(&current, target);
    let max_deviation = allocation::max_abs_deviation(&deviations);
    let total_deviation = super::total_deviation(&deviations);
    let needed =
        elapsed >= i64::from(config.period_months) && max_deviation > config.min_deviation;

    let mut actions = super::build_actions(
        portfolio,
        &current,
        &deviations,
        target,
        config.min_deviation,
        config.min_trade_amount,
    );
    // biggest money first, alphabetical on equal amounts
    actions.sort_by(|a, b| {
        b.estimated_amount
            .cmp(&a.estimated_amount)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    for action in &mut actions {
        action.priority = SCHEDULED_ACTION_PRIORITY;
    }

    let mut strategy_details = HashMap::new();
    strategy_details.insert("periodMonths".to_string(), json!(config.period_months));
    strategy_details.insert("monthsSinceUpdate".to_string(), json!(elapsed));
    strategy_details.insert(
        "minDeviationPercent".to_string(),
        json!(config.min_deviation),
    );

    let notes = if needed {
        format!(
            "Scheduled rebalance: {} month(s) since last portfolio change, largest deviation {}%",
            elapsed, max_deviation
        )
    } else if elapsed < i64::from(config.period_months) {
        format!(
            "Next scheduled rebalance after {} month(s); {} elapsed",
            config.period_months, elapsed
        )
    } else {
        format!(
            "Period elapsed but drift stayed under {}%; skipping this cycle",
            config.min_deviation
        )
    };

    RebalancingRecommendation {
        recommendation_id: Uuid::new_v4().to_string(),
        portfolio_id: portfolio.id.clone(),
        strategy_name: TIME_BASED.to_string(),
        rebalancing_needed: needed,
        total_deviation_percent: total_deviation,
        current_allocation: current,
        target_allocation: target.0.clone(),
        deviations,
        estimated_transaction_cost: super::transaction_cost(&actions),
        tax_impact: super::tax_impact(portfolio, &actions),
        actions,
        created_at: now,
        next_review_date: now + Months::new(config.period_months),
        strategy_details,
        priority: SCHEDULED_RECOMMENDATION_PRIORITY,
        notes,
    }
}
