//! Hybrid rebalancing.
//!
//! Scheduled like the time-based strategy, with an emergency override: a
//! position drifting past the emergency threshold rebalances immediately,
//! schedule or not. Emergency runs reuse the threshold engine, regular runs
//! the time-based one; either way the output is relabeled as a hybrid run
//! with its trigger recorded.

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
use crate::rebalancing::rebalancing_model::{
    RebalancingRecommendation, TaxImpact, TriggerType,
};

use super::{threshold, time_based, ThresholdConfig, TimeBasedConfig, HYBRID};

#[derive(Clone, Debug)]
pub struct HybridConfig {
    /// Months between scheduled reviews
    pub review_period_months: u32,
    /// Drift that makes a scheduled review act
    pub regular_threshold: Decimal,
    /// Drift that forces an immediate rebalance
    pub emergency_threshold: Decimal,
    /// Trades moving less money than this are dropped
    pub min_trade_amount: Decimal,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            review_period_months: 3,
            regular_threshold: dec!(3.0),
            emergency_threshold: dec!(10.0),
            min_trade_amount: DEFAULT_MIN_TRADE_AMOUNT,
        }
    }
}

impl HybridConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.review_period_months == 0 || self.review_period_months > 12 {
            return Err(ValidationError::InvalidStrategyConfig(format!(
                "review period is {} months, must be between 1 and 12",
                self.review_period_months
            )));
        }
        if self.regular_threshold < Decimal::ONE || self.regular_threshold > Decimal::TEN {
            return Err(ValidationError::InvalidStrategyConfig(format!(
                "regular threshold is {}, must be between 1 and 10",
                self.regular_threshold
            )));
        }
        if self.emergency_threshold < Decimal::from(5)
            || self.emergency_threshold > Decimal::from(30)
        {
            return Err(ValidationError::InvalidStrategyConfig(format!(
                "emergency threshold is {}, must be between 5 and 30",
                self.emergency_threshold
            )));
        }
        if self.emergency_threshold <= self.regular_threshold {
            return Err(ValidationError::InvalidStrategyConfig(
                "emergency threshold must exceed the regular threshold".to_string(),
            ));
        }
        if self.min_trade_amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidStrategyConfig(
                "minimum trade amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn trigger(config: &HybridConfig, portfolio: &Portfolio, target: &TargetAllocation) -> TriggerType {
    let current = allocation::current_allocation(portfolio);
    let deviations = allocation::deviations(&current, target);
    let max_deviation = allocation::max_abs_deviation(&deviations);

    if max_deviation > config.emergency_threshold {
        return TriggerType::Emergency;
    }

    let elapsed = super::months_between(portfolio.updated_at, Utc::now());
    if elapsed >= i64::from(config.review_period_months)
        && max_deviation > config.regular_threshold
    {
        return TriggerType::Regular;
    }

    TriggerType::None
}

pub(crate) fn needs_rebalancing(
    config: &HybridConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> bool {
    trigger(config, portfolio, target) != TriggerType::None
}

pub(crate) fn generate(
    config: &HybridConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> RebalancingRecommendation {
    let now = Utc::now();
    let trigger = trigger(config, portfolio, target);

    let mut recommendation = match trigger {
        TriggerType::Emergency => {
            // true up everything outside the regular band while we are at it
            let delegate = ThresholdConfig {
                threshold: config.regular_threshold,
                min_trade_amount: config.min_trade_amount,
            };
            let mut recommendation = threshold::generate(&delegate, portfolio, target);
            recommendation.rebalancing_needed = true;
            recommendation.notes = format!(
                "Emergency rebalance: a position drifted past {}%. {}",
                config.emergency_threshold, recommendation.notes
            );
            recommendation
        }
        TriggerType::Regular => {
            let delegate = TimeBasedConfig {
                period_months: config.review_period_months,
                min_deviation: config.regular_threshold,
                min_trade_amount: config.min_trade_amount,
            };
            let mut recommendation = time_based::generate(&delegate, portfolio, target);
            recommendation.rebalancing_needed = true;
            recommendation.notes = format!(
                "Scheduled hybrid review: drift exceeded {}%. {}",
                config.regular_threshold, recommendation.notes
            );
            recommendation
        }
        TriggerType::None => no_action_recommendation(config, portfolio, target),
    };

    recommendation.strategy_name = HYBRID.to_string();
    recommendation.next_review_date = now + Months::new(config.review_period_months);
    recommendation.strategy_details.insert(
        "triggerType".to_string(),
        json!(trigger.as_str()),
    );
    recommendation.strategy_details.insert(
        "emergencyThresholdPercent".to_string(),
        json!(config.emergency_threshold),
    );
    recommendation.strategy_details.insert(
        "regularThresholdPercent".to_string(),
        json!(config.regular_threshold),
    );
    recommendation.strategy_details.insert(
        "reviewPeriodMonths".to_string(),
        json!(config.review_period_months),
    );
    recommendation
}

/// Nothing fired: report the actual state of the portfolio with no actions.
fn no_action_recommendation(
    config: &HybridConfig,
    portfolio: &Portfolio,
    target: &TargetAllocation,
) -> RebalancingRecommendation {
    let now = Utc::now();
    let current = allocation::current_allocation(portfolio);
    let deviations = allocation::deviations(&current, target);
    let max_deviation = allocation::max_abs_deviation(&deviations);
    let total_deviation = super::total_deviation(&deviations);
    let elapsed = super::months_between(portfolio.updated_at, now);

    let mut strategy_details = HashMap::new();
    strategy_details.insert("maxDeviation".to_string(), json!(max_deviation));
    strategy_details.insert("monthsSinceUpdate".to_string(), json!(elapsed));

    RebalancingRecommendation {
        recommendation_id: Uuid::new_v4().to_string(),
        portfolio_id: portfolio.id.clone(),
        strategy_name: HYBRID.to_string(),
        rebalancing_needed: false,
        total_deviation_percent: total_deviation,
        current_allocation: current,
        target_allocation: target.0.clone(),
        deviations,
        actions: Vec::new(),
        estimated_transaction_cost: Decimal::ZERO,
        tax_impact: TaxImpact::default(),
        created_at: now,
        next_review_date: now + Months::new(config.review_period_months),
        strategy_details,
        priority: 5,
        notes: format!(
            "No rebalancing required: largest deviation {}% stays under the {}% emergency \
             threshold and the review window has not produced actionable drift",
            max_deviation, config.emergency_threshold
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::priced_portfolio;
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn target_60_40() -> TargetAllocation {
        let mut weights = HashMap::new();
        weights.insert("AAPL".to_string(), dec!(60));
        weights.insert("MSFT".to_string(), dec!(40));
        TargetAllocation::new(weights)
    }

    fn portfolio_with_drift(aapl_shares: Decimal, msft_shares: Decimal) -> Portfolio {
        priced_portfolio(&[
            ("AAPL", aapl_shares, dec!(90), dec!(100)),
            ("MSFT", msft_shares, dec!(90), dec!(100)),
        ])
    }

    #[test]
    fn test_config_validation_ranges() {
        assert!(HybridConfig::default().validate().is_ok());

        let config = HybridConfig {
            review_period_months: 13,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = HybridConfig {
            regular_threshold: dec!(0.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = HybridConfig {
            emergency_threshold: dec!(31),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // inverted band
        let config = HybridConfig {
            regular_threshold: dec!(8),
            emergency_threshold: dec!(6),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_emergency_trigger_overrides_schedule() {
        // 72/28: 12-point drift, portfolio touched today
        let portfolio = portfolio_with_drift(dec!(72), dec!(28));
        let config = HybridConfig::default();

        assert!(needs_rebalancing(&config, &portfolio, &target_60_40()));
        let recommendation = generate(&config, &portfolio, &target_60_40());
        assert!(recommendation.rebalancing_needed);
        assert_eq!(recommendation.strategy_name, "HYBRID");
        assert_eq!(
            recommendation.strategy_details["triggerType"],
            serde_json::json!("EMERGENCY")
        );
        assert!(!recommendation.actions.is_empty());
        assert!(recommendation.notes.starts_with("Emergency rebalance"));
    }

    #[test]
    fn test_regular_trigger_needs_elapsed_period() {
        // 64/36: 4-point drift, above regular but below emergency
        let mut portfolio = portfolio_with_drift(dec!(64), dec!(36));
        let config = HybridConfig::default();

        // fresh portfolio: no trigger
        assert!(!needs_rebalancing(&config, &portfolio, &target_60_40()));

        portfolio.updated_at = Utc::now() - Duration::days(124);
        assert!(needs_rebalancing(&config, &portfolio, &target_60_40()));

        let recommendation = generate(&config, &portfolio, &target_60_40());
        assert!(recommendation.rebalancing_needed);
        assert_eq!(
            recommendation.strategy_details["triggerType"],
            serde_json::json!("REGULAR")
        );
        assert_eq!(recommendation.strategy_name, "HYBRID");
    }

    #[test]
    fn test_no_trigger_reports_real_allocation() {
        // 61/39: 1-point drift, elapsed period
        let mut portfolio = portfolio_with_drift(dec!(61), dec!(39));
        portfolio.updated_at = Utc::now() - Duration::days(124);
        let config = HybridConfig::default();

        assert!(!needs_rebalancing(&config, &portfolio, &target_60_40()));
        let recommendation = generate(&config, &portfolio, &target_60_40());

        assert!(!recommendation.rebalancing_needed);
        assert!(recommendation.actions.is_empty());
        assert_eq!(recommendation.priority, 5);
        assert_eq!(
            recommendation.strategy_details["triggerType"],
            serde_json::json!("NONE")
        );
        // the idle report still carries the real figures
        assert_eq!(recommendation.current_allocation["AAPL"], dec!(61.00));
        assert_eq!(recommendation.current_allocation["MSFT"], dec!(39.00));
        assert_eq!(recommendation.deviations["AAPL"], dec!(1.00));
        assert_eq!(recommendation.total_deviation_percent, dec!(1.00));
    }

    #[test]
    fn test_emergency_wins_over_regular() {
        // both conditions hold; emergency takes precedence
        let mut portfolio = portfolio_with_drift(dec!(75), dec!(25));
        portfolio.updated_at = Utc::now() - Duration::days(200);

        let recommendation = generate(&HybridConfig::default(), &portfolio, &target_60_40());
        assert_eq!(
            recommendation.strategy_details["triggerType"],
            serde_json::json!("EMERGENCY")
        );
    }
}
