//! The rebalancing strategies and their shared engine.
//!
//! Strategies form a closed set behind [`RebalancingStrategy`]; every
//! dispatch is an exhaustive match, so adding a strategy is a compile-time
//! event, not a runtime registration.

pub mod hybrid;
pub mod threshold;
pub mod time_based;

pub use hybrid::HybridConfig;
pub use threshold::ThresholdConfig;
pub use time_based::TimeBasedConfig;

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{AMOUNT_SCALE, CAPITAL_GAINS_RATE, COMMISSION_RATE, QUANTITY_SCALE};
use crate::errors::ValidationError;
use crate::portfolio::portfolio_model::{Portfolio, TargetAllocation};
use crate::rebalancing::rebalancing_model::{
    ActionType, RebalancingAction, RebalancingRecommendation, TaxImpact,
};

pub const THRESHOLD_BASED: &str = "THRESHOLD_BASED";
pub const TIME_BASED: &str = "TIME_BASED";
pub const HYBRID: &str = "HYBRID";

/// The closed set of rebalancing strategies.
#[derive(Clone, Debug)]
pub enum RebalancingStrategy {
    ThresholdBased(ThresholdConfig),
    TimeBased(TimeBasedConfig),
    Hybrid(HybridConfig),
}

impl RebalancingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ThresholdBased(_) => THRESHOLD_BASED,
            Self::TimeBased(_) => TIME_BASED,
            Self::Hybrid(_) => HYBRID,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ThresholdBased(_) => {
                "Rebalance whenever any position drifts past a fixed deviation threshold"
            }
            Self::TimeBased(_) => {
                "Rebalance on a calendar schedule, skipping periods with negligible drift"
            }
            Self::Hybrid(_) => {
                "Scheduled rebalancing with an emergency override for large drifts"
            }
        }
    }

    /// Check the configuration ranges without running the strategy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::ThresholdBased(config) => config.validate(),
            Self::TimeBased(config) => config.validate(),
            Self::Hybrid(config) => config.validate(),
        }
    }

    pub fn needs_rebalancing(&self, portfolio: &Portfolio, target: &TargetAllocation) -> bool {
        match self {
            Self::ThresholdBased(config) => threshold::needs_rebalancing(config, portfolio, target),
            Self::TimeBased(config) => time_based::needs_rebalancing(config, portfolio, target),
            Self::Hybrid(config) => hybrid::needs_rebalancing(config, portfolio, target),
        }
    }

    pub fn generate_recommendation(
        &self,
        portfolio: &Portfolio,
        target: &TargetAllocation,
    ) -> RebalancingRecommendation {
        match self {
            Self::ThresholdBased(config) => threshold::generate(config, portfolio, target),
            Self::TimeBased(config) => time_based::generate(config, portfolio, target),
            Self::Hybrid(config) => hybrid::generate(config, portfolio, target),
        }
    }
}

/// Half the summed absolute deviations. Over- and underweights mirror each
/// other, so summing one side double-counts the drift.
pub(crate) fn total_deviation(deviations: &HashMap<String, Decimal>) -> Decimal {
    let sum: Decimal = deviations.values().map(|d| d.abs()).sum();
    sum / Decimal::TWO
}

/// Urgency of a single action from its absolute deviation.
pub(crate) fn action_priority(abs_deviation: Decimal) -> u8 {
    if abs_deviation > Decimal::from(15) {
        1
    } else if abs_deviation > Decimal::from(10) {
        2
    } else if abs_deviation > Decimal::from(7) {
        3
    } else if abs_deviation > Decimal::from(5) {
        4
    } else {
        5
    }
}

/// Urgency of the whole recommendation from the total deviation.
pub(crate) fn recommendation_priority(total_deviation: Decimal) -> u8 {
    if total_deviation > Decimal::from(20) {
        1
    } else if total_deviation > Decimal::from(15) {
        2
    } else if total_deviation > Decimal::from(10) {
        3
    } else if total_deviation > Decimal::from(5) {
        4
    } else {
        5
    }
}

/// Build the trade list for every symbol whose drift exceeds the inclusion
/// threshold.
///
/// Target quantity comes from the target amount at the current price
/// (zero when the position has no usable price); trades whose money moved
/// stays under `min_trade_amount` are dropped as not worth their costs.
/// The result is unordered; each strategy applies its own ordering.
pub(crate) fn build_actions(
    portfolio: &Portfolio,
    current: &HashMap<String, Decimal>,
    deviations: &HashMap<String, Decimal>,
    target: &TargetAllocation,
    inclusion_threshold: Decimal,
    min_trade_amount: Decimal,
) -> Vec<RebalancingAction> {
    let total_value = portfolio.total_value();
    let mut actions = Vec::new();

    for (symbol, deviation) in deviations {
        if deviation.abs() <= inclusion_threshold {
            continue;
        }

        let holding = portfolio.holding(symbol);
        let current_quantity = holding.map(|h| h.quantity).unwrap_or(Decimal::ZERO);
        let current_price = holding
            .and_then(|h| h.current_price)
            .unwrap_or(Decimal::ZERO);

        let target_weight = target.weight(symbol);
        let target_amount = (total_value * target_weight / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let target_quantity = if current_price <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            (target_amount / current_price)
                .round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        };

        let quantity_change = target_quantity - current_quantity;
        let estimated_amount = (quantity_change.abs() * current_price)
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);

        if estimated_amount < min_trade_amount {
            continue;
        }

        let action_type = if quantity_change > Decimal::ZERO {
            ActionType::Buy
        } else if quantity_change < Decimal::ZERO {
            ActionType::Sell
        } else {
            ActionType::Hold
        };

        actions.push(RebalancingAction {
            action_type,
            symbol: symbol.clone(),
            current_quantity,
            target_quantity,
            quantity_change,
            current_price,
            estimated_amount,
            current_weight: current.get(symbol).copied().unwrap_or(Decimal::ZERO),
            target_weight,
            deviation: *deviation,
            priority: action_priority(deviation.abs()),
        });
    }

    actions
}

/// Flat commission estimate over the summed trade amounts.
pub(crate) fn transaction_cost(actions: &[RebalancingAction]) -> Decimal {
    let turnover: Decimal = actions.iter().map(|a| a.estimated_amount).sum();
    (turnover * COMMISSION_RATE)
        .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// First-order tax reading of the proposed sells.
///
/// Gains tax assumes the sold fraction realizes a proportional share of the
/// position's unrealized gain. Sells that realize no gain are flagged as
/// tax-efficient; loss-making positions are harvesting material whether or
/// not they are being sold.
pub(crate) fn tax_impact(portfolio: &Portfolio, actions: &[RebalancingAction]) -> TaxImpact {
    let mut tax = Decimal::ZERO;
    let mut efficient = Vec::new();

    for action in actions {
        if action.action_type != ActionType::Sell {
            continue;
        }
        let Some(holding) = portfolio.holding(&action.symbol) else {
            continue;
        };
        let Some(gain) = holding.gain_loss() else {
            continue;
        };
        if gain > Decimal::ZERO && holding.quantity > Decimal::ZERO {
            let sold_fraction = action.quantity_change.abs() / holding.quantity;
            tax += gain * sold_fraction * CAPITAL_GAINS_RATE;
        } else {
            efficient.push(action.symbol.clone());
        }
    }

    let mut harvesting: Vec<String> = portfolio
        .holdings
        .iter()
        .filter(|h| h.gain_loss().is_some_and(|g| g < Decimal::ZERO))
        .map(|h| h.symbol.clone())
        .collect();

    efficient.sort();
    harvesting.sort();

    TaxImpact {
        estimated_capital_gains_tax: tax
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        tax_efficient_sell_candidates: efficient,
        tax_loss_harvesting_opportunities: harvesting,
    }
}

/// Whole calendar months between two instants, never negative. A started
/// but unfinished month does not count.
pub(crate) fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let mut months = (to.year() as i64 - from.year() as i64) * 12
        + (to.month() as i64 - from.month() as i64);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}
