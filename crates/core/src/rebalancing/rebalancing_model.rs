//! Rebalancing recommendation models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What to do with a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Buy,
    Sell,
    Hold,
}

/// Why a hybrid run produced (or skipped) a rebalance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    Emergency,
    Regular,
    None,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Regular => "REGULAR",
            Self::None => "NONE",
        }
    }
}

/// One trade (or explicit hold) proposed for a symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingAction {
    pub action_type: ActionType,
    pub symbol: String,
    pub current_quantity: Decimal,
    pub target_quantity: Decimal,
    /// Positive buys, negative sells
    pub quantity_change: Decimal,
    pub current_price: Decimal,
    /// Money moved by this action
    pub estimated_amount: Decimal,
    pub current_weight: Decimal,
    pub target_weight: Decimal,
    pub deviation: Decimal,
    /// 1 = most urgent, 5 = least
    pub priority: u8,
}

/// Coarse tax estimate over the proposed sells. A first-order signal only;
/// real lot-level accounting is out of scope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxImpact {
    pub estimated_capital_gains_tax: Decimal,
    /// Sells that realize no gain
    pub tax_efficient_sell_candidates: Vec<String>,
    /// Positions currently under water
    pub tax_loss_harvesting_opportunities: Vec<String>,
}

/// A full rebalancing recommendation. Built once, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingRecommendation {
    pub recommendation_id: String,
    pub portfolio_id: String,
    pub strategy_name: String,
    pub rebalancing_needed: bool,
    /// Half the summed absolute deviations
    pub total_deviation_percent: Decimal,
    pub current_allocation: HashMap<String, Decimal>,
    pub target_allocation: HashMap<String, Decimal>,
    pub deviations: HashMap<String, Decimal>,
    pub actions: Vec<RebalancingAction>,
    pub estimated_transaction_cost: Decimal,
    pub tax_impact: TaxImpact,
    pub created_at: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
    /// Strategy-specific figures (thresholds hit, months elapsed, trigger)
    pub strategy_details: HashMap<String, serde_json::Value>,
    /// 1 = most urgent, 5 = least
    pub priority: u8,
    pub notes: String,
}
