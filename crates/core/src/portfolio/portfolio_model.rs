//! Holdings, portfolios, and target allocations.
//!
//! Derived figures (market value, gain/loss, totals) are computed on read
//! from quantity, cost, and the latest price. Nothing derived is stored, so
//! there is no stale state to recompute after a mutation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::WEIGHT_SCALE;
use crate::errors::ValidationError;

/// A single position in a portfolio.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Symbol, stored uppercased
    pub symbol: String,
    /// Number of shares, fractional allowed
    pub quantity: Decimal,
    /// Average acquisition price per share
    pub average_cost: Decimal,
    /// Latest known price; `None` until a refresh succeeds
    pub current_price: Option<Decimal>,
}

impl Holding {
    pub fn new(
        symbol: &str,
        quantity: Decimal,
        average_cost: Decimal,
    ) -> Result<Self, ValidationError> {
        if quantity < Decimal::ZERO {
            return Err(ValidationError::InvalidHolding(format!(
                "negative quantity for {}",
                symbol
            )));
        }
        if average_cost <= Decimal::ZERO {
            return Err(ValidationError::InvalidHolding(format!(
                "non-positive average cost for {}",
                symbol
            )));
        }
        Ok(Self {
            symbol: symbol.trim().to_uppercase(),
            quantity,
            average_cost,
            current_price: None,
        })
    }

    /// Quantity times the latest price; zero while unpriced.
    pub fn market_value(&self) -> Decimal {
        match self.current_price {
            Some(price) => self.quantity * price,
            None => Decimal::ZERO,
        }
    }

    pub fn total_cost(&self) -> Decimal {
        self.quantity * self.average_cost
    }

    /// Unrealized gain/loss; `None` while unpriced.
    pub fn gain_loss(&self) -> Option<Decimal> {
        self.current_price
            .map(|price| self.quantity * price - self.total_cost())
    }

    /// Gain/loss as a percentage of cost, four decimal places.
    pub fn gain_loss_percent(&self) -> Option<Decimal> {
        let gain_loss = self.gain_loss()?;
        let cost = self.total_cost();
        if cost.is_zero() {
            return None;
        }
        Some(
            (gain_loss / cost).round_dp_with_strategy(
                WEIGHT_SCALE,
                RoundingStrategy::MidpointAwayFromZero,
            ) * Decimal::ONE_HUNDRED,
        )
    }
}

/// A named collection of holdings, unique by symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub holdings: Vec<Holding>,
    /// Last composition change. Price refreshes deliberately do not touch
    /// this; it drives the time-based review clock.
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            holdings: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        let symbol = symbol.trim().to_uppercase();
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    pub fn add_holding(&mut self, holding: Holding) -> Result<(), ValidationError> {
        if self.holding(&holding.symbol).is_some() {
            return Err(ValidationError::InvalidHolding(format!(
                "duplicate symbol {}",
                holding.symbol
            )));
        }
        self.holdings.push(holding);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn update_holding(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        average_cost: Decimal,
    ) -> Result<(), ValidationError> {
        let updated = Holding::new(symbol, quantity, average_cost)?;
        let symbol = updated.symbol.clone();
        match self.holdings.iter_mut().find(|h| h.symbol == symbol) {
            Some(holding) => {
                holding.quantity = updated.quantity;
                holding.average_cost = updated.average_cost;
                self.updated_at = Utc::now();
                Ok(())
            }
            None => Err(ValidationError::InvalidHolding(format!(
                "unknown symbol {}",
                symbol
            ))),
        }
    }

    pub fn remove_holding(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        let before = self.holdings.len();
        self.holdings.retain(|h| h.symbol != symbol);
        let removed = self.holdings.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Record a fresh price for a symbol. Returns false for unknown symbols.
    pub fn set_price(&mut self, symbol: &str, price: Decimal) -> bool {
        let symbol = symbol.trim().to_uppercase();
        match self.holdings.iter_mut().find(|h| h.symbol == symbol) {
            Some(holding) => {
                holding.current_price = Some(price);
                true
            }
            None => false,
        }
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn total_value(&self) -> Decimal {
        self.holdings.iter().map(Holding::market_value).sum()
    }

    pub fn total_cost(&self) -> Decimal {
        self.holdings.iter().map(Holding::total_cost).sum()
    }

    pub fn total_gain_loss(&self) -> Decimal {
        self.total_value() - self.total_cost()
    }

    pub fn total_gain_loss_percent(&self) -> Option<Decimal> {
        let cost = self.total_cost();
        if cost.is_zero() {
            return None;
        }
        Some(
            (self.total_gain_loss() / cost).round_dp_with_strategy(
                WEIGHT_SCALE,
                RoundingStrategy::MidpointAwayFromZero,
            ) * Decimal::ONE_HUNDRED,
        )
    }
}

/// Desired percentage weights per symbol.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TargetAllocation(pub HashMap<String, Decimal>);

impl TargetAllocation {
    pub fn new(weights: HashMap<String, Decimal>) -> Self {
        Self(
            weights
                .into_iter()
                .map(|(symbol, weight)| (symbol.trim().to_uppercase(), weight))
                .collect(),
        )
    }

    /// Target weight for a symbol, zero when absent.
    pub fn weight(&self, symbol: &str) -> Decimal {
        self.0.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Non-empty, every weight in [0, 100], and the sum within 100 ± 1
    /// (small rounding drift from percentage entry is tolerated).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::InvalidAllocation(
                "no target weights given".to_string(),
            ));
        }
        for (symbol, weight) in &self.0 {
            if *weight < Decimal::ZERO || *weight > Decimal::ONE_HUNDRED {
                return Err(ValidationError::InvalidAllocation(format!(
                    "weight for {} is {}, must be between 0 and 100",
                    symbol, weight
                )));
            }
        }
        let sum: Decimal = self.0.values().sum();
        if (sum - Decimal::ONE_HUNDRED).abs() > Decimal::ONE {
            return Err(ValidationError::InvalidAllocation(format!(
                "weights sum to {}, must be within 100 \u{b1} 1",
                sum
            )));
        }
        Ok(())
    }
}

impl From<HashMap<String, Decimal>> for TargetAllocation {
    fn from(weights: HashMap<String, Decimal>) -> Self {
        Self::new(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn priced_holding(symbol: &str, quantity: Decimal, cost: Decimal, price: Decimal) -> Holding {
        let mut holding = Holding::new(symbol, quantity, cost).unwrap();
        holding.current_price = Some(price);
        holding
    }

    #[test]
    fn test_holding_rejects_bad_values() {
        assert!(Holding::new("AAPL", dec!(-1), dec!(100)).is_err());
        assert!(Holding::new("AAPL", dec!(1), dec!(0)).is_err());
        assert!(Holding::new("AAPL", dec!(0), dec!(100)).is_ok());
    }

    #[test]
    fn test_holding_symbol_normalized() {
        let holding = Holding::new(" aapl ", dec!(1), dec!(100)).unwrap();
        assert_eq!(holding.symbol, "AAPL");
    }

    #[test]
    fn test_derived_values() {
        let holding = priced_holding("AAPL", dec!(10), dec!(100), dec!(150));
        assert_eq!(holding.market_value(), dec!(1500));
        assert_eq!(holding.total_cost(), dec!(1000));
        assert_eq!(holding.gain_loss(), Some(dec!(500)));
        assert_eq!(holding.gain_loss_percent(), Some(dec!(50.00)));
    }

    #[test]
    fn test_unpriced_holding() {
        let holding = Holding::new("AAPL", dec!(10), dec!(100)).unwrap();
        assert_eq!(holding.market_value(), dec!(0));
        assert_eq!(holding.gain_loss(), None);
        assert_eq!(holding.gain_loss_percent(), None);
    }

    #[test]
    fn test_portfolio_totals() {
        let mut portfolio = Portfolio::new("p1", "Main");
        portfolio
            .add_holding(priced_holding("AAPL", dec!(10), dec!(100), dec!(150)))
            .unwrap();
        portfolio
            .add_holding(priced_holding("MSFT", dec!(5), dec!(200), dec!(180)))
            .unwrap();

        assert_eq!(portfolio.total_value(), dec!(2400));
        assert_eq!(portfolio.total_cost(), dec!(2000));
        assert_eq!(portfolio.total_gain_loss(), dec!(400));
        assert_eq!(portfolio.total_gain_loss_percent(), Some(dec!(20.00)));
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut portfolio = Portfolio::new("p1", "Main");
        portfolio
            .add_holding(Holding::new("AAPL", dec!(1), dec!(100)).unwrap())
            .unwrap();
        let err = portfolio
            .add_holding(Holding::new("aapl", dec!(2), dec!(90)).unwrap())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidHolding(_)));
    }

    #[test]
    fn test_set_price_does_not_touch_updated_at() {
        let mut portfolio = Portfolio::new("p1", "Main");
        portfolio
            .add_holding(Holding::new("AAPL", dec!(1), dec!(100)).unwrap())
            .unwrap();
        let stamp = portfolio.updated_at;
        assert!(portfolio.set_price("AAPL", dec!(150)));
        assert_eq!(portfolio.updated_at, stamp);
        assert!(!portfolio.set_price("NOPE", dec!(1)));
    }

    #[test]
    fn test_allocation_validation() {
        let mut weights = HashMap::new();
        weights.insert("AAPL".to_string(), dec!(60));
        weights.insert("MSFT".to_string(), dec!(40));
        assert!(TargetAllocation::new(weights.clone()).validate().is_ok());

        // drift within the ±1 tolerance
        weights.insert("MSFT".to_string(), dec!(40.5));
        assert!(TargetAllocation::new(weights.clone()).validate().is_ok());

        weights.insert("MSFT".to_string(), dec!(45));
        assert!(TargetAllocation::new(weights.clone()).validate().is_err());

        weights.insert("MSFT".to_string(), dec!(-5));
        assert!(TargetAllocation::new(weights).validate().is_err());

        assert!(TargetAllocation::default().validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_two_asset_allocation_valid_iff_sum_near_100(
            first in 0u32..=100,
            second in 0u32..=100,
        ) {
            let mut weights = HashMap::new();
            weights.insert("AAPL".to_string(), Decimal::from(first));
            weights.insert("MSFT".to_string(), Decimal::from(second));
            let allocation = TargetAllocation::new(weights);

            let sum = first + second;
            let expected_ok = (99..=101).contains(&sum);
            prop_assert_eq!(allocation.validate().is_ok(), expected_ok);
        }

        #[test]
        fn prop_out_of_range_weight_always_rejected(weight in 101u32..10_000) {
            let mut weights = HashMap::new();
            weights.insert("AAPL".to_string(), Decimal::from(weight));
            prop_assert!(TargetAllocation::new(weights).validate().is_err());
        }
    }
}
