//! Pure allocation and deviation math.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::WEIGHT_SCALE;
use crate::portfolio::portfolio_model::{Portfolio, TargetAllocation};

/// Current percentage weight of every holding.
///
/// Each weight is the value ratio rounded half-up to four decimal places and
/// then scaled to percent, so the figures match what a statement would show.
/// A portfolio with zero total value has no weights at all.
pub fn current_allocation(portfolio: &Portfolio) -> HashMap<String, Decimal> {
    let total = portfolio.total_value();
    if total.is_zero() {
        return HashMap::new();
    }

    portfolio
        .holdings
        .iter()
        .map(|holding| {
            let ratio = (holding.market_value() / total)
                .round_dp_with_strategy(WEIGHT_SCALE, RoundingStrategy::MidpointAwayFromZero);
            (holding.symbol.clone(), ratio * Decimal::ONE_HUNDRED)
        })
        .collect()
}

/// Per-symbol deviation of current weight from target weight.
///
/// The union of both symbol sets is covered; a symbol absent on one side
/// counts as zero there. Positive means overweight.
pub fn deviations(
    current: &HashMap<String, Decimal>,
    target: &TargetAllocation,
) -> HashMap<String, Decimal> {
    let mut result: HashMap<String, Decimal> = HashMap::new();
    for (symbol, weight) in current {
        result.insert(symbol.clone(), *weight - target.weight(symbol));
    }
    for (symbol, weight) in &target.0 {
        result
            .entry(symbol.clone())
            .or_insert_with(|| -*weight);
    }
    result
}

/// Largest absolute deviation, zero for an empty map.
pub fn max_abs_deviation(deviations: &HashMap<String, Decimal>) -> Decimal {
    deviations
        .values()
        .map(|d| d.abs())
        .max()
        .unwrap_or(Decimal::ZERO)
}

/// Symbol carrying the largest absolute deviation, alphabetical on ties.
pub fn max_deviation_entry(deviations: &HashMap<String, Decimal>) -> Option<(String, Decimal)> {
    let mut entries: Vec<_> = deviations.iter().collect();
    entries.sort_by(|a, b| {
        b.1.abs()
            .cmp(&a.1.abs())
            .then_with(|| a.0.cmp(b.0))
    });
    entries
        .first()
        .map(|(symbol, deviation)| ((*symbol).clone(), **deviation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::portfolio_model::Holding;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn portfolio_60_40() -> Portfolio {
        let mut portfolio = Portfolio::new("p1", "Main");
        let mut aapl = Holding::new("AAPL", dec!(4), dec!(100)).unwrap();
        aapl.current_price = Some(dec!(150));
        let mut msft = Holding::new("MSFT", dec!(2), dec!(150)).unwrap();
        msft.current_price = Some(dec!(200));
        portfolio.add_holding(aapl).unwrap();
        portfolio.add_holding(msft).unwrap();
        portfolio
    }

    #[test]
    fn test_current_allocation() {
        let allocation = current_allocation(&portfolio_60_40());
        assert_eq!(allocation["AAPL"], dec!(60.00));
        assert_eq!(allocation["MSFT"], dec!(40.00));
    }

    #[test]
    fn test_rounding_is_half_up_on_the_ratio() {
        let mut portfolio = Portfolio::new("p1", "Main");
        let mut a = Holding::new("A", dec!(1), dec!(1)).unwrap();
        a.current_price = Some(dec!(1));
        let mut b = Holding::new("B", dec!(2), dec!(1)).unwrap();
        b.current_price = Some(dec!(1));
        portfolio.add_holding(a).unwrap();
        portfolio.add_holding(b).unwrap();

        // 1/3 = 0.33333.. -> 0.3333 -> 33.33%
        let allocation = current_allocation(&portfolio);
        assert_eq!(allocation["A"], dec!(33.33));
        assert_eq!(allocation["B"], dec!(66.67));
    }

    #[test]
    fn test_zero_value_portfolio_has_no_weights() {
        let mut portfolio = Portfolio::new("p1", "Main");
        portfolio
            .add_holding(Holding::new("AAPL", dec!(10), dec!(100)).unwrap())
            .unwrap();
        assert!(current_allocation(&portfolio).is_empty());
    }

    #[test]
    fn test_deviations_cover_symbol_union() {
        let mut current = HashMap::new();
        current.insert("AAPL".to_string(), dec!(70));
        current.insert("GLD".to_string(), dec!(30));

        let mut target = HashMap::new();
        target.insert("AAPL".to_string(), dec!(60));
        target.insert("MSFT".to_string(), dec!(40));
        let target = TargetAllocation::new(target);

        let deviations = deviations(&current, &target);
        assert_eq!(deviations["AAPL"], dec!(10));
        assert_eq!(deviations["GLD"], dec!(30));
        assert_eq!(deviations["MSFT"], dec!(-40));
    }

    #[test]
    fn test_max_deviation_entry_tie_breaks_alphabetically() {
        let mut map = HashMap::new();
        map.insert("MSFT".to_string(), dec!(-10));
        map.insert("AAPL".to_string(), dec!(10));
        let (symbol, deviation) = max_deviation_entry(&map).unwrap();
        assert_eq!(symbol, "AAPL");
        assert_eq!(deviation, dec!(10));
        assert_eq!(max_abs_deviation(&map), dec!(10));
    }

    proptest! {
        #[test]
        fn prop_unpriced_portfolio_always_has_empty_allocation(
            quantities in proptest::collection::vec(1u32..1_000, 1..6),
        ) {
            let mut portfolio = Portfolio::new("p1", "Main");
            for (i, quantity) in quantities.iter().enumerate() {
                let holding =
                    Holding::new(&format!("SYM{}", i), Decimal::from(*quantity), dec!(10))
                        .unwrap();
                portfolio.add_holding(holding).unwrap();
            }
            prop_assert!(current_allocation(&portfolio).is_empty());
        }

        #[test]
        fn prop_priced_weights_sum_close_to_100(
            values in proptest::collection::vec(1u32..10_000, 2..6),
        ) {
            let mut portfolio = Portfolio::new("p1", "Main");
            for (i, value) in values.iter().enumerate() {
                let mut holding =
                    Holding::new(&format!("SYM{}", i), Decimal::from(*value), dec!(1))
                        .unwrap();
                holding.current_price = Some(dec!(1));
                portfolio.add_holding(holding).unwrap();
            }
            let sum: Decimal = current_allocation(&portfolio).values().sum();
            // rounding each weight to 4 dp keeps the sum within a hair of 100
            prop_assert!((sum - dec!(100)).abs() < dec!(0.1));
        }
    }
}
