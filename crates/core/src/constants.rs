//! Policy constants shared across the rebalancing engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Flat commission estimate applied to the summed trade amounts (0.25%).
pub const COMMISSION_RATE: Decimal = dec!(0.0025);

/// Flat capital gains rate used by the coarse tax estimate (22%).
pub const CAPITAL_GAINS_RATE: Decimal = dec!(0.22);

/// Default floor under which a trade is not worth placing.
pub const DEFAULT_MIN_TRADE_AMOUNT: Decimal = dec!(100);

/// Deviation above which a portfolio is flagged for attention in quick
/// analysis and used as the default rebalancing threshold.
pub const ATTENTION_THRESHOLD: Decimal = dec!(5.0);

/// Decimal places kept for percentage weights.
pub const WEIGHT_SCALE: u32 = 4;

/// Decimal places kept for monetary amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Decimal places kept for share quantities (fractional shares allowed).
pub const QUANTITY_SCALE: u32 = 6;
