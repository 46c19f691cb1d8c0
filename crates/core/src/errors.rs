//! Error types for the portfolio core.

use thiserror::Error;

use folio_market_data::MarketDataError;

/// Result type alias for portfolio core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the portfolio core.
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed validation before any work was done.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced portfolio does not exist.
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    /// A quote lookup failed underneath a portfolio operation.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

/// Validation failures, kept separate so callers can report them as
/// user errors rather than faults.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The target allocation is empty, out of range, or does not sum to 100.
    #[error("Invalid target allocation: {0}")]
    InvalidAllocation(String),

    /// A strategy configuration value is outside its allowed range.
    #[error("Invalid strategy configuration: {0}")]
    InvalidStrategyConfig(String),

    /// A holding carries impossible values (negative quantity, zero cost).
    #[error("Invalid holding: {0}")]
    InvalidHolding(String),
}
