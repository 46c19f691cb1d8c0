//! Portfolio core: holdings, allocation math, and rebalancing strategies.
//!
//! The crate is split along the two halves of the domain:
//!
//! - [`portfolio`]: the holding/portfolio model, target allocations, the pure
//!   allocation calculator, and price refresh through the market-data
//!   resolver.
//! - [`rebalancing`]: the three rebalancing strategies behind a closed enum,
//!   the strategy selector, and the orchestrating service.

pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod rebalancing;

pub use errors::{Error, Result, ValidationError};
pub use portfolio::portfolio_model::{Holding, Portfolio, TargetAllocation};
pub use rebalancing::rebalancing_service::RebalancingService;
