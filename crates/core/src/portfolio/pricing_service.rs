//! Refreshing holding prices through the quote resolver.

use std::sync::Arc;

use log::{info, warn};

use folio_market_data::QuoteResolver;

use crate::portfolio::portfolio_model::Portfolio;

/// Applies fresh market prices to a portfolio's holdings.
pub struct PricingService {
    resolver: Arc<QuoteResolver>,
}

impl PricingService {
    pub fn new(resolver: Arc<QuoteResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve quotes for every holding and apply the prices that arrive.
    ///
    /// Symbols that could not be priced are returned, sorted; they keep
    /// their previous price. A partial failure never aborts the refresh.
    pub async fn refresh_prices(&self, portfolio: &mut Portfolio) -> Vec<String> {
        let symbols = portfolio.symbols();
        let results = self.resolver.resolve_quotes(&symbols).await;

        let mut failed = Vec::new();
        for (symbol, result) in results {
            match result {
                Ok(quote) => {
                    portfolio.set_price(&symbol, quote.price);
                }
                Err(error) => {
                    warn!("price refresh failed for {}: {}", symbol, error);
                    failed.push(symbol);
                }
            }
        }
        failed.sort();

        info!(
            "refreshed prices for portfolio {}: {} priced, {} failed",
            portfolio.id,
            symbols.len() - failed.len(),
            failed.len()
        );
        failed
    }
}
