//! Provider registry with fixed priority ordering.

use std::sync::Arc;

use crate::models::ProviderStatus;
use crate::provider::alpha_vantage::AlphaVantageProvider;
use crate::provider::finnhub::FinnhubProvider;
use crate::provider::yahoo::YahooProvider;
use crate::provider::QuoteProvider;
use crate::settings::MarketDataSettings;

/// Holds the quote providers in the order the resolver should try them.
///
/// The order is fixed at construction: Yahoo first (keyless, broadest
/// coverage), then Alpha Vantage, then Finnhub. Availability is asked of the
/// providers on every call, never cached, so a provider that gains or loses
/// its credentials is picked up on the next resolution.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn QuoteProvider>>,
}

impl ProviderRegistry {
    pub fn new(settings: MarketDataSettings) -> Self {
        let providers: Vec<Arc<dyn QuoteProvider>> = vec![
            Arc::new(YahooProvider::new(settings.yahoo)),
            Arc::new(AlphaVantageProvider::new(settings.alpha_vantage)),
            Arc::new(FinnhubProvider::new(settings.finnhub)),
        ];
        Self { providers }
    }

    /// Build a registry from an explicit provider list, keeping its order.
    pub fn from_providers(providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        Self { providers }
    }

    /// Providers that report themselves usable right now, in priority order.
    pub async fn available_providers(&self) -> Vec<Arc<dyn QuoteProvider>> {
        let mut available = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            if provider.is_available().await {
                available.push(Arc::clone(provider));
            }
        }
        available
    }

    /// Look up an available provider by name, case-insensitively.
    pub async fn get_provider(&self, name: &str) -> Option<Arc<dyn QuoteProvider>> {
        for provider in &self.providers {
            if provider.name().eq_ignore_ascii_case(name) {
                if provider.is_available().await {
                    return Some(Arc::clone(provider));
                }
                return None;
            }
        }
        None
    }

    /// Current availability of every registered provider.
    pub async fn provider_status(&self) -> Vec<ProviderStatus> {
        let mut statuses = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            statuses.push(ProviderStatus {
                name: provider.name().to_string(),
                available: provider.is_available().await,
            });
        }
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticProvider;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_available_filters_and_keeps_order() {
        let registry = ProviderRegistry::from_providers(vec![
            Arc::new(StaticProvider::unavailable("YAHOO")),
            Arc::new(StaticProvider::quoting("ALPHA_VANTAGE", dec!(150.25))),
            Arc::new(StaticProvider::quoting("FINNHUB", dec!(150.30))),
        ]);

        let available = registry.available_providers().await;
        let names: Vec<_> = available.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["ALPHA_VANTAGE", "FINNHUB"]);
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let registry = ProviderRegistry::from_providers(vec![Arc::new(StaticProvider::quoting(
            "YAHOO",
            dec!(150.25),
        ))]);

        assert!(registry.get_provider("yahoo").await.is_some());
        assert!(registry.get_provider("Yahoo").await.is_some());
        assert!(registry.get_provider("FINNHUB").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_hides_unavailable_provider() {
        let registry =
            ProviderRegistry::from_providers(vec![Arc::new(StaticProvider::unavailable("YAHOO"))]);

        assert!(registry.get_provider("YAHOO").await.is_none());
    }

    #[tokio::test]
    async fn test_provider_status() {
        let registry = ProviderRegistry::from_providers(vec![
            Arc::new(StaticProvider::quoting("YAHOO", dec!(150.25))),
            Arc::new(StaticProvider::unavailable("FINNHUB")),
        ]);

        let statuses = registry.provider_status().await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].available);
        assert!(!statuses[1].available);
    }
}
