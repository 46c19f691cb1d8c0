//! Error types for market data operations.

use thiserror::Error;

/// Errors that can occur while fetching quotes from external vendors.
///
/// The first three variants are per-provider failures: the resolver treats
/// them as a signal to move on to the next provider in the chain. The last
/// two are terminal for a single request.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider is disabled or missing credentials.
    /// Skipped by the registry; surfaces only on direct lookup.
    #[error("Provider unavailable: {provider}")]
    ProviderUnavailable {
        /// The provider that is not usable right now
        provider: String,
    },

    /// The call to the provider failed (network, timeout, non-success status).
    /// Try the next provider in the chain.
    #[error("Provider call failed: {provider} - {message}")]
    ProviderCallFailed {
        /// The provider that failed
        provider: String,
        /// What went wrong
        message: String,
    },

    /// The provider answered but the payload could not be turned into a
    /// usable quote (missing nodes, non-positive price).
    /// Try the next provider in the chain.
    #[error("Provider response invalid: {provider} - {message}")]
    ProviderParseError {
        /// The provider whose response was rejected
        provider: String,
        /// Description of the rejected payload
        message: String,
    },

    /// No provider is available to handle the request.
    /// All providers are disabled or unconfigured.
    #[error("No market data provider available")]
    NoProviderAvailable,

    /// Every available provider was tried and all failed.
    /// Carries the last provider error as the terminal cause.
    #[error("All providers failed for symbol: {symbol}")]
    AllProvidersExhausted {
        /// The symbol that could not be resolved
        symbol: String,
        /// The error from the last provider tried
        #[source]
        source: Box<MarketDataError>,
    },
}

impl MarketDataError {
    /// Whether the fallback loop should continue to the next provider
    /// after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. }
                | Self::ProviderCallFailed { .. }
                | Self::ProviderParseError { .. }
        )
    }
}
