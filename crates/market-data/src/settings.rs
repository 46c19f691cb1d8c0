//! Provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection and read timeouts for a provider's HTTP client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpTimeouts {
    pub connect_secs: u64,
    pub read_secs: u64,
}

impl HttpTimeouts {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
}

/// Settings for a provider that authenticates with an API key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProviderSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeouts: HttpTimeouts,
}

impl ApiProviderSettings {
    /// Usable means enabled with a non-blank API key.
    pub fn is_configured(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .map(|key| !key.trim().is_empty())
                .unwrap_or(false)
    }
}

/// Settings for the keyless Yahoo chart API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSettings {
    pub enabled: bool,
    pub base_url: String,
    pub timeouts: HttpTimeouts,
}

/// Configuration for all quote providers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataSettings {
    pub yahoo: YahooSettings,
    pub alpha_vantage: ApiProviderSettings,
    pub finnhub: ApiProviderSettings,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            // The chart endpoint is slow compared to the API vendors, so it
            // gets the most generous read timeout.
            yahoo: YahooSettings {
                enabled: true,
                base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
                timeouts: HttpTimeouts {
                    connect_secs: 10,
                    read_secs: 30,
                },
            },
            alpha_vantage: ApiProviderSettings {
                enabled: true,
                api_key: None,
                base_url: "https://www.alphavantage.co/query".to_string(),
                timeouts: HttpTimeouts {
                    connect_secs: 5,
                    read_secs: 10,
                },
            },
            finnhub: ApiProviderSettings {
                enabled: true,
                api_key: None,
                base_url: "https://finnhub.io/api/v1".to_string(),
                timeouts: HttpTimeouts {
                    connect_secs: 5,
                    read_secs: 10,
                },
            },
        }
    }
}
