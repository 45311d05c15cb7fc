//! Credential and endpoint resolution for the CoinGecko API.

use athena_actions::Auth;
use athena_core::{PluginError, Result, Runtime};

pub const FREE_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
pub const FREE_HEADER: &str = "x-cg-demo-api-key";
pub const PRO_HEADER: &str = "x-cg-pro-api-key";

/// Raw settings as the host reports them.
#[derive(Debug, Clone, Default)]
pub struct CoinGeckoSettings {
    pub api_key: Option<String>,
    pub pro_api_key: Option<String>,
    /// Replaces the tier's base URL, e.g. for a proxy.
    pub base_url: Option<String>,
}

/// Where and how to call the API for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub header_name: &'static str,
}

impl ApiConfig {
    pub fn is_pro(&self) -> bool {
        self.header_name == PRO_HEADER
    }

    pub fn auth(&self) -> Auth {
        Auth::Header {
            name: self.header_name.to_string(),
            value: self.api_key.clone(),
        }
    }
}

impl CoinGeckoSettings {
    pub fn from_runtime(runtime: &dyn Runtime) -> Self {
        Self {
            api_key: runtime.get_setting("COINGECKO_API_KEY"),
            pro_api_key: runtime.get_setting("COINGECKO_PRO_API_KEY"),
            base_url: runtime.get_setting("COINGECKO_BASE_URL"),
        }
    }

    /// Pick the pro tier when its key is set, else the free tier.
    pub fn resolve(&self) -> Result<ApiConfig> {
        let (api_key, default_base, header_name) = match (&self.pro_api_key, &self.api_key) {
            (Some(pro), _) => (pro.clone(), PRO_BASE_URL, PRO_HEADER),
            (None, Some(free)) => (free.clone(), FREE_BASE_URL, FREE_HEADER),
            (None, None) => {
                return Err(PluginError::Configuration(
                    "Either COINGECKO_API_KEY or COINGECKO_PRO_API_KEY must be provided".into(),
                ));
            }
        };
        Ok(ApiConfig {
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| default_base.to_string()),
            api_key,
            header_name,
        })
    }
}

pub fn resolve_api_config(runtime: &dyn Runtime) -> Result<ApiConfig> {
    CoinGeckoSettings::from_runtime(runtime).resolve()
}
