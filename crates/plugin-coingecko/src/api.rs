//! Shared CoinGecko access: one HTTP client, the reference-data policy, and
//! the cached category and coin lists.

use athena_actions::{
    ErrorMessages, ReferenceDataPolicy, UpstreamClient, fetch_cached, require_non_empty,
};
use athena_core::{Result, Runtime};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::resolve_api_config;

pub const CATEGORIES_CACHE_KEY: &str = "coingecko:categories";
pub const COINS_CACHE_KEY: &str = "coingecko:coins";

const PRO_REQUIRED: &str =
    "This endpoint requires a CoinGecko Pro API key. Please upgrade your plan to access this data.";

/// Status wording for a CoinGecko call about `subject`.
pub const fn errors(subject: &'static str) -> ErrorMessages {
    ErrorMessages::new(subject, PRO_REQUIRED)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinListing {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Handle shared by every CoinGecko action and provider.
#[derive(Debug, Clone, Default)]
pub struct CoinGecko {
    http: reqwest::Client,
    policy: ReferenceDataPolicy,
}

impl CoinGecko {
    pub fn new(policy: ReferenceDataPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &ReferenceDataPolicy {
        &self.policy
    }

    /// A client for the tier the runtime's credentials select.
    pub fn client(&self, runtime: &dyn Runtime) -> Result<UpstreamClient> {
        let config = resolve_api_config(runtime)?;
        Ok(UpstreamClient::with_client(
            self.http.clone(),
            config.base_url.clone(),
            config.auth(),
        ))
    }

    pub async fn categories(&self, runtime: &dyn Runtime) -> Result<Vec<Category>> {
        let client = &self.client(runtime)?;
        let timeout = self.policy.retry.request_timeout;
        fetch_cached(runtime.cache(), CATEGORIES_CACHE_KEY, &self.policy, move || async move {
            let list: Vec<Category> = client
                .get_json_with_timeout("/coins/categories/list", &[], timeout)
                .await?;
            require_non_empty(list, "categories")
        })
        .await
    }

    pub async fn coins(&self, runtime: &dyn Runtime) -> Result<Vec<CoinListing>> {
        let client = &self.client(runtime)?;
        let timeout = self.policy.retry.request_timeout;
        fetch_cached(runtime.cache(), COINS_CACHE_KEY, &self.policy, move || async move {
            let list: Vec<CoinListing> = client
                .get_json_with_timeout(
                    "/coins/list",
                    &[("include_platform", "false".to_string())],
                    timeout,
                )
                .await?;
            require_non_empty(list, "coins")
        })
        .await
    }
}

/// Whether the runtime has CoinGecko credentials.
pub fn is_configured(runtime: &dyn Runtime) -> bool {
    match resolve_api_config(runtime) {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "coingecko action unavailable");
            false
        }
    }
}

/// `$` for USD, otherwise the upper-case code and a space.
pub fn price_prefix(vs_currency: &str) -> String {
    if vs_currency.eq_ignore_ascii_case("usd") {
        "$".into()
    } else {
        format!("{} ", vs_currency.to_uppercase())
    }
}

/// Fraction digits for a quoted price: sub-unit prices keep more precision.
pub fn price_digits(price: f64) -> usize {
    if price.abs() >= 1.0 { 2 } else { 8 }
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut gap = false;
    for c in name.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            gap = false;
        } else if !gap {
            out.push('-');
            gap = true;
        }
    }
    out
}

/// Resolve a free-text category against the reference list.
///
/// Rules apply in order and the first rule with any match wins: exact id,
/// then case-insensitive name or name slug, then substring of name or id.
pub fn resolve_category<'a>(candidate: &str, categories: &'a [Category]) -> Option<&'a Category> {
    let needle = candidate.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    categories
        .iter()
        .find(|c| c.category_id == needle)
        .or_else(|| {
            categories.iter().find(|c| {
                let name = c.name.to_lowercase();
                name == needle || slug(&name) == needle
            })
        })
        .or_else(|| {
            categories.iter().find(|c| {
                c.name.to_lowercase().contains(&needle) || c.category_id.contains(&needle)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: &str, name: &str) -> Category {
        Category {
            category_id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("layer 1 (l1)"), "layer-1-l1-");
        assert_eq!(slug("gaming"), "gaming");
    }

    #[test]
    fn test_exact_id_beats_earlier_substring() {
        let list = vec![
            cat("play-to-earn-gaming", "Play To Earn Gaming"),
            cat("gaming", "Gaming (GameFi)"),
        ];
        assert_eq!(resolve_category("gaming", &list).unwrap().category_id, "gaming");
    }

    #[test]
    fn test_name_and_slug_match() {
        let list = vec![
            cat("smart-contract-platform", "Smart Contract Platform"),
            cat("decentralized-finance-defi", "Decentralized Finance (DeFi)"),
        ];
        assert_eq!(
            resolve_category("Smart Contract Platform", &list).unwrap().category_id,
            "smart-contract-platform"
        );
        assert_eq!(
            resolve_category("decentralized-finance-defi-", &list).unwrap().category_id,
            "decentralized-finance-defi"
        );
    }

    #[test]
    fn test_substring_and_miss() {
        let list = vec![cat("meme-token", "Meme")];
        assert_eq!(resolve_category(" MEME ", &list).unwrap().category_id, "meme-token");
        assert!(resolve_category("metaverse", &list).is_none());
        assert!(resolve_category("  ", &list).is_none());
    }
}
