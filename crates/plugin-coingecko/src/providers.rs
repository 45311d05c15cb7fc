use async_trait::async_trait;
use athena_core::{Memory, Provider, Runtime, State};
use std::sync::Arc;
use tracing::error;

use crate::api::{Category, CoinGecko, CoinListing};

const POPULAR_CATEGORIES: &[&str] = &[
    "layer-1",
    "defi",
    "meme",
    "ai-meme-coins",
    "artificial-intelligence",
    "gaming",
    "metaverse",
];

const POPULAR_COINS: &[&str] = &[
    "bitcoin",
    "ethereum",
    "binancecoin",
    "ripple",
    "cardano",
    "solana",
    "polkadot",
    "dogecoin",
];

pub fn format_categories_context(categories: &[Category]) -> String {
    let popular: Vec<String> = categories
        .iter()
        .filter(|c| POPULAR_CATEGORIES.contains(&c.category_id.as_str()))
        .map(|c| format!("- {} ({})", c.name, c.category_id))
        .collect();
    format!(
        "Available cryptocurrency categories:\n\n\
         Popular categories:\n{}\n\n\
         Total available categories: {}\n\n\
         You can use these category IDs when filtering cryptocurrency market data.",
        popular.join("\n"),
        categories.len()
    )
}

pub fn format_coins_context(coins: &[CoinListing]) -> String {
    let popular: Vec<String> = coins
        .iter()
        .filter(|c| POPULAR_COINS.contains(&c.id.as_str()))
        .map(|c| format!("- {} ({}) - ID: {}", c.name, c.symbol.to_uppercase(), c.id))
        .collect();
    format!(
        "Available cryptocurrencies:\n\n\
         Popular coins:\n{}\n\n\
         Total available coins: {}\n\n\
         You can use these coin IDs when querying specific cryptocurrency data.",
        popular.join("\n"),
        coins.len()
    )
}

/// Injects the popular category ids into the prompt.
pub struct CategoriesProvider {
    api: Arc<CoinGecko>,
}

impl CategoriesProvider {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Provider for CategoriesProvider {
    fn name(&self) -> &str {
        "coingecko_categories"
    }

    async fn get(&self, runtime: &dyn Runtime, _message: &Memory, _state: Option<&State>) -> String {
        match self.api.categories(runtime).await {
            Ok(categories) => format_categories_context(&categories),
            Err(e) => {
                error!(error = %e, "categories provider failed");
                "Cryptocurrency categories are temporarily unavailable. Please try again later."
                    .into()
            }
        }
    }
}

/// Injects the popular coin ids into the prompt.
pub struct CoinsProvider {
    api: Arc<CoinGecko>,
}

impl CoinsProvider {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Provider for CoinsProvider {
    fn name(&self) -> &str {
        "coingecko_coins"
    }

    async fn get(&self, runtime: &dyn Runtime, _message: &Memory, _state: Option<&State>) -> String {
        match self.api.coins(runtime).await {
            Ok(coins) => format_coins_context(&coins),
            Err(e) => {
                error!(error = %e, "coins provider failed");
                "Cryptocurrency list is temporarily unavailable. Please try again later.".into()
            }
        }
    }
}
