//! # plugin-coingecko
//!
//! CoinGecko market data for the agent: simple prices, token prices by
//! contract address, ranked market listings, trending coins and pools, top
//! movers and new listings.
//!
//! ## Settings
//!
//! | Setting                 | Meaning                                      |
//! |-------------------------|----------------------------------------------|
//! | `COINGECKO_API_KEY`     | Demo (free tier) key                         |
//! | `COINGECKO_PRO_API_KEY` | Pro key; selects the pro endpoint when set   |
//! | `COINGECKO_BASE_URL`    | Optional base URL override                   |
//!
//! The category and coin lists are cached through the host cache and
//! refetched with retry once they expire.

pub mod api;
pub mod environment;
pub mod markets;
pub mod movers;
pub mod new_coins;
pub mod pools;
pub mod price;
pub mod providers;
pub mod templates;
pub mod token_price;
pub mod trending;

use athena_actions::{Pipeline, ReferenceDataPolicy};
use athena_core::Plugin;
use std::sync::Arc;

pub use api::{CoinGecko, resolve_category};
pub use environment::{ApiConfig, CoinGeckoSettings};

pub fn coingecko_plugin(policy: ReferenceDataPolicy) -> Plugin {
    let api = Arc::new(CoinGecko::new(policy));
    Plugin::new(
        "coingecko",
        "CoinGecko market data: prices, markets, trending coins and pools",
    )
    .with_action(Arc::new(Pipeline::new(price::GetPrice::new(api.clone()))))
    .with_action(Arc::new(Pipeline::new(
        token_price::GetTokenPriceByAddress::new(api.clone()),
    )))
    .with_action(Arc::new(Pipeline::new(trending::GetTrending::new(api.clone()))))
    .with_action(Arc::new(Pipeline::new(pools::GetTrendingPools::new(api.clone()))))
    .with_action(Arc::new(Pipeline::new(markets::GetMarkets::new(api.clone()))))
    .with_action(Arc::new(Pipeline::new(
        movers::GetTopGainersLosers::new(api.clone()),
    )))
    .with_action(Arc::new(Pipeline::new(new_coins::GetNewCoins::new(api.clone()))))
    .with_provider(Arc::new(providers::CategoriesProvider::new(api.clone())))
    .with_provider(Arc::new(providers::CoinsProvider::new(api)))
}
