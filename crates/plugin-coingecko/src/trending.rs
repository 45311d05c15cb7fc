//! `GET_TRENDING`: trending coins, NFTs and categories from search activity.

use async_trait::async_trait;
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, Result, Runtime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_TRENDING",
    similes: &[
        "TRENDING_COINS",
        "TRENDING_CRYPTO",
        "HOT_COINS",
        "POPULAR_COINS",
        "TRENDING_SEARCH",
    ],
    description: "Get list of trending cryptocurrencies, NFTs, and categories from CoinGecko",
};

const ERRORS: ErrorMessages = api::errors("trending data");

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::boolean("include_nfts").default(true))
        .field(Field::boolean("include_categories").default(true))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingParams {
    pub include_nfts: bool,
    pub include_categories: bool,
}

#[derive(Debug, Default, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<CoinHit>,
    #[serde(default)]
    nfts: Vec<NftHit>,
    #[serde(default)]
    categories: Vec<CategoryHit>,
}

#[derive(Debug, Deserialize)]
struct CoinHit {
    item: CoinItem,
}

#[derive(Debug, Deserialize)]
struct CoinItem {
    id: String,
    name: String,
    symbol: String,
    market_cap_rank: Option<u32>,
    thumb: Option<String>,
    large: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NftHit {
    id: String,
    name: String,
    symbol: String,
    #[serde(rename(serialize = "thumbnail"))]
    thumb: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryHit {
    id: u64,
    name: String,
}

fn numbered<T>(items: &[T], empty: &str, line: impl Fn(&T) -> String) -> Vec<String> {
    if items.is_empty() {
        return vec![empty.to_string()];
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, line(item)))
        .collect()
}

fn render(data: &TrendingResponse, params: &TrendingParams) -> String {
    let mut lines = vec!["Trending Coins:".to_string()];
    lines.extend(numbered(&data.coins, "No trending coins available", |c| {
        let rank = c
            .item
            .market_cap_rank
            .map(|r| format!(" - Rank #{r}"))
            .unwrap_or_default();
        format!("{} ({}){rank}", c.item.name, c.item.symbol.to_uppercase())
    }));
    if params.include_nfts {
        lines.push(String::new());
        lines.push("Trending NFTs:".into());
        lines.extend(numbered(&data.nfts, "No trending NFTs available", |n| {
            format!("{} ({})", n.name, n.symbol)
        }));
    }
    if params.include_categories {
        lines.push(String::new());
        lines.push("Trending Categories:".into());
        lines.extend(numbered(
            &data.categories,
            "No trending categories available",
            |c| c.name.clone(),
        ));
    }
    lines.join("\n")
}

pub struct GetTrending {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetTrending {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::TRENDING, schema(), ModelClass::Large),
        }
    }
}

#[async_trait]
impl ApiAction for GetTrending {
    type Params = TrendingParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![
                ActionExample::user("What are the trending cryptocurrencies?"),
                ActionExample::agent_action(
                    "I'll check the trending cryptocurrencies for you.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent(
                    "Here are the trending cryptocurrencies:\n1. Bitcoin (BTC) - Rank #1\n2. Ethereum (ETH) - Rank #2\n{{dynamic}}",
                ),
            ],
            vec![
                ActionExample::user("Show me what's hot in crypto right now"),
                ActionExample::agent_action(
                    "I'll fetch the current trending cryptocurrencies.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent("Here are the trending cryptocurrencies:\n{{dynamic}}"),
            ],
        ]
    }

    fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    fn errors(&self) -> &ErrorMessages {
        &ERRORS
    }

    async fn is_available(&self, runtime: &dyn Runtime) -> bool {
        api::is_configured(runtime)
    }

    async fn execute(&self, runtime: &dyn Runtime, params: TrendingParams) -> Result<Delivery> {
        let client = self.api.client(runtime)?;
        info!(
            include_nfts = params.include_nfts,
            include_categories = params.include_categories,
            "fetching trending"
        );
        let data: TrendingResponse = client.get_json("/search/trending", &[]).await?;

        let coins: Vec<_> = data
            .coins
            .iter()
            .map(|c| {
                json!({
                    "name": c.item.name,
                    "symbol": c.item.symbol.to_uppercase(),
                    "marketCapRank": c.item.market_cap_rank,
                    "id": c.item.id,
                    "thumbnail": c.item.thumb,
                    "largeImage": c.item.large,
                })
            })
            .collect();
        let mut trending = json!({ "coins": coins });
        if params.include_nfts {
            trending["nfts"] = json!(data.nfts);
        }
        if params.include_categories {
            trending["categories"] = json!(data.categories);
        }

        let text = render(&data, &params);
        Ok(Delivery::new(
            text,
            json!({ "trending": trending, "timestamp": api::timestamp() }),
        ))
    }
}
