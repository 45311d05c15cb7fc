//! `GET_PRICE_FEEDS`: search the feed catalogue.

use async_trait::async_trait;
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, Result, Runtime};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::hermes::{self, Hermes, PriceFeed};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_PRICE_FEEDS",
    similes: &["FETCH_PRICE_FEEDS", "LIST_PRICE_FEEDS", "SEARCH_PRICE_FEEDS", "PYTH_FEEDS"],
    description: "Search the Pyth price feed catalogue by symbol and asset type",
};

const ERRORS: ErrorMessages = hermes::errors("price feeds");

pub const ASSET_TYPES: &[&str] = &["crypto", "equity", "fx", "metal", "rates"];

pub const NO_FEEDS: &str = "No Pyth price feeds matched your search.";

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::string("query"))
        .field(Field::one_of("asset_type", ASSET_TYPES))
        .field(
            Field::integer("limit")
                .range(Some(1.0), Some(50.0))
                .default(10),
        )
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedsParams {
    pub query: Option<String>,
    pub asset_type: Option<String>,
    pub limit: usize,
}

fn feed_entry(rank: usize, feed: &PriceFeed) -> String {
    let attrs = &feed.attributes;
    let symbol = attrs
        .symbol
        .as_deref()
        .or(attrs.display_symbol.as_deref())
        .unwrap_or("Unknown");
    let asset_type = attrs
        .asset_type
        .as_deref()
        .map(|t| format!(" ({})", t.to_lowercase()))
        .unwrap_or_default();
    let mut lines = vec![
        format!("{rank}. {symbol}{asset_type}"),
        format!("   ID: 0x{}", feed.id.trim_start_matches("0x")),
    ];
    if let Some(description) = attrs.description.as_deref() {
        lines.push(format!("   Description: {description}"));
    }
    lines.join("\n")
}

fn render(feeds: &[PriceFeed], total: usize, params: &FeedsParams) -> String {
    if feeds.is_empty() {
        return NO_FEEDS.to_string();
    }
    let matching = params
        .query
        .as_deref()
        .map(|q| format!(" matching \"{q}\""))
        .unwrap_or_default();
    let mut lines = vec![
        format!("Found {total} Pyth price feeds{matching}. Showing {}:", feeds.len()),
        String::new(),
    ];
    lines.extend(feeds.iter().enumerate().map(|(i, f)| feed_entry(i + 1, f)));
    lines.join("\n")
}

pub struct GetPriceFeeds {
    hermes: Arc<Hermes>,
    extraction: Extraction,
}

impl GetPriceFeeds {
    pub fn new(hermes: Arc<Hermes>) -> Self {
        Self {
            hermes,
            extraction: Extraction::new(templates::PRICE_FEEDS, schema(), ModelClass::Small),
        }
    }
}

#[async_trait]
impl ApiAction for GetPriceFeeds {
    type Params = FeedsParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user("Which Pyth feeds exist for BTC?"),
            ActionExample::agent_action("I'll search the Pyth price feeds for BTC.", DESCRIPTOR.name),
            ActionExample::agent(
                "Found 3 Pyth price feeds matching \"btc\". Showing 3:\n1. Crypto.BTC/USD (crypto)\n{{dynamic}}",
            ),
        ]]
    }

    fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    fn errors(&self) -> &ErrorMessages {
        &ERRORS
    }

    async fn is_available(&self, _runtime: &dyn Runtime) -> bool {
        true
    }

    async fn execute(&self, runtime: &dyn Runtime, params: FeedsParams) -> Result<Delivery> {
        let client = self.hermes.client(runtime);
        let mut query = Vec::new();
        if let Some(q) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query.push(("query", q.to_string()));
        }
        if let Some(t) = params.asset_type.as_deref() {
            query.push(("asset_type", t.to_string()));
        }
        info!(?query, limit = params.limit, "searching price feeds");

        let feeds: Vec<PriceFeed> = client.get_json("/v2/price_feeds", &query).await?;
        let total = feeds.len();
        let shown: Vec<PriceFeed> = feeds.into_iter().take(params.limit).collect();

        let text = render(&shown, total, &params);
        let content = json!({
            "feeds": shown,
            "total": total,
            "params": {
                "query": params.query,
                "asset_type": params.asset_type,
                "limit": params.limit,
            },
        });
        Ok(Delivery::new(text, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> PriceFeed {
        serde_json::from_value(json!({
            "id": "e62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43",
            "attributes": {
                "asset_type": "Crypto",
                "base": "BTC",
                "description": "BITCOIN / US DOLLAR",
                "symbol": "Crypto.BTC/USD"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_render_listing() {
        let params = FeedsParams {
            query: Some("btc".into()),
            asset_type: None,
            limit: 1,
        };
        assert_eq!(
            render(&[feed()], 4, &params),
            "Found 4 Pyth price feeds matching \"btc\". Showing 1:\n\n\
             1. Crypto.BTC/USD (crypto)\n   \
             ID: 0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43\n   \
             Description: BITCOIN / US DOLLAR"
        );
    }

    #[test]
    fn test_schema_clamps_and_checks_asset_type() {
        let resolved = schema().resolve(json!({ "limit": 500 })).unwrap();
        assert_eq!(resolved["limit"], 50);
        assert!(schema().resolve(json!({ "asset_type": "bonds" })).is_err());
        let resolved = schema().resolve(json!({ "asset_type": "FX" })).unwrap();
        assert_eq!(resolved["asset_type"], "fx");
    }
}
