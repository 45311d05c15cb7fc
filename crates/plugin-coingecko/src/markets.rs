//! `GET_MARKETS`: ranked market listing, optionally within a category.

use async_trait::async_trait;
use athena_actions::format::{format_billions, format_number, format_signed_percent};
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko, price_digits, price_prefix, resolve_category};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_MARKETS",
    similes: &[
        "MARKET_OVERVIEW",
        "TOP_RANKINGS",
        "MARKET_LEADERBOARD",
        "CRYPTO_RANKINGS",
        "BEST_PERFORMING_COINS",
        "TOP_MARKET_CAPS",
    ],
    description: "Get ranked list of top cryptocurrencies sorted by market metrics (without specifying coins)",
};

const ERRORS: ErrorMessages = api::errors("market data");

pub const ORDERS: &[&str] = &["market_cap_desc", "market_cap_asc", "volume_desc", "volume_asc"];

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::string("vs_currency").default("usd"))
        .field(Field::string("category"))
        .field(Field::one_of("order", ORDERS).default("market_cap_desc"))
        .field(
            Field::integer("per_page")
                .range(Some(1.0), Some(250.0))
                .default(20),
        )
        .field(Field::integer("page").range(Some(1.0), None).default(1))
        .field(Field::boolean("sparkline").default(false))
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketsParams {
    pub vs_currency: String,
    #[serde(default)]
    pub category: Option<String>,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
}

#[derive(Debug, Deserialize)]
struct MarketCoin {
    name: String,
    symbol: String,
    market_cap_rank: Option<u32>,
    current_price: Option<f64>,
    price_change_24h: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
    high_24h: Option<f64>,
    low_24h: Option<f64>,
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
    max_supply: Option<f64>,
    last_updated: Option<String>,
}

impl MarketCoin {
    fn payload(&self) -> Value {
        json!({
            "name": self.name,
            "symbol": self.symbol.to_uppercase(),
            "marketCapRank": self.market_cap_rank,
            "currentPrice": self.current_price,
            "priceChange24h": self.price_change_24h,
            "priceChangePercentage24h": self.price_change_percentage_24h,
            "marketCap": self.market_cap,
            "volume24h": self.total_volume,
            "high24h": self.high_24h,
            "low24h": self.low_24h,
            "circulatingSupply": self.circulating_supply,
            "totalSupply": self.total_supply,
            "maxSupply": self.max_supply,
            "lastUpdated": self.last_updated,
        })
    }

    fn line(&self, rank: usize, prefix: &str) -> String {
        let price = self
            .current_price
            .map(|p| format!("{prefix}{}", format_number(p, 0, price_digits(p))))
            .unwrap_or_else(|| "N/A".into());
        let change = self
            .price_change_percentage_24h
            .map(format_signed_percent)
            .unwrap_or_else(|| "N/A".into());
        let cap = self
            .market_cap
            .map(|m| format!("{prefix}{}", format_billions(m)))
            .unwrap_or_else(|| "N/A".into());
        format!(
            "{rank}. {} ({}) | {price} | {change} | MCap: {cap}",
            self.name,
            self.symbol.to_uppercase()
        )
    }
}

fn heading(count: usize, category: Option<&str>, order: &str) -> String {
    let category = category
        .map(|c| format!("{} ", c.to_uppercase()))
        .unwrap_or_default();
    let metric = if order.starts_with("volume") {
        "Volume"
    } else {
        "Market Cap"
    };
    format!("Top {count} {category}Cryptocurrencies by {metric}:")
}

pub struct GetMarkets {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetMarkets {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::MARKETS, schema(), ModelClass::Small),
        }
    }
}

#[async_trait]
impl ApiAction for GetMarkets {
    type Params = MarketsParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user("Show me the top cryptocurrencies by market cap"),
            ActionExample::agent_action(
                "I'll fetch the current market data for top cryptocurrencies.",
                DESCRIPTOR.name,
            ),
            ActionExample::agent(
                "Here are the top cryptocurrencies:\n1. Bitcoin (BTC) | $45,000 | +2.50% | MCap: $870.50B\n{{dynamic}}",
            ),
        ]]
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

    async fn template_values(&self, runtime: &dyn Runtime) -> Result<Vec<(&'static str, String)>> {
        let categories = self.api.categories(runtime).await?;
        let rendered = categories
            .iter()
            .map(|c| format!("- {} (ID: {})", c.name, c.category_id))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(vec![("categories", rendered)])
    }

    async fn execute(&self, runtime: &dyn Runtime, params: MarketsParams) -> Result<Delivery> {
        let client = self.api.client(runtime)?;
        let categories = self.api.categories(runtime).await?;

        let candidate = params
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let category = match candidate {
            Some(c) => Some(
                resolve_category(c, &categories)
                    .ok_or_else(|| PluginError::UnresolvedCategory(c.to_string()))?,
            ),
            None => None,
        };

        let mut query = vec![
            ("vs_currency", params.vs_currency.clone()),
            ("order", params.order.clone()),
            ("per_page", params.per_page.to_string()),
            ("page", params.page.to_string()),
            ("sparkline", params.sparkline.to_string()),
        ];
        if let Some(c) = category {
            query.push(("category", c.category_id.clone()));
        }
        info!(
            category = ?category.map(|c| &c.category_id),
            vs_currency = %params.vs_currency,
            order = %params.order,
            per_page = params.per_page,
            page = params.page,
            "fetching markets"
        );

        let coins: Vec<MarketCoin> = client.get_json("/coins/markets", &query).await?;
        if coins.is_empty() {
            return Err(PluginError::InvalidResponse(
                "No market data received from CoinGecko API".into(),
            ));
        }

        let prefix = price_prefix(&params.vs_currency);
        let mut lines = vec![heading(
            coins.len(),
            category.map(|c| c.name.as_str()),
            &params.order,
        )];
        lines.extend(
            coins
                .iter()
                .enumerate()
                .map(|(i, coin)| coin.line(i + 1, &prefix)),
        );

        let content = json!({
            "markets": coins.iter().map(MarketCoin::payload).collect::<Vec<_>>(),
            "params": {
                "vs_currency": params.vs_currency,
                "category": category.map(|c| &c.category_id),
                "order": params.order,
                "per_page": params.per_page,
                "page": params.page,
            },
            "timestamp": api::timestamp(),
        });
        Ok(Delivery::new(lines.join("\n"), content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading() {
        assert_eq!(
            heading(10, Some("Gaming"), "market_cap_desc"),
            "Top 10 GAMING Cryptocurrencies by Market Cap:"
        );
        assert_eq!(
            heading(20, None, "volume_asc"),
            "Top 20 Cryptocurrencies by Volume:"
        );
    }

    #[test]
    fn test_line_format() {
        let coin = MarketCoin {
            name: "Bitcoin".into(),
            symbol: "btc".into(),
            market_cap_rank: Some(1),
            current_price: Some(45000.0),
            price_change_24h: None,
            price_change_percentage_24h: Some(2.5),
            market_cap: Some(870.5e9),
            total_volume: None,
            high_24h: None,
            low_24h: None,
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            last_updated: None,
        };
        assert_eq!(
            coin.line(1, "$"),
            "1. Bitcoin (BTC) | $45,000 | +2.50% | MCap: $870.50B"
        );
    }

    #[test]
    fn test_schema_clamps_page_size() {
        let resolved = schema().resolve(json!({ "per_page": 1000 })).unwrap();
        assert_eq!(resolved["per_page"], 250);
        assert_eq!(resolved["order"], "market_cap_desc");
        assert_eq!(resolved["vs_currency"], "usd");
    }
}
