//! `GET_TOP_GAINERS_LOSERS`: biggest price movers over a window.

use async_trait::async_trait;
use athena_actions::format::{format_number, format_signed_percent};
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko, price_prefix};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_TOP_GAINERS_LOSERS",
    similes: &[
        "TOP_MOVERS",
        "BIGGEST_GAINERS",
        "BIGGEST_LOSERS",
        "PRICE_CHANGES",
        "BEST_WORST_PERFORMERS",
    ],
    description: "Get list of top gaining and losing cryptocurrencies by price change",
};

const ERRORS: ErrorMessages = api::errors("top gainers/losers data");

pub const DURATIONS: &[&str] = &["1h", "24h", "7d", "14d", "30d", "60d", "1y"];

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::string("vs_currency").default("usd"))
        .field(Field::one_of("duration", DURATIONS).default("24h"))
        .field(Field::string("top_coins").default("1000"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoversParams {
    pub vs_currency: String,
    pub duration: String,
    pub top_coins: String,
}

#[derive(Debug, Deserialize)]
struct MoversResponse {
    #[serde(default)]
    top_gainers: Vec<Map<String, Value>>,
    #[serde(default)]
    top_losers: Vec<Map<String, Value>>,
}

fn mover_line(rank: usize, coin: &Map<String, Value>, vs: &str, duration: &str) -> String {
    let text = |key: &str| coin.get(key).and_then(Value::as_str).unwrap_or_default();
    let price = coin
        .get(vs)
        .and_then(Value::as_f64)
        .map(|p| format!("{}{}", price_prefix(vs), format_number(p, 2, 8)))
        .unwrap_or_else(|| "N/A".into());
    let change = coin
        .get(&format!("{vs}_{duration}_change"))
        .and_then(Value::as_f64)
        .map(format_signed_percent)
        .unwrap_or_else(|| "N/A".into());
    let rank_suffix = coin
        .get("market_cap_rank")
        .and_then(Value::as_u64)
        .map(|r| format!(" | Rank #{r}"))
        .unwrap_or_default();
    format!(
        "{rank}. {} ({}) | {price} | {change}{rank_suffix}",
        text("name"),
        text("symbol").to_uppercase()
    )
}

fn render(data: &MoversResponse, vs: &str, duration: &str) -> String {
    let mut lines = vec!["Top Gainers:".to_string()];
    lines.extend(
        data.top_gainers
            .iter()
            .enumerate()
            .map(|(i, c)| mover_line(i + 1, c, vs, duration)),
    );
    lines.push(String::new());
    lines.push("Top Losers:".into());
    lines.extend(
        data.top_losers
            .iter()
            .enumerate()
            .map(|(i, c)| mover_line(i + 1, c, vs, duration)),
    );
    lines.join("\n")
}

pub struct GetTopGainersLosers {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetTopGainersLosers {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::GAINERS_LOSERS, schema(), ModelClass::Large),
        }
    }
}

#[async_trait]
impl ApiAction for GetTopGainersLosers {
    type Params = MoversParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![
                ActionExample::user("What are the top gaining and losing cryptocurrencies?"),
                ActionExample::agent_action(
                    "I'll check the top gainers and losers for you.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent(
                    "Here are the top gainers and losers:\nTop Gainers:\n1. Bitcoin (BTC) | $45,000.00 | +5.20% | Rank #1\n{{dynamic}}",
                ),
            ],
            vec![
                ActionExample::user("Show me the best and worst performing crypto today"),
                ActionExample::agent_action(
                    "I'll fetch the current top movers in the crypto market.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent("Here are today's best and worst performers:\n{{dynamic}}"),
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

    async fn execute(&self, runtime: &dyn Runtime, params: MoversParams) -> Result<Delivery> {
        let vs = params.vs_currency.to_lowercase();
        let client = self.api.client(runtime)?;
        info!(
            vs_currency = %vs,
            duration = %params.duration,
            top_coins = %params.top_coins,
            "fetching top movers"
        );
        let raw: Value = client
            .get_json(
                "/coins/top_gainers_losers",
                &[
                    ("vs_currency", vs.clone()),
                    ("duration", params.duration.clone()),
                    ("top_coins", params.top_coins.clone()),
                ],
            )
            .await?;
        let data: MoversResponse = serde_json::from_value(raw.clone())
            .map_err(|e| PluginError::InvalidResponse(e.to_string()))?;

        let text = render(&data, &vs, &params.duration);
        let content = json!({
            "data": raw,
            "params": {
                "vs_currency": vs,
                "duration": params.duration,
                "top_coins": params.top_coins,
            },
        });
        Ok(Delivery::new(text, content))
    }
}
