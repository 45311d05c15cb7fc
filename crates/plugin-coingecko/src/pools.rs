//! `GET_TRENDING_POOLS`: trending on-chain liquidity pools.

use async_trait::async_trait;
use athena_actions::format::{format_currency, short_date};
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, Result, Runtime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_TRENDING_POOLS",
    similes: &["TRENDING_POOLS", "HOT_POOLS", "POPULAR_POOLS", "TOP_POOLS"],
    description: "Get list of trending pools from CoinGecko's onchain data",
};

const ERRORS: ErrorMessages = api::errors("trending pools data");

/// Only `limit` is accepted, and values outside 1..=100 are rejected.
pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(
            Field::integer("limit")
                .range(Some(1.0), Some(100.0))
                .reject_out_of_range()
                .default(10),
        )
        .strict()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolsParams {
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    data: Vec<Pool>,
}

#[derive(Debug, Deserialize)]
struct Pool {
    attributes: PoolAttributes,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
    name: String,
    market_cap_usd: Option<String>,
    fdv_usd: Option<String>,
    reserve_in_usd: Option<String>,
    pool_created_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PoolSummary {
    name: String,
    market_cap: String,
    fdv: String,
    #[serde(rename = "reserveUSD")]
    reserve_usd: String,
    created_at: String,
}

/// The API reports USD amounts as decimal strings.
fn usd(amount: Option<&str>) -> String {
    amount
        .and_then(|a| a.parse::<f64>().ok())
        .map(|v| format_currency(v, "USD", None))
        .unwrap_or_else(|| "N/A".into())
}

impl From<&PoolAttributes> for PoolSummary {
    fn from(a: &PoolAttributes) -> Self {
        let created_at = a
            .pool_created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| short_date(&d.with_timezone(&Utc)))
            .unwrap_or_else(|| "N/A".into());
        Self {
            name: a.name.clone(),
            market_cap: usd(a.market_cap_usd.as_deref()),
            fdv: usd(a.fdv_usd.as_deref()),
            reserve_usd: usd(a.reserve_in_usd.as_deref()),
            created_at,
        }
    }
}

fn render(pools: &[PoolSummary]) -> String {
    let mut lines = vec!["Trending Pools Overview:".to_string(), String::new()];
    for (i, pool) in pools.iter().enumerate() {
        lines.push(format!(
            "{}. {}\n   Market Cap: {}\n   FDV: {}\n   Reserve: {}\n   Created: {}\n",
            i + 1,
            pool.name,
            pool.market_cap,
            pool.fdv,
            pool.reserve_usd,
            pool.created_at
        ));
    }
    lines.join("\n")
}

pub struct GetTrendingPools {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetTrendingPools {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::TRENDING_POOLS, schema(), ModelClass::Large),
        }
    }
}

#[async_trait]
impl ApiAction for GetTrendingPools {
    type Params = PoolsParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![
                ActionExample::user("Show me trending liquidity pools"),
                ActionExample::agent_action(
                    "I'll check the trending liquidity pools for you.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent(
                    "Here are the trending liquidity pools:\n1. MELANIA / USDC\n   Market Cap: $954,636,707\n   FDV: $6,402,478,508\n   Reserve: $363,641,037\n   Created: 1/19/2025",
                ),
            ],
            vec![
                ActionExample::user("What are the top hottest dex pools?"),
                ActionExample::agent_action(
                    "I'll fetch the top hottest DEX pools for you.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent(
                    "Here are the top 5 hottest DEX pools:\n1. TRUMP / USDC\n   Market Cap: $8,844,297,825\n   FDV: $43,874,068,484\n   Reserve: $718,413,745\n   Created: 1/17/2025",
                ),
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

    async fn execute(&self, runtime: &dyn Runtime, params: PoolsParams) -> Result<Delivery> {
        let client = self.api.client(runtime)?;
        info!(limit = params.limit, "fetching trending pools");
        let response: PoolsResponse = client
            .get_json(
                "/onchain/networks/trending_pools",
                &[("include", "base_token,dex".to_string())],
            )
            .await?;

        let pools: Vec<PoolSummary> = response
            .data
            .iter()
            .take(params.limit)
            .map(|p| PoolSummary::from(&p.attributes))
            .collect();

        let text = render(&pools);
        Ok(Delivery::new(
            text,
            json!({ "trendingPools": pools, "timestamp": api::timestamp() }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_formats_usd_strings() {
        let attrs = PoolAttributes {
            name: "MELANIA / USDC".into(),
            market_cap_usd: Some("954636707.12".into()),
            fdv_usd: Some("6402478508.4".into()),
            reserve_in_usd: None,
            pool_created_at: Some("2025-01-19T15:04:05Z".into()),
        };
        let s = PoolSummary::from(&attrs);
        assert_eq!(s.market_cap, "$954,636,707.12");
        assert_eq!(s.fdv, "$6,402,478,508.40");
        assert_eq!(s.reserve_usd, "N/A");
        assert_eq!(s.created_at, "1/19/2025");
        assert_eq!(
            render(&[s]),
            "Trending Pools Overview:\n\n1. MELANIA / USDC\n   Market Cap: $954,636,707.12\n   \
             FDV: $6,402,478,508.40\n   Reserve: N/A\n   Created: 1/19/2025\n"
        );
    }

    #[test]
    fn test_schema_rejects_limit_over_100() {
        assert!(schema().resolve(json!({ "limit": 500 })).is_err());
        assert!(schema().resolve(json!({ "limit": 5, "network": "eth" })).is_err());
        assert_eq!(schema().resolve(json!({})).unwrap()["limit"], 10);
    }
}
