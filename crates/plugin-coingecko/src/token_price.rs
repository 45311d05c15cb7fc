//! `GET_TOKEN_PRICE_BY_ADDRESS`: USD price of a token by chain and contract.

use async_trait::async_trait;
use athena_actions::format::format_number;
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_TOKEN_PRICE_BY_ADDRESS",
    similes: &[
        "FETCH_TOKEN_PRICE_BY_ADDRESS",
        "CHECK_TOKEN_PRICE_BY_ADDRESS",
        "LOOKUP_TOKEN_BY_ADDRESS",
    ],
    description: "Get the current USD price for a token using its blockchain address",
};

const ERRORS: ErrorMessages = api::errors("token price");

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::string("chainId").required())
        .field(Field::string("tokenAddress").required())
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPriceParams {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    name: String,
    symbol: String,
    #[serde(default)]
    market_data: Option<MarketData>,
}

#[derive(Debug, Default, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
}

impl MarketData {
    fn usd(map: &HashMap<String, Option<f64>>) -> Option<f64> {
        map.get("usd").copied().flatten().filter(|v| *v != 0.0)
    }
}

/// A chain id or contract address used as a URL path segment.
fn path_segment(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(value.to_string())
    } else {
        Err(PluginError::InvalidParameter {
            field: field.to_string(),
            reason: format!("'{value}' is not a valid identifier"),
        })
    }
}

pub struct GetTokenPriceByAddress {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetTokenPriceByAddress {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::PRICE_BY_ADDRESS, schema(), ModelClass::Small),
        }
    }
}

#[async_trait]
impl ApiAction for GetTokenPriceByAddress {
    type Params = TokenPriceParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user(
                "What's the price of the USDC token on Ethereum? The address is 0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            ),
            ActionExample::agent_action("I'll check the USDC token price for you.", DESCRIPTOR.name),
            ActionExample::agent(
                "USD Coin (USDC)\nAddress: 0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48\nChain: ethereum\nPrice: {{dynamic}} USD\nMarket Cap: ${{dynamic}} USD",
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

    async fn execute(&self, runtime: &dyn Runtime, params: TokenPriceParams) -> Result<Delivery> {
        let chain = path_segment("chainId", &params.chain_id.to_lowercase())?;
        let address = path_segment("tokenAddress", &params.token_address)?;
        let client = self.api.client(runtime)?;

        info!(chain = %chain, address = %address, "fetching token price");
        let token: TokenData = client
            .get_json(&format!("/coins/{chain}/contract/{address}"), &[])
            .await?;

        let market = token.market_data.unwrap_or_default();
        let Some(price) = MarketData::usd(&market.current_price) else {
            return Err(PluginError::InvalidResponse(format!(
                "No price data available for token {address} on {chain}"
            )));
        };
        let market_cap = MarketData::usd(&market.market_cap);

        let mut parts = vec![
            format!("{} ({})", token.name, token.symbol.to_uppercase()),
            format!("Address: {address}"),
            format!("Chain: {chain}"),
            format!("Price: ${price:.6} USD"),
        ];
        if let Some(cap) = market_cap {
            parts.push(format!("Market Cap: ${} USD", format_number(cap, 0, 3)));
        }

        let content = json!({
            "token": {
                "name": token.name,
                "symbol": token.symbol,
                "address": address,
                "chain": chain,
                "price": price,
                "marketCap": market_cap,
            }
        });
        Ok(Delivery::new(parts.join("\n"), content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment() {
        assert_eq!(
            path_segment("tokenAddress", " 0xA0b8 ").unwrap(),
            "0xA0b8"
        );
        assert_eq!(
            path_segment("chainId", "binance-smart-chain").unwrap(),
            "binance-smart-chain"
        );
        assert!(path_segment("tokenAddress", "0xabc/../x").is_err());
        assert!(path_segment("chainId", "").is_err());
    }

    #[test]
    fn test_zero_price_counts_as_missing() {
        let map = HashMap::from([("usd".to_string(), Some(0.0))]);
        assert_eq!(MarketData::usd(&map), None);
        let map = HashMap::from([("usd".to_string(), Some(0.999912))]);
        assert_eq!(MarketData::usd(&map), Some(0.999912));
    }
}
