//! `GET_PRICE`: simple price lookup for named coins in one or more currencies.

use async_trait::async_trait;
use athena_actions::format::{format_currency, format_signed_percent, from_unix, short_date_time};
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, OneOrMany,
    ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko, CoinListing};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_PRICE",
    similes: &[
        "COIN_PRICE_CHECK",
        "SPECIFIC_COINS_PRICE",
        "COIN_PRICE_LOOKUP",
        "SELECTED_COINS_PRICE",
        "PRICE_DETAILS",
        "COIN_PRICE_DATA",
    ],
    description: "Get price and basic market data for one or more specific cryptocurrencies (by name/symbol)",
};

const ERRORS: ErrorMessages = api::errors("price data");

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::string_or_list("coinIds").required())
        .field(Field::string_or_list("currency").default(json!(["usd"])))
        .field(Field::boolean("include_market_cap").default(false))
        .field(Field::boolean("include_24hr_vol").default(false))
        .field(Field::boolean("include_24hr_change").default(false))
        .field(Field::boolean("include_last_updated_at").default(false))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceParams {
    #[serde(rename = "coinIds")]
    pub coin_ids: OneOrMany,
    pub currency: OneOrMany,
    pub include_market_cap: bool,
    pub include_24hr_vol: bool,
    pub include_24hr_change: bool,
    pub include_last_updated_at: bool,
}

fn number(quote: &Map<String, Value>, key: &str) -> Option<f64> {
    quote.get(key).and_then(Value::as_f64)
}

fn coin_block(
    coin_id: &str,
    quote: &Map<String, Value>,
    currencies: &[String],
    params: &PriceParams,
    coins: &[CoinListing],
) -> String {
    let title = coins
        .iter()
        .find(|c| c.id == coin_id)
        .map(|c| format!("{} ({})", c.name, c.symbol.to_uppercase()))
        .unwrap_or_else(|| coin_id.to_string());
    let mut parts = vec![format!("{title}:")];

    for currency in currencies {
        let upper = currency.to_uppercase();
        if let Some(price) = number(quote, currency) {
            parts.push(format!("  {upper}: {}", format_currency(price, currency, None)));
        }
        if params.include_market_cap
            && let Some(cap) = number(quote, &format!("{currency}_market_cap"))
        {
            parts.push(format!(
                "  Market Cap ({upper}): {}",
                format_currency(cap, currency, Some(0))
            ));
        }
        if params.include_24hr_vol
            && let Some(vol) = number(quote, &format!("{currency}_24h_vol"))
        {
            parts.push(format!(
                "  24h Volume ({upper}): {}",
                format_currency(vol, currency, Some(0))
            ));
        }
        if params.include_24hr_change
            && let Some(change) = number(quote, &format!("{currency}_24h_change"))
        {
            parts.push(format!(
                "  24h Change ({upper}): {}",
                format_signed_percent(change)
            ));
        }
    }

    if params.include_last_updated_at
        && let Some(at) = quote
            .get("last_updated_at")
            .and_then(Value::as_i64)
            .and_then(from_unix)
    {
        parts.push(format!("  Last Updated: {}", short_date_time(&at)));
    }
    parts.join("\n")
}

pub struct GetPrice {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetPrice {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::PRICE, schema(), ModelClass::Large),
        }
    }
}

#[async_trait]
impl ApiAction for GetPrice {
    type Params = PriceParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![
                ActionExample::user("What's the current price of Bitcoin?"),
                ActionExample::agent_action(
                    "I'll check the current Bitcoin price for you.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent("The current price of Bitcoin is {{dynamic}} USD"),
            ],
            vec![
                ActionExample::user("Check ETH and BTC prices in EUR with market cap"),
                ActionExample::agent_action(
                    "I'll check the current prices with market cap data.",
                    DESCRIPTOR.name,
                ),
                ActionExample::agent(
                    "Bitcoin: EUR {{dynamic}} | Market Cap: €{{dynamic}}\nEthereum: EUR {{dynamic}} | Market Cap: €{{dynamic}}",
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

    async fn execute(&self, runtime: &dyn Runtime, params: PriceParams) -> Result<Delivery> {
        let coin_ids = params.coin_ids.clone().into_vec();
        if coin_ids.is_empty() {
            return Err(PluginError::InvalidParameter {
                field: "coinIds".into(),
                reason: "no coin ids given".into(),
            });
        }
        let mut currencies: Vec<String> = params
            .currency
            .clone()
            .into_vec()
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();
        if currencies.is_empty() {
            currencies.push("usd".into());
        }

        let client = self.api.client(runtime)?;
        let query = [
            ("ids", coin_ids.join(",")),
            ("vs_currencies", currencies.join(",")),
            ("include_market_cap", params.include_market_cap.to_string()),
            ("include_24hr_vol", params.include_24hr_vol.to_string()),
            ("include_24hr_change", params.include_24hr_change.to_string()),
            (
                "include_last_updated_at",
                params.include_last_updated_at.to_string(),
            ),
        ];
        info!(ids = %query[0].1, vs_currencies = %query[1].1, "fetching prices");

        let data: Map<String, Value> = client.get_json("/simple/price", &query).await?;
        if data.is_empty() {
            return Err(PluginError::InvalidResponse(
                "No price data available for the specified coins and currency".into(),
            ));
        }

        let coins = self.api.coins(runtime).await?;
        let empty = Map::new();
        let blocks: Vec<String> = data
            .iter()
            .map(|(id, quote)| {
                let quote = quote.as_object().unwrap_or(&empty);
                coin_block(id, quote, &currencies, &params, &coins)
            })
            .collect();

        let prices: Map<String, Value> = data
            .iter()
            .map(|(id, quote)| {
                let quote = quote.as_object().unwrap_or(&empty);
                let per_currency: Map<String, Value> = currencies
                    .iter()
                    .map(|c| {
                        (
                            c.clone(),
                            json!({
                                "price": number(quote, c),
                                "marketCap": number(quote, &format!("{c}_market_cap")),
                                "volume24h": number(quote, &format!("{c}_24h_vol")),
                                "change24h": number(quote, &format!("{c}_24h_change")),
                                "lastUpdated": quote.get("last_updated_at"),
                            }),
                        )
                    })
                    .collect();
                (id.clone(), Value::Object(per_currency))
            })
            .collect();

        let content = json!({
            "prices": prices,
            "params": {
                "currencies": currencies.iter().map(|c| c.to_uppercase()).collect::<Vec<_>>(),
                "include_market_cap": params.include_market_cap,
                "include_24hr_vol": params.include_24hr_vol,
                "include_24hr_change": params.include_24hr_change,
                "include_last_updated_at": params.include_last_updated_at,
            },
        });
        Ok(Delivery::new(blocks.join("\n\n"), content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(flags: bool) -> PriceParams {
        PriceParams {
            coin_ids: OneOrMany::One("bitcoin".into()),
            currency: OneOrMany::Many(vec!["usd".into(), "eur".into()]),
            include_market_cap: flags,
            include_24hr_vol: flags,
            include_24hr_change: flags,
            include_last_updated_at: flags,
        }
    }

    #[test]
    fn test_coin_block_with_all_fields() {
        let quote = json!({
            "usd": 67187.33,
            "usd_market_cap": 1_317_802_988_326.25,
            "usd_24h_vol": 31_260_929_299.52,
            "usd_24h_change": 3.637,
            "eur": 61900.5,
            "eur_24h_change": -0.5,
            "last_updated_at": 1_711_356_300
        });
        let coins = vec![CoinListing {
            id: "bitcoin".into(),
            symbol: "btc".into(),
            name: "Bitcoin".into(),
        }];
        let currencies = vec!["usd".to_string(), "eur".to_string()];
        let block = coin_block(
            "bitcoin",
            quote.as_object().unwrap(),
            &currencies,
            &params(true),
            &coins,
        );
        assert_eq!(
            block,
            "Bitcoin (BTC):\n  USD: $67,187.33\n  Market Cap (USD): $1,317,802,988,326\n  \
             24h Volume (USD): $31,260,929,300\n  24h Change (USD): +3.64%\n  EUR: €61,900.50\n  \
             24h Change (EUR): -0.50%\n  Last Updated: 3/25/2024, 8:45:00 AM"
        );
    }

    #[test]
    fn test_coin_block_unknown_coin_uses_id() {
        let quote = json!({ "usd": 0.5 });
        let block = coin_block(
            "mystery",
            quote.as_object().unwrap(),
            &["usd".to_string()],
            &params(false),
            &[],
        );
        assert_eq!(block, "mystery:\n  USD: $0.50");
    }
}
