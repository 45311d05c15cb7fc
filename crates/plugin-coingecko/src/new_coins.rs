//! `GET_NEW_COINS`: most recently listed coins.

use async_trait::async_trait;
use athena_actions::format::{from_unix, long_date_time};
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, ParamSchema,
    require_non_empty,
};
use athena_core::{ActionExample, ModelClass, Result, Runtime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::{self, CoinGecko};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_NEW_COINS",
    similes: &["NEW_COINS", "RECENTLY_ADDED", "NEW_LISTINGS", "LATEST_COINS"],
    description: "Get list of recently added coins from CoinGecko",
};

const ERRORS: ErrorMessages = api::errors("new coins data");

pub fn schema() -> ParamSchema {
    ParamSchema::new().field(
        Field::integer("limit")
            .range(Some(1.0), Some(50.0))
            .default(10),
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCoinsParams {
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
struct NewCoin {
    name: String,
    symbol: String,
    activated_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedCoin {
    name: String,
    symbol: String,
    activated_at: String,
}

impl From<&NewCoin> for ListedCoin {
    fn from(c: &NewCoin) -> Self {
        Self {
            name: c.name.clone(),
            symbol: c.symbol.to_uppercase(),
            activated_at: from_unix(c.activated_at)
                .map(|at| long_date_time(&at))
                .unwrap_or_else(|| c.activated_at.to_string()),
        }
    }
}

fn render(coins: &[ListedCoin]) -> String {
    let mut lines = vec!["Recently Added Coins:".to_string(), String::new()];
    lines.extend(coins.iter().enumerate().map(|(i, c)| {
        format!(
            "{}. {} ({})\n   Listed: {}",
            i + 1,
            c.name,
            c.symbol,
            c.activated_at
        )
    }));
    lines.join("\n")
}

pub struct GetNewCoins {
    api: Arc<CoinGecko>,
    extraction: Extraction,
}

impl GetNewCoins {
    pub fn new(api: Arc<CoinGecko>) -> Self {
        Self {
            api,
            extraction: Extraction::new(templates::NEW_COINS, schema(), ModelClass::Large),
        }
    }
}

#[async_trait]
impl ApiAction for GetNewCoins {
    type Params = NewCoinsParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user("What are the newest coins listed?"),
            ActionExample::agent_action("I'll check the recently added coins for you.", DESCRIPTOR.name),
            ActionExample::agent(
                "Here are the recently added coins:\n1. Verb Ai (VERB)\n   Listed: January 20, 2025, 12:31 PM\n{{dynamic}}",
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

    async fn execute(&self, runtime: &dyn Runtime, params: NewCoinsParams) -> Result<Delivery> {
        let client = self.api.client(runtime)?;
        info!(limit = params.limit, "fetching new coins");
        let coins: Vec<NewCoin> = client.get_json("/coins/list/new", &[]).await?;
        let coins = require_non_empty(coins, "new coins")?;

        let listed: Vec<ListedCoin> = coins
            .iter()
            .take(params.limit)
            .map(ListedCoin::from)
            .collect();
        let text = render(&listed);
        Ok(Delivery::new(
            text,
            json!({ "newCoins": listed, "timestamp": api::timestamp() }),
        ))
    }
}
