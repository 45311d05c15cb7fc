//! `GET_LATEST_PRICE_UPDATES`: the most recent price for each feed id.

use async_trait::async_trait;
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, OneOrMany,
    ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::hermes::{self, Hermes, PriceUpdate, id_query, normalize_price_ids, render_update};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_LATEST_PRICE_UPDATES",
    similes: &["LATEST_PRICES", "PYTH_PRICE", "CURRENT_PRICE_UPDATE", "FETCH_LATEST_PRICE"],
    description: "Get the latest Pyth price updates for one or more price feed ids",
};

const ERRORS: ErrorMessages = hermes::errors("latest price updates");

pub fn schema() -> ParamSchema {
    ParamSchema::new().field(Field::string_or_list("price_ids").required())
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestParams {
    pub price_ids: OneOrMany,
}

pub(crate) fn render(update: &PriceUpdate) -> String {
    let blocks: Vec<String> = update.parsed.iter().map(render_update).collect();
    format!("Latest Pyth prices:\n\n{}", blocks.join("\n\n"))
}

pub struct GetLatestPriceUpdates {
    hermes: Arc<Hermes>,
    extraction: Extraction,
}

impl GetLatestPriceUpdates {
    pub fn new(hermes: Arc<Hermes>) -> Self {
        Self {
            hermes,
            extraction: Extraction::new(
                templates::LATEST_PRICE_UPDATES,
                schema(),
                ModelClass::Small,
            ),
        }
    }
}

#[async_trait]
impl ApiAction for GetLatestPriceUpdates {
    type Params = LatestParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user(
                "Get the latest price for 0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43",
            ),
            ActionExample::agent_action("I'll fetch the latest Pyth price for that feed.", DESCRIPTOR.name),
            ActionExample::agent("Latest Pyth prices:\n{{dynamic}}"),
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

    async fn execute(&self, runtime: &dyn Runtime, params: LatestParams) -> Result<Delivery> {
        let ids = normalize_price_ids(params.price_ids.into_vec())?;
        let client = self.hermes.client(runtime);
        info!(ids = ids.len(), "fetching latest price updates");

        let mut query = id_query(&ids);
        query.push(("parsed", "true".into()));
        let update: PriceUpdate = client.get_json("/v2/updates/price/latest", &query).await?;
        if update.parsed.is_empty() {
            return Err(PluginError::InvalidResponse(
                "No price updates returned for the requested feeds".into(),
            ));
        }

        let text = render(&update);
        let content = json!({
            "updates": update.parsed,
            "binary": update.binary,
            "params": { "price_ids": ids },
        });
        Ok(Delivery::new(text, content))
    }
}
