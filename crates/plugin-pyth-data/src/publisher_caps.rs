//! `GET_LATEST_PUBLISHER_CAPS`: current publisher stake caps.

use async_trait::async_trait;
use athena_actions::format::format_number;
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::hermes::{self, BinaryUpdate, Hermes};

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_LATEST_PUBLISHER_CAPS",
    similes: &["PUBLISHER_CAPS", "PUBLISHER_STAKE_CAPS", "PYTH_PUBLISHER_CAPS"],
    description: "Get the latest Pyth publisher stake caps",
};

const ERRORS: ErrorMessages = hermes::errors("publisher stake caps");

/// Caps listed in the text; the payload carries all of them.
pub const LISTED_CAPS: usize = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct CapsParams {}

#[derive(Debug, Deserialize)]
struct CapsResponse {
    #[serde(default)]
    binary: Option<BinaryUpdate>,
    #[serde(default)]
    parsed: Vec<ParsedCaps>,
}

#[derive(Debug, Deserialize)]
struct ParsedCaps {
    #[serde(default)]
    publisher_stake_caps: Vec<PublisherCap>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherCap {
    pub publisher: String,
    pub cap: u64,
}

fn render(caps: &[PublisherCap]) -> String {
    let mut lines = vec![format!(
        "Latest Pyth publisher stake caps ({} publishers):",
        caps.len()
    )];
    lines.push(String::new());
    lines.extend(
        caps.iter()
            .take(LISTED_CAPS)
            .enumerate()
            .map(|(i, c)| format!("{}. {}: {}", i + 1, c.publisher, format_number(c.cap as f64, 0, 0))),
    );
    if caps.len() > LISTED_CAPS {
        lines.push(format!("...and {} more", caps.len() - LISTED_CAPS));
    }
    lines.join("\n")
}

pub struct GetLatestPublisherCaps {
    hermes: Arc<Hermes>,
    extraction: Extraction,
}

impl GetLatestPublisherCaps {
    pub fn new(hermes: Arc<Hermes>) -> Self {
        Self {
            hermes,
            extraction: Extraction::new("", ParamSchema::new(), ModelClass::Small),
        }
    }
}

#[async_trait]
impl ApiAction for GetLatestPublisherCaps {
    type Params = CapsParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user("What are the current Pyth publisher stake caps?"),
            ActionExample::agent_action("I'll fetch the latest publisher stake caps.", DESCRIPTOR.name),
            ActionExample::agent("Latest Pyth publisher stake caps (42 publishers):\n{{dynamic}}"),
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

    async fn execute(&self, runtime: &dyn Runtime, _params: CapsParams) -> Result<Delivery> {
        let client = self.hermes.client(runtime);
        info!("fetching publisher stake caps");
        let response: CapsResponse = client
            .get_json(
                "/v2/updates/publisher_stake_caps/latest",
                &[("parsed", "true".to_string())],
            )
            .await?;

        let mut caps: Vec<PublisherCap> = response
            .parsed
            .into_iter()
            .flat_map(|p| p.publisher_stake_caps)
            .collect();
        if caps.is_empty() {
            return Err(PluginError::InvalidResponse(
                "No publisher stake caps returned".into(),
            ));
        }
        caps.sort_by(|a, b| b.cap.cmp(&a.cap).then_with(|| a.publisher.cmp(&b.publisher)));

        let text = render(&caps);
        let content = json!({ "publisherCaps": caps, "binary": response.binary });
        Ok(Delivery::new(text, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_truncates_long_lists() {
        let caps: Vec<PublisherCap> = (0..30)
            .map(|i| PublisherCap {
                publisher: format!("pub{i}"),
                cap: 1_000_000 - i,
            })
            .collect();
        let text = render(&caps);
        assert!(text.starts_with("Latest Pyth publisher stake caps (30 publishers):\n\n1. pub0: 1,000,000"));
        assert!(text.ends_with("25. pub24: 999,976\n...and 5 more"));
    }
}
