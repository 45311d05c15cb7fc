//! `GET_PRICE_UPDATES_STREAM`: collect a handful of streamed price updates.
//!
//! Hermes streams updates as server-sent events. Collection stops after
//! `max_updates` events, when the server closes the stream, or when the
//! window closes, whichever happens first.

use async_trait::async_trait;
use athena_actions::upstream::check_status;
use athena_actions::{
    ActionDescriptor, ApiAction, Delivery, ErrorMessages, Extraction, Field, OneOrMany,
    ParamSchema,
};
use athena_core::{ActionExample, ModelClass, PluginError, Result, Runtime};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::hermes::{self, Hermes, PriceUpdate, id_query, normalize_price_ids, render_update};
use crate::templates;

const DESCRIPTOR: ActionDescriptor = ActionDescriptor {
    name: "GET_PRICE_UPDATES_STREAM",
    similes: &["STREAM_PRICES", "WATCH_PRICES", "PRICE_STREAM", "LIVE_PRICE_UPDATES"],
    description: "Collect a short burst of streamed Pyth price updates for one or more feed ids",
};

const ERRORS: ErrorMessages = hermes::errors("price update stream");

pub const STREAM_WINDOW: Duration = Duration::from_secs(10);

pub fn schema() -> ParamSchema {
    ParamSchema::new()
        .field(Field::string_or_list("price_ids").required())
        .field(
            Field::integer("max_updates")
                .range(Some(1.0), Some(20.0))
                .default(5),
        )
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamParams {
    pub price_ids: OneOrMany,
    pub max_updates: usize,
}

/// Reassembles `data:` payloads from a chunked event stream.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseBuffer {
    /// Feed one chunk; returns the payloads of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\r', '\n']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                self.data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
        }
        events
    }
}

fn render(updates: &[PriceUpdate]) -> String {
    let mut sections = vec![format!("Received {} Pyth price updates:", updates.len())];
    for (i, update) in updates.iter().enumerate() {
        let blocks: Vec<String> = update.parsed.iter().map(render_update).collect();
        sections.push(format!("Update {}:\n{}", i + 1, blocks.join("\n")));
    }
    sections.join("\n\n")
}

pub struct GetPriceUpdatesStream {
    hermes: Arc<Hermes>,
    extraction: Extraction,
    window: Duration,
}

impl GetPriceUpdatesStream {
    pub fn new(hermes: Arc<Hermes>) -> Self {
        Self {
            hermes,
            extraction: Extraction::new(
                templates::PRICE_UPDATES_STREAM,
                schema(),
                ModelClass::Small,
            ),
            window: STREAM_WINDOW,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    async fn collect(
        &self,
        runtime: &dyn Runtime,
        ids: &[String],
        max_updates: usize,
    ) -> Result<Vec<PriceUpdate>> {
        let client = self.hermes.client(runtime);
        let mut query = id_query(ids);
        query.push(("parsed", "true".into()));
        let request = self
            .hermes
            .http()
            .get(client.url("/v2/updates/price/stream"))
            .header("accept", "text/event-stream")
            .query(&query);
        let resp = check_status(request).await?;

        let deadline = tokio::time::Instant::now() + self.window;
        let mut stream = resp.bytes_stream();
        let mut sse = SseBuffer::default();
        let mut updates = Vec::new();

        'read: loop {
            let chunk = match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(chunk)) => chunk.map_err(|e| PluginError::UpstreamHttp {
                    status: None,
                    message: e.to_string(),
                })?,
                Ok(None) => {
                    debug!("price stream closed by server");
                    break;
                }
                Err(_) => {
                    debug!(window_secs = self.window.as_secs(), "price stream window closed");
                    break;
                }
            };
            for data in sse.push(&chunk) {
                match serde_json::from_str::<PriceUpdate>(&data) {
                    Ok(update) => {
                        updates.push(update);
                        if updates.len() >= max_updates {
                            break 'read;
                        }
                    }
                    Err(e) => warn!(error = %e, "skipping malformed stream event"),
                }
            }
        }
        Ok(updates)
    }
}

#[async_trait]
impl ApiAction for GetPriceUpdatesStream {
    type Params = StreamParams;

    fn descriptor(&self) -> &ActionDescriptor {
        &DESCRIPTOR
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![
            ActionExample::user(
                "Stream 3 price updates for 0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace",
            ),
            ActionExample::agent_action("I'll watch that Pyth feed for a few updates.", DESCRIPTOR.name),
            ActionExample::agent("Received 3 Pyth price updates:\n{{dynamic}}"),
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

    async fn execute(&self, runtime: &dyn Runtime, params: StreamParams) -> Result<Delivery> {
        let ids = normalize_price_ids(params.price_ids.into_vec())?;
        info!(ids = ids.len(), max_updates = params.max_updates, "collecting streamed price updates");

        let updates = self.collect(runtime, &ids, params.max_updates).await?;
        if updates.is_empty() {
            return Err(PluginError::InvalidResponse(
                "No price updates received from the stream".into(),
            ));
        }

        let text = render(&updates);
        let parsed: Vec<_> = updates.iter().flat_map(|u| u.parsed.iter()).collect();
        let content = json!({
            "updates": parsed,
            "count": updates.len(),
            "params": { "price_ids": ids, "max_updates": params.max_updates },
        });
        Ok(Delivery::new(text, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_buffer_reassembles_split_events() {
        let mut sse = SseBuffer::default();
        assert!(sse.push(b": keep-alive\n\ndata: {\"a\"").is_empty());
        let events = sse.push(b":1}\n\ndata:{\"b\":2}\r\n\r\n");
        assert_eq!(events, vec![r#"{"a":1}"#.to_string(), r#"{"b":2}"#.to_string()]);
    }

    #[test]
    fn test_sse_buffer_handles_split_utf8() {
        let mut sse = SseBuffer::default();
        let payload = "data: ±\n\n".as_bytes();
        assert!(sse.push(&payload[..7]).is_empty());
        assert_eq!(sse.push(&payload[7..]), vec!["±".to_string()]);
    }

    #[test]
    fn test_max_updates_clamps() {
        let resolved = schema()
            .resolve(json!({ "price_ids": "abc", "max_updates": 100 }))
            .unwrap();
        assert_eq!(resolved["max_updates"], 20);
        assert!(schema().resolve(json!({ "max_updates": 3 })).is_err());
    }
}
