//! `WEB_SEARCH`: answers a message with a web search summary and sources.
//!
//! The raw message text is the query; no parameters are extracted.

use async_trait::async_trait;
use athena_actions::ErrorMessages;
use athena_core::{
    Action, ActionExample, Callback, Content, HandlerOptions, Memory, PluginError, Result,
    Runtime, State,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::service::{SearchOptions, SearchResponse, WebSearchService};

pub const NAME: &str = "WEB_SEARCH";

const SIMILES: &[&str] = &[
    "SEARCH_WEB",
    "INTERNET_SEARCH",
    "LOOKUP",
    "QUERY_WEB",
    "FIND_ONLINE",
    "SEARCH_ENGINE",
    "WEB_LOOKUP",
    "ONLINE_SEARCH",
    "FIND_INFORMATION",
];

pub const MAX_RESPONSE_TOKENS: usize = 4000;
const CHARS_PER_TOKEN: usize = 4;

pub const NO_RESULTS: &str = "I couldn't find any results for that search.";

const ERRORS: ErrorMessages = ErrorMessages::new(
    "search results",
    "The search service rejected the request. Please check the TAVILY_API_KEY plan.",
);

/// Rough token count used for the response cap.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Cut `text` to at most `max_tokens` estimated tokens.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    if estimate_tokens(text) <= max_tokens {
        return text.to_string();
    }
    text.chars().take(max_tokens * CHARS_PER_TOKEN).collect()
}

/// Answer first, then the numbered source links.
pub fn render(response: &SearchResponse) -> String {
    let sources = response
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. [{}]({})", i + 1, r.title, r.url))
        .collect::<Vec<_>>()
        .join("\n");
    let resources = format!("For more details, you can check out these resources:\n{sources}");
    match response.answer.as_deref().map(str::trim) {
        Some(answer) if !answer.is_empty() => format!("{answer}\n\n{resources}"),
        _ => resources,
    }
}

pub struct WebSearch {
    service: Arc<WebSearchService>,
    options: SearchOptions,
}

impl WebSearch {
    pub fn new(service: Arc<WebSearchService>) -> Self {
        Self {
            service,
            options: SearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    async fn search(&self, runtime: &dyn Runtime, query: &str) -> (Content, bool) {
        match self.service.search(runtime, query, &self.options).await {
            Ok(response) if !response.results.is_empty() => {
                let text = truncate_to_tokens(&render(&response), MAX_RESPONSE_TOKENS);
                info!(results = response.results.len(), "web search answered");
                let content = json!({
                    "query": query,
                    "answer": response.answer,
                    "results": response.results,
                });
                (Content::text(text).with_content(content), true)
            }
            Ok(_) => {
                warn!(query, "search returned no results");
                (
                    Content::text(NO_RESULTS).with_error(json!({ "message": NO_RESULTS, "soft": true })),
                    false,
                )
            }
            Err(e) => {
                error!(query, status = ?e.status(), error = %e, "web search action failed");
                failure(&e)
            }
        }
    }
}

fn failure(e: &PluginError) -> (Content, bool) {
    (
        Content::text(ERRORS.user_message(e)).with_error(ERRORS.payload(e)),
        false,
    )
}

fn example(question: &str, reply: &str) -> Vec<ActionExample> {
    vec![
        ActionExample::user(question),
        ActionExample::agent_action(reply, NAME),
    ]
}

#[async_trait]
impl Action for WebSearch {
    fn name(&self) -> &str {
        NAME
    }

    fn similes(&self) -> &[&str] {
        SIMILES
    }

    fn description(&self) -> &str {
        "Perform a web search to find information related to the message."
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            example(
                "Find the latest news about SpaceX launches.",
                "Here is the latest news about SpaceX launches:",
            ),
            example(
                "Can you find details about the iPhone 16 release?",
                "Here are the details I found about the iPhone 16 release:",
            ),
            example(
                "What is the schedule for the next FIFA World Cup?",
                "Here is the schedule for the next FIFA World Cup:",
            ),
            example(
                "Check the latest stock price of Tesla.",
                "Here is the latest stock price of Tesla I found:",
            ),
            example(
                "What are the current trending movies in the US?",
                "Here are the current trending movies in the US:",
            ),
            example(
                "What is the latest score in the NBA finals?",
                "Here is the latest score from the NBA finals:",
            ),
            example(
                "When is the next Apple keynote event?",
                "Here is the information about the next Apple keynote event:",
            ),
        ]
    }

    async fn validate(&self, runtime: &dyn Runtime, _message: &Memory) -> bool {
        runtime.get_setting("TAVILY_API_KEY").is_some()
    }

    async fn handler(
        &self,
        runtime: &dyn Runtime,
        message: &Memory,
        state: Option<State>,
        _options: &HandlerOptions,
        callback: Option<Callback<'_>>,
    ) -> Result<bool> {
        info!(action = NAME, "handling action");
        // Refreshed for the host; the query is the raw message text.
        let state = match state {
            Some(state) => runtime.update_recent_message_state(state).await,
            None => runtime.compose_state(message).await,
        };

        let query = message.text().trim();
        let (content, ok) = match state {
            Ok(_) => self.search(runtime, query).await,
            Err(e) => {
                error!(action = NAME, error = %e, "could not compose state");
                failure(&e)
            }
        };
        if let Some(cb) = callback {
            cb(content.with_action(NAME));
        }
        Ok(ok)
    }
}
