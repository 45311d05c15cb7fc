//! Tavily search client, initialized once from the runtime's settings.

use async_trait::async_trait;
use athena_actions::{Auth, UpstreamClient};
use athena_core::{PluginError, Result, Runtime, Service};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

pub const SERVICE_TYPE: &str = "web_search";
pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    News,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

/// Request options sent alongside the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOptions {
    pub include_answer: bool,
    pub max_results: u32,
    pub topic: Topic,
    pub search_depth: SearchDepth,
    pub include_images: bool,
    /// Look-back window in days; only honored by the news topic.
    pub days: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_answer: true,
            max_results: 3,
            topic: Topic::General,
            search_depth: SearchDepth::Basic,
            include_images: false,
            days: 3,
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(flatten)]
    options: &'a SearchOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub images: Vec<Value>,
    #[serde(default)]
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// Holds the Tavily client once credentials have been read.
///
/// Initialization happens on the first `initialize` or `search`, whichever
/// comes first; later calls reuse the same client.
#[derive(Default)]
pub struct WebSearchService {
    client: OnceCell<UpstreamClient>,
}

impl WebSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    async fn client(&self, runtime: &dyn Runtime) -> Result<&UpstreamClient> {
        self.client
            .get_or_try_init(|| async { connect(runtime) })
            .await
    }

    pub async fn search(
        &self,
        runtime: &dyn Runtime,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let client = self.client(runtime).await?;
        info!(
            query,
            max_results = options.max_results,
            topic = ?options.topic,
            depth = ?options.search_depth,
            "searching the web"
        );
        let body = serde_json::to_value(SearchRequest { query, options })?;
        client
            .post_json("/search", &body)
            .await
            .inspect_err(|e| error!(query, status = ?e.status(), error = %e, "web search failed"))
    }
}

fn connect(runtime: &dyn Runtime) -> Result<UpstreamClient> {
    let api_key = runtime
        .get_setting("TAVILY_API_KEY")
        .ok_or_else(|| PluginError::Configuration("TAVILY_API_KEY is not set".into()))?;
    let base_url = runtime
        .get_setting("TAVILY_BASE_URL")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    Ok(UpstreamClient::new(base_url, Auth::Bearer(api_key)))
}

#[async_trait]
impl Service for WebSearchService {
    fn service_type(&self) -> &str {
        SERVICE_TYPE
    }

    async fn initialize(&self, runtime: &dyn Runtime) -> Result<()> {
        self.client(runtime).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_defaults() {
        let options = SearchOptions::default();
        let body = serde_json::to_value(SearchRequest {
            query: "spacex launches",
            options: &options,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "query": "spacex launches",
                "include_answer": true,
                "max_results": 3,
                "topic": "general",
                "search_depth": "basic",
                "include_images": false,
                "days": 3
            })
        );
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "results": [ { "title": "T", "url": "https://example.com" } ]
        }))
        .unwrap();
        assert!(resp.answer.is_none());
        assert_eq!(resp.results.len(), 1);
        assert!(resp.results[0].content.is_empty());
    }
}
