//! # plugin-web-search
//!
//! A single `WEB_SEARCH` action backed by Tavily. Requires the
//! `TAVILY_API_KEY` setting; `TAVILY_BASE_URL` optionally points the client
//! at another host.

pub mod action;
pub mod service;

use athena_core::Plugin;
use std::sync::Arc;

pub use action::WebSearch;
pub use service::{SearchDepth, SearchOptions, SearchResponse, SearchResult, Topic, WebSearchService};

pub fn web_search_plugin() -> Plugin {
    let service = Arc::new(WebSearchService::new());
    Plugin::new("webSearch", "Search the web and get news")
        .with_action(Arc::new(WebSearch::new(service.clone())))
        .with_service(service)
}
