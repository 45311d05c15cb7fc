#[cfg(test)]
mod tests {
    use athena_core::*;
    use athena_llm::MockProvider;
    use athena_runtime::AgentRuntime;
    use plugin_web_search::action::{MAX_RESPONSE_TOKENS, NO_RESULTS};
    use plugin_web_search::{WebSearchService, web_search_plugin};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ── Helpers ────────────────────────────────────────────────

    fn runtime(server: &MockServer) -> AgentRuntime {
        let mut rt = AgentRuntime::new(Arc::new(MockProvider::new("m")))
            .isolated()
            .with_setting("TAVILY_API_KEY", "tvly-test")
            .with_setting("TAVILY_BASE_URL", server.uri());
        rt.register(web_search_plugin()).unwrap();
        rt
    }

    async fn mount_search(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-test"))
            .and(body_partial_json(json!({
                "include_answer": true,
                "max_results": 3,
                "topic": "general",
                "search_depth": "basic",
                "include_images": false,
                "days": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    // ── Registration ───────────────────────────────────────────

    #[test]
    fn test_plugin_shape() {
        let plugin = web_search_plugin();
        assert_eq!(plugin.action_names(), vec!["WEB_SEARCH"]);
        assert_eq!(plugin.services.len(), 1);
        assert_eq!(plugin.services[0].service_type(), "web_search");
        assert!(plugin.action("lookup").is_some());
        assert_eq!(plugin.action("WEB_SEARCH").unwrap().similes().len(), 9);
    }

    #[tokio::test]
    async fn test_validate_requires_key() {
        let mut rt = AgentRuntime::new(Arc::new(MockProvider::new("m"))).isolated();
        rt.register(web_search_plugin()).unwrap();
        let (ok, delivered) = rt
            .invoke("WEB_SEARCH", "latest spacex news", Uuid::new_v4())
            .await
            .unwrap();
        assert!(!ok);
        assert!(delivered.is_empty());
    }

    #[tokio::test]
    async fn test_service_initialize_requires_key() {
        let rt = AgentRuntime::new(Arc::new(MockProvider::new("m"))).isolated();
        let service = WebSearchService::new();
        let err = service.initialize(&rt).await.unwrap_err();
        assert!(matches!(err, PluginError::Configuration(_)));
        assert!(err.to_string().contains("TAVILY_API_KEY"));
        assert!(!service.is_initialized());
    }

    // ── Searching ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_search_renders_answer_and_links() {
        let server = MockServer::start().await;
        mount_search(
            &server,
            json!({
                "query": "latest spacex launches",
                "answer": "SpaceX launched Starlink satellites yesterday.",
                "results": [
                    { "title": "Launches", "url": "https://spacex.com/launches", "content": "...", "score": 0.9 },
                    { "title": "News", "url": "https://news.example/spacex", "content": "...", "score": 0.7 }
                ],
                "images": [],
                "response_time": 1.2
            }),
        )
        .await;

        let rt = runtime(&server);
        rt.initialize().await;
        let (ok, delivered) = rt
            .invoke("SEARCH_WEB", "latest spacex launches", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(delivered.len(), 1);
        assert_eq!(
            delivered[0].text,
            "SpaceX launched Starlink satellites yesterday.\n\n\
             For more details, you can check out these resources:\n\
             1. [Launches](https://spacex.com/launches)\n\
             2. [News](https://news.example/spacex)"
        );
        assert_eq!(delivered[0].action.as_deref(), Some("WEB_SEARCH"));
        let content = delivered[0].content.as_ref().unwrap();
        assert_eq!(content["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_is_raw_message_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({ "query": "When is the next Apple keynote event?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "September.",
                "results": [ { "title": "Apple", "url": "https://apple.com" } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rt = runtime(&server);
        let (ok, _) = rt
            .invoke("WEB_SEARCH", "  When is the next Apple keynote event?  ", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_no_results() {
        let server = MockServer::start().await;
        mount_search(&server, json!({ "query": "zzz", "answer": null, "results": [] })).await;

        let rt = runtime(&server);
        let (ok, delivered) = rt.invoke("WEB_SEARCH", "zzz", Uuid::new_v4()).await.unwrap();
        assert!(!ok);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].text, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_long_answer_is_truncated() {
        let server = MockServer::start().await;
        mount_search(
            &server,
            json!({
                "answer": "x".repeat(20_000),
                "results": [ { "title": "Long", "url": "https://long.example" } ]
            }),
        )
        .await;

        let rt = runtime(&server);
        let (ok, delivered) = rt.invoke("WEB_SEARCH", "long", Uuid::new_v4()).await.unwrap();
        assert!(ok);
        assert_eq!(delivered[0].text.chars().count(), MAX_RESPONSE_TOKENS * 4);
    }

    #[tokio::test]
    async fn test_rate_limited_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let rt = runtime(&server);
        let (ok, delivered) = rt.invoke("WEB_SEARCH", "anything", Uuid::new_v4()).await.unwrap();
        assert!(!ok);
        assert_eq!(delivered[0].text, "Rate limit exceeded. Please try again later.");
        assert_eq!(delivered[0].error.as_ref().unwrap()["statusCode"], 429);
    }
}
