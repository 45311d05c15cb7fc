#[cfg(test)]
mod tests {
    use athena_llm::mock::{MockProvider, MockResponse};
    use athena_llm::provider::{ChatMessage, LlmProvider, LlmRequest};
    use athena_llm::OpenAiProvider;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_request(model: &str) -> LlmRequest {
        LlmRequest {
            model: model.to_string(),
            system: None,
            messages: vec![ChatMessage::user("Extract the parameters")],
            max_tokens: 100,
            temperature: 0.0,
            json_mode: true,
        }
    }

    // ── Mock provider ──────────────────────────────────────────

    #[tokio::test]
    async fn test_mock_returns_queued_in_order() {
        let mock = MockProvider::new("mock")
            .with_json(json!({"limit": 5}))
            .with_response("second");
        let req = make_request("mock/model");
        assert_eq!(mock.complete(&req).await.unwrap().text, r#"{"limit":5}"#);
        assert_eq!(mock.complete(&req).await.unwrap().text, "second");
        // Exhausted queue answers null.
        assert_eq!(mock.complete(&req).await.unwrap().text, "null");
        assert_eq!(mock.recorded_requests().lock().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_error() {
        let mock = MockProvider::new("mock");
        mock.queue_response(MockResponse::error("HTTP 500: boom"));
        let err = mock.complete(&make_request("m")).await.unwrap_err();
        assert!(matches!(err, athena_core::PluginError::Generation(_)));
    }

    // ── OpenAI-compatible provider ─────────────────────────────

    #[tokio::test]
    async fn test_openai_complete_parses_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "{\"coinIds\":\"bitcoin\"}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 40, "completion_tokens": 8}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("sk-test".into()).with_base_url(server.uri());
        let resp = provider.complete(&make_request("gpt-4o-mini")).await.unwrap();
        assert_eq!(resp.text, r#"{"coinIds":"bitcoin"}"#);
    }

    #[tokio::test]
    async fn test_openai_http_error_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("sk-wrong".into()).with_base_url(server.uri());
        let err = provider.complete(&make_request("gpt-4o")).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"), "{msg}");
        assert!(msg.contains("bad key"), "{msg}");
    }
}
