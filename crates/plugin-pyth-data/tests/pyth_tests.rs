#[cfg(test)]
mod tests {
    use athena_llm::MockProvider;
    use athena_runtime::AgentRuntime;
    use plugin_pyth_data::pyth_data_plugin;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BTC: &str = "e62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43";
    const ETH: &str = "ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace";

    // ── Helpers ────────────────────────────────────────────────

    fn runtime(server: &MockServer, mock: MockProvider) -> AgentRuntime {
        let mut rt = AgentRuntime::new(Arc::new(mock))
            .isolated()
            .with_setting("PYTH_HERMES_URL", server.uri());
        rt.register(pyth_data_plugin()).unwrap();
        rt
    }

    fn parsed(id: &str, price: &str) -> Value {
        json!({
            "id": id,
            "price": { "price": price, "conf": "1500000", "expo": -8, "publish_time": 1_737_299_045 },
            "ema_price": { "price": price, "conf": "1600000", "expo": -8, "publish_time": 1_737_299_045 },
            "metadata": { "slot": 1, "proof_available_time": 1_737_299_046, "prev_publish_time": 1_737_299_044 }
        })
    }

    // ── Registry ───────────────────────────────────────────────

    #[test]
    fn test_registry_order() {
        let plugin = pyth_data_plugin();
        assert_eq!(plugin.name, "pyth-data");
        assert_eq!(
            plugin.action_names(),
            vec![
                "GET_PRICE_FEEDS",
                "GET_PRICE_UPDATES_STREAM",
                "GET_LATEST_PRICE_UPDATES",
                "GET_LATEST_PUBLISHER_CAPS",
            ]
        );
    }

    // ── GET_PRICE_FEEDS ────────────────────────────────────────

    #[tokio::test]
    async fn test_price_feeds_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/price_feeds"))
            .and(query_param("query", "btc"))
            .and(query_param("asset_type", "crypto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": BTC, "attributes": { "asset_type": "Crypto", "symbol": "Crypto.BTC/USD", "description": "BITCOIN / US DOLLAR" } },
                { "id": ETH, "attributes": { "asset_type": "Crypto", "symbol": "Crypto.WBTC/BTC" } }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mock = MockProvider::new("m").with_json(json!({ "query": "btc", "asset_type": "crypto", "limit": 1 }));
        let rt = runtime(&server, mock);
        let (ok, delivered) = rt
            .invoke("GET_PRICE_FEEDS", "which pyth feeds exist for btc?", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ok);
        let text = &delivered[0].text;
        assert!(text.starts_with("Found 2 Pyth price feeds matching \"btc\". Showing 1:"));
        assert!(text.contains("1. Crypto.BTC/USD (crypto)"));
        assert!(!text.contains("WBTC"));
        assert_eq!(delivered[0].content.as_ref().unwrap()["total"], 2);
    }

    // ── GET_LATEST_PRICE_UPDATES ───────────────────────────────

    #[tokio::test]
    async fn test_latest_prices_normalizes_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/updates/price/latest"))
            .and(query_param("ids[]", BTC))
            .and(query_param("parsed", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "binary": { "encoding": "hex", "data": ["504e4155"] },
                "parsed": [ parsed(BTC, "6512345678901") ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mock = MockProvider::new("m")
            .with_json(json!({ "price_ids": format!("0x{}", BTC.to_uppercase()) }));
        let rt = runtime(&server, mock);
        let (ok, delivered) = rt
            .invoke("GET_LATEST_PRICE_UPDATES", "latest btc price from pyth", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(
            delivered[0].text,
            format!(
                "Latest Pyth prices:\n\nFeed 0x{BTC}\n  Price: 65,123.45678901 ± 0.015\n  \
                 EMA Price: 65,123.45678901 ± 0.016\n  Published: 1/19/2025, 3:04:05 PM UTC"
            )
        );
        let content = delivered[0].content.as_ref().unwrap();
        assert_eq!(content["params"]["price_ids"], json!([BTC]));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_the_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/updates/price/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "parsed": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let rt = runtime(&server, MockProvider::new("m").with_json(json!({ "price_ids": ["0xdeadbeef"] })));
        let (ok, delivered) = rt
            .invoke("GET_LATEST_PRICE_UPDATES", "price for 0xdeadbeef", Uuid::new_v4())
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(delivered[0].error.as_ref().unwrap()["soft"], true);
        assert!(delivered[0].text.contains("0xdeadbeef"));
    }

    #[tokio::test]
    async fn test_latest_prices_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/updates/price/latest"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown price id"))
            .mount(&server)
            .await;

        let rt = runtime(&server, MockProvider::new("m").with_json(json!({ "price_ids": [BTC] })));
        let (ok, delivered) = rt
            .invoke("GET_LATEST_PRICE_UPDATES", "btc price", Uuid::new_v4())
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(
            delivered[0].text,
            "Invalid request parameters. Please check your input."
        );
    }

    // ── GET_PRICE_UPDATES_STREAM ───────────────────────────────

    #[tokio::test]
    async fn test_stream_stops_at_max_updates() {
        let server = MockServer::start().await;
        let events: String = ["6500000000000", "6500100000000", "6500200000000"]
            .iter()
            .map(|p| format!("data:{}\n\n", json!({ "parsed": [ parsed(ETH, p) ] })))
            .collect();
        Mock::given(method("GET"))
            .and(path("/v2/updates/price/stream"))
            .and(query_param("ids[]", ETH))
            .respond_with(ResponseTemplate::new(200).set_body_raw(events, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let mock = MockProvider::new("m").with_json(json!({ "price_ids": [ETH], "max_updates": 2 }));
        let rt = runtime(&server, mock);
        let (ok, delivered) = rt
            .invoke("WATCH_PRICES", "stream eth prices", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ok);
        let text = &delivered[0].text;
        assert!(text.starts_with("Received 2 Pyth price updates:"));
        assert!(text.contains("Update 2:\nFeed 0x"));
        assert!(!text.contains("Update 3:"));
        assert_eq!(delivered[0].content.as_ref().unwrap()["count"], 2);
    }

    #[tokio::test]
    async fn test_empty_stream_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/updates/price/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(": keep-alive\n\n", "text/event-stream"))
            .mount(&server)
            .await;

        let rt = runtime(&server, MockProvider::new("m").with_json(json!({ "price_ids": ETH })));
        let (ok, delivered) = rt
            .invoke("GET_PRICE_UPDATES_STREAM", "stream eth", Uuid::new_v4())
            .await
            .unwrap();
        assert!(!ok);
        assert!(delivered[0].text.starts_with("Error fetching price update stream:"));
    }

    // ── GET_LATEST_PUBLISHER_CAPS ──────────────────────────────

    #[tokio::test]
    async fn test_publisher_caps_without_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/updates/publisher_stake_caps/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "binary": { "encoding": "base64", "data": ["UE5BVQ=="] },
                "parsed": [ { "publisher_stake_caps": [
                    { "publisher": "Small", "cap": 1500 },
                    { "publisher": "Large", "cap": 2500000 }
                ] } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mock = MockProvider::new("m");
        let requests = mock.recorded_requests();
        let rt = runtime(&server, mock);
        let (ok, delivered) = rt
            .invoke("PUBLISHER_CAPS", "show publisher caps", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(
            delivered[0].text,
            "Latest Pyth publisher stake caps (2 publishers):\n\n1. Large: 2,500,000\n2. Small: 1,500"
        );
        assert!(requests.lock().is_empty());
    }
}
