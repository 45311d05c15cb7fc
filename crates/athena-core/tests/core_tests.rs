#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use athena_core::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    // ── Message tests ──────────────────────────────────────────

    #[test]
    fn test_memory_user_text() {
        let agent = Uuid::new_v4();
        let user = Uuid::new_v4();
        let msg = Memory::user_text(agent, user, Uuid::nil(), "hello");
        assert_eq!(msg.text(), "hello");
        assert!(!msg.is_from_agent());
        assert!(msg.content.action.is_none());
    }

    #[test]
    fn test_content_builders() {
        let c = Content::text("ok")
            .with_content(json!({"a": 1}))
            .with_action("GET_PRICE");
        assert!(!c.is_error());
        assert_eq!(c.action.as_deref(), Some("GET_PRICE"));

        let e = Content::text("boom").with_error(json!({"statusCode": 429}));
        assert!(e.is_error());
    }

    #[test]
    fn test_content_serde_skips_empty_fields() {
        let c = Content::text("plain");
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(s, r#"{"text":"plain"}"#);
    }

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_error_soft_classification() {
        assert!(PluginError::ExtractionFailed("null".into()).is_soft());
        assert!(PluginError::UnresolvedCategory("foo".into()).is_soft());
        assert!(!PluginError::Configuration("no key".into()).is_soft());
        assert!(
            !PluginError::UpstreamHttp {
                status: Some(429),
                message: "too many".into()
            }
            .is_soft()
        );
    }

    #[test]
    fn test_error_status_through_retry_wrapper() {
        let err = PluginError::UpstreamUnavailable {
            resource: "categories".into(),
            attempts: 3,
            source: Box::new(PluginError::UpstreamHttp {
                status: Some(503),
                message: "unavailable".into(),
            }),
        };
        assert_eq!(err.status(), Some(503));
        let s = err.to_string();
        assert!(s.contains("categories"));
        assert!(s.contains("3 attempts"));
    }

    #[test]
    fn test_error_unresolved_category_display() {
        let err = PluginError::UnresolvedCategory("moonshots".into());
        assert!(err.to_string().contains("moonshots"));
    }

    // ── Cache tests ────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_cache_entry_lives_until_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("k", json!([1, 2]), CacheOptions::expires_in(Duration::from_secs(300)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("k").await, Some(json!([1, 2])));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_without_expiry_persists() {
        let cache = MemoryCache::new();
        cache.set("k", json!("v"), CacheOptions::default()).await.unwrap();
        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(cache.get("k").await, Some(json!("v")));
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_cache_overwrite() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), CacheOptions::default()).await.unwrap();
        cache.set("k", json!(2), CacheOptions::default()).await.unwrap();
        assert_eq!(cache.get("k").await, Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    // ── Plugin registry tests ──────────────────────────────────

    struct Noop(&'static str);

    #[async_trait]
    impl Action for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn similes(&self) -> &[&str] {
            &["DO_NOTHING"]
        }

        fn description(&self) -> &str {
            "does nothing"
        }

        fn examples(&self) -> Vec<Vec<ActionExample>> {
            vec![]
        }

        async fn validate(&self, _runtime: &dyn Runtime, _message: &Memory) -> bool {
            true
        }

        async fn handler(
            &self,
            _runtime: &dyn Runtime,
            _message: &Memory,
            _state: Option<State>,
            _options: &HandlerOptions,
            callback: Option<Callback<'_>>,
        ) -> Result<bool> {
            if let Some(cb) = callback {
                cb(Content::text("done"));
            }
            Ok(true)
        }
    }

    #[test]
    fn test_plugin_lookup_by_name_and_simile() {
        let plugin = Plugin::new("test", "test plugin")
            .with_action(Arc::new(Noop("FIRST")))
            .with_action(Arc::new(Noop("SECOND")));
        assert_eq!(plugin.action_names(), vec!["FIRST", "SECOND"]);
        assert_eq!(plugin.action("second").unwrap().name(), "SECOND");
        // Similes resolve to the first registered action that declares them.
        assert_eq!(plugin.action("DO_NOTHING").unwrap().name(), "FIRST");
        assert!(plugin.action("MISSING").is_none());
        assert!(plugin.validate().is_ok());
    }

    #[test]
    fn test_plugin_rejects_duplicate_names() {
        let plugin = Plugin::new("dup", "dup")
            .with_action(Arc::new(Noop("SAME")))
            .with_action(Arc::new(Noop("same")));
        assert!(matches!(plugin.validate(), Err(PluginError::Config(_))));
    }
}
