#[cfg(test)]
mod tests {
    use athena_config::ConfigLoader;
    use athena_config::schema::*;
    use std::io::Write;
    use std::time::Duration;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.name, "athena");
        assert_eq!(config.small_model, "gpt-4o-mini");
        assert_eq!(config.large_model, "gpt-4o");
        assert_eq!(config.max_tokens, 1024);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_reference_data_defaults() {
        let config = AthenaConfig::default();
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.backoff_step(), Duration::from_secs(1));
        assert_eq!(config.fetch.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = AthenaConfig::default();
        config
            .settings
            .insert("COINGECKO_API_KEY".into(), "demo-key".into());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: AthenaConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.agent.small_model, config.agent.small_model);
        assert_eq!(restored.fetch.max_attempts, config.fetch.max_attempts);
        assert_eq!(
            restored.settings.get("COINGECKO_API_KEY").map(String::as_str),
            Some("demo-key")
        );
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let config: AthenaConfig = toml::from_str(
            r#"
[fetch]
max_attempts = 5
"#,
        )
        .unwrap();
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.backoff_step_ms, 1000);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.agent.small_model, "gpt-4o-mini");
        assert!(config.settings.is_empty());
    }

    // ── Settings tests ─────────────────────────────────────────

    #[test]
    fn test_get_setting_prefers_table() {
        let mut config = AthenaConfig::default();
        config.settings.insert("PATH".into(), "from-table".into());
        assert_eq!(config.get_setting("PATH").as_deref(), Some("from-table"));
    }

    #[test]
    fn test_get_setting_falls_back_to_env() {
        let config = AthenaConfig::default();
        // PATH is present in any test environment.
        assert!(config.get_setting("PATH").is_some());
        assert!(config.get_setting("ATHENA_SURELY_UNSET_SETTING_42").is_none());
    }

    #[test]
    fn test_get_setting_empty_is_unset() {
        let mut config = AthenaConfig::default();
        config
            .settings
            .insert("ATHENA_EMPTY_SETTING".into(), "   ".into());
        assert!(config.get_setting("ATHENA_EMPTY_SETTING").is_none());
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_validate_defaults_has_no_errors() {
        let mut config = AthenaConfig::default();
        config.agent.api_key = Some("sk-test".into());
        let warnings = config.validate().unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_validate_missing_api_key_is_warning() {
        let config = AthenaConfig::default();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "agent.api_key"
            && w.severity == WarningSeverity::Warning));
    }

    #[test]
    fn test_validate_zero_attempts_is_error() {
        let mut config = AthenaConfig::default();
        config.fetch.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("fetch.max_attempts"));
    }

    #[test]
    fn test_validate_bad_temperature_is_error() {
        let mut config = AthenaConfig::default();
        config.agent.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_warning_display_includes_hint() {
        let w = ConfigWarning {
            field: "logging.format".into(),
            message: "unknown log format 'xml'".into(),
            severity: WarningSeverity::Warning,
            hint: Some("Valid values: pretty, json, compact".into()),
        };
        let s = w.to_string();
        assert!(s.starts_with("warning logging.format"));
        assert!(s.contains("Valid values"));
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_resolve_path_explicit_wins() {
        let p = std::path::Path::new("/tmp/custom-athena.toml");
        assert_eq!(ConfigLoader::resolve_path(Some(p)), p.to_path_buf());
    }

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("athena.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[agent]
name = "oracle"
max_tokens = 2048

[cache]
ttl_secs = 60

[settings]
TAVILY_API_KEY = "tvly-test"
"#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(config.agent.name, "oracle");
        assert_eq!(config.agent.max_tokens, 2048);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.get_setting("TAVILY_API_KEY").as_deref(), Some("tvly-test"));
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("athena.toml");
        std::fs::write(&config_path, "[fetch]\nmax_attempts = 0\n").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("athena.toml");
        std::fs::write(&config_path, "[agent\nname = ").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("absent.toml");

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert_eq!(loader.path(), config_path.as_path());
        assert_eq!(loader.get().cache.ttl_secs, 300);
        assert_eq!(loader.into_config().fetch.max_attempts, 3);
    }
}
