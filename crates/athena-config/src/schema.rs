use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration, maps to `athena.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AthenaConfig {
    pub agent: AgentConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
    /// Free-form settings and secrets (API keys) handed to plugins.
    pub settings: HashMap<String, String>,
}

// ── Agent ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Display name used in composed conversation state.
    pub name: String,
    /// Base URL of the OpenAI-compatible generation endpoint.
    pub base_url: String,
    /// API key for the generation endpoint.
    /// Can also be set via OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Model used for `ModelClass::Small` extraction calls.
    pub small_model: String,
    /// Model used for `ModelClass::Large` extraction calls.
    pub large_model: String,
    /// Temperature (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens per generation.
    pub max_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "athena".into(),
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            small_model: "gpt-4o-mini".into(),
            large_model: "gpt-4o".into(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

// ── Reference data ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of cached reference lists (coins, categories).
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per reference-data fetch, including the first.
    pub max_attempts: u32,
    /// Backoff unit: attempt `n` waits `n * backoff_step_ms` before retrying.
    pub backoff_step_ms: u64,
    /// Socket timeout for a single reference-data request.
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step_ms: 1000,
            request_timeout_secs: 5,
        }
    }
}

impl FetchConfig {
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{} {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl AthenaConfig {
    /// Look up a plugin setting: the `[settings]` table first, then the
    /// process environment. Empty values count as unset.
    pub fn get_setting(&self, key: &str) -> Option<String> {
        self.settings
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .filter(|v| !v.trim().is_empty())
    }

    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Models ───
        for (field, model) in [
            ("agent.small_model", &self.agent.small_model),
            ("agent.large_model", &self.agent.large_model),
        ] {
            if model.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: field.into(),
                    message: "model is empty".into(),
                    severity: WarningSeverity::Error,
                    hint: Some("Set to e.g. 'gpt-4o-mini'".into()),
                });
            }
        }

        if self.agent.api_key.is_none() {
            warnings.push(ConfigWarning {
                field: "agent.api_key".into(),
                message: "no generation API key set; parameter extraction will fail".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set agent.api_key or OPENAI_API_KEY".into()),
            });
        }

        // ── Temperature ───
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            warnings.push(ConfigWarning {
                field: "agent.temperature".into(),
                message: format!("temperature {} is out of range", self.agent.temperature),
                severity: WarningSeverity::Error,
                hint: Some("Temperature must be between 0.0 and 2.0".into()),
            });
        }

        if self.agent.max_tokens == 0 {
            warnings.push(ConfigWarning {
                field: "agent.max_tokens".into(),
                message: "max_tokens is 0, the model cannot answer".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 1024".into()),
            });
        }

        // ── Reference data ───
        if self.fetch.max_attempts == 0 {
            warnings.push(ConfigWarning {
                field: "fetch.max_attempts".into(),
                message: "max_attempts is 0, reference data can never be fetched".into(),
                severity: WarningSeverity::Error,
                hint: Some("Use at least 1; 3 is the usual value".into()),
            });
        }

        if self.cache.ttl_secs == 0 {
            warnings.push(ConfigWarning {
                field: "cache.ttl_secs".into(),
                message: "ttl is 0, every action will refetch reference data".into(),
                severity: WarningSeverity::Warning,
                hint: Some("300 seconds is typical".into()),
            });
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
