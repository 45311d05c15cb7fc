use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::AthenaConfig;

/// The loaded Athena configuration and the path it was resolved from.
pub struct ConfigLoader {
    config: AthenaConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > ATHENA_CONFIG env > ~/.athena/athena.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("ATHENA_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".athena")
            .join("athena.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> athena_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::parse_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            AthenaConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(athena_core::PluginError::Config(e));
            }
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get(&self) -> &AthenaConfig {
        &self.config
    }

    pub fn into_config(self) -> AthenaConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn parse_file(path: &Path) -> athena_core::Result<AthenaConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<AthenaConfig>(&raw).map_err(|e| {
            athena_core::PluginError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply env var overrides (ATHENA_SMALL_MODEL, ATHENA_LOG_LEVEL, etc.)
    pub fn apply_env_overrides(mut config: AthenaConfig) -> AthenaConfig {
        if let Ok(v) = std::env::var("ATHENA_SMALL_MODEL") {
            config.agent.small_model = v;
        }
        if let Ok(v) = std::env::var("ATHENA_LARGE_MODEL") {
            config.agent.large_model = v;
        }
        if let Ok(v) = std::env::var("ATHENA_LOG_LEVEL") {
            config.logging.level = v;
        }
        // Config file takes priority, env is the fallback.
        if config.agent.api_key.is_none()
            && let Ok(v) = std::env::var("OPENAI_API_KEY")
        {
            config.agent.api_key = Some(v);
        }
        config
    }
}
