//! # athena-config
//!
//! Configuration for the Athena host. Reads `athena.toml`, then applies
//! environment overrides. Plugin secrets live in the `[settings]` table and
//! fall back to same-named environment variables.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    AgentConfig, AthenaConfig, CacheConfig, ConfigWarning, FetchConfig, LoggingConfig,
    WarningSeverity,
};
