//! # athena-core
//!
//! The contract between action plugins and the agent runtime hosting them:
//! messages, conversation state, the cache service, structured generation,
//! and the `Action` / `Provider` / `Service` / `Plugin` registry types.

pub mod action;
pub mod cache;
pub mod error;
pub mod message;
pub mod plugin;
pub mod runtime;
pub mod state;

pub use action::{Action, Callback, HandlerOptions};
pub use cache::{CacheOptions, CacheStore, MemoryCache};
pub use error::{PluginError, Result};
pub use message::{ActionExample, Content, Memory};
pub use plugin::{Plugin, Provider, Service};
pub use runtime::{GenerateRequest, ModelClass, Runtime};
pub use state::State;
