use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::cache::CacheStore;
use crate::message::Memory;
use crate::state::State;
use crate::Result;

/// Model tier requested from the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelClass {
    Small,
    Large,
}

/// A structured-generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Fully rendered prompt.
    pub context: String,
    pub model_class: ModelClass,
    /// JSON Schema the reply should conform to.
    pub schema: Value,
}

/// Everything a plugin may ask of the hosting agent runtime.
#[async_trait]
pub trait Runtime: Send + Sync {
    fn agent_id(&self) -> Uuid;

    /// Look up a setting or secret. Empty values are reported as absent.
    fn get_setting(&self, key: &str) -> Option<String>;

    fn cache(&self) -> &dyn CacheStore;

    /// Build a fresh state for `message`.
    async fn compose_state(&self, message: &Memory) -> Result<State>;

    /// Refresh the recent-message fields of an existing state.
    async fn update_recent_message_state(&self, state: State) -> Result<State>;

    /// Ask the model for a JSON object. `Ok(None)` means the model answered
    /// `null`, i.e. the request does not match what the prompt asked for.
    async fn generate_object(&self, request: GenerateRequest) -> Result<Option<Value>>;
}
