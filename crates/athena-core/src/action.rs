use async_trait::async_trait;
use serde_json::Value;

use crate::message::{ActionExample, Content, Memory};
use crate::runtime::Runtime;
use crate::state::State;
use crate::Result;

/// Delivery sink for an action's result.
pub type Callback<'a> = &'a mut (dyn FnMut(Content) + Send);

/// Extra options the host may pass to a handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    pub values: serde_json::Map<String, Value>,
}

/// A named, independently invokable unit of agent behavior.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique name, e.g. "GET_MARKETS".
    fn name(&self) -> &str;

    /// Alternate trigger names.
    fn similes(&self) -> &[&str];

    fn description(&self) -> &str;

    /// Example transcripts shown to the model when choosing an action.
    fn examples(&self) -> Vec<Vec<ActionExample>>;

    /// Whether this action can run at all for `message`.
    async fn validate(&self, runtime: &dyn Runtime, message: &Memory) -> bool;

    /// Run the action. Delivers exactly one result through `callback` and
    /// returns whether the action succeeded.
    async fn handler(
        &self,
        runtime: &dyn Runtime,
        message: &Memory,
        state: Option<State>,
        options: &HandlerOptions,
        callback: Option<Callback<'_>>,
    ) -> Result<bool>;

    /// Whether `name` is this action's name or one of its similes.
    fn answers_to(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
            || self.similes().iter().any(|s| s.eq_ignore_ascii_case(name))
    }
}
